use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use regclean::{
    ExclusionEntry, MemoryStore, Orchestrator, ScanConfig, Section, SectionSelection, SessionResult, SessionStatus,
};
use tracing::warn;

use crate::console::ConsoleObserver;
use crate::logging;
use crate::snapshot::ExportSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "regclean", version, about = "Scan a registry export for entries that reference missing files")]
pub struct Cli {
    /// Registry export to scan (.json, .yaml or .yml)
    pub store: PathBuf,

    /// Scan only these sections (repeatable or comma separated)
    #[arg(long = "section", value_delimiter = ',')]
    pub sections: Vec<Section>,

    /// Skip these sections
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<Section>,

    /// Suppress findings at or beneath this key (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Directory receiving the session log
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Write a restore point of the store before scanning
    #[arg(long)]
    pub snapshot: bool,

    /// Directory receiving restore points
    #[arg(long, default_value = "restore-points")]
    pub snapshot_dir: PathBuf,

    /// Windows directory used to resolve relative file references
    #[arg(long, default_value = regclean::DEFAULT_SYSTEM_ROOT)]
    pub system_root: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Do not print progress while scanning
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase diagnostics (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Sections to scan: `--section` (or every section) minus `--skip`.
    #[must_use]
    pub fn selection(&self) -> SectionSelection {
        let mut selection = if self.sections.is_empty() {
            SectionSelection::all()
        } else {
            self.sections.iter().copied().collect()
        };
        for section in &self.skip {
            selection.disable(*section);
        }
        selection
    }

    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        let mut config = ScanConfig::with_system_root(&self.system_root);
        config.log_dir.clone_from(&self.log_dir);
        config.create_snapshot = self.snapshot;
        for path in &self.exclude {
            config.exclusions.push(ExclusionEntry::from_path(path));
        }
        config
    }
}

/// Parse the command line, scan, and print the report.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded, the session cannot start,
/// or the report cannot be written.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = scan(&cli).await?;
    let mut stdout = std::io::stdout().lock();
    write_report(&result, cli.format, &mut stdout)?;

    if cli.format == OutputFormat::Human {
        let verdict = match result.status {
            SessionStatus::Aborted => "Scan aborted".red().bold(),
            _ if result.findings.is_empty() => "Registry is clean".green().bold(),
            _ => format!("{} problem(s) found", result.findings_count()).yellow().bold(),
        };
        writeln!(stdout, "{verdict}")?;
    }
    Ok(())
}

/// Run a scan session for `cli`, aborting it on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded, no section is enabled, or
/// the session fails to start or finish.
pub async fn scan(cli: &Cli) -> Result<SessionResult> {
    let store = Arc::new(
        MemoryStore::load(&cli.store).with_context(|| format!("Failed to load store {}", cli.store.display()))?,
    );

    let selection = cli.selection();
    if selection.is_empty() {
        bail!("No sections enabled; check --section and --skip");
    }

    let mut orchestrator = Orchestrator::for_sections(store.clone(), &selection, cli.scan_config());
    if cli.snapshot {
        orchestrator =
            orchestrator.with_snapshot_manager(Arc::new(ExportSnapshot::new(store, cli.snapshot_dir.clone())));
    }

    let handle = if cli.quiet {
        orchestrator.start(regclean::NullObserver)?
    } else {
        orchestrator.start(ConsoleObserver::new(cli.verbose))?
    };
    let abort = handle.abort_signal();
    let mut session = tokio::task::spawn_blocking(move || handle.wait());

    let joined = tokio::select! {
        joined = &mut session => joined,
        Ok(()) = tokio::signal::ctrl_c() => {
            warn!("interrupt received, aborting scan");
            abort.request();
            session.await
        }
    };
    Ok(joined.context("Scan task failed")??)
}

/// Write the session report in the requested format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_report(result: &SessionResult, format: OutputFormat, writer: &mut dyn Write) -> Result<()> {
    match format {
        OutputFormat::Json => regclean::output::write_json(result, writer),
        OutputFormat::Human => regclean::output::write_human(result, writer),
    }
}
