use std::io::IsTerminal;

use chrono::Local;
use colored::Colorize;
use regclean::{Finding, ScanObserver};

/// Prints scan progress to stderr as events arrive.
///
/// Output is plain text when stderr is not a terminal.
pub struct ConsoleObserver {
    verbose: u8,
    total_sections: usize,
}

impl ConsoleObserver {
    #[must_use]
    pub fn new(verbose: u8) -> Self {
        if !std::io::stderr().is_terminal() {
            colored::control::set_override(false);
        }
        Self {
            verbose,
            total_sections: 0,
        }
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string()
    }
}

impl ScanObserver for ConsoleObserver {
    fn on_session_started(&mut self, total_sections: usize) {
        self.total_sections = total_sections;
        eprintln!(
            "{} - INFO - Scanning {} section(s)",
            Self::timestamp(),
            total_sections.to_string().cyan()
        );
    }

    fn on_section_changed(&mut self, label: &str) {
        eprintln!("{} - INFO - {}", Self::timestamp(), label.blue().bold());
    }

    fn on_path_visited(&mut self, path: &str, items_scanned: u64) {
        if self.verbose >= 2 {
            eprintln!(
                "{} - DEBUG - {} {}",
                Self::timestamp(),
                format!("[{items_scanned}]").dimmed(),
                path.bright_black()
            );
        }
    }

    fn on_finding_recorded(&mut self, finding: &Finding) {
        eprintln!(
            "{} - WARN - {} {}",
            Self::timestamp(),
            finding.problem.yellow(),
            finding.path().bright_black()
        );
    }

    fn on_section_completed(&mut self, completed: usize, total: usize) {
        if self.verbose >= 1 {
            eprintln!(
                "{} - INFO - {}",
                Self::timestamp(),
                format!("{completed}/{total} sections done").magenta()
            );
        }
    }
}
