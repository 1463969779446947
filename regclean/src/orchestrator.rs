//! Scan session orchestration.
//!
//! Runs the enabled validators one after another, each on its own worker
//! thread, and waits for every worker before starting the next.
//!
//! # Graceful degradation
//!
//! - Access-denied and missing keys: swallowed inside the validators
//! - Validator panic: caught at the worker join, logged as a failed section,
//!   the session continues
//! - Abort: the running validator unwinds at its next checkpoint and no
//!   further validator starts; findings recorded so far are kept
//! - Snapshot facility missing or failing: logged, never fatal
//! - Session log write failures: buffered and retried
//!
//! The only fatal condition is failing to create the session log.

use std::any::Any;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Local};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cancel::AbortSignal;
use crate::config::ScanConfig;
use crate::error::{ScanAborted, SessionError};
use crate::findings::FindingsStore;
use crate::probe::{DiskProbe, FileProbe};
use crate::progress::ProgressSink;
use crate::report::{SessionResult, SessionStatus};
use crate::section::SectionSelection;
use crate::session_log::SessionLog;
use crate::snapshot::{NoSnapshot, SnapshotManager, SnapshotOutcome, take_snapshot};
use crate::store::StoreReader;
use crate::validator::{ScanContext, Validator};
use crate::validators;

/// Runs a list of validators against one store.
pub struct Orchestrator {
    store: Arc<dyn StoreReader>,
    validators: Vec<Box<dyn Validator>>,
    pub(super) config: ScanConfig,
    probe: Arc<dyn FileProbe>,
    snapshots: Arc<dyn SnapshotManager>,
}

/// State owned by the orchestrator for the lifetime of one session.
struct ScanSession {
    id: Uuid,
    findings: FindingsStore,
    log: SessionLog,
    items_scanned: u64,
    completed_sections: usize,
    status: SessionStatus,
}

/// How a validator worker ended.
enum WorkerOutcome {
    Finished,
    Aborted,
    Failed(String),
}

impl Orchestrator {
    /// Orchestrate an explicit list of validators, dispatched in list order.
    #[must_use]
    pub fn new(store: Arc<dyn StoreReader>, validators: Vec<Box<dyn Validator>>, config: ScanConfig) -> Self {
        Self {
            store,
            validators,
            config,
            probe: Arc::new(DiskProbe),
            snapshots: Arc::new(NoSnapshot),
        }
    }

    /// Orchestrate the built-in validators for the enabled sections.
    #[must_use]
    pub fn for_sections(store: Arc<dyn StoreReader>, sections: &SectionSelection, config: ScanConfig) -> Self {
        Self::new(store, validators::for_sections(sections), config)
    }

    /// Use `probe` instead of the local filesystem for existence checks.
    #[must_use]
    pub fn with_file_probe(mut self, probe: Arc<dyn FileProbe>) -> Self {
        self.probe = probe;
        self
    }

    #[must_use]
    pub fn with_snapshot_manager(mut self, snapshots: Arc<dyn SnapshotManager>) -> Self {
        self.snapshots = snapshots;
        self
    }

    #[must_use]
    pub fn total_sections(&self) -> usize {
        self.validators.len()
    }

    /// Run a whole session on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogCreate`] if the session log cannot be
    /// created. Every other failure is absorbed into the result.
    pub fn run(&self, abort: &AbortSignal, progress: &ProgressSink) -> Result<SessionResult, SessionError> {
        let started_at = Local::now();
        let log = SessionLog::create(&self.config.log_dir, &started_at)?;
        Ok(self.run_with_log(log, started_at, abort, progress))
    }

    /// Run a session writing its audit trail to an already opened log.
    #[must_use]
    pub fn run_with_log(
        &self,
        log: SessionLog,
        started_at: DateTime<Local>,
        abort: &AbortSignal,
        progress: &ProgressSink,
    ) -> SessionResult {
        let mut session = ScanSession {
            id: Uuid::new_v4(),
            findings: FindingsStore::new(self.store.clone(), self.config.exclusions.clone()),
            log,
            items_scanned: 0,
            completed_sections: 0,
            status: SessionStatus::Running,
        };
        let total = self.total_sections();

        session.log.write_line(format!("Session ID: {}", session.id));
        session
            .log
            .write_line(format!("Scan started: {}", started_at.format("%Y-%m-%d %H:%M:%S")));
        info!(session_id = %session.id, sections = total, "scan session started");
        progress.session_started(total);

        let snapshot = self.snapshot(&mut session.log);

        for validator in &self.validators {
            if abort.is_requested() {
                break;
            }

            let label = validator.label();
            session.log.section(validator.log_description());
            info!(section = label, "scanning section");
            progress.section_changed(label);

            match self.run_validator(validator.as_ref(), &mut session, abort, progress) {
                WorkerOutcome::Finished => {}
                WorkerOutcome::Aborted => break,
                WorkerOutcome::Failed(reason) => {
                    error!(section = label, %reason, "validator failed");
                    session.log.write_line(format!("Section failed: {label} ({reason})"));
                }
            }

            session.completed_sections += 1;
            progress.section_completed(session.completed_sections, total);
        }

        session.status = if abort.is_requested() {
            SessionStatus::Aborted
        } else {
            SessionStatus::Completed
        };
        Self::finalize(session, total, snapshot)
    }

    fn snapshot(&self, log: &mut SessionLog) -> SnapshotOutcome {
        if self.config.create_snapshot {
            log.write_line("Creating restore point...");
        }
        let outcome = take_snapshot(
            self.snapshots.as_ref(),
            self.config.create_snapshot,
            &self.config.snapshot_description,
        );
        log.write_line(outcome.log_line());
        outcome
    }

    /// Run one validator on a scoped worker and wait for it.
    ///
    /// The worker borrows the session's findings, log and counter mutably, so
    /// no other validator can touch them until it has been joined.
    fn run_validator(
        &self,
        validator: &dyn Validator,
        session: &mut ScanSession,
        abort: &AbortSignal,
        progress: &ProgressSink,
    ) -> WorkerOutcome {
        let store = self.store.as_ref();
        let probe = self.probe.as_ref();
        let config = &self.config;
        let ScanSession {
            findings,
            log,
            items_scanned,
            ..
        } = session;

        thread::scope(|scope| {
            let worker = thread::Builder::new()
                .name("regclean-validator".to_owned())
                .spawn_scoped(scope, move || {
                    let mut ctx =
                        ScanContext::new(store, probe, config, findings, log, progress, abort, items_scanned);
                    validator.run(&mut ctx)
                });

            match worker {
                Ok(handle) => match handle.join() {
                    Ok(Ok(())) => WorkerOutcome::Finished,
                    Ok(Err(ScanAborted)) => WorkerOutcome::Aborted,
                    Err(payload) => WorkerOutcome::Failed(format!("panicked: {}", panic_message(payload.as_ref()))),
                },
                Err(e) => WorkerOutcome::Failed(format!("worker thread could not start: {e}")),
            }
        })
    }

    fn finalize(mut session: ScanSession, total_sections: usize, snapshot: SnapshotOutcome) -> SessionResult {
        if session.status == SessionStatus::Aborted {
            session.log.write_line("User aborted scan... Exiting.");
        }
        session.log.summary(session.items_scanned, session.status);

        let log_path = session.log.path().map(std::path::Path::to_path_buf);
        let lost = session.log.close();
        if lost > 0 {
            warn!(lost, "session log is missing lines");
        }

        let findings = session.findings.into_findings();
        info!(
            session_id = %session.id,
            status = ?session.status,
            items_scanned = session.items_scanned,
            findings = findings.len(),
            "scan session finished"
        );

        SessionResult {
            session_id: session.id,
            status: session.status,
            total_sections,
            completed_sections: session.completed_sections,
            items_scanned: session.items_scanned,
            findings,
            log_path,
            snapshot,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
