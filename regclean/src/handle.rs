//! Running a session in the background.

use std::thread::{self, JoinHandle};

use chrono::Local;
use tracing::warn;

use crate::cancel::AbortSignal;
use crate::error::SessionError;
use crate::orchestrator::Orchestrator;
use crate::progress::{self, ScanObserver};
use crate::report::SessionResult;
use crate::session_log::SessionLog;

/// A session running on a background thread.
///
/// Progress is delivered to the observer on a separate dispatcher thread, so
/// a slow observer never stalls the scan.
pub struct ScanHandle {
    abort: AbortSignal,
    worker: JoinHandle<SessionResult>,
    dispatcher: JoinHandle<()>,
}

impl Orchestrator {
    /// Start the session in the background.
    ///
    /// The session log is created before this returns, so a log failure is
    /// reported here rather than through [`ScanHandle::wait`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogCreate`] if the session log cannot be
    /// created and [`SessionError::SpawnFailed`] if a thread cannot be started.
    pub fn start(self, observer: impl ScanObserver + 'static) -> Result<ScanHandle, SessionError> {
        let started_at = Local::now();
        let log = SessionLog::create(&self.config.log_dir, &started_at)?;
        let (sink, events) = progress::channel();
        let abort = AbortSignal::new();

        let dispatcher = thread::Builder::new()
            .name("regclean-events".to_owned())
            .spawn(move || {
                let mut observer = observer;
                progress::dispatch(&events, &mut observer);
            })
            .map_err(SessionError::SpawnFailed)?;

        let worker_abort = abort.clone();
        let worker = thread::Builder::new()
            .name("regclean-scan".to_owned())
            .spawn(move || self.run_with_log(log, started_at, &worker_abort, &sink))
            .map_err(SessionError::SpawnFailed)?;

        Ok(ScanHandle {
            abort,
            worker,
            dispatcher,
        })
    }
}

impl ScanHandle {
    /// Ask the session to stop. The running validator unwinds at its next
    /// checkpoint; no further validator starts.
    pub fn request_abort(&self) {
        self.abort.request();
    }

    /// A clone of the session's abort signal, e.g. for a Ctrl-C handler.
    #[must_use]
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Whether the scan thread has finished (events may still be in flight).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the session to end and for every event to reach the observer.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WorkerPanicked`] if the scan thread itself
    /// panicked outside any validator.
    pub fn wait(self) -> Result<SessionResult, SessionError> {
        let result = self.worker.join().map_err(|_| SessionError::WorkerPanicked);
        if self.dispatcher.join().is_err() {
            warn!("progress observer panicked, some events were not delivered");
        }
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::finding::Finding;
    use crate::progress::NullObserver;
    use crate::report::SessionStatus;
    use crate::store::{MemoryStore, StoreValue};
    use crate::validators::SharedDlls;
    use crate::validators::shared_dlls::SHARED_DLLS_KEY;
    use crate::validators::testing::ScriptedProbe;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        findings: Arc<Mutex<Vec<Finding>>>,
    }

    impl ScanObserver for Recorder {
        fn on_finding_recorded(&mut self, finding: &Finding) {
            self.findings.lock().unwrap().push(finding.clone());
        }
    }

    fn config(tmp: &tempfile::TempDir) -> ScanConfig {
        let mut config = ScanConfig::default();
        config.log_dir = tmp.path().join("logs");
        config
    }

    #[test]
    fn test_wait_delivers_every_event_first() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        store.set_value(SHARED_DLLS_KEY, "C:\\missing.dll", StoreValue::Dword(1));
        let recorder = Recorder::default();

        let handle = Orchestrator::new(store, vec![Box::new(SharedDlls)], config(&tmp))
            .with_file_probe(Arc::new(ScriptedProbe::new(&[])))
            .start(recorder.clone())
            .unwrap();
        let result = handle.wait().unwrap();

        assert_eq!(result.status, SessionStatus::Completed);
        assert_eq!(*recorder.findings.lock().unwrap(), result.findings);
        assert!(result.log_path.as_ref().is_some_and(|p| p.exists()));
    }

    #[test]
    fn test_log_failure_is_reported_synchronously() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let mut config = ScanConfig::default();
        config.log_dir = blocker.join("logs");

        let err = Orchestrator::new(Arc::new(MemoryStore::new()), Vec::new(), config)
            .start(NullObserver)
            .err()
            .unwrap();
        assert!(matches!(err, SessionError::LogCreate { .. }));
    }
}
