//! The validator contract and the reporting surface validators receive.

use tracing::{debug, trace, warn};

use crate::cancel::AbortSignal;
use crate::config::ScanConfig;
use crate::error::{ScanAborted, StoreError};
use crate::findings::FindingsStore;
use crate::probe::FileProbe;
use crate::progress::ProgressSink;
use crate::session_log::SessionLog;
use crate::store::{StoreReader, StoreValue};

/// One category of check against the store.
///
/// `run` executes synchronously on a worker thread owned by the orchestrator.
/// Implementations must report every key they visit through
/// [`ScanContext::visit`], check [`ScanContext::checkpoint`] before each
/// enumeration, and keep going when a subtree is access-denied.
pub trait Validator: Send + Sync {
    /// Section name shown while this validator runs.
    fn label(&self) -> &str;

    /// Line written to the session log when this validator starts.
    fn log_description(&self) -> &str {
        self.label()
    }

    /// Walk the store and record findings.
    ///
    /// # Errors
    ///
    /// Returns [`ScanAborted`] when the session abort was observed; the walk
    /// must stop as soon as it sees it.
    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted>;
}

/// Everything a validator may touch during one session.
///
/// The orchestrator builds one per validator and lends it to the worker
/// thread for the duration of `run`; the session itself stays with the
/// orchestrator.
pub struct ScanContext<'a> {
    store: &'a dyn StoreReader,
    probe: &'a dyn FileProbe,
    config: &'a ScanConfig,
    findings: &'a mut FindingsStore,
    log: &'a mut SessionLog,
    progress: &'a ProgressSink,
    abort: &'a AbortSignal,
    items_scanned: &'a mut u64,
}

impl<'a> ScanContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        store: &'a dyn StoreReader,
        probe: &'a dyn FileProbe,
        config: &'a ScanConfig,
        findings: &'a mut FindingsStore,
        log: &'a mut SessionLog,
        progress: &'a ProgressSink,
        abort: &'a AbortSignal,
        items_scanned: &'a mut u64,
    ) -> Self {
        Self {
            store,
            probe,
            config,
            findings,
            log,
            progress,
            abort,
            items_scanned,
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn StoreReader {
        self.store
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        self.config
    }

    /// Whether a referenced file or folder exists.
    #[must_use]
    pub fn file_exists(&self, path: &str) -> bool {
        self.probe.exists(path)
    }

    /// Stop point for cooperative cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`ScanAborted`] once the session abort has been requested.
    pub fn checkpoint(&self) -> Result<(), ScanAborted> {
        self.abort.check()
    }

    /// Report that `path` is being scanned.
    pub fn visit(&mut self, path: &str) {
        *self.items_scanned += 1;
        trace!(path, items = *self.items_scanned, "visiting");
        self.progress.path_visited(path, *self.items_scanned);
    }

    /// Submit a finding. Returns whether it was recorded (see
    /// [`FindingsStore::store`]); recorded findings are logged and published.
    pub fn record(&mut self, problem: &str, path: &str, value_name: Option<&str>) -> bool {
        if !self.findings.store(problem, path, value_name) {
            return false;
        }
        if let Some(finding) = self.findings.last() {
            debug!(path, problem, "finding recorded");
            self.log.finding(finding);
            self.progress.finding_recorded(finding);
        }
        true
    }

    /// Subkey names of `path`, after a cancellation check.
    ///
    /// A missing or access-denied key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ScanAborted`] once the session abort has been requested.
    pub fn subkeys(&self, path: &str) -> Result<Vec<String>, ScanAborted> {
        self.checkpoint()?;
        Ok(recover(path, self.store.list_subkeys(path)).unwrap_or_default())
    }

    /// Value names of `path`, after a cancellation check.
    ///
    /// A missing or access-denied key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ScanAborted`] once the session abort has been requested.
    pub fn value_names(&self, path: &str) -> Result<Vec<String>, ScanAborted> {
        self.checkpoint()?;
        Ok(recover(path, self.store.list_value_names(path)).unwrap_or_default())
    }

    /// A value, or `None` if it is absent or unreadable.
    #[must_use]
    pub fn value(&self, path: &str, name: &str) -> Option<StoreValue> {
        recover(path, self.store.get_value(path, name)).flatten()
    }

    /// The text of a string-typed value, with `%VAR%` references expanded for
    /// expandable strings. Empty strings count as absent.
    #[must_use]
    pub fn string_value(&self, path: &str, name: &str) -> Option<String> {
        let value = self.value(path, name)?;
        let text = match &value {
            StoreValue::ExpandString(s) => crate::validators::paths::expand_vars(s, self.config),
            StoreValue::String(s) => s.clone(),
            _ => return None,
        };
        let text = text.trim_matches('\0').trim().to_owned();
        (!text.is_empty()).then_some(text)
    }
}

/// Swallow the per-key failures a validator must survive.
fn recover<T>(path: &str, result: Result<T, StoreError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(StoreError::NotFound { .. }) => None,
        Err(StoreError::AccessDenied { .. }) => {
            debug!(path, "access denied, skipping subtree");
            None
        }
        Err(e) => {
            warn!(path, error = %e, "store read failed, skipping key");
            None
        }
    }
}
