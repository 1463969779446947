//! # regclean
//!
//! Scan engine for invalid Windows registry entries: startup commands, shared
//! DLLs, fonts, COM servers and other keys that reference files which no longer
//! exist.
//!
//! The crate separates the **scan core** (orchestrator, validator contract,
//! findings store, progress events, session log) from the **store backend**
//! behind [`StoreReader`]. [`MemoryStore`] is the bundled backend, loaded from a
//! JSON or YAML export.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use regclean::{MemoryStore, NullObserver, ScanConfig, SectionSelection};
//!
//! let store = Arc::new(MemoryStore::load("registry.json".as_ref()).unwrap());
//! let mut config = ScanConfig::default();
//! config.log_dir = "logs".into();
//!
//! let handle = regclean::start(store, &SectionSelection::all(), config, NullObserver).unwrap();
//! let result = handle.wait().unwrap();
//! println!("Items scanned: {}", result.items_scanned);
//! println!("Problems found: {}", result.findings_count());
//! ```

mod cancel;
mod config;
mod error;
mod exclusion;
mod finding;
mod findings;
mod handle;
mod orchestrator;
pub mod output;
mod probe;
pub mod progress;
mod report;
mod section;
mod session_log;
mod snapshot;
pub mod store;
mod validator;
pub mod validators;

use std::sync::Arc;

pub use cancel::AbortSignal;
pub use config::{DEFAULT_SYSTEM_ROOT, ScanConfig};
pub use error::{ScanAborted, SessionError, StoreError};
pub use exclusion::{ExclusionEntry, ExclusionList};
pub use finding::Finding;
pub use findings::FindingsStore;
pub use handle::ScanHandle;
pub use orchestrator::Orchestrator;
pub use probe::{DiskProbe, FileProbe};
pub use progress::{NullObserver, ProgressSink, ScanEvent, ScanObserver};
pub use report::{SessionResult, SessionStatus};
pub use section::{Section, SectionSelection};
pub use session_log::SessionLog;
pub use snapshot::{NoSnapshot, SnapshotManager, SnapshotOutcome};
pub use store::{KeyNode, MemoryStore, StoreReader, StoreValue};
pub use validator::{ScanContext, Validator};

/// Start a scan of the enabled sections on a background thread.
///
/// File references are checked against the local filesystem and no restore
/// point facility is used; build an [`Orchestrator`] directly to change either.
///
/// # Errors
///
/// Returns [`SessionError::LogCreate`] if the session log cannot be created in
/// `config.log_dir`, or [`SessionError::SpawnFailed`] if the scan thread
/// cannot be started.
pub fn start(
    store: Arc<dyn StoreReader>,
    sections: &SectionSelection,
    config: ScanConfig,
    observer: impl ScanObserver + 'static,
) -> Result<ScanHandle, SessionError> {
    Orchestrator::for_sections(store, sections, config).start(observer)
}
