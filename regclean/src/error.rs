//! Error types for registry scanning.

use std::path::PathBuf;

use thiserror::Error;

/// A failure reported by a [`StoreReader`](crate::store::StoreReader).
///
/// Access-denied is kept distinct from every other failure: validators swallow
/// it per subtree and keep enumerating siblings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// The caller may not open or enumerate the key.
    #[error("access denied: {path}")]
    AccessDenied {
        /// Full path of the key that could not be opened.
        path: String,
    },
    /// The key does not exist (or vanished since it was enumerated).
    #[error("key not found: {path}")]
    NotFound {
        /// Full path of the missing key.
        path: String,
    },
    /// Any other backend failure.
    #[error("store failure at {path}: {message}")]
    Backend {
        /// Full path of the key being read.
        path: String,
        /// Human-readable description of the failure.
        message: String,
    },
    /// A store export could not be loaded.
    #[error("failed to load store from {}: {message}", .file.display())]
    Load {
        /// The export file.
        file: PathBuf,
        /// Human-readable description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Whether this is the recoverable per-subtree access-denied condition.
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    /// Whether the key is simply absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Returned through every traversal step once an abort has been requested.
///
/// Validators propagate it with `?` so the walk unwinds cooperatively and
/// scoped resources are released on the way out.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("scan aborted by user")]
pub struct ScanAborted;

/// Conditions the orchestrator itself must act on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The session log could not be created. Fatal at session start.
    #[error("failed to create session log {}: {source}", .path.display())]
    LogCreate {
        /// The log file that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The background orchestrator thread could not be started.
    #[error("failed to spawn scan thread: {0}")]
    SpawnFailed(#[source] std::io::Error),
    /// The background orchestrator thread panicked outside any validator.
    #[error("scan thread panicked")]
    WorkerPanicked,
}
