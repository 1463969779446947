//! Session result types.

use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use crate::finding::Finding;
use crate::snapshot::SnapshotOutcome;

/// Lifecycle state of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Aborted,
}

impl SessionStatus {
    /// Terminal marker written to the session log.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Completed => "Finished",
            Self::Aborted => "Aborted",
        }
    }
}

/// Result of a scan session, returned whatever recoverable errors occurred.
#[derive(Debug, Clone, Serialize)]
#[non_exhaustive]
pub struct SessionResult {
    pub session_id: Uuid,
    /// `Completed` or `Aborted`.
    pub status: SessionStatus,
    /// Number of enabled sections dispatched (or scheduled) in this session.
    pub total_sections: usize,
    /// Sections whose validator ran to the end (including ones that panicked).
    pub completed_sections: usize,
    /// Number of path-visited events emitted across all validators.
    pub items_scanned: u64,
    /// Findings in the order they were recorded.
    pub findings: Vec<Finding>,
    /// Audit log written for the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// What happened to the pre-scan snapshot.
    pub snapshot: SnapshotOutcome,
}

impl SessionResult {
    #[must_use]
    pub fn findings_count(&self) -> usize {
        self.findings.len()
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.status == SessionStatus::Aborted
    }
}
