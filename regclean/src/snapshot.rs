//! Best-effort system snapshot taken before a scan.

use serde::Serialize;

/// External facility able to checkpoint system state (a restore point).
///
/// Implementations never fail fatally: absence of the facility is a normal,
/// loggable outcome.
pub trait SnapshotManager: Send + Sync {
    /// Whether the snapshot service is present and active.
    fn is_available(&self) -> bool;

    /// Create a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when the snapshot could not be taken.
    fn create_snapshot(&self, description: &str) -> Result<(), String>;
}

/// No snapshot facility on this platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnapshot;

impl SnapshotManager for NoSnapshot {
    fn is_available(&self) -> bool {
        false
    }

    fn create_snapshot(&self, _description: &str) -> Result<(), String> {
        Err("no snapshot facility on this platform".to_owned())
    }
}

/// What the session did about the pre-scan snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum SnapshotOutcome {
    /// Snapshots are turned off in the configuration.
    Disabled,
    /// The facility reported itself unavailable.
    Unavailable,
    Created,
    /// The facility was available but creation failed.
    Failed(String),
}

impl SnapshotOutcome {
    /// Line recorded in the session log.
    #[must_use]
    pub fn log_line(&self) -> String {
        match self {
            Self::Disabled => "Restore point skipped: snapshot disabled".to_owned(),
            Self::Unavailable => "Restore point skipped: snapshot unavailable".to_owned(),
            Self::Created => "Restore point created".to_owned(),
            Self::Failed(reason) => format!("Restore point skipped: snapshot failed ({reason})"),
        }
    }
}

/// Take the pre-scan snapshot if enabled and available.
#[must_use]
pub fn take_snapshot(manager: &dyn SnapshotManager, enabled: bool, description: &str) -> SnapshotOutcome {
    if !enabled {
        return SnapshotOutcome::Disabled;
    }
    if !manager.is_available() {
        tracing::warn!("snapshot facility unavailable, scanning without a restore point");
        return SnapshotOutcome::Unavailable;
    }
    match manager.create_snapshot(description) {
        Ok(()) => SnapshotOutcome::Created,
        Err(reason) => {
            tracing::warn!(%reason, "restore point creation failed");
            SnapshotOutcome::Failed(reason)
        }
    }
}
