//! Restore points for store exports: a timestamped JSON copy of the store
//! written before the scan starts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use regclean::{KeyNode, MemoryStore, SnapshotManager};
use serde::Serialize;

#[derive(Serialize)]
struct RestorePoint<'a> {
    description: &'a str,
    created_at: String,
    registry: BTreeMap<String, KeyNode>,
}

/// Writes restore points into a directory.
pub struct ExportSnapshot {
    store: Arc<MemoryStore>,
    dir: PathBuf,
}

impl ExportSnapshot {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, dir: PathBuf) -> Self {
        Self { store, dir }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotManager for ExportSnapshot {
    /// Available when the directory exists, or when its nearest existing
    /// ancestor is a directory it can be created in. Nothing is created here.
    fn is_available(&self) -> bool {
        self.dir
            .ancestors()
            .find(|dir| dir.as_os_str().is_empty() || dir.exists())
            .is_some_and(|dir| dir.as_os_str().is_empty() || dir.is_dir())
    }

    fn create_snapshot(&self, description: &str) -> Result<(), String> {
        let now = Local::now();
        let point = RestorePoint {
            description,
            created_at: now.to_rfc3339(),
            registry: self.store.export(),
        };
        let json = serde_json::to_string_pretty(&point).map_err(|e| format!("failed to serialize store: {e}"))?;
        fs::create_dir_all(&self.dir).map_err(|e| format!("failed to create {}: {e}", self.dir.display()))?;

        let file = self
            .dir
            .join(format!("restore_{}.json", now.format("%Y_%m_%d_%H%M%S")));
        fs::write(&file, json).map_err(|e| format!("failed to write {}: {e}", file.display()))?;
        tracing::info!(file = %file.display(), "restore point written");
        Ok(())
    }
}
