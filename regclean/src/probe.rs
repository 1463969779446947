//! File existence checks for paths referenced by store values.

use std::path::Path;

/// Answers whether a referenced file or folder exists.
///
/// Validators never touch the filesystem directly so that tests can script
/// which Windows paths exist.
pub trait FileProbe: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Checks the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskProbe;

impl FileProbe for DiskProbe {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}
