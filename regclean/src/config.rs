//! Configuration for a scan session.
//!
//! Which sections run is chosen separately through
//! [`SectionSelection`](crate::section::SectionSelection); everything else a
//! session needs lives in [`ScanConfig`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::exclusion::ExclusionList;

/// Windows directory assumed when none is configured.
pub const DEFAULT_SYSTEM_ROOT: &str = "C:\\Windows";

/// Session-wide options.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ScanConfig {
    /// Directory receiving the session log (default: `logs`).
    pub log_dir: PathBuf,
    /// Take a restore point before scanning when the facility is available.
    pub create_snapshot: bool,
    /// Description attached to the restore point.
    pub snapshot_description: String,
    /// Paths whose findings are suppressed at insertion time.
    pub exclusions: ExclusionList,
    /// Windows directory, used to resolve relative font and driver files.
    pub system_root: String,
    /// Variables available to `%VAR%` expansion in store values.
    /// Names are matched ignoring ASCII case.
    pub environment: BTreeMap<String, String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::with_system_root(DEFAULT_SYSTEM_ROOT)
    }
}

impl ScanConfig {
    /// Default configuration for a machine whose Windows directory is `system_root`.
    #[must_use]
    pub fn with_system_root(system_root: &str) -> Self {
        let system_root = system_root.trim_end_matches('\\').to_owned();
        let drive = system_root
            .split_once('\\')
            .map_or("C:", |(drive, _)| drive)
            .to_owned();

        let environment = BTreeMap::from([
            ("SystemRoot".to_owned(), system_root.clone()),
            ("windir".to_owned(), system_root.clone()),
            ("SystemDrive".to_owned(), drive.clone()),
            ("ProgramFiles".to_owned(), format!("{drive}\\Program Files")),
            (
                "CommonProgramFiles".to_owned(),
                format!("{drive}\\Program Files\\Common Files"),
            ),
        ]);

        Self {
            log_dir: PathBuf::from("logs"),
            create_snapshot: false,
            snapshot_description: "regclean pre-scan restore point".to_owned(),
            exclusions: ExclusionList::default(),
            system_root,
            environment,
        }
    }

    /// Look up an environment variable ignoring ASCII case.
    #[must_use]
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_from_system_root() {
        let config = ScanConfig::with_system_root("D:\\WINNT\\");
        assert_eq!(config.system_root, "D:\\WINNT");
        assert_eq!(config.env_var("SYSTEMROOT"), Some("D:\\WINNT"));
        assert_eq!(config.env_var("programfiles"), Some("D:\\Program Files"));
        assert_eq!(config.env_var("Missing"), None);
        assert!(!config.create_snapshot);
    }
}
