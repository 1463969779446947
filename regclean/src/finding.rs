//! A single broken reference discovered by a validator.

use serde::Serialize;

use crate::store::split_path;

/// A recorded invalid entry.
///
/// Findings are only created by [`FindingsStore::store`](crate::findings::FindingsStore::store)
/// and are immutable afterwards.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Finding {
    /// Human-readable reason the entry is invalid.
    pub problem: String,
    /// Top-level namespace (hive) of the key.
    pub namespace: String,
    /// Path of the key below the namespace.
    pub subkey_path: String,
    /// Name of the offending value, when the problem is value specific.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
}

impl Finding {
    pub(super) fn new(problem: &str, path: &str, value_name: Option<&str>) -> Self {
        let (namespace, subkey_path) = split_path(path);
        Self {
            problem: problem.to_owned(),
            namespace: namespace.to_owned(),
            subkey_path: subkey_path.to_owned(),
            value_name: value_name.filter(|v| !v.is_empty()).map(str::to_owned),
        }
    }

    /// Full key path: `namespace\subkey_path`, or whichever part is present.
    #[must_use]
    pub fn path(&self) -> String {
        match (self.namespace.is_empty(), self.subkey_path.is_empty()) {
            (false, false) => format!("{}\\{}", self.namespace, self.subkey_path),
            (false, true) => self.namespace.clone(),
            (true, false) => self.subkey_path.clone(),
            (true, true) => String::new(),
        }
    }

    /// Format the finding for human-readable output.
    ///
    /// `{path} [{value_name}]: {problem}`, omitting the brackets when there is
    /// no value name.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        match &self.value_name {
            Some(value) => format!("{} [{value}]: {}", self.path(), self.problem),
            None => format!("{}: {}", self.path(), self.problem),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_path_joins_namespace_and_subkey() {
        let finding = Finding::new(
            "Invalid file or folder",
            "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs",
            Some("C:\\missing.dll"),
        );
        assert_eq!(finding.namespace, "HKEY_LOCAL_MACHINE");
        assert_eq!(
            finding.subkey_path,
            "Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs"
        );
        assert_eq!(
            finding.path(),
            "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs"
        );
    }

    #[test]
    fn test_path_with_namespace_only() {
        let finding = Finding::new("Missing software settings", "HKEY_USERS", None);
        assert_eq!(finding.subkey_path, "");
        assert_eq!(finding.path(), "HKEY_USERS");

        let empty = Finding::new("Missing software settings", "", Some(""));
        assert_eq!(empty.path(), "");
        assert_eq!(empty.value_name, None);
    }

    #[test]
    fn test_format_human_readable() {
        let with_value = Finding::new("Invalid help file", "HKLM\\Software\\Microsoft\\Windows\\Help", Some("app.hlp"));
        assert_eq!(
            with_value.format_human_readable(),
            "HKLM\\Software\\Microsoft\\Windows\\Help [app.hlp]: Invalid help file"
        );

        let without = Finding::new("Missing software settings", "HKCU\\Software\\Gone", None);
        assert_eq!(
            without.format_human_readable(),
            "HKCU\\Software\\Gone: Missing software settings"
        );
    }
}
