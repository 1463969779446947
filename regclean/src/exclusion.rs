//! User-configured paths whose findings are suppressed.

use serde::{Deserialize, Serialize};

use crate::store::{canonical_namespace, split_path};

/// One excluded location: a namespace plus a subkey path below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub main_key: String,
    pub sub_key: String,
}

impl ExclusionEntry {
    #[must_use]
    pub fn new(main_key: impl Into<String>, sub_key: impl Into<String>) -> Self {
        Self {
            main_key: main_key.into(),
            sub_key: sub_key.into(),
        }
    }

    /// Parse `NAMESPACE\sub\key` into an entry.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let (main_key, sub_key) = split_path(path);
        Self::new(main_key, sub_key)
    }

    /// Whether `path` is this entry or lies beneath it.
    ///
    /// Namespace aliases are resolved and comparison ignores ASCII case.
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        let (namespace, subkey) = split_path(path);
        if !canonical_namespace(namespace).eq_ignore_ascii_case(canonical_namespace(&self.main_key)) {
            return false;
        }

        let excluded = self.sub_key.trim_matches('\\');
        if excluded.is_empty() {
            return true;
        }
        let subkey = subkey.trim_matches('\\');
        let (Some(head), Some(tail)) = (subkey.get(..excluded.len()), subkey.get(excluded.len()..))
        else {
            return false;
        };
        head.eq_ignore_ascii_case(excluded) && (tail.is_empty() || tail.starts_with('\\'))
    }
}

/// Ordered list of excluded locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList {
    entries: Vec<ExclusionEntry>,
}

impl ExclusionList {
    #[must_use]
    pub fn new(entries: Vec<ExclusionEntry>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: ExclusionEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[ExclusionEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any entry covers `path`.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.covers(path))
    }
}

impl FromIterator<ExclusionEntry> for ExclusionList {
    fn from_iter<I: IntoIterator<Item = ExclusionEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
