//! Read-only access to the hierarchical key/value store.
//!
//! Paths are backslash separated and start with a namespace (hive), e.g.
//! `HKEY_LOCAL_MACHINE\Software\Microsoft`. Short aliases such as `HKLM` are
//! accepted everywhere a path is, and lookups ignore ASCII case the way the
//! Windows registry does.
//!
//! [`MemoryStore`] is the bundled implementation. It is loaded from a JSON or
//! YAML export and can be mutated while a scan is running, which is how the
//! enumerate-then-vanish race is exercised in tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub const HKEY_CLASSES_ROOT: &str = "HKEY_CLASSES_ROOT";
pub const HKEY_CURRENT_USER: &str = "HKEY_CURRENT_USER";
pub const HKEY_LOCAL_MACHINE: &str = "HKEY_LOCAL_MACHINE";
pub const HKEY_USERS: &str = "HKEY_USERS";
pub const HKEY_CURRENT_CONFIG: &str = "HKEY_CURRENT_CONFIG";

/// Short hive names and the namespace they stand for.
const NAMESPACE_ALIASES: &[(&str, &str)] = &[
    ("HKCR", HKEY_CLASSES_ROOT),
    ("HKCU", HKEY_CURRENT_USER),
    ("HKLM", HKEY_LOCAL_MACHINE),
    ("HKU", HKEY_USERS),
    ("HKCC", HKEY_CURRENT_CONFIG),
];

/// Resolve a short hive alias (or any casing of a full hive name) to the
/// full namespace name.
///
/// Unknown names are returned unchanged.
#[must_use]
pub fn canonical_namespace(name: &str) -> &str {
    NAMESPACE_ALIASES
        .iter()
        .find(|(alias, full)| alias.eq_ignore_ascii_case(name) || full.eq_ignore_ascii_case(name))
        .map_or(name, |(_, full)| full)
}

/// Split a full path into `(namespace, subkey_path)` at the first backslash.
#[must_use]
pub fn split_path(path: &str) -> (&str, &str) {
    path.split_once('\\').unwrap_or((path, ""))
}

/// Append a child key name to a path.
#[must_use]
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else if child.is_empty() {
        parent.to_owned()
    } else {
        format!("{}\\{child}", parent.trim_end_matches('\\'))
    }
}

/// A typed value stored under a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum StoreValue {
    String(String),
    /// A string that may contain `%VAR%` references.
    ExpandString(String),
    MultiString(Vec<String>),
    Dword(u32),
    Qword(u64),
    Binary(Vec<u8>),
}

impl StoreValue {
    /// The textual payload of string-typed values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::ExpandString(s) => Some(s),
            _ => None,
        }
    }
}

/// Read-only capability over the hierarchical store.
///
/// Implementations must be shareable across the orchestrator thread and the
/// validator worker, and must report access-denied as
/// [`StoreError::AccessDenied`] rather than a generic failure.
pub trait StoreReader: Send + Sync {
    /// Top-level namespaces present in the store.
    fn list_namespaces(&self) -> Vec<String>;

    /// Names of the direct subkeys of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is absent and
    /// [`StoreError::AccessDenied`] if it cannot be opened.
    fn list_subkeys(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Names of the values stored directly under `path`. The default value is
    /// named by the empty string.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StoreReader::list_subkeys`].
    fn list_value_names(&self, path: &str) -> Result<Vec<String>, StoreError>;

    /// Read one value; `Ok(None)` when the key exists but the value does not.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StoreReader::list_subkeys`].
    fn get_value(&self, path: &str, name: &str) -> Result<Option<StoreValue>, StoreError>;

    /// Whether the key at `path` currently exists.
    fn exists(&self, path: &str) -> bool;
}

/// One key of a [`MemoryStore`], as found in an export file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNode {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, StoreValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, KeyNode>,
    /// Opening this key (or anything beneath it) fails with access-denied.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub denied: bool,
}

fn find_ci<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<(&'a String, &'a V)> {
    map.iter().find(|(k, _)| k.eq_ignore_ascii_case(name))
}

fn child_mut<'a>(map: &'a mut BTreeMap<String, KeyNode>, name: &str) -> &'a mut KeyNode {
    let existing = find_ci(map, name).map(|(k, _)| k.clone());
    map.entry(existing.unwrap_or_else(|| name.to_owned()))
        .or_default()
}

/// Fold `source` into `target`. Values of `source` win on name clashes.
fn merge_into(target: &mut KeyNode, source: KeyNode) {
    target.denied |= source.denied;
    for (name, value) in source.values {
        let existing = find_ci(&target.values, &name).map(|(k, _)| k.clone());
        target.values.insert(existing.unwrap_or(name), value);
    }
    for (name, child) in source.keys {
        merge_into(child_mut(&mut target.keys, &name), child);
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('\\').filter(|s| !s.is_empty())
}

/// Result of resolving a path in the tree.
enum Lookup<'a> {
    Found(&'a KeyNode),
    Denied,
    Missing,
}

/// In-memory store, safe to mutate while a scan reads it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: RwLock<BTreeMap<String, KeyNode>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already parsed namespaces, resolving hive aliases.
    ///
    /// Namespaces that resolve to the same hive (`HKLM` and
    /// `HKEY_LOCAL_MACHINE`) are merged key by key.
    #[must_use]
    pub fn from_namespaces(namespaces: BTreeMap<String, KeyNode>) -> Self {
        let mut canonical = BTreeMap::new();
        for (name, node) in namespaces {
            merge_into(child_mut(&mut canonical, canonical_namespace(&name)), node);
        }
        Self {
            namespaces: RwLock::new(canonical),
        }
    }

    /// Parse a JSON export.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the content is not a valid export.
    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let namespaces: BTreeMap<String, KeyNode> =
            serde_json::from_str(content).map_err(|e| StoreError::Load {
                file: "<json>".into(),
                message: format!("JSON parse error: {e}"),
            })?;
        Ok(Self::from_namespaces(namespaces))
    }

    /// Parse a YAML export.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the content is not a valid export.
    pub fn from_yaml_str(content: &str) -> Result<Self, StoreError> {
        let namespaces: BTreeMap<String, KeyNode> =
            serde_saphyr::from_str(content).map_err(|e| StoreError::Load {
                file: "<yaml>".into(),
                message: format!("YAML parse error: {e}"),
            })?;
        Ok(Self::from_namespaces(namespaces))
    }

    /// Load an export file, choosing the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Load`] if the file cannot be read, has an
    /// unsupported extension, or does not parse.
    pub fn load(file: &Path) -> Result<Self, StoreError> {
        let load_err = |message: String| StoreError::Load {
            file: file.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(file)
            .map_err(|e| load_err(format!("failed to read file: {e}")))?;
        let parsed = match file.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => return Err(load_err("unsupported store format (expected .json, .yaml or .yml)".to_owned())),
        };
        parsed.map_err(|e| match e {
            StoreError::Load { message, .. } => load_err(message),
            other => other,
        })
    }

    /// Serialize the whole tree as a JSON export.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let guard = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_string_pretty(&*guard)
    }

    /// A copy of the whole tree, keyed by namespace.
    #[must_use]
    pub fn export(&self) -> BTreeMap<String, KeyNode> {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Create `path` (and any missing parents).
    pub fn insert_key(&self, path: &str) {
        self.with_node_mut(path, |_| {});
    }

    /// Set a value, creating the key if needed.
    pub fn set_value(&self, path: &str, name: &str, value: StoreValue) {
        self.with_node_mut(path, |node| {
            let existing = find_ci(&node.values, name).map(|(k, _)| k.clone());
            node.values
                .insert(existing.unwrap_or_else(|| name.to_owned()), value);
        });
    }

    /// Mark a key as access-denied, creating it if needed.
    pub fn deny(&self, path: &str) {
        self.with_node_mut(path, |node| node.denied = true);
    }

    /// Remove a key and its whole subtree. Returns whether anything was removed.
    #[must_use]
    pub fn remove_key(&self, path: &str) -> bool {
        let (namespace, subkey) = split_path(path);
        let mut guard = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        let namespace = canonical_namespace(namespace);

        let mut parts: Vec<&str> = segments(subkey).collect();
        let Some(leaf) = parts.pop() else {
            let existing = find_ci(&guard, namespace).map(|(k, _)| k.clone());
            return existing.is_some_and(|k| guard.remove(&k).is_some());
        };

        let Some(key) = find_ci(&guard, namespace).map(|(k, _)| k.clone()) else {
            return false;
        };
        let mut node = guard.get_mut(&key);
        for part in parts {
            node = node.and_then(|n| {
                let key = find_ci(&n.keys, part).map(|(k, _)| k.clone())?;
                n.keys.get_mut(&key)
            });
        }
        node.is_some_and(|n| {
            let key = find_ci(&n.keys, leaf).map(|(k, _)| k.clone());
            key.is_some_and(|k| n.keys.remove(&k).is_some())
        })
    }

    fn with_node_mut(&self, path: &str, f: impl FnOnce(&mut KeyNode)) {
        let (namespace, subkey) = split_path(path);
        let mut guard = self.namespaces.write().unwrap_or_else(PoisonError::into_inner);
        let mut node = child_mut(&mut guard, canonical_namespace(namespace));
        for part in segments(subkey) {
            node = child_mut(&mut node.keys, part);
        }
        f(node);
    }

    fn read<T>(&self, path: &str, f: impl FnOnce(&KeyNode) -> T) -> Result<T, StoreError> {
        let guard = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        match Self::lookup(&guard, path) {
            Lookup::Found(node) => Ok(f(node)),
            Lookup::Denied => Err(StoreError::AccessDenied {
                path: path.to_owned(),
            }),
            Lookup::Missing => Err(StoreError::NotFound {
                path: path.to_owned(),
            }),
        }
    }

    fn lookup<'a>(roots: &'a BTreeMap<String, KeyNode>, path: &str) -> Lookup<'a> {
        let (namespace, subkey) = split_path(path);
        let Some((_, mut node)) = find_ci(roots, canonical_namespace(namespace)) else {
            return Lookup::Missing;
        };
        let mut denied = node.denied;
        for part in segments(subkey) {
            match find_ci(&node.keys, part) {
                Some((_, child)) => {
                    denied |= child.denied;
                    node = child;
                }
                None => return Lookup::Missing,
            }
        }
        if denied { Lookup::Denied } else { Lookup::Found(node) }
    }
}

impl StoreReader for MemoryStore {
    fn list_namespaces(&self) -> Vec<String> {
        let guard = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        guard.keys().cloned().collect()
    }

    fn list_subkeys(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.read(path, |node| node.keys.keys().cloned().collect())
    }

    fn list_value_names(&self, path: &str) -> Result<Vec<String>, StoreError> {
        self.read(path, |node| node.values.keys().cloned().collect())
    }

    fn get_value(&self, path: &str, name: &str) -> Result<Option<StoreValue>, StoreError> {
        self.read(path, |node| find_ci(&node.values, name).map(|(_, v)| v.clone()))
    }

    fn exists(&self, path: &str) -> bool {
        let guard = self.namespaces.read().unwrap_or_else(PoisonError::into_inner);
        !matches!(Self::lookup(&guard, path), Lookup::Missing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const SHARED_DLLS: &str = "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs";

    #[test]
    fn test_split_and_join_paths() {
        assert_eq!(
            split_path("HKEY_CURRENT_USER\\AppEvents\\Schemes"),
            ("HKEY_CURRENT_USER", "AppEvents\\Schemes")
        );
        assert_eq!(split_path("HKEY_USERS"), ("HKEY_USERS", ""));
        assert_eq!(join_path("HKEY_USERS\\", "S-1-5-18"), "HKEY_USERS\\S-1-5-18");
        assert_eq!(join_path("", "HKEY_USERS"), "HKEY_USERS");
        assert_eq!(canonical_namespace("hklm"), HKEY_LOCAL_MACHINE);
        assert_eq!(canonical_namespace("Custom"), "Custom");
    }

    #[test]
    fn test_lookup_ignores_case_and_accepts_aliases() {
        let store = MemoryStore::new();
        store.set_value(SHARED_DLLS, "C:\\app\\core.dll", StoreValue::Dword(1));

        assert!(store.exists("HKLM\\SOFTWARE\\microsoft\\Windows\\CurrentVersion\\SharedDLLs"));
        let names = store.list_value_names(SHARED_DLLS).unwrap();
        assert_eq!(names, vec!["C:\\app\\core.dll".to_owned()]);
        assert_eq!(
            store.get_value(SHARED_DLLS, "c:\\APP\\core.dll").unwrap(),
            Some(StoreValue::Dword(1))
        );
        assert_eq!(store.list_namespaces(), vec![HKEY_LOCAL_MACHINE.to_owned()]);
    }

    #[test]
    fn test_missing_key_is_not_found() {
        let store = MemoryStore::new();
        store.insert_key("HKCU\\Software");

        let err = store.list_subkeys("HKCU\\Software\\Nope").unwrap_err();
        assert!(err.is_not_found());
        assert!(!store.exists("HKCU\\Software\\Nope"));
        assert_eq!(store.get_value("HKCU\\Software", "missing").unwrap(), None);
    }

    #[test]
    fn test_denied_subtree_reports_access_denied() {
        let store = MemoryStore::new();
        store.insert_key("HKLM\\SECURITY\\Policy\\Secrets");
        store.deny("HKLM\\SECURITY");

        let err = store.list_subkeys("HKLM\\SECURITY\\Policy").unwrap_err();
        assert!(err.is_access_denied(), "got: {err}");
        assert!(store.exists("HKLM\\SECURITY\\Policy"));
        assert!(store.list_subkeys("HKLM").is_ok());
    }

    #[test]
    fn test_remove_key_drops_subtree() {
        let store = MemoryStore::new();
        store.insert_key("HKCU\\AppEvents\\Schemes\\Apps\\.Default");

        assert!(store.remove_key("hkcu\\appevents\\schemes"));
        assert!(!store.exists("HKCU\\AppEvents\\Schemes\\Apps"));
        assert!(store.exists("HKCU\\AppEvents"));
        assert!(!store.remove_key("HKCU\\AppEvents\\Schemes"));
    }

    #[test]
    fn test_load_yaml_export() {
        let yaml = r#"
HKLM:
  keys:
    Software:
      keys:
        Vendor:
          values:
            "":
              type: string
              data: "C:\\Program Files\\Vendor\\app.exe"
            Count:
              type: dword
              data: 3
"#;
        let store = MemoryStore::from_yaml_str(yaml).unwrap();
        let value = store
            .get_value("HKEY_LOCAL_MACHINE\\Software\\Vendor", "")
            .unwrap()
            .unwrap();
        assert_eq!(value.as_str(), Some("C:\\Program Files\\Vendor\\app.exe"));
        assert_eq!(
            store.get_value("HKLM\\Software\\Vendor", "count").unwrap(),
            Some(StoreValue::Dword(3))
        );
    }

    #[test]
    fn test_aliased_namespaces_are_merged() {
        let json = r#"{
            "HKLM": {
                "keys": {
                    "Software": {
                        "keys": { "Vendor": { "values": { "Mode": { "type": "dword", "data": 1 } } } }
                    }
                }
            },
            "HKEY_LOCAL_MACHINE": {
                "keys": {
                    "SOFTWARE": {
                        "keys": { "Other": {} },
                        "values": { "Owner": { "type": "string", "data": "it" } }
                    }
                }
            },
            "hkey_local_machine": {
                "keys": { "System": {} }
            }
        }"#;
        let store = MemoryStore::from_json_str(json).unwrap();

        assert_eq!(store.list_namespaces(), vec![HKEY_LOCAL_MACHINE.to_owned()]);
        assert_eq!(
            store.get_value("HKLM\\Software\\Vendor", "Mode").unwrap(),
            Some(StoreValue::Dword(1))
        );
        assert!(store.exists("HKLM\\Software\\Other"));
        assert!(store.exists("HKLM\\System"));
        assert_eq!(store.list_subkeys("HKLM\\Software").unwrap().len(), 2);
        assert_eq!(
            store.get_value("HKLM\\Software", "owner").unwrap(),
            Some(StoreValue::String("it".to_owned()))
        );
    }

    #[test]
    fn test_json_export_reloads() {
        let store = MemoryStore::new();
        store.set_value(
            "HKCU\\Software\\Vendor",
            "Path",
            StoreValue::ExpandString("%ProgramFiles%\\Vendor".to_owned()),
        );
        store.deny("HKCU\\Software\\Locked");

        let json = store.to_json().unwrap();
        let reloaded = MemoryStore::from_json_str(&json).unwrap();
        assert_eq!(
            reloaded.get_value("HKCU\\Software\\Vendor", "Path").unwrap(),
            Some(StoreValue::ExpandString("%ProgramFiles%\\Vendor".to_owned()))
        );
        assert!(reloaded.list_subkeys("HKCU\\Software\\Locked").unwrap_err().is_access_denied());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let file = tmp.path().join("export.reg");
        std::fs::write(&file, "Windows Registry Editor Version 5.00").unwrap();

        let err = MemoryStore::load(&file).unwrap_err();
        assert!(err.to_string().contains("unsupported store format"), "got: {err}");
    }
}
