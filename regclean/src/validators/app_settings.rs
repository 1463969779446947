//! Vendor keys under `Software` that hold nothing at all.

use tracing::debug;

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};

pub const SOFTWARE_KEYS: [&str; 2] = [
    "HKEY_CURRENT_USER\\Software",
    "HKEY_LOCAL_MACHINE\\Software",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AppSettings;

impl AppSettings {
    /// Empty only when both listings succeed and come back empty; a key we
    /// cannot open is not evidence of anything.
    fn is_empty_key(ctx: &ScanContext<'_>, path: &str) -> bool {
        let store = ctx.store();
        match (store.list_value_names(path), store.list_subkeys(path)) {
            (Ok(values), Ok(keys)) => values.is_empty() && keys.is_empty(),
            (Err(e), _) | (_, Err(e)) => {
                debug!(path, error = %e, "cannot inspect key");
                false
            }
        }
    }
}

impl Validator for AppSettings {
    fn label(&self) -> &str {
        Section::AppSettings.label()
    }

    fn log_description(&self) -> &str {
        Section::AppSettings.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for root in SOFTWARE_KEYS {
            for vendor in ctx.subkeys(root)? {
                ctx.checkpoint()?;
                let key = join_path(root, &vendor);
                ctx.visit(&key);

                if Self::is_empty_key(ctx, &key) {
                    ctx.record("Missing software settings", &key, None);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreValue};
    use crate::validators::testing::run_validator;
    use std::sync::Arc;

    #[test]
    fn test_only_truly_empty_vendor_keys() {
        let store = Arc::new(MemoryStore::new());
        store.insert_key("HKCU\\Software\\Abandoned");
        store.insert_key("HKCU\\Software\\Vendor\\Product");
        store.set_value("HKCU\\Software\\Tool", "Version", StoreValue::Dword(3));
        store.deny("HKLM\\Software\\Locked");

        let outcome = run_validator(&AppSettings, &store, &[]);

        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].path(), "HKEY_CURRENT_USER\\Software\\Abandoned");
        assert_eq!(outcome.findings[0].problem, "Missing software settings");
        assert_eq!(outcome.items_scanned, 4);
    }
}
