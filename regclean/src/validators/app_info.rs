//! Uninstall entries that are orphaned or point at a removed install folder.

use tracing::debug;

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};

pub const UNINSTALL_KEYS: [&str; 2] = [
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
    "HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AppInfo;

impl Validator for AppInfo {
    fn label(&self) -> &str {
        Section::AppInfo.label()
    }

    fn log_description(&self) -> &str {
        Section::AppInfo.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for root in UNINSTALL_KEYS {
            for app in ctx.subkeys(root)? {
                ctx.checkpoint()?;
                let key = join_path(root, &app);
                ctx.visit(&key);

                // Absent values only count when the entry could be read.
                if let Err(e) = ctx.store().list_value_names(&key) {
                    debug!(path = %key, error = %e, "cannot inspect uninstall entry");
                    continue;
                }
                let display_name = ctx.string_value(&key, "DisplayName");
                let uninstall = ctx.string_value(&key, "UninstallString");
                if display_name.is_none() && uninstall.is_none() {
                    ctx.record("Invalid application info", &key, None);
                    continue;
                }

                if let Some(location) = ctx.string_value(&key, "InstallLocation")
                    && !ctx.file_exists(&location)
                {
                    ctx.record("Invalid install location", &key, Some("InstallLocation"));
                }
            }
        }
        Ok(())
    }
}
