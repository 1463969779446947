//! Help file registrations (`name = directory`) whose file is missing.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::join_windows;

pub const HELP_KEYS: [&str; 2] = [
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\Help",
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\HTML Help",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct HelpFiles;

impl Validator for HelpFiles {
    fn label(&self) -> &str {
        Section::HelpFiles.label()
    }

    fn log_description(&self) -> &str {
        Section::HelpFiles.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for key in HELP_KEYS {
            if !ctx.store().exists(key) {
                continue;
            }
            ctx.visit(key);

            for name in ctx.value_names(key)? {
                ctx.checkpoint()?;
                if name.is_empty() {
                    continue;
                }
                let Some(dir) = ctx.string_value(key, &name) else {
                    continue;
                };
                if !ctx.file_exists(&join_windows(&dir, &name)) {
                    ctx.record("Invalid help file", key, Some(&name));
                }
            }
        }
        Ok(())
    }
}
