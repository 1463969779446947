//! Registered program locations (`App Paths`) that no longer resolve.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::{command_path, referenced_file_exists};

pub const APP_PATHS_KEY: &str =
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\App Paths";

#[derive(Debug, Clone, Copy, Default)]
pub struct AppPaths;

impl Validator for AppPaths {
    fn label(&self) -> &str {
        Section::AppPaths.label()
    }

    fn log_description(&self) -> &str {
        Section::AppPaths.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for program in ctx.subkeys(APP_PATHS_KEY)? {
            ctx.checkpoint()?;
            let key = join_path(APP_PATHS_KEY, &program);
            ctx.visit(&key);

            if let Some(target) = ctx.string_value(&key, "").as_deref().and_then(command_path)
                && !referenced_file_exists(ctx, &target, &[])
            {
                ctx.record("Invalid file or folder", &key, Some("(default)"));
            }

            if let Some(search_path) = ctx.string_value(&key, "Path") {
                let missing = search_path
                    .split(';')
                    .map(str::trim)
                    .filter(|dir| !dir.is_empty())
                    .any(|dir| !ctx.file_exists(dir));
                if missing {
                    ctx.record("Invalid folder", &key, Some("Path"));
                }
            }
        }
        Ok(())
    }
}
