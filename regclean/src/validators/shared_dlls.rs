//! Shared DLL reference counts pointing at files that no longer exist.
//!
//! The key is a flat list: every value *name* is a DLL path.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::validator::{ScanContext, Validator};

pub const SHARED_DLLS_KEY: &str =
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs";

#[derive(Debug, Clone, Copy, Default)]
pub struct SharedDlls;

impl Validator for SharedDlls {
    fn label(&self) -> &str {
        Section::SharedDlls.label()
    }

    fn log_description(&self) -> &str {
        Section::SharedDlls.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        if !ctx.store().exists(SHARED_DLLS_KEY) {
            return Ok(());
        }
        ctx.visit(SHARED_DLLS_KEY);

        for file in ctx.value_names(SHARED_DLLS_KEY)? {
            ctx.checkpoint()?;
            if !file.is_empty() && !ctx.file_exists(&file) {
                ctx.record("Invalid file or folder", SHARED_DLLS_KEY, Some(&file));
            }
        }
        Ok(())
    }
}
