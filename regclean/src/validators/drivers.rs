//! Multimedia driver aliases pointing at missing driver files.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::referenced_file_exists;

pub const DRIVERS32_KEY: &str =
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows NT\\CurrentVersion\\Drivers32";

#[derive(Debug, Clone, Copy, Default)]
pub struct Drivers;

impl Validator for Drivers {
    fn label(&self) -> &str {
        Section::Drivers.label()
    }

    fn log_description(&self) -> &str {
        Section::Drivers.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        if !ctx.store().exists(DRIVERS32_KEY) {
            return Ok(());
        }
        ctx.visit(DRIVERS32_KEY);

        for alias in ctx.value_names(DRIVERS32_KEY)? {
            ctx.checkpoint()?;
            let Some(file) = ctx.string_value(DRIVERS32_KEY, &alias) else {
                continue;
            };
            if !referenced_file_exists(ctx, &file, &["System32"]) {
                ctx.record("Invalid driver file", DRIVERS32_KEY, Some(&alias));
            }
        }
        Ok(())
    }
}
