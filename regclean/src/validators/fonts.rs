//! Installed font registrations whose font file is gone.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::referenced_file_exists;

pub const FONTS_KEY: &str = "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows NT\\CurrentVersion\\Fonts";

#[derive(Debug, Clone, Copy, Default)]
pub struct Fonts;

impl Validator for Fonts {
    fn label(&self) -> &str {
        Section::Fonts.label()
    }

    fn log_description(&self) -> &str {
        Section::Fonts.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        if !ctx.store().exists(FONTS_KEY) {
            return Ok(());
        }
        ctx.visit(FONTS_KEY);

        for name in ctx.value_names(FONTS_KEY)? {
            ctx.checkpoint()?;
            let Some(file) = ctx.string_value(FONTS_KEY, &name) else {
                continue;
            };
            // Relative names live in %SystemRoot%\Fonts.
            if !referenced_file_exists(ctx, &file, &["Fonts"]) {
                ctx.record("Invalid font reference", FONTS_KEY, Some(&name));
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
    fn test_relative_and_absolute_font_files() {
        let store = Arc::new(MemoryStore::new());
        store.set_value(FONTS_KEY, "Arial (TrueType)", StoreValue::String("arial.ttf".to_owned()));
        store.set_value(FONTS_KEY, "Gone (TrueType)", StoreValue::String("gone.ttf".to_owned()));
        store.set_value(
            FONTS_KEY,
            "Custom (OpenType)",
            StoreValue::String("D:\\fonts\\custom.otf".to_owned()),
        );

        let outcome = run_validator(&Fonts, &store, &["C:\\Windows\\Fonts\\arial.ttf"]);

        let names: Vec<_> = outcome
            .findings
            .iter()
            .filter_map(|f| f.value_name.clone())
            .collect();
        assert_eq!(names, vec!["Custom (OpenType)", "Gone (TrueType)"]);
        assert!(outcome.findings.iter().all(|f| f.problem == "Invalid font reference"));
    }
}
