//! Sound scheme entries whose wave file is missing.
//!
//! `AppEvents\Schemes\Apps` is a tree of applications and events; the leaves
//! that carry a file are the `.Current` and `.Modified` keys (their default
//! value). Everything else is descended into.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::referenced_file_exists;

pub const SOUND_SCHEMES_KEY: &str = "HKEY_CURRENT_USER\\AppEvents\\Schemes\\Apps";

#[derive(Debug, Clone, Copy, Default)]
pub struct Sounds;

impl Sounds {
    fn walk(ctx: &mut ScanContext<'_>, path: &str) -> Result<(), ScanAborted> {
        for name in ctx.subkeys(path)? {
            if name.is_empty() {
                continue;
            }
            let child = join_path(path, &name);
            if !ctx.store().exists(&child) {
                continue;
            }
            ctx.visit(&child);

            if name.eq_ignore_ascii_case(".Current") || name.eq_ignore_ascii_case(".Modified") {
                if let Some(sound) = ctx.string_value(&child, "")
                    && !referenced_file_exists(ctx, &sound, &["Media"])
                {
                    ctx.record("Invalid file or folder", &child, Some("(default)"));
                }
            } else {
                Self::walk(ctx, &child)?;
            }
        }
        Ok(())
    }
}

impl Validator for Sounds {
    fn label(&self) -> &str {
        Section::Sounds.label()
    }

    fn log_description(&self) -> &str {
        Section::Sounds.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        if !ctx.store().exists(SOUND_SCHEMES_KEY) {
            return Ok(());
        }
        Self::walk(ctx, SOUND_SCHEMES_KEY)
    }
}
