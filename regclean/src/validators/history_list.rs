//! Open/Save dialog history entries for documents that are gone.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};

pub const OPEN_SAVE_MRU_KEY: &str =
    "HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Explorer\\ComDlg32\\OpenSaveMRU";

#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryList;

impl HistoryList {
    fn check_entries(ctx: &mut ScanContext<'_>, key: &str) -> Result<(), ScanAborted> {
        ctx.visit(key);
        for name in ctx.value_names(key)? {
            ctx.checkpoint()?;
            if name.is_empty() || name.eq_ignore_ascii_case("MRUList") {
                continue;
            }
            let Some(document) = ctx.string_value(key, &name) else {
                continue;
            };
            if !ctx.file_exists(&document) {
                ctx.record("Invalid recent document", key, Some(&name));
            }
        }
        Ok(())
    }
}

impl Validator for HistoryList {
    fn label(&self) -> &str {
        Section::HistoryList.label()
    }

    fn log_description(&self) -> &str {
        Section::HistoryList.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        if !ctx.store().exists(OPEN_SAVE_MRU_KEY) {
            return Ok(());
        }
        Self::check_entries(ctx, OPEN_SAVE_MRU_KEY)?;

        for extension in ctx.subkeys(OPEN_SAVE_MRU_KEY)? {
            let key = join_path(OPEN_SAVE_MRU_KEY, &extension);
            if !ctx.store().exists(&key) {
                continue;
            }
            Self::check_entries(ctx, &key)?;
        }
        Ok(())
    }
}
