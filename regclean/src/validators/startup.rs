//! Programs launched at logon that no longer exist.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::{command_path, referenced_file_exists};

pub const STARTUP_KEYS: [&str; 4] = [
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\Run",
    "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\RunOnce",
    "HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Run",
    "HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\RunOnce",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct Startup;

/// Bare program names (`ctfmon`) are run as `.exe`.
fn with_default_extension(program: String) -> String {
    let file_name = program.rsplit(['\\', '/']).next().unwrap_or_default();
    if file_name.contains('.') {
        program
    } else {
        format!("{program}.exe")
    }
}

impl Validator for Startup {
    fn label(&self) -> &str {
        Section::Startup.label()
    }

    fn log_description(&self) -> &str {
        Section::Startup.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for key in STARTUP_KEYS {
            if !ctx.store().exists(key) {
                continue;
            }
            ctx.visit(key);

            for name in ctx.value_names(key)? {
                ctx.checkpoint()?;
                let Some(program) = ctx
                    .string_value(key, &name)
                    .as_deref()
                    .and_then(command_path)
                    .map(with_default_extension)
                else {
                    continue;
                };
                if !referenced_file_exists(ctx, &program, &["System32"]) {
                    ctx.record("Invalid file or folder", key, Some(&name));
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
    fn test_run_entries_are_checked() {
        let store = Arc::new(MemoryStore::new());
        let run = STARTUP_KEYS[0];
        store.set_value(run, "Updater", StoreValue::String("\"C:\\Program Files\\Old\\upd.exe\" /quiet".to_owned()));
        store.set_value(run, "Input", StoreValue::String("ctfmon /n".to_owned()));
        store.set_value(run, "Tray", StoreValue::String("C:\\Program Files\\Tray\\tray.exe -min".to_owned()));
        store.set_value(STARTUP_KEYS[3], "Once", StoreValue::String("C:\\setup\\finish.cmd".to_owned()));

        let outcome = run_validator(
            &Startup,
            &store,
            &["C:\\Windows\\System32\\ctfmon.exe", "C:\\Program Files\\Tray\\tray.exe"],
        );

        let names: Vec<_> = outcome
            .findings
            .iter()
            .map(|f| (f.path(), f.value_name.clone().unwrap_or_default()))
            .collect();
        assert_eq!(
            names,
            vec![
                (run.to_owned(), "Updater".to_owned()),
                (STARTUP_KEYS[3].to_owned(), "Once".to_owned()),
            ]
        );
        assert_eq!(outcome.items_scanned, 2);
    }

    #[test]
    fn test_bare_program_names_get_exe() {
        assert_eq!(with_default_extension("ctfmon".to_owned()), "ctfmon.exe");
        assert_eq!(with_default_extension("C:\\x\\run.bat".to_owned()), "C:\\x\\run.bat");
    }
}
