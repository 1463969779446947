//! COM class registrations whose server binary is missing.

use crate::error::ScanAborted;
use crate::section::Section;
use crate::store::join_path;
use crate::validator::{ScanContext, Validator};
use crate::validators::paths::{command_path, referenced_file_exists};

pub const CLSID_KEY: &str = "HKEY_CLASSES_ROOT\\CLSID";

const SERVER_KEYS: [&str; 2] = ["InprocServer32", "LocalServer32"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveX;

impl Validator for ActiveX {
    fn label(&self) -> &str {
        Section::Activex.label()
    }

    fn log_description(&self) -> &str {
        Section::Activex.log_description()
    }

    fn run(&self, ctx: &mut ScanContext<'_>) -> Result<(), ScanAborted> {
        for clsid in ctx.subkeys(CLSID_KEY)? {
            ctx.checkpoint()?;
            let class_key = join_path(CLSID_KEY, &clsid);
            ctx.visit(&class_key);

            for server in SERVER_KEYS {
                let server_key = join_path(&class_key, server);
                if !ctx.store().exists(&server_key) {
                    continue;
                }
                let Some(binary) = ctx.string_value(&server_key, "").as_deref().and_then(command_path) else {
                    continue;
                };
                if !referenced_file_exists(ctx, &binary, &["System32"]) {
                    ctx.record("Invalid COM server file", &server_key, Some("(default)"));
                }
            }
        }
        Ok(())
    }
}
