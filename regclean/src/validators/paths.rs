//! Helpers for turning store values into filesystem paths.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ScanConfig;
use crate::validator::ScanContext;

/// Unquoted command line: the shortest prefix ending in an executable
/// extension, followed by whitespace, a comma or the end of the string.
static UNQUOTED_EXECUTABLE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(concat!(
        r"(?i)^(.+?\.",                            // shortest path prefix
        r"(?:exe|com|bat|cmd|dll|scr|pif|vbs|js))", // executable extension
        r"(?:[\s,]|$)",                             // end of the program part
    )) {
        Ok(regex) => regex,
        Err(err) => panic!("Invalid executable regex: {err}"),
    }
});

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"%([^%\s]+)%") {
    Ok(regex) => regex,
    Err(err) => panic!("Invalid environment regex: {err}"),
});

/// Expand `%VAR%` references from the configured environment. Unknown
/// variables are left untouched.
#[must_use]
pub fn expand_vars(text: &str, config: &ScanConfig) -> String {
    ENV_REFERENCE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            config
                .env_var(&caps[1])
                .map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

/// Extract the program path from a command line such as
/// `"C:\Program Files\App\app.exe" /background` or
/// `C:\WINDOWS\system32\rundll32.exe shell32.dll,Control_RunDLL`.
#[must_use]
pub fn command_path(command: &str) -> Option<String> {
    let command = command.trim();
    if let Some(rest) = command.strip_prefix('"') {
        let program = rest.split('"').next().unwrap_or_default().trim();
        return (!program.is_empty()).then(|| program.to_owned());
    }
    if let Some(caps) = UNQUOTED_EXECUTABLE.captures(command) {
        return Some(caps[1].trim().to_owned());
    }
    command
        .split_whitespace()
        .next()
        .map(str::to_owned)
}

/// Whether `path` is rooted (`C:\...`, `\\server\share`, or `/...`).
#[must_use]
pub fn is_qualified(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with("\\\\")
        || path.starts_with('/')
        || (bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/'))
}

/// Join a Windows directory and a file name with a single backslash.
#[must_use]
pub fn join_windows(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches(['\\', '/']);
    let file = file.trim_start_matches(['\\', '/']);
    if dir.is_empty() {
        file.to_owned()
    } else {
        format!("{dir}\\{file}")
    }
}

/// Whether the file a value refers to exists. Unqualified names are looked up
/// in the given directories below the Windows directory (and the Windows
/// directory itself), as the loader would.
#[must_use]
pub fn referenced_file_exists(ctx: &ScanContext<'_>, file: &str, search_dirs: &[&str]) -> bool {
    if is_qualified(file) {
        return ctx.file_exists(file);
    }
    let root = &ctx.config().system_root;
    search_dirs
        .iter()
        .map(|dir| join_windows(root, dir))
        .chain(std::iter::once(root.clone()))
        .any(|dir| ctx.file_exists(&join_windows(&dir, file)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown_vars() {
        let config = ScanConfig::default();
        assert_eq!(
            expand_vars("%SystemRoot%\\Media\\ding.wav", &config),
            "C:\\Windows\\Media\\ding.wav"
        );
        assert_eq!(expand_vars("%NOPE%\\x", &config), "%NOPE%\\x");
        assert_eq!(expand_vars("100% done", &config), "100% done");
    }

    #[test]
    fn test_command_path_variants() {
        assert_eq!(
            command_path("\"C:\\Program Files\\App\\app.exe\" /background").as_deref(),
            Some("C:\\Program Files\\App\\app.exe")
        );
        assert_eq!(
            command_path("C:\\Program Files\\Tool\\tool.exe -silent").as_deref(),
            Some("C:\\Program Files\\Tool\\tool.exe")
        );
        assert_eq!(
            command_path("C:\\WINDOWS\\system32\\rundll32.exe shell32.dll,Control_RunDLL").as_deref(),
            Some("C:\\WINDOWS\\system32\\rundll32.exe")
        );
        assert_eq!(command_path("ctfmon /n").as_deref(), Some("ctfmon"));
        assert_eq!(command_path("   "), None);
        assert_eq!(command_path("\"\""), None);
    }

    #[test]
    fn test_qualified_paths_and_joins() {
        assert!(is_qualified("C:\\Windows"));
        assert!(is_qualified("\\\\server\\share\\file.dll"));
        assert!(is_qualified("/tmp/file"));
        assert!(!is_qualified("arial.ttf"));
        assert!(!is_qualified("C:"));
        assert_eq!(join_windows("C:\\Windows\\", "\\Fonts"), "C:\\Windows\\Fonts");
        assert_eq!(join_windows("", "a.dll"), "a.dll");
    }
}
