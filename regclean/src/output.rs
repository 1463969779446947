//! Shared output formatting for session results.
//!
//! Provides JSON and plain-text formatters for `SessionResult`.
//! Color/terminal formatting belongs to the CLI layer.

use std::io::Write;

use crate::report::{SessionResult, SessionStatus};

/// Format a `SessionResult` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(result: &SessionResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `SessionResult` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(result: &SessionResult, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  REGISTRY SCAN")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Session:        {}", result.session_id)?;
    writeln!(
        writer,
        "  Sections:       {}/{}",
        result.completed_sections, result.total_sections
    )?;
    writeln!(writer, "  Items scanned:  {}", result.items_scanned)?;
    writeln!(writer, "  Problems found: {}", result.findings_count())?;
    writeln!(writer, "  Restore point:  {}", result.snapshot.log_line())?;
    if let Some(log_path) = &result.log_path {
        writeln!(writer, "  Session log:    {}", log_path.display())?;
    }
    writeln!(writer)?;

    if !result.findings.is_empty() {
        writeln!(writer, "{}", "-".repeat(80))?;
        writeln!(writer, "  PROBLEMS")?;
        writeln!(writer, "{}", "-".repeat(80))?;
        for finding in &result.findings {
            writeln!(writer, "{}", finding.format_human_readable())?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "{}", "=".repeat(80))?;
    match result.status {
        SessionStatus::Aborted => writeln!(
            writer,
            "\u{2717} Scan aborted after {} of {} section(s)",
            result.completed_sections, result.total_sections
        )?,
        _ if result.findings.is_empty() => writeln!(writer, "\u{2713} No problems found")?,
        _ => writeln!(
            writer,
            "\u{2717} {} problem(s) found",
            result.findings_count()
        )?,
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::finding::Finding;
    use crate::snapshot::SnapshotOutcome;
    use uuid::Uuid;

    fn result(status: SessionStatus, findings: Vec<Finding>) -> SessionResult {
        SessionResult {
            session_id: Uuid::nil(),
            status,
            total_sections: 3,
            completed_sections: 2,
            items_scanned: 17,
            findings,
            log_path: None,
            snapshot: SnapshotOutcome::Disabled,
        }
    }

    #[test]
    fn test_human_output_lists_findings() {
        let finding = Finding::new(
            "Invalid file or folder",
            "HKEY_LOCAL_MACHINE\\Software\\Microsoft\\Windows\\CurrentVersion\\SharedDLLs",
            Some("C:\\missing.dll"),
        );
        let mut out = Vec::new();
        write_human(&result(SessionStatus::Completed, vec![finding]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Items scanned:  17"));
        assert!(text.contains("SharedDLLs [C:\\missing.dll]: Invalid file or folder"));
        assert!(text.contains("1 problem(s) found"));
    }

    #[test]
    fn test_human_output_for_aborted_session() {
        let mut out = Vec::new();
        write_human(&result(SessionStatus::Aborted, Vec::new()), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Scan aborted after 2 of 3 section(s)"));
    }

    #[test]
    fn test_json_output_shape() {
        let mut out = Vec::new();
        write_json(&result(SessionStatus::Completed, Vec::new()), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["status"], "completed");
        assert_eq!(value["items_scanned"], 17);
        assert_eq!(value["snapshot"]["outcome"], "disabled");
        assert!(value.get("log_path").is_none());
    }
}
