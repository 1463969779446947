//! Append-only audit trail of a scan session.
//!
//! Every line is flushed as soon as it is written so that an abort never loses
//! lines that were already reported. A failed write does not stop the scan:
//! the line stays queued and is retried before the next one and on close.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::warn;

use crate::error::SessionError;
use crate::finding::Finding;
use crate::report::SessionStatus;

/// Log file name for a session started at `started_at`.
#[must_use]
pub fn file_name_for(started_at: &DateTime<Local>) -> String {
    started_at.format("%Y_%m_%d_%H%M%S.txt").to_string()
}

pub struct SessionLog {
    path: Option<PathBuf>,
    writer: Box<dyn Write + Send>,
    pending: VecDeque<String>,
}

impl SessionLog {
    /// Create the log file for a session under `dir`, creating `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::LogCreate`] if the directory or file cannot be
    /// created. This is the only log failure that is fatal.
    pub fn create(dir: &Path, started_at: &DateTime<Local>) -> Result<Self, SessionError> {
        let path = dir.join(file_name_for(started_at));
        let log_create = |source| SessionError::LogCreate {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(log_create)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(log_create)?;

        Ok(Self {
            path: Some(path),
            writer: Box::new(file),
            pending: VecDeque::new(),
        })
    }

    /// Log into an arbitrary writer (no backing file).
    #[must_use]
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            path: None,
            writer: Box::new(writer),
            pending: VecDeque::new(),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines written but not yet accepted by the writer.
    #[must_use]
    pub fn pending_lines(&self) -> usize {
        self.pending.len()
    }

    pub fn write_line(&mut self, line: impl Into<String>) {
        self.pending.push_back(line.into());
        self.drain();
    }

    /// Record the start of a section.
    pub fn section(&mut self, description: &str) {
        self.write_line(description);
    }

    pub fn finding(&mut self, finding: &Finding) {
        self.write_line(format!(
            "Found invalid registry key. Key Name: \"{}\" Path: \"{}\" Reason: \"{}\"",
            finding.value_name.as_deref().unwrap_or_default(),
            finding.path(),
            finding.problem
        ));
    }

    /// Record the final summary.
    pub fn summary(&mut self, items_scanned: u64, status: SessionStatus) {
        self.write_line(format!("Total Items Scanned: {items_scanned}"));
        self.write_line(format!("Scan {}", status.marker()));
    }

    /// Retry queued lines one last time and close the log.
    ///
    /// Returns the number of lines that could not be written.
    pub fn close(mut self) -> usize {
        self.drain();
        if !self.pending.is_empty() {
            warn!(lost = self.pending.len(), "session log closed with unwritten lines");
        }
        self.pending.len()
    }

    fn drain(&mut self) {
        while let Some(line) = self.pending.front() {
            let result = writeln!(self.writer, "{line}").and_then(|()| self.writer.flush());
            if let Err(e) = result {
                warn!(error = %e, queued = self.pending.len(), "session log write failed, will retry");
                return;
            }
            self.pending.pop_front();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;

    /// Writer that fails while `broken` is set and captures text otherwise.
    #[derive(Clone, Default)]
    struct Flaky {
        broken: Arc<Mutex<bool>>,
        text: Arc<Mutex<String>>,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if *self.broken.lock().unwrap() {
                return Err(io::Error::other("disk unplugged"));
            }
            self.text.lock().unwrap().push_str(&String::from_utf8_lossy(buf));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_file_name_from_start_time() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap();
        assert_eq!(file_name_for(&at), "2024_03_09_070502.txt");
    }

    #[test]
    fn test_create_makes_directory_and_flushes_each_line() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("logs").join("nested");
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let mut log = SessionLog::create(&dir, &at).unwrap();
        log.section("Checking for invalid DLL entries");
        let path = log.path().unwrap().to_path_buf();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Checking for invalid DLL entries\n");
        assert_eq!(log.close(), 0);
    }

    #[test]
    fn test_create_fails_when_dir_is_a_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();

        let err = SessionLog::create(&blocker, &Local::now()).err().unwrap();
        assert!(matches!(err, SessionError::LogCreate { .. }), "got: {err}");
    }

    #[test]
    fn test_failed_writes_are_retried() {
        let writer = Flaky::default();
        let mut log = SessionLog::from_writer(writer.clone());

        log.write_line("first");
        *writer.broken.lock().unwrap() = true;
        log.write_line("second");
        log.write_line("third");
        assert_eq!(log.pending_lines(), 2);

        *writer.broken.lock().unwrap() = false;
        log.summary(7, SessionStatus::Aborted);
        assert_eq!(log.close(), 0);
        assert_eq!(
            *writer.text.lock().unwrap(),
            "first\nsecond\nthird\nTotal Items Scanned: 7\nScan Aborted\n"
        );
    }
}
