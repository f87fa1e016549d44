//! Append-only diagnostic log (`error.log`) for failed attempts.
//!
//! The report only carries a short note per attempt; the full story (status, body
//! excerpt, fault chain, selected proxy) lands here, one line per failure event.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// File name of the diagnostic log inside a dataset directory
pub const DIAGNOSTIC_LOG_FILE: &str = "error.log";

/// Shared append-only log; cheap to share behind an `Arc`
///
/// The file is opened on first use, so clean runs leave no empty log behind.
/// Appends are serialized by a mutex so concurrent workers always write whole lines.
#[derive(Debug)]
pub struct DiagnosticLog {
    path: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
}

impl DiagnosticLog {
    /// Log writing to `<dir>/error.log`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(DIAGNOSTIC_LOG_FILE),
            file: Mutex::new(None),
        }
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line
    ///
    /// Line breaks inside `message` are flattened. Write failures are traced and
    /// otherwise ignored: losing a diagnostic line must never fail an attempt.
    pub async fn append(&self, message: &str) {
        let line = format_line(&chrono::Local::now(), message);

        let mut guard = self.file.lock().await;
        if let Err(e) = write_line(&self.path, &mut guard, &line).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to append to diagnostic log"
            );
            // Reopen on the next attempt
            *guard = None;
        }
    }
}

async fn write_line(
    path: &Path,
    slot: &mut Option<tokio::fs::File>,
    line: &str,
) -> std::io::Result<()> {
    if slot.is_none() {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        *slot = Some(file);
    }

    if let Some(file) = slot.as_mut() {
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
    }
    Ok(())
}

fn format_line<Tz>(at: &chrono::DateTime<Tz>, message: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let flat: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("[{}] {}\n", at.format("%Y-%m-%d %H:%M:%S"), flat.trim_end())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[test]
    fn line_format_has_bracketed_timestamp() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 9).unwrap();

        let line = format_line(&at, "HTTP 403, URL: https://a.example");

        assert_eq!(line, "[2026-03-01 14:05:09] HTTP 403, URL: https://a.example\n");
    }

    #[test]
    fn line_breaks_are_flattened() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

        let line = format_line(&at, "first\nsecond\r\n");

        assert_eq!(line, "[2026-03-01 00:00:00] first second\n");
    }

    #[tokio::test]
    async fn no_file_until_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let log = DiagnosticLog::new(dir.path());

        assert!(!log.path().exists());

        log.append("boom").await;

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert!(content.ends_with("] boom\n"));
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("provider").join("dataset");
        let log = DiagnosticLog::new(&nested);

        log.append("x").await;

        assert!(nested.join(DIAGNOSTIC_LOG_FILE).exists());
    }

    #[tokio::test]
    async fn concurrent_appends_write_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(DiagnosticLog::new(dir.path()));

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let log = Arc::clone(&log);
                tokio::spawn(async move { log.append(&format!("event {i} {}", "x".repeat(200))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 50);
        for line in lines {
            assert!(line.starts_with('['));
            assert!(line.ends_with(&"x".repeat(200)));
        }
    }

    #[tokio::test]
    async fn appends_to_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DIAGNOSTIC_LOG_FILE);
        tokio::fs::write(&path, "[earlier] line\n").await.unwrap();

        DiagnosticLog::new(dir.path()).append("later").await;

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("[earlier] line\n"));
        assert_eq!(content.lines().count(), 2);
    }
}
