//! File-backed conversation log stored as `|`-delimited text.
//!
//! The file is read in full on every `read_records` call and appended to on
//! every `append`; no state is cached between calls, so two reads with no
//! append in between always agree.
//!
//! Storage location defaults to `output.txt` in the working directory and is
//! configured through `log_file`.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tagtty_core::error::LogError;
use tagtty_core::log::{LogReader, LogRecord, LogSnapshot, LogWriter};
use tracing::{debug, warn};

use crate::codec;

/// A conversation log stored as one delimited line per record.
#[derive(Debug, Clone)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    /// Create a log handle for the given path. Nothing is touched on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file (and parent directories) if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<(), LogError> {
        self.open_for_append().map(|_| ())
    }

    /// Parse log text, skipping blank and malformed lines.
    pub fn parse_text(content: &str) -> LogSnapshot {
        let mut snapshot = LogSnapshot::default();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match codec::parse_line(line, index + 1) {
                Ok(record) => snapshot.records.push(record),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed log line");
                    snapshot.skipped += 1;
                }
            }
        }

        snapshot
    }

    fn io_error(&self, e: std::io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn open_for_append(&self) -> Result<std::fs::File, LogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))
    }
}

impl LogReader for FileLog {
    fn read_records(&self) -> Result<LogSnapshot, LogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            // No file yet means no history yet
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Conversation log not found, starting empty");
                return Ok(LogSnapshot::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let snapshot = Self::parse_text(&content);
        debug!(
            path = %self.path.display(),
            records = snapshot.records.len(),
            skipped = snapshot.skipped,
            "Conversation log loaded"
        );
        Ok(snapshot)
    }
}

impl LogWriter for FileLog {
    fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut file = self.open_for_append()?;
        file.write_all(codec::serialize(record).as_bytes())
            .map_err(|e| self.io_error(e))?;
        Ok(())
    }
}
