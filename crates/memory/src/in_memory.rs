//! In-memory log, for tests and sessions run with logging disabled.

use std::sync::RwLock;
use tagtty_core::error::LogError;
use tagtty_core::log::{LogReader, LogRecord, LogSnapshot, LogWriter};

/// A conversation log that keeps its records in a Vec.
#[derive(Debug, Default)]
pub struct InMemoryLog {
    records: RwLock<Vec<LogRecord>>,
}

impl InMemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log with existing records, oldest first.
    pub fn with_records(records: Vec<LogRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// A copy of every record appended so far.
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogReader for InMemoryLog {
    fn read_records(&self) -> Result<LogSnapshot, LogError> {
        Ok(LogSnapshot {
            records: self.records(),
            skipped: 0,
        })
    }
}

impl LogWriter for InMemoryLog {
    fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut guard = match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(record.clone());
        Ok(())
    }
}
