//! Conversation log: the append-only record of question/response pairs.
//!
//! Each record is one line of `timestamp|tag|question|response`. The reader
//! and writer traits are the seam between the context assembler and the
//! storage that backs it.

use crate::error::LogError;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The character separating fields of a persisted record.
pub const FIELD_DELIMITER: char = '|';

/// Timestamp layout used in the log (`YYYY-MM-DD HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted question/response pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub tag: String,
    pub question: String,
    pub response: String,
}

impl LogRecord {
    /// Build a record stamped with the current local time.
    ///
    /// Every field has the delimiter stripped, so the result is always safe
    /// to serialize.
    pub fn now(tag: &str, question: &str, response: &str) -> Self {
        Self::at(Local::now().naive_local(), tag, question, response)
    }

    /// Build a record stamped with the given time.
    pub fn at(time: NaiveDateTime, tag: &str, question: &str, response: &str) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            tag: strip_delimiter(tag),
            question: strip_delimiter(question),
            response: strip_delimiter(response),
        }
    }

    /// True when no field contains the delimiter.
    pub fn is_serializable(&self) -> bool {
        [&self.timestamp, &self.tag, &self.question, &self.response]
            .iter()
            .all(|f| !f.contains(FIELD_DELIMITER))
    }
}

/// Remove every delimiter character and flatten line breaks to spaces.
pub fn strip_delimiter(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != FIELD_DELIMITER)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// The result of reading the whole log once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSnapshot {
    /// Well-formed records in persisted (oldest-first) order.
    pub records: Vec<LogRecord>,
    /// Lines that were skipped because they were malformed.
    pub skipped: usize,
}

impl LogSnapshot {
    /// Records carrying the given tag, oldest first.
    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a LogRecord> + 'a {
        self.records.iter().filter(move |r| r.tag == tag)
    }
}

/// Read access to the conversation log.
///
/// A genuinely absent log is "no history yet" and yields an empty snapshot;
/// any other failure is reported as [`LogError::Io`].
pub trait LogReader: Send + Sync {
    fn read_records(&self) -> Result<LogSnapshot, LogError>;
}

/// Append access to the conversation log. Records are never rewritten.
pub trait LogWriter: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<(), LogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 3, 12)
            .unwrap()
            .and_hms_opt(12, 0, 5)
            .unwrap()
    }

    #[test]
    fn timestamp_uses_log_layout() {
        let record = LogRecord::at(noon(), "t", "q", "r");
        assert_eq!(record.timestamp, "2023-03-12 12:00:05");
    }

    #[test]
    fn constructor_strips_delimiter_and_newlines() {
        let record = LogRecord::at(noon(), "a|b", "why | how", "line one\nline two|");
        assert_eq!(record.tag, "ab");
        assert_eq!(record.question, "why  how");
        assert_eq!(record.response, "line one line two");
        assert!(record.is_serializable());
    }

    #[test]
    fn hand_built_record_with_delimiter_is_not_serializable() {
        let record = LogRecord {
            timestamp: "2023-03-12 12:00:05".into(),
            tag: String::new(),
            question: "a|b".into(),
            response: "c".into(),
        };
        assert!(!record.is_serializable());
    }

    #[test]
    fn snapshot_filters_by_tag_in_order() {
        let snapshot = LogSnapshot {
            records: vec![
                LogRecord::at(noon(), "x", "1", "a"),
                LogRecord::at(noon(), "y", "2", "b"),
                LogRecord::at(noon(), "x", "3", "c"),
            ],
            skipped: 0,
        };
        let questions: Vec<_> = snapshot.tagged("x").map(|r| r.question.as_str()).collect();
        assert_eq!(questions, vec!["1", "3"]);
    }
}
