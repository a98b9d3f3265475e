//! Log line codec.
//!
//! `parse_line` and `serialize` are inverses for any record whose fields
//! contain no `|`. Callers strip the delimiter before building a record
//! (see `LogRecord::now`).

use tagtty_core::error::LogError;
use tagtty_core::log::{FIELD_DELIMITER, LogRecord};

/// Parse one log line into a record.
///
/// Splits on `|` and trims each of the first four fields. Lines with fewer
/// than four fields are reported as [`LogError::Malformed`]; `line_number`
/// is 1-based and only used for the error.
pub fn parse_line(line: &str, line_number: usize) -> Result<LogRecord, LogError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut fields = line.split(FIELD_DELIMITER).map(str::trim);

    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(timestamp), Some(tag), Some(question), Some(response)) => Ok(LogRecord {
            timestamp: timestamp.to_string(),
            tag: tag.to_string(),
            question: question.to_string(),
            response: response.to_string(),
        }),
        _ => Err(LogError::Malformed {
            line: line_number,
            fields: line.split(FIELD_DELIMITER).count(),
        }),
    }
}

/// Serialize a record as one newline-terminated log line.
pub fn serialize(record: &LogRecord) -> String {
    let mut line = [
        record.timestamp.as_str(),
        record.tag.as_str(),
        record.question.as_str(),
        record.response.as_str(),
    ]
    .join("|");
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(tag: &str, question: &str, response: &str) -> LogRecord {
        let at = NaiveDate::from_ymd_opt(2023, 3, 12)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        LogRecord::at(at, tag, question, response)
    }

    #[test]
    fn serialize_writes_fields_in_order() {
        let line = serialize(&record("Tag1", "what is rust?", "A language."));
        assert_eq!(line, "2023-03-12 09:30:00|Tag1|what is rust?|A language.\n");
    }

    #[test]
    fn parse_inverts_serialize() {
        let cases = [
            record("Tag1", "what is the capital of australia?", "Canberra."),
            record("", "untagged question", "untagged answer"),
            record("multi-word-tag", "Australia's capital", "it's Canberra"),
        ];
        for original in cases {
            let parsed = parse_line(&serialize(&original), 1).unwrap();
            assert_eq!(parsed, original);
        }
    }

    #[test]
    fn parse_trims_each_field() {
        let parsed = parse_line(" 2023-03-12 09:30:00 | Tag1 |  q  | r \r\n", 1).unwrap();
        assert_eq!(parsed.timestamp, "2023-03-12 09:30:00");
        assert_eq!(parsed.tag, "Tag1");
        assert_eq!(parsed.question, "q");
        assert_eq!(parsed.response, "r");
    }

    #[test]
    fn empty_fields_are_still_four_fields() {
        let parsed = parse_line("|||", 1).unwrap();
        assert!(parsed.tag.is_empty());
        assert!(parsed.response.is_empty());
    }

    #[test]
    fn too_few_fields_is_malformed() {
        let err = parse_line("2023-03-12 09:30:00|Tag1|only a question", 3).unwrap_err();
        assert!(matches!(err, LogError::Malformed { line: 3, fields: 3 }));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let parsed = parse_line("t|tag|q|r|stray", 1).unwrap();
        assert_eq!(parsed.response, "r");
    }
}
