//! `tagtty log`: print the conversation log.

use tagtty_config::AppConfig;
use tagtty_core::log::{LogReader, LogRecord, LogSnapshot};
use tagtty_memory::FileLog;

pub fn run(
    config: &AppConfig,
    tag: Option<&str>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = FileLog::new(&config.log_file);
    let snapshot = log.read_records()?;

    println!("📜 Conversation log: {}", log.path().display());
    println!();
    print_records(&snapshot, tag, limit);
    Ok(())
}

/// Print records (oldest first), optionally filtered by tag and limited to
/// the most recent `limit`.
pub fn print_records(snapshot: &LogSnapshot, tag: Option<&str>, limit: Option<usize>) {
    let records = select(snapshot, tag, limit);

    if records.is_empty() {
        match tag {
            Some(tag) => println!("  No records tagged [{tag}]."),
            None => println!("  No records yet."),
        }
    }

    for record in &records {
        let label = if record.tag.is_empty() {
            String::new()
        } else {
            format!(" [{}]", record.tag)
        };
        println!("  {}{label}", record.timestamp);
        println!("    Q: {}", record.question);
        println!("    A: {}", record.response);
    }

    if snapshot.skipped > 0 {
        println!();
        println!("  ⚠️  {} malformed line(s) skipped", snapshot.skipped);
    }
}

fn select<'a>(
    snapshot: &'a LogSnapshot,
    tag: Option<&str>,
    limit: Option<usize>,
) -> Vec<&'a LogRecord> {
    let matching: Vec<&LogRecord> = snapshot
        .records
        .iter()
        .filter(|r| tag.is_none_or(|t| r.tag == t))
        .collect();
    let skip = limit.map_or(0, |n| matching.len().saturating_sub(n));
    matching.into_iter().skip(skip).collect()
}
