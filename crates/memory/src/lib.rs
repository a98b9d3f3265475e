//! Conversation log storage for tagtty.
//!
//! The durable format is one `timestamp|tag|question|response` line per
//! record. [`codec`] owns that format; [`FileLog`] and [`InMemoryLog`]
//! implement the core `LogReader` / `LogWriter` traits on top of it.

pub mod codec;
pub mod file_log;
pub mod in_memory;

pub use codec::{parse_line, serialize};
pub use file_log::FileLog;
pub use in_memory::InMemoryLog;
