//! # tagtty core
//!
//! Domain types, collaborator traits, and error definitions shared by every
//! tagtty crate. Nothing here performs I/O; implementations live in their
//! respective crates and depend inward on this one.

pub mod error;
pub mod log;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{ContextError, Error, LogError, ProviderError, Result};
pub use log::{LogReader, LogRecord, LogSnapshot, LogWriter, FIELD_DELIMITER};
pub use message::{Prompt, Role, Turn, TurnFormat};
pub use provider::{CompletionRequest, CompletionResponse, Provider, Usage};
