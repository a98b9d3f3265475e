//! Error types for the tagtty domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for tagtty operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Conversation log errors ---
    #[error("Log error: {0}")]
    Log(#[from] LogError),

    // --- Context assembly errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the conversation log collaborator.
#[derive(Debug, Clone, Error)]
pub enum LogError {
    /// The log exists but could not be read or written.
    #[error("Log I/O failed at {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// A line did not carry the four `|`-delimited fields.
    #[error("Malformed log record on line {line}: expected 4 fields, found {fields}")]
    Malformed { line: usize, fields: usize },
}

#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// A tag was supplied but the assembler has no log to read history from.
    #[error("Tag '{tag}' requested shared history but no conversation log is configured")]
    MissingLog { tag: String },

    #[error(transparent)]
    Log(#[from] LogError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn malformed_record_names_line_and_field_count() {
        let err = LogError::Malformed { line: 7, fields: 2 };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("found 2"));
    }

    #[test]
    fn context_error_wraps_log_io() {
        let err: ContextError = LogError::Io {
            path: PathBuf::from("/var/log/output.txt"),
            reason: "permission denied".into(),
        }
        .into();
        assert!(err.to_string().contains("permission denied"));

        let top: Error = err.into();
        assert!(top.to_string().starts_with("Context error"));
    }

    #[test]
    fn missing_log_mentions_tag() {
        let err = ContextError::MissingLog { tag: "rust".into() };
        assert!(err.to_string().contains("'rust'"));
    }
}
