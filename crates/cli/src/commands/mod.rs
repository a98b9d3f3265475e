pub mod chat;
pub mod config_cmd;
pub mod log;
pub mod query;

use std::path::Path;
use std::sync::Arc;

use tagtty_agent::{ChatSession, SessionSettings};
use tagtty_config::AppConfig;
use tagtty_memory::FileLog;
use tagtty_providers::OpenAiCompatProvider;

/// Load configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_overrides(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build a session over the configured provider and log file.
pub fn build_session(
    config: &AppConfig,
    debug: bool,
    logging: bool,
) -> Result<(ChatSession, Arc<FileLog>), Box<dyn std::error::Error>> {
    // Check for API key early, give a clear error
    if !config.has_api_key() {
        print_missing_key_help();
        return Err("No API key found. See above for setup instructions.".into());
    }
    let provider = OpenAiCompatProvider::from_config(config)?;

    let log = Arc::new(FileLog::new(&config.log_file));
    if logging {
        log.ensure_exists()?;
    }

    let session = ChatSession::new(Arc::new(provider), SessionSettings::from_config(config))
        .with_log(log.clone(), log.clone())
        .with_logging(logging)
        .with_debug(debug);

    Ok((session, log))
}

/// Flatten line breaks unless the user asked to keep them.
pub fn format_response(text: &str, preserve_new_lines: bool) -> String {
    if preserve_new_lines {
        text.to_string()
    } else {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn print_missing_key_help() {
    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    TAGTTY_API_KEY=sk-...");
    eprintln!("    OPENAI_API_KEY=sk-...");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
}
