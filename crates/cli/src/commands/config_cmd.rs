//! `tagtty config`: configuration management commands.

use std::path::{Path, PathBuf};

use tagtty_config::AppConfig;

use super::load_config;

fn resolve_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

pub fn validate(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match load_config(path) {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();
            if !config.has_api_key() {
                warnings.push("No API key set (set TAGTTY_API_KEY or OPENAI_API_KEY)");
            }
            if config.max_context_length == 0 {
                warnings.push("max_context_length is 0: prompts will carry no history");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Model:     {}", config.model);
            println!("   Format:    {:?}", config.effective_turn_format());
            println!("   Context:   {} words", config.max_context_length);
            println!("   Log:       {}", config.log_file.display());
        }
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e);
        }
    }

    Ok(())
}

pub fn show(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    for line in config.summary_lines() {
        println!("{line}");
    }
    Ok(())
}

pub fn path(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", resolve_path(path).display());
    Ok(())
}

pub fn init(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let target = resolve_path(path);
    if target.exists() {
        println!("Config already exists at {}", target.display());
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&target, AppConfig::default_toml())?;
    println!("✅ Wrote default config to {}", target.display());
    Ok(())
}
