//! tagtty CLI, the main entry point.
//!
//! Commands:
//! - `chat`    Interactive chat; prefix a question with `[tag]` to share context
//! - `query`   Answer one or more questions and exit
//! - `log`     Print the conversation log
//! - `config`  Show, locate, validate or initialize the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tagtty",
    about = "tagtty: chat with OpenAI-compatible models, sharing context by tag",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.tagtty/config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat {
        /// Report how each prompt was assembled
        #[arg(long)]
        debug: bool,
    },

    /// Answer questions non-interactively
    Query {
        /// A question to ask (repeatable, answered in order)
        #[arg(short, long = "question", required = true)]
        questions: Vec<String>,

        /// Tag shared by every question
        #[arg(short, long)]
        tag: Option<String>,

        /// Extra context: a file path, or literal text
        #[arg(long)]
        additional_context: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Do not append answers to the conversation log
        #[arg(long)]
        no_log: bool,

        /// Report how each prompt was assembled
        #[arg(long)]
        debug: bool,
    },

    /// Print logged exchanges
    Log {
        /// Only show this tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Show at most this many (most recent) records
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration (API key redacted)
    Show,
    /// Print the config file path
    Path,
    /// Check the configuration for problems
    Validate,
    /// Write a default config file if none exists
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Chat owns stdout, so logs go to stderr and stay quiet by default
    let debug_report = matches!(
        cli.command,
        Commands::Chat { debug: true } | Commands::Query { debug: true, .. }
    );
    let filter = if cli.verbose {
        "debug"
    } else if debug_report {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Chat { debug } => {
            let config = commands::load_config(config_path)?;
            commands::chat::run(&config, debug).await?
        }
        Commands::Query {
            questions,
            tag,
            additional_context,
            json,
            no_log,
            debug,
        } => {
            let config = commands::load_config(config_path)?;
            let args = commands::query::QueryArgs {
                questions,
                tag,
                additional_context,
                json,
                no_log,
                debug,
            };
            commands::query::run(&config, args).await?
        }
        Commands::Log { tag, limit } => {
            let config = commands::load_config(config_path)?;
            commands::log::run(&config, tag.as_deref(), limit)?
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show(config_path)?,
            ConfigAction::Path => commands::config_cmd::path(config_path)?,
            ConfigAction::Validate => commands::config_cmd::validate(config_path)?,
            ConfigAction::Init => commands::config_cmd::init(config_path)?,
        },
    }

    Ok(())
}
