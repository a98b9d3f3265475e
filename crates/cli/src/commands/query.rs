//! `tagtty query`: answer questions non-interactively.

use std::path::Path;

use tagtty_agent::parse_tagged_input;
use tagtty_config::AppConfig;

use super::{build_session, format_response};

/// Arguments of `tagtty query`.
#[derive(Debug, Clone, Default)]
pub struct QueryArgs {
    pub questions: Vec<String>,
    pub tag: Option<String>,
    pub additional_context: Option<String>,
    pub json: bool,
    pub no_log: bool,
    pub debug: bool,
}

pub async fn run(config: &AppConfig, args: QueryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (session, _log) = build_session(config, args.debug, !args.no_log)?;
    let additional_context = match &args.additional_context {
        Some(arg) => resolve_additional_context(arg)?,
        None => String::new(),
    };

    let mut results = Vec::with_capacity(args.questions.len());

    // In order: later questions see earlier answers through the log
    for raw in &args.questions {
        let (tag, question) = split_question(args.tag.as_deref(), raw);
        let exchange = session.ask(&tag, &question, &additional_context).await?;
        let response = format_response(&exchange.response, config.preserve_new_lines);

        if args.json {
            results.push(serde_json::json!({
                "question": exchange.question,
                "tag": exchange.tag,
                "response": response,
            }));
        } else {
            println!("{}: {}", config.your_name, exchange.question);
            println!("{}: {response}", config.gpt_name);
            println!();
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

/// The tag and question for one query. An explicit `--tag` wins over an
/// inline `[tag]` prefix.
fn split_question(explicit_tag: Option<&str>, raw: &str) -> (String, String) {
    match explicit_tag {
        Some(tag) => (normalize_tag(tag), raw.trim().to_string()),
        None => parse_tagged_input(raw),
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.split_whitespace()
        .map(|w| w.replace('|', ""))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Read `arg` as a file when it names one, otherwise use it as text.
fn resolve_additional_context(arg: &str) -> std::io::Result<String> {
    let path = Path::new(arg);
    if path.is_file() {
        std::fs::read_to_string(path)
    } else {
        Ok(arg.to_string())
    }
}
