//! `tagtty chat`: interactive chat mode.

use std::io::Write;
use std::time::Duration;

use tagtty_agent::parse_tagged_input;
use tagtty_config::AppConfig;
use tagtty_core::log::LogReader;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{build_session, format_response, log::print_records};

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatCommand {
    Empty,
    Help,
    Quit,
    Configs,
    /// Show logged records, optionally for one tag.
    Context(Option<String>),
    Unknown(String),
    Question(String),
}

impl ChatCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Question(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match parts.next().unwrap_or_default() {
            "help" | "h" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "configs" => Self::Configs,
            "context" => {
                let tag: Vec<&str> = parts.collect();
                if tag.is_empty() {
                    Self::Context(None)
                } else {
                    Self::Context(Some(tag.join("-")))
                }
            }
            other => Self::Unknown(other.to_string()),
        }
    }
}

pub async fn run(config: &AppConfig, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (session, log) = build_session(config, debug, true)?;

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║            tagtty: interactive chat          ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Format:    {:?}", session.settings().turn_format);
    println!("  Context:   {} words", config.max_context_length);
    println!("  Log:       {}", log.path().display());
    println!();
    println!("  Prefix a question with [tag] to share context with earlier");
    println!("  questions under the same tag. Type :help for commands.");
    println!();

    let mut rx = spawn_stdin_reader();
    prompt(&config.your_name)?;

    while let Some(line) = rx.recv().await {
        match ChatCommand::parse(&line) {
            ChatCommand::Empty => println!("  Please enter a question, or :help for commands."),
            ChatCommand::Quit => break,
            ChatCommand::Help => print_help(),
            ChatCommand::Configs => {
                for line in config.summary_lines() {
                    println!("  {line}");
                }
            }
            ChatCommand::Context(tag) => match log.read_records() {
                Ok(snapshot) => print_records(&snapshot, tag.as_deref(), None),
                Err(e) => eprintln!("  [Error] {e}"),
            },
            ChatCommand::Unknown(command) => {
                println!("  Unknown command :{command}. Type :help for commands.")
            }
            ChatCommand::Question(text) => {
                let (tag, question) = parse_tagged_input(&text);
                if question.is_empty() {
                    println!("  Please enter a question after the tag.");
                } else {
                    let spinner = spawn_waiting_indicator();
                    let result = session.ask(&tag, &question, "").await;
                    spinner.abort();
                    let _ = spinner.await;
                    eprint!("\r     \r");

                    match result {
                        Ok(exchange) => {
                            println!();
                            let answer = format_response(&exchange.response, config.preserve_new_lines);
                            for line in answer.lines() {
                                println!("  {} > {line}", config.gpt_name);
                            }
                            println!();
                        }
                        Err(e) => {
                            eprintln!("  [Error] {e}");
                            println!();
                        }
                    }
                }
            }
        }

        prompt(&config.your_name)?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

fn prompt(name: &str) -> std::io::Result<()> {
    print!("  {name} > ");
    std::io::stdout().flush()
}

fn print_help() {
    println!("  :help              Show this help");
    println!("  :quit              Leave the chat");
    println!("  :configs           Show the current configuration");
    println!("  :context [tag]     Show logged exchanges, optionally for one tag");
    println!("  [tag] question     Ask with context shared by tag");
}

/// Read stdin lines on a background task. The channel closes on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    tracing::warn!("stdin read failed: {e}");
                    break;
                }
            }
        }
    });

    rx
}

/// Animate a waiting indicator on stderr until aborted.
fn spawn_waiting_indicator() -> JoinHandle<()> {
    tokio::spawn(async move {
        let frames = [".  ", ".. ", "..."];
        let mut ticker = tokio::time::interval(Duration::from_millis(250));
        for frame in frames.iter().cycle() {
            ticker.tick().await;
            eprint!("\r  {frame}");
        }
    })
}
