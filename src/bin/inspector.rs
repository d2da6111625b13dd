//! Terminal front end for the transaction inspector
//!
//! Reads one serialized transaction per line from stdin, as the capturing
//! backend pushes them, and prints each record as it enters the store.
//! Lines starting with `:` are user commands:
//!
//! - `:select <id>` activates a transaction and prints its processed view
//! - `:replay` asks the backend to replay the active transaction
//! - `:list` prints every transaction, newest first
//!
//! # Options
//!
//! - `--config <file>`: inspector settings as JSON
//! - `--batch <file>`: initial batch of transactions to load at startup
//! - `--replay-base <url>`: backend base URL, overrides the config file
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use chrono::Utc;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use txn_inspector::config::{load_config_file, InspectorConfig};
use txn_inspector::formatter::metadata::{format_relative_time, format_timestamp};
use txn_inspector::models::MessageRecord;
use txn_inspector::replay::ReplayClient;
use txn_inspector::store::{EventOutcome, Inspector, InspectorEvent, TransactionStore};
use txn_inspector::{FormatOptions, TransactionRecord};

const EVENT_QUEUE_SIZE: usize = 64;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    batch: Option<PathBuf>,
    replay_base: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .ok_or_else(|| format!("Missing value for {}", flag))
        };
        match flag.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--batch" => args.batch = Some(PathBuf::from(value()?)),
            "--replay-base" => args.replay_base = Some(value()?),
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn load_settings(args: &Args) -> Result<InspectorConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => InspectorConfig::default(),
    };
    if let Some(base) = &args.replay_base {
        config.replay_base_url = base.clone();
        config.validate()?;
    }
    Ok(config)
}

/// One line of input.
#[derive(Debug, PartialEq)]
enum Input {
    Event(InspectorEvent),
    List,
}

fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let event = match line.strip_prefix(':') {
        Some("list") => return Some(Input::List),
        Some("replay") => InspectorEvent::Replay,
        Some(cmd) => InspectorEvent::Select(cmd.strip_prefix("select ")?.trim().to_string()),
        None => InspectorEvent::Message(line.to_string()),
    };
    Some(Input::Event(event))
}

fn print_message(label: &str, message: &MessageRecord) {
    println!("--- {} ---", label);
    match &message.raw_text {
        Some(text) => println!("{}", text),
        None => println!("{}", message.hex_dump.as_deref().unwrap_or("")),
    }
    if message.body.has_content {
        println!("--- {} body ({}) ---", label, message.body.syntax_class.as_str());
        println!("{}", message.body.text.as_str());
    }
    if let Some(err) = &message.body.error {
        println!("!!! {}", err);
    }
}

fn print_transaction(txn: &TransactionRecord) {
    println!("=== {} {} ===", txn.id, txn.summary());
    if let (Some(at), Some(ago)) = (
        format_timestamp(txn.start),
        format_relative_time(txn.start, Utc::now()),
    ) {
        println!("captured {} ({})", at, ago);
    }
    print_message("request", &txn.request);
    print_message("response", &txn.response);
}

fn print_list(store: &TransactionStore) {
    for txn in store.all() {
        let marker = if store.is_active(txn) { '*' } else { ' ' };
        println!("{} {} {}", marker, txn.id, txn.summary());
    }
}

async fn read_stdin(tx: mpsc::Sender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let _ = tx.send(Input::Event(InspectorEvent::Connected)).await;
    loop {
        let input = match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Some(input) => input,
                None => continue,
            },
            Ok(None) => {
                let closed = InspectorEvent::Disconnected("end of input".to_string());
                let _ = tx.send(Input::Event(closed)).await;
                return;
            }
            Err(e) => {
                let _ = tx.send(Input::Event(InspectorEvent::TransportError(e.to_string()))).await;
                return;
            }
        };
        if tx.send(input).await.is_err() {
            return;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: inspector [--config <file>] [--batch <file>] [--replay-base <url>]");
            return ExitCode::from(2);
        }
    };
    let config = match load_settings(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let client = match ReplayClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut inspector = Inspector::new(TransactionStore::new(FormatOptions::from(&config)));
    if let Some(path) = &args.batch {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                inspector
                    .store_mut()
                    .initialize_from_json(&json)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = loaded {
            error!("Failed to load batch {}: {}", path.display(), e);
        }
        print_list(inspector.store());
    }

    let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_SIZE);
    tokio::spawn(read_stdin(tx));

    loop {
        let input = tokio::select! {
            input = rx.recv() => match input {
                Some(input) => input,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };

        let event = match input {
            Input::Event(event) => event,
            Input::List => {
                print_list(inspector.store());
                continue;
            }
        };

        match inspector.handle(event) {
            EventOutcome::Inserted { id, activated } => {
                if let Some(txn) = inspector.store().get(&id) {
                    if activated {
                        print_transaction(txn);
                    } else {
                        println!("+ {} {}", txn.id, txn.summary());
                    }
                }
            }
            EventOutcome::Activated(_) => {
                if let Some(txn) = inspector.store().get_active() {
                    print_transaction(txn);
                }
            }
            EventOutcome::Replay(request) => {
                client.dispatch(request);
            }
            EventOutcome::Rejected(e) => error!("{}", e),
            EventOutcome::Ignored => {}
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  "), None);
        assert_eq!(parse_line(":list"), Some(Input::List));
        assert_eq!(
            parse_line(":replay"),
            Some(Input::Event(InspectorEvent::Replay))
        );
        assert_eq!(
            parse_line(":select  abc "),
            Some(Input::Event(InspectorEvent::Select("abc".to_string())))
        );
        assert_eq!(parse_line(":bogus"), None);
        assert_eq!(
            parse_line(r#"{"Id":"x"}"#),
            Some(Input::Event(InspectorEvent::Message(r#"{"Id":"x"}"#.to_string())))
        );
    }
}
