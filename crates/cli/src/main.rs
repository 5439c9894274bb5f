mod config;
mod serve;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use slotlove_core::{DisabledSink, Locks, SpinRequest, Spinner};
use slotlove_storage::JsonFileStore;

use crate::config::{Overrides, Settings};

/// SlotLove card spinner.
#[derive(Parser)]
#[command(name = "slotlove", version, about = "SlotLove card spinner")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Port to listen on [default: 8000]
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding options.json, scores.json and mapping.json
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory holding index.html and static assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Draw one combination and print it as JSON
    Spin {
        /// Directory holding options.json, scores.json and mapping.json
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Difficulty level; its last character selects the energy cards
        #[arg(long, default_value = "")]
        level: String,
        /// Lock a category to a code (repeatable)
        #[arg(long = "lock", value_name = "CATEGORY=CODE", value_parser = parse_lock)]
        locks: Vec<(String, String)>,
        /// Also draw the participants card instead of using pair mode
        #[arg(long)]
        spin_part: bool,
    },
}

fn parse_lock(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((category, code)) if !category.is_empty() => {
            Ok((category.to_string(), code.to_string()))
        }
        _ => Err(format!("expected CATEGORY=CODE, got '{}'", raw)),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            data_dir,
            static_dir,
        } => cmd_serve(
            cli.config,
            Overrides {
                port,
                data_dir,
                static_dir,
            },
        ),
        Commands::Spin {
            data_dir,
            level,
            locks,
            spin_part,
        } => cmd_spin(
            cli.config,
            data_dir,
            SpinRequest {
                locked: locks.into_iter().collect::<Locks>(),
                level,
                spin_participants: spin_part,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("failed to create tokio runtime: {}", e))
}

fn cmd_serve(config: Option<PathBuf>, overrides: Overrides) -> Result<(), String> {
    let settings = Settings::load(config.as_deref(), overrides)?;
    let rt = runtime()?;
    rt.block_on(serve::start_server(settings))
        .map_err(|e| format!("server error: {}", e))
}

/// Offline spin: never notifies, never writes.
fn cmd_spin(
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    request: SpinRequest,
) -> Result<(), String> {
    let settings = Settings::load(
        config.as_deref(),
        Overrides {
            data_dir,
            ..Overrides::default()
        },
    )?;

    let spinner = Spinner::new(JsonFileStore::new(&settings.data_dir), Arc::new(DisabledSink));
    let rt = runtime()?;
    let outcome = rt.block_on(spinner.spin(request));

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| format!("could not serialize result: {}", e))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_parser_splits_on_first_equals() {
        assert_eq!(
            parse_lock("azione=a=1").unwrap(),
            ("azione".to_string(), "a=1".to_string())
        );
        assert!(parse_lock("azione").is_err());
        assert!(parse_lock("=a1").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
