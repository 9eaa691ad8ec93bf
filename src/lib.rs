pub mod client;
pub mod config;
pub mod creds;
pub mod error;
pub mod import;
pub mod load_config;
pub mod normalize;
pub mod pace;
pub mod parse;
pub mod progress;
pub mod resolve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use client::TrelloClient;
use creds::{CredentialStore, KEY_API_KEY, KEY_API_TOKEN};
use import::run_import;
use load_config::load_config;
use pace::WallClockPacer;
use parse::parse_rows;
use progress::{Counters, ImportStage, ProgressSink};

#[derive(Parser)]
#[clap(
    name = "trello-import",
    version,
    about = "Batch-import CSV/JSON records as Trello lists, labels and cards"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an import against the board named in the config file
    Import {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Input file (CSV or JSON); overrides `input` from the config
        #[clap(long)]
        file: Option<PathBuf>,
        /// Alternate Trello API endpoint
        #[clap(long)]
        base_url: Option<String>,
        /// Alternate credential store location
        #[clap(long)]
        creds_file: Option<PathBuf>,
    },
    /// Store API credentials (an empty value clears the key)
    Auth {
        #[clap(long)]
        key: String,
        #[clap(long)]
        token: String,
        /// Alternate credential store location
        #[clap(long)]
        creds_file: Option<PathBuf>,
    },
    /// Report whether credentials are configured
    Status {
        /// Alternate credential store location
        #[clap(long)]
        creds_file: Option<PathBuf>,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import {
            config,
            file,
            base_url,
            creds_file,
        } => {
            let store = open_store(creds_file)?;
            let run_config = load_config(&config, &store)?;

            let input = file
                .or_else(|| run_config.options.input.clone())
                .context("no input file: pass --file or set `input` in the config")?;

            println!("Import starting...");
            let rows = parse_rows(&input)?;

            let api = match base_url {
                Some(url) => TrelloClient::with_base_url(url, run_config.credentials),
                None => TrelloClient::new(run_config.credentials),
            };
            let report = run_import(
                &api,
                &WallClockPacer,
                &ConsoleSink,
                &run_config.options.board_id,
                &run_config.options.policy,
                &rows,
            )
            .await?;

            println!("Import complete.\nReport:");
            println!("{report:#?}");
            Ok(())
        }
        Commands::Auth {
            key,
            token,
            creds_file,
        } => {
            let store = open_store(creds_file)?;
            store.set(KEY_API_KEY, non_empty(&key))?;
            store.set(KEY_API_TOKEN, non_empty(&token))?;
            match store.credentials()? {
                Some(_) => println!("Credentials saved"),
                None => println!("Not authorized"),
            }
            Ok(())
        }
        Commands::Status { creds_file } => {
            let store = open_store(creds_file)?;
            let authorized = store.credentials()?.is_some();
            println!("authorized: {authorized}");
            Ok(())
        }
    }
}

fn open_store(path: Option<PathBuf>) -> Result<CredentialStore> {
    let path = match path {
        Some(p) => p,
        None => CredentialStore::default_path()?,
    };
    Ok(CredentialStore::new(path))
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Presentation sink for the CLI: stage changes and log lines go to stdout,
/// mirroring the progress/log panes of the original UI.
struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_stage(&self, stage: ImportStage, counters: &Counters) {
        match stage {
            ImportStage::CreatingCards => {
                println!("Creating cards... ({} created)", counters.created)
            }
            _ => println!(
                "[{stage}] created={} skipped={} failed={}",
                counters.created, counters.skipped, counters.failed
            ),
        }
    }

    fn on_log(&self, message: &str) {
        println!("{message}");
    }
}
