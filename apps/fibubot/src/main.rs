//! fibubot
//!
//! Runs the bot against the real Tempus and chat platform APIs with a file
//! store, but reads chat and liveness events from stdin and prints outgoing
//! chat to stdout. See [`console`] for the line format.
//!
//! ```bash
//! cargo run --package fibubot -- --config fibubot.toml
//! ```

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fibu::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::console::{ConsoleFeed, ConsoleLine, ConsoleTransport};

#[derive(Debug, Parser)]
#[command(name = "fibubot", version, about = "Multi-channel chat bot for jump streamers")]
struct Cli {
    /// Configuration file; searched for in the working and user config dirs otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (`development`, `production` or a custom name).
    #[arg(short, long)]
    profile: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new().with_current_dir().with_user_config_dir();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    if let Some(profile) = &cli.profile {
        loader = loader.profile(profile);
    }
    let config = loader.load().context("failed to load configuration")?;

    let store = FileStore::from_config(&config.storage)
        .await
        .with_context(|| format!("failed to open store at {}", config.storage.data_dir.display()))?;

    let feed = Arc::new(ConsoleFeed::default());
    let runtime = BotRuntime::builder()
        .config(config)
        .store(Arc::new(store))
        .transport(Arc::new(ConsoleTransport))
        .liveness_feed(feed.clone())
        .build()?;

    let console = read_console(runtime.clone(), feed);
    runtime
        .run_until(async move {
            tokio::select! {
                _ = console => info!("End of input, shutting down"),
                _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
            }
        })
        .await?;

    Ok(())
}

async fn read_console(runtime: BotRuntime, feed: Arc<ConsoleFeed>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                return;
            }
        };

        match ConsoleLine::parse(&line) {
            Ok(ConsoleLine::Chat(message)) => {
                runtime.spawn_message(message);
            }
            Ok(ConsoleLine::Liveness { channel, is_live }) => feed.emit(&channel, is_live),
            Ok(ConsoleLine::Stats) => println!("{}", runtime.stats().await),
            Ok(ConsoleLine::Blank) => {}
            Err(e) => eprintln!("{e}"),
        }
    }
}
