//! Server binary: parse flags, load the deck, serve.

use std::path::PathBuf;

use clap::Parser;
use oddword::{GameServerBuilder, ServerError};
use oddword_game::{GameConfig, WordDeck};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "oddword-server", about = "Oddword game server")]
struct Args {
    /// Address to listen on (dual-stack by default).
    #[arg(long, default_value = "[::]:12345")]
    bind: String,

    /// Word pair file, one `majority,outlier` per line. Uses the
    /// built-in deck when omitted.
    #[arg(long)]
    words: Option<PathBuf>,

    /// Send explicit error messages for rejected commands instead of
    /// silently ignoring them.
    #[arg(long)]
    notify_rejections: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let deck = match &args.words {
        Some(path) => WordDeck::load(path)?,
        None => WordDeck::builtin(),
    };
    tracing::info!(pairs = deck.len(), "word deck loaded");

    let server = match GameServerBuilder::new()
        .bind(&args.bind)
        .deck(deck)
        .game_config(GameConfig {
            notify_rejections: args.notify_rejections,
        })
        .build()
        .await
    {
        Ok(server) => server,
        Err(e @ ServerError::Transport(_)) if e.is_bind_failure() => {
            // Address in use is a known operational condition: log it
            // and keep the process alive-but-idle semantics of the
            // original by exiting cleanly without serving.
            tracing::error!(error = %e, addr = %args.bind, "could not bind, not serving");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await?;
    Ok(())
}
