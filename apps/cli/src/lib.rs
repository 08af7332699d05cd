//! Command line driver for cardsync.

pub mod args;
pub mod commands;

pub use args::{Cli, Command, SyncArgs};

use anyhow::Context;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level '{}'", cli.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Sync(args) => {
            let report = commands::sync(&args, &settings)?;
            serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
            println!();
        }
        Command::Card { text, id } => commands::card(&text, id, io::stdout().lock())?,
        Command::Wiki { add } => {
            commands::wiki(io::stdin().lock(), add.as_deref(), &settings, io::stdout().lock())?
        }
    }
    Ok(())
}
