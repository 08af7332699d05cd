//! CLI argument definitions using clap
//!
//! Commands:
//! - cardsync sync <FROM> <TO> [-r] [-i] [-m] [-d] [-u] [-a]
//! - cardsync card -s <TEXT> [-n <ID>]
//! - cardsync wiki [-a <TEXT>]

use cardsync_core::{CardId, SyncPlan};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flashcard export -> wiki page synchronizer
#[derive(Parser, Debug)]
#[command(name = "cardsync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log filter directives, e.g. `info` or `cardsync_core=debug`
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Path to a JSON settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync cards from one file to another
    Sync(SyncArgs),

    /// Print a card built from `front:back` text as JSON
    Card {
        /// Colon separated field text
        #[arg(short = 's', long)]
        text: String,

        /// Card id
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        id: Option<CardId>,
    },

    /// Read a wiki page on stdin and print it, optionally with a new card
    Wiki {
        /// Colon separated text of a card to add
        #[arg(short = 'a', long)]
        add: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// File to sync from (.txt or .html)
    pub from: PathBuf,

    /// File to sync to (.txt or .html)
    pub to: PathBuf,

    /// Report only, write nothing
    #[arg(short = 'r', long)]
    pub read_only: bool,

    /// Ignore existing ids in the 'from' file (use with caution)
    #[arg(short = 'i', long)]
    pub ignore_existing_ids: bool,

    /// Copy unmatched ided 'from' cards
    #[arg(short = 'm', long)]
    pub copy_unmatched: bool,

    /// Delete unmatched 'to' cards
    #[arg(short = 'd', long)]
    pub delete_extra: bool,

    /// Update matching cards
    #[arg(short = 'u', long)]
    pub update: bool,

    /// Id new 'from' cards and add them
    #[arg(short = 'a', long)]
    pub add_new: bool,
}

impl SyncArgs {
    pub fn plan(&self) -> SyncPlan {
        SyncPlan {
            ignore_existing_ids: self.ignore_existing_ids,
            copy_unmatched: self.copy_unmatched,
            delete_extra: self.delete_extra,
            update: self.update,
            add_new: self.add_new,
        }
    }
}
