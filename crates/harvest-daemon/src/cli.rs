//! Command line interface

use clap::{Parser, Subcommand};

/// Poll channels, rebuild multi-message posts, keep those with media.
#[derive(Parser, Debug)]
#[command(name = "harvest-daemon")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll forever and sweep expired posts until Ctrl-C / SIGTERM (default)
    Run,
    /// Run a single polling cycle over every configured channel
    PollOnce,
    /// Run one retention sweep
    Sweep,
    /// Show cursors, recent posts, and media statistics
    Inspect {
        /// How many recent posts to list
        #[arg(long, default_value_t = 5)]
        recent: i64,
    },
    /// Delete every stored post
    Purge {
        /// Also forget channel cursors, so every channel starts over
        #[arg(long)]
        cursors: bool,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::PollOnce => "poll-once",
            Self::Sweep => "sweep",
            Self::Inspect { .. } => "inspect",
            Self::Purge { .. } => "purge",
        }
    }
}
