pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedwatch")]
#[command(about = "Watch RSS/Atom feeds for items matching your triggers", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/feedwatch/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Number of parallel workers for fetching feeds
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a trigger file and list its active triggers
    Check {
        /// Trigger file (default: from config)
        #[arg(short, long)]
        triggers: Option<PathBuf>,
    },
    /// Fetch once and print matching items
    Filter {
        /// Trigger file (default: from config)
        #[arg(short, long)]
        triggers: Option<PathBuf>,

        /// Print matches as JSON lines
        #[arg(long)]
        json: bool,

        /// Feed URLs or local feed files (default: feeds from config)
        sources: Vec<String>,
    },
    /// Poll feeds and print new matches as they appear
    Watch {
        /// Trigger file (default: from config)
        #[arg(short, long)]
        triggers: Option<PathBuf>,

        /// Poll interval (e.g., "30s", "2m", "1h")
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip the poll on start
        #[arg(long)]
        no_initial_poll: bool,
    },
    /// Poll feeds and show matches in a terminal UI
    Tui {
        /// Trigger file (default: from config)
        #[arg(short, long)]
        triggers: Option<PathBuf>,

        /// Poll interval (e.g., "30s", "2m", "1h")
        #[arg(short, long)]
        interval: Option<String>,
    },
}

impl Commands {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Commands::Tui { .. })
    }
}
