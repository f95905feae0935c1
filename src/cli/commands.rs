//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// calldeck connector CLI
#[derive(Parser, Debug)]
#[command(name = "calldeck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Connector definition: a built-in name (aircall, modjo) or a YAML path
    #[arg(short = 'n', long, global = true)]
    pub connector: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// State file (JSON), read at start and updated at every checkpoint
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the API
    Check {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Discover available streams
    Discover {
        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,
    },

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Inline config JSON
        #[arg(long)]
        config_json: Option<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,

        /// Only emit the terminal checkpoint, not one per page
        #[arg(long)]
        final_state_only: bool,
    },

    /// Show connector specification
    Spec,

    /// Validate a connector definition
    Validate,

    /// List built-in connectors
    List,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
