use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DuckTape Ingest - classify CSV exports and extract calendar events
#[derive(Debug, Parser)]
#[command(name = "ducktape-ingest")]
#[command(about = "Classify CSV exports and extract calendar events", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to the per-user config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Detect the type of one or more CSV files from their header
    #[command(alias = "classify")]
    Detect {
        /// CSV files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the full detection results as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the supported CSV types and their columns
    #[command(alias = "list")]
    Types,

    /// Extract events from a calendar export
    #[command(alias = "ics")]
    Calendar {
        /// Calendar file
        #[arg(required = true)]
        file: PathBuf,

        /// Print the batch result as JSON
        #[arg(long)]
        json: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Show configuration
    #[command(aliases = ["list", "get"])]
    Show,
}
