pub mod app;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod detection;
pub mod encoding;
pub mod source;

use anyhow::Result;
use log::*;
use std::path::Path;

pub async fn run(cli: cli::Cli) -> Result<()> {
    let config = match cli.config.as_deref() {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    let app = app::Application::new(config)?;
    info!("Initializing DuckTape Ingest");
    app.run(cli.command).await
}

pub fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

/// Classify a CSV file with the built-in registry.
pub fn detect_csv_type(path: &Path) -> detection::DetectionResult {
    detection::detect_file(path, &detection::SignatureRegistry::default())
}

/// Extract calendar records with the built-in roster.
pub fn extract_calendar(path: &Path) -> calendar::CalendarBatchResult {
    calendar::parse_calendar_file(path, &calendar::Roster::default())
}

// Re-export commonly used types
pub use calendar::{CalendarBatchResult, CalendarRecord, ParseStatus, Roster};
pub use config::Config;
pub use detection::{DetectionResult, MatchDetail, Signature, SignatureRegistry};
