use crate::calendar::{parse_calendar_file, CalendarBatchResult, ParseStatus, Roster};
use crate::cli::{Commands, ConfigActions};
use crate::config::Config;
use crate::detection::{detect_file, ConfidenceBand, DetectionResult, SignatureRegistry};
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Application {
    config: Config,
    registry: Arc<SignatureRegistry>,
    roster: Roster,
}

impl Application {
    pub fn new(config: Config) -> Result<Self> {
        let registry = Arc::new(config.registry()?);
        let roster = config.roster();
        log::debug!("Loaded {} signatures", registry.len());
        Ok(Self { config, registry, roster })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Detect { files, json } => {
                let results = self.detect_files(files).await?;
                if json {
                    let values: Vec<&DetectionResult> = results.iter().map(|(_, r)| r).collect();
                    println!("{}", serde_json::to_string_pretty(&values)?);
                } else {
                    for (path, result) in &results {
                        self.print_detection(path, result);
                    }
                }
                Ok(())
            }
            Commands::Types => {
                self.print_types();
                Ok(())
            }
            Commands::Calendar { file, json } => {
                let batch = parse_calendar_file(&file, &self.roster);
                if json {
                    println!("{}", serde_json::to_string_pretty(&batch)?);
                } else {
                    print_batch(&batch);
                }
                match batch.parse_status {
                    ParseStatus::Ok => Ok(()),
                    _ => Err(anyhow!(batch.error.unwrap_or_else(|| "Calendar not parsed".into()))),
                }
            }
            Commands::Config { action: ConfigActions::Show } => {
                println!("{}", toml::to_string_pretty(&self.config)?);
                Ok(())
            }
        }
    }

    /// Classify files concurrently, one blocking task per file. Results keep
    /// the order of `files`.
    pub async fn detect_files(&self, files: Vec<PathBuf>) -> Result<Vec<(PathBuf, DetectionResult)>> {
        let handles: Vec<_> = files
            .into_iter()
            .map(|path| {
                let registry = Arc::clone(&self.registry);
                tokio::task::spawn_blocking(move || {
                    let result = detect_file(&path, &registry);
                    (path, result)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await.context("Detection task failed")?);
        }
        Ok(results)
    }

    fn print_detection(&self, path: &std::path::Path, result: &DetectionResult) {
        println!("\n📄 {}", path.display());

        if !result.success {
            println!("  ❌ {}", result.error.as_deref().unwrap_or("No matching type"));
            return;
        }

        let band = result.band(&self.config.detection);
        let icon = match band {
            ConfidenceBand::AutoAccept => "✅",
            ConfidenceBand::NeedsConfirmation => "⚠️ ",
            ConfidenceBand::ManualMapping => "❌",
        };

        println!(
            "  {} {} ({:.1}%, {})",
            icon,
            result.detected_type.as_deref().unwrap_or_default(),
            result.confidence,
            band.label()
        );
        if let Some(description) = &result.description {
            println!("  Description: {}", description);
        }
        println!(
            "  Encoding: {}  Delimiter: {:?}",
            result.encoding,
            result.delimiter.unwrap_or(',')
        );

        if let Some(detail) = &result.match_detail {
            if !detail.unmatched_required.is_empty() {
                println!("  Missing required: {}", detail.unmatched_required.join(", "));
            }
            if !detail.extra_columns.is_empty() {
                println!("  Extra columns: {}", detail.extra_columns.join(", "));
            }
        }

        for score in result.scores.iter().skip(1) {
            println!("    also {} ({:.1}%)", score.type_id, score.confidence);
        }
    }

    fn print_types(&self) {
        println!("Supported CSV types:");
        for info in self.registry.supported_types() {
            println!("\n  {} - {}", info.type_id, info.description);
            println!("    Required: {}", info.required_columns.join(", "));
            if !info.optional_columns.is_empty() {
                println!("    Optional: {}", info.optional_columns.join(", "));
            }
        }
    }
}

fn print_batch(batch: &CalendarBatchResult) {
    if batch.parse_status != ParseStatus::Ok {
        println!("❌ {}", batch.error.as_deref().unwrap_or("Calendar not parsed"));
        return;
    }

    println!("📅 {} events", batch.records.len());
    for record in &batch.records {
        let when = record
            .start
            .map(|s| match s.display_time() {
                Some(time) => format!("{} {}", s.display_date(), time),
                None => s.display_date(),
            })
            .unwrap_or_else(|| "unknown date".to_string());

        let length = match (record.duration, record.duration_unit) {
            (Some(d), Some(unit)) => format!("{:.2} {:?}", d, unit).to_lowercase(),
            _ => "-".to_string(),
        };

        println!(
            "  {} | {} | {} | {} | {}",
            when, record.responsible_party, record.counterpart, length, record.notes
        );
    }

    println!("\nTotal hours: {:.2}", batch.total_hours);
    println!("Total days: {:.0}", batch.total_days);
    println!("People: {}", batch.distinct_responsible_parties.len());
    println!("Counterparts: {}", batch.distinct_counterparts.len());
    println!("Locations: {}", batch.distinct_locations.len());
}
