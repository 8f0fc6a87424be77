use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{
    Roster, DEFAULT_FIRST_NAMES, DEFAULT_PLACEHOLDER_ATTENDEES, DEFAULT_TECHNICIANS,
    UNASSIGNED,
};
use crate::detection::{Signature, SignatureRegistry};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub auto_accept_threshold: f64,
    pub confirm_threshold: f64,
    pub extra_signatures: Vec<Signature>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { auto_accept_threshold: 70.0, confirm_threshold: 40.0, extra_signatures: Vec::new() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub technicians: Vec<String>,
    pub placeholder_attendees: Vec<String>,
    pub unassigned_label: String,
    /// Bare first name (lowercase) to roster full name.
    pub first_names: BTreeMap<String, String>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            technicians: DEFAULT_TECHNICIANS.iter().map(|s| s.to_string()).collect(),
            placeholder_attendees: DEFAULT_PLACEHOLDER_ATTENDEES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            unassigned_label: UNASSIGNED.to_string(),
            first_names: DEFAULT_FIRST_NAMES
                .iter()
                .map(|(first, full)| (first.to_string(), full.to_string()))
                .collect(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Built-in signatures plus any configured extras.
    pub fn registry(&self) -> Result<SignatureRegistry> {
        SignatureRegistry::with_extra(self.detection.extra_signatures.clone())
            .context("Invalid signature configuration")
    }

    pub fn roster(&self) -> Roster {
        Roster::from_config(&self.calendar)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "ducktape", "ducktape-ingest")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
