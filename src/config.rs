//! Persistent user settings.

use dirs_next as dirs;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

fn default_plan_gap_months() -> u32 {
    2
}

/// Settings stored as JSON in the platform config directory.
///
/// Every field has a serde default so configuration files written by older
/// versions, or edited by hand, still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Months without a workout after which a routine starts a new plan.
    #[serde(default = "default_plan_gap_months")]
    pub plan_gap_months: u32,
    #[serde(default)]
    pub last_file: Option<String>,
    /// Where to write chart projections of every plan after an import.
    #[serde(default)]
    pub export_json: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            plan_gap_months: default_plan_gap_months(),
            last_file: None,
            export_json: None,
        }
    }
}

impl Settings {
    const FILE: &'static str = "strong_progress_settings.json";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    /// Load settings from the configuration file, falling back to defaults.
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(p).ok())
            .unwrap_or_default()
    }

    /// Persist the settings, ignoring failures.
    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
