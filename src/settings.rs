//! User settings persistence.
//!
//! Defaults for the export (output file, sheet name, column width cap) can be
//! kept in a JSON file so repeated runs do not need the same flags. Command
//! line arguments always take precedence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::convert::{DEFAULT_OUTPUT, DEFAULT_SHEET};
use crate::export::DEFAULT_MAX_COLUMN_WIDTH;

/// User settings that persist across runs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    /// Output spreadsheet path used when `--output` is not given
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Sheet name used when `--sheet` is not given
    #[serde(default = "default_sheet")]
    pub sheet: String,
    /// Upper bound for column widths, in characters
    #[serde(default = "default_max_column_width")]
    pub max_column_width: usize,
    /// Wrap text in every cell
    #[serde(default = "default_wrap_text")]
    pub wrap_text: bool,
}

fn default_version() -> u32 {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn default_sheet() -> String {
    DEFAULT_SHEET.to_string()
}

fn default_max_column_width() -> usize {
    DEFAULT_MAX_COLUMN_WIDTH
}

fn default_wrap_text() -> bool {
    true
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            output: default_output(),
            sheet: default_sheet(),
            max_column_width: default_max_column_width(),
            wrap_text: default_wrap_text(),
        }
    }
}

impl UserSettings {
    /// Get the config directory path for smilog
    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("smilog"))
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings file {:?}: {}", path, e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write settings file: {}", e))?;

        Ok(())
    }
}
