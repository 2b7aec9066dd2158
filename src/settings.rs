// Import necessary libraries and modules for file I/O and serialization.
use crate::error::AppError;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

// Define a structure to hold application settings with serialization and deserialization capabilities.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub data_dir: Option<PathBuf>, // Where characters and definitions are stored.
    pub log_level: String,
    pub edit_debounce_ms: u64, // Quiet period before an edited field is committed.
    pub language: String,
}

// Implement the Default trait for Settings to provide a method to create default settings.
impl Default for Settings {
    fn default() -> Self {
        Settings {
            data_dir: None,
            log_level: "info".to_string(),
            edit_debounce_ms: 300,
            language: "English".to_string(),
        }
    }
}

/// `~/charforge/data`, if a home directory can be found.
pub fn default_data_dir() -> Option<PathBuf> {
    dir::home_dir().map(|home| home.join("charforge").join("data"))
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    // Load settings from the default data directory.
    pub fn load() -> Result<Self, AppError> {
        let path = Self::default_path()?;
        Self::load_settings_from_file(&path)
    }

    // Save current settings to the default data directory.
    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::default_path()?;
        self.save_to_file(&path)
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    pub fn load_settings_from_file(path: &Path) -> Result<Self, AppError> {
        let data = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let settings = serde_json::from_str(&data)
            .map_err(|e| format!("Failed to parse {}: {e}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), AppError> {
        let data = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path).map_err(|e| e.to_string())?;
        file.write_all(data.as_bytes()).map_err(|e| e.to_string())?;
        Ok(())
    }

    fn default_path() -> Result<PathBuf, AppError> {
        default_data_dir()
            .map(|dir| dir.join(SETTINGS_FILE))
            .ok_or_else(|| AppError::Settings("No home directory".to_string()))
    }

    /// The configured data directory, else the default one.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(default_data_dir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.edit_debounce_ms)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
