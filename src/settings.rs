//! Persisted user settings.

use crate::brightness::Brightness;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name the host uses for this module's settings.
pub const SETTINGS_FILE_NAME: &str = "fourletterdisplay.conf";

/// Error type for settings loading/saving.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON or holds an out-of-range value.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The settings store rejected the record.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// User settings, persisted across restarts.
///
/// Field names match the keys the host configuration page reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daytime brightness.
    pub brightness: Brightness,
    /// Night mode enabled.
    #[serde(rename = "nightmode")]
    pub night_mode: bool,
    /// Brightness applied at night when night mode is enabled.
    #[serde(rename = "nightbrightness")]
    pub night_brightness: Brightness,
    /// Last brightness successfully written to the display.
    #[serde(rename = "appliedbrightness", skip_serializing_if = "Option::is_none")]
    pub applied_brightness: Option<Brightness>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brightness: Brightness::MAX,
            night_mode: false,
            night_brightness: Brightness::NIGHT_DEFAULT,
            applied_brightness: None,
        }
    }
}

/// Storage backend for [`Settings`].
pub trait SettingsStore: Send {
    /// Load the stored settings, falling back to defaults when nothing is stored yet.
    fn load(&self) -> Result<Settings, SettingsError>;

    /// Persist the settings.
    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Use the settings file at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        if !self.path.exists() {
            debug!("no settings at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("conf.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}
