//! Hardware and file locations.

use crate::driver::DEFAULT_ADDRESS;
use crate::os::{DEFAULT_BOOT_CONFIG, DEFAULT_MODULES_FILE};
use crate::settings::{SETTINGS_FILE_NAME, SettingsError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the display lives and where its configuration is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// I2C bus device.
    pub i2c_bus: PathBuf,
    /// 7-bit I2C address of the display controller.
    pub address: u8,
    /// Boot configuration holding the `dtparam=i2c_arm` switch.
    pub boot_config: PathBuf,
    /// File listing kernel modules loaded at boot.
    pub modules_file: PathBuf,
    /// User settings file.
    pub settings_path: PathBuf,
    /// Delay between scroll steps, in milliseconds.
    pub scroll_delay_ms: u64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            i2c_bus: PathBuf::from("/dev/i2c-1"),
            address: DEFAULT_ADDRESS,
            boot_config: PathBuf::from(DEFAULT_BOOT_CONFIG),
            modules_file: PathBuf::from(DEFAULT_MODULES_FILE),
            settings_path: Path::new("/etc/fourletter").join(SETTINGS_FILE_NAME),
            scroll_delay_ms: 300,
        }
    }
}

impl HardwareConfig {
    /// Read a JSON config file. Absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Scroll delay as a [`Duration`].
    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}
