//! Controller for four-character seven-segment displays driven by an HT16K33 over I2C.
//!
//! This crate shows text, the time and decimal-point indicators on a four-letter display,
//! and dims it automatically between sunset and sunrise when night mode is on.
//!
//! # Requirements
//!
//! - Linux with the I2C bus enabled (`dtparam=i2c_arm=on`)
//! - The `i2c-dev` kernel module loaded
//! - An HT16K33 backpack, by default at address `0x70` on `/dev/i2c-1`
//!
//! # Example
//!
//! ```no_run
//! use fourletter_core::{
//!     Brightness, ClockTime, FourLetterController, HardwareConfig, HardwarePolicy,
//! };
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut controller = FourLetterController::open(&HardwareConfig::default())?;
//!
//!     // Enable the bus and module if needed (takes effect after reboot)
//!     if !controller.is_installed() {
//!         controller.install()?;
//!     }
//!
//!     controller.start(ClockTime::new(21, 30)?, HardwarePolicy::IgnoreAbsent)?;
//!
//!     // Dim to 3/15 once the sun sets
//!     controller.set_night_brightness(Brightness::new(3)?)?;
//!     controller.enable_night_mode(true)?;
//!     controller.on_sunset()?;
//!
//!     controller.display_message("helo")?;
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Use [`MockOs`], [`MockConnector`] and [`MemoryStore`] to test code without hardware:
//!
//! ```
//! use fourletter_core::{
//!     FourLetterController, HardwareAdapter, MemoryStore, MockConnector, MockOs, DisplayOp,
//! };
//!
//! let connector = MockConnector::new();
//! let adapter = HardwareAdapter::new(
//!     Box::new(MockOs::new(true, true)),
//!     Box::new(connector.clone()),
//! );
//! let mut controller = FourLetterController::new(adapter, Box::new(MemoryStore::new())).unwrap();
//!
//! controller.display_message("helo").unwrap();
//! assert_eq!(connector.display().ops(), vec![DisplayOp::Print("helo".to_string())]);
//! ```

#![warn(missing_docs)]

mod adapter;
mod brightness;
mod config;
mod controller;
mod driver;
mod error;
mod event;
pub mod font;
mod mock;
mod os;
pub mod params;
mod settings;
mod state;

// Re-export public API
pub use adapter::{DeviceConnector, HardwareAdapter, I2C_DEV_MODULE, OsAdapter};
pub use brightness::{Brightness, TimeOfDay, effective_brightness};
pub use config::HardwareConfig;
pub use controller::{ALARM_CELL, FourLetterController, HardwarePolicy};
pub use driver::{DEFAULT_ADDRESS, Ht16k33, I2cConnector, SegmentDisplay};
pub use error::{ControllerError, DriverError};
pub use event::{ClockTime, HostEvent};
pub use mock::{DisplayOp, MemoryStore, MockConnector, MockDisplay, MockOs};
pub use os::{BootFiles, DEFAULT_BOOT_CONFIG, DEFAULT_MODULES_FILE};
pub use settings::{JsonFileStore, SETTINGS_FILE_NAME, Settings, SettingsError, SettingsStore};
pub use state::{CELL_COUNT, DisplayState};

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with(
        os: &MockOs,
        connector: &MockConnector,
        store: &MemoryStore,
    ) -> FourLetterController {
        let adapter = HardwareAdapter::new(Box::new(os.clone()), Box::new(connector.clone()));
        FourLetterController::new(adapter, Box::new(store.clone())).unwrap()
    }

    #[test]
    fn test_night_cycle() {
        let os = MockOs::new(true, true);
        let connector = MockConnector::new();
        let store = MemoryStore::new();
        let mut controller = controller_with(&os, &connector, &store);

        controller.set_brightness(Brightness::new(15).unwrap()).unwrap();
        controller
            .set_night_brightness(Brightness::new(4).unwrap())
            .unwrap();
        controller.enable_night_mode(true).unwrap();

        controller.on_sunset().unwrap();
        assert_eq!(controller.state().effective_brightness().value(), 4);
        controller.on_sunrise().unwrap();
        assert_eq!(controller.state().effective_brightness().value(), 15);

        assert_eq!(connector.display().brightness_writes(), vec![15, 15, 4, 15]);
    }

    #[test]
    fn test_settings_survive_restart() {
        let os = MockOs::new(true, true);
        let connector = MockConnector::new();
        let store = MemoryStore::new();

        let mut controller = controller_with(&os, &connector, &store);
        controller.set_brightness(Brightness::new(9).unwrap()).unwrap();
        controller.enable_night_mode(true).unwrap();
        drop(controller);

        let controller = controller_with(&os, &connector, &store);
        let state = controller.state();
        assert_eq!(state.brightness.value(), 9);
        assert!(state.night_mode);
        assert_eq!(state.night_brightness, Brightness::NIGHT_DEFAULT);
    }

    #[test]
    fn test_install_then_use() {
        let os = MockOs::new(false, false);
        let connector = MockConnector::new();
        let mut controller = controller_with(&os, &connector, &MemoryStore::new());

        assert!(!controller.is_installed());
        assert!(matches!(
            controller.display_message("helo"),
            Err(ControllerError::NotInstalled)
        ));

        controller.install().unwrap();
        assert!(controller.is_installed());
        assert_eq!(os.enabled_modules(), vec![I2C_DEV_MODULE.to_string()]);
        controller.display_message("helo").unwrap();
        assert_eq!(connector.connect_count(), 1);
    }

    #[test]
    fn test_host_events_drive_controller() {
        let os = MockOs::new(true, true);
        let connector = MockConnector::new();
        let mut controller = controller_with(&os, &connector, &MemoryStore::new());

        let params = serde_json::json!({ "hour": 6, "minute": 45 });
        let event = HostEvent::parse("parameters.time.now", &params)
            .unwrap()
            .unwrap();
        controller.handle_event(&event).unwrap();

        let ops = connector.display().ops();
        assert_eq!(ops, vec![DisplayOp::Print("06.45".to_string())]);
        assert_eq!(controller.state().indicators, [false; CELL_COUNT]);
    }
}
