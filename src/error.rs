//! Error types for the four-letter display controller.

use crate::settings::SettingsError;

/// Errors raised by the display driver itself (bus open or write failures).
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The I2C bus device could not be opened.
    #[error("Failed to open display bus: {0}")]
    Open(String),

    /// A bus transfer to the display failed.
    #[error("Display bus error: {0}")]
    Bus(String),
}

/// Errors that can occur when using the display controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A required command parameter was not supplied.
    #[error("Parameter \"{0}\" is missing")]
    MissingParameter(&'static str),

    /// A command parameter was supplied but rejected.
    #[error("{message}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// Human readable reason.
        message: String,
    },

    /// The I2C bus or the `i2c-dev` module is not enabled on this system.
    #[error("Four-letter display driver is not installed")]
    NotInstalled,

    /// The bus is enabled but the display could not be reached.
    #[error("Four-letter display does not seem connected. Please check hardware ({0})")]
    NotConnected(#[source] DriverError),

    /// Reading or writing persisted settings failed.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl ControllerError {
    /// Build the out-of-range error for a brightness parameter.
    pub(crate) fn brightness_out_of_range(name: &'static str) -> Self {
        ControllerError::InvalidParameter {
            name,
            message: format!("Parameter \"{}\" must be between 0..15", name),
        }
    }

    /// Whether this error means the hardware is absent (not installed or not reachable).
    pub fn is_hardware_absent(&self) -> bool {
        matches!(
            self,
            ControllerError::NotInstalled | ControllerError::NotConnected(_)
        )
    }
}
