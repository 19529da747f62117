//! Brightness values and the night-mode brightness policy.

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A display brightness level (0-15, the 16 dimming steps of the display).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Brightness(u8);

impl Brightness {
    /// Highest dimming step.
    pub const MAX: Brightness = Brightness(15);

    /// Lowest dimming step. The display stays lit.
    pub const MIN: Brightness = Brightness(0);

    /// Default night-mode brightness.
    pub const NIGHT_DEFAULT: Brightness = Brightness(4);

    /// Create a new brightness level.
    ///
    /// # Errors
    /// Returns an error if value > 15.
    pub fn new(value: u8) -> Result<Self, ControllerError> {
        if value > Self::MAX.0 {
            return Err(ControllerError::brightness_out_of_range("brightness"));
        }
        Ok(Self(value))
    }

    /// The raw dimming step.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ControllerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for Brightness {
    type Error = ControllerError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ControllerError::brightness_out_of_range("brightness"))
            .and_then(Self::new)
    }
}

impl From<Brightness> for u8 {
    fn from(value: Brightness) -> Self {
        value.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/15", self.0)
    }
}

/// Whether the host last reported sunrise or sunset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOfDay {
    /// Between sunrise and sunset. Assumed until the host says otherwise.
    #[default]
    Day,
    /// Between sunset and sunrise.
    Night,
}

/// Pick the brightness that should be on the display right now.
///
/// The night value only wins when night mode is enabled and it is night.
pub fn effective_brightness(
    brightness: Brightness,
    night_brightness: Brightness,
    night_mode: bool,
    time_of_day: TimeOfDay,
) -> Brightness {
    match (night_mode, time_of_day) {
        (true, TimeOfDay::Night) => night_brightness,
        _ => brightness,
    }
}
