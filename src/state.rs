//! Controller state snapshot.

use crate::brightness::{Brightness, TimeOfDay, effective_brightness};

/// Number of character cells (and decimal-point indicators) on the display.
pub const CELL_COUNT: usize = 4;

/// A snapshot of the controller's current state.
///
/// Use [`FourLetterController::state`](crate::FourLetterController::state) to obtain a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayState {
    /// Configured daytime brightness.
    pub brightness: Brightness,
    /// Brightness used at night when night mode is enabled.
    pub night_brightness: Brightness,
    /// Whether night mode is enabled.
    pub night_mode: bool,
    /// Last reported time of day.
    pub time_of_day: TimeOfDay,
    /// Decimal-point indicator per cell, left to right.
    pub indicators: [bool; CELL_COUNT],
}

impl DisplayState {
    /// The brightness the hardware should show for this state.
    pub fn effective_brightness(&self) -> Brightness {
        effective_brightness(
            self.brightness,
            self.night_brightness,
            self.night_mode,
            self.time_of_day,
        )
    }

    /// Night mode is enabled and it is currently night.
    pub fn is_night_state(&self) -> bool {
        self.night_mode && self.time_of_day == TimeOfDay::Night
    }
}
