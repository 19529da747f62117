//! Events pushed by the host application.

use crate::error::ControllerError;
use crate::params;
use serde_json::Value;
use std::fmt;

/// A wall-clock time as reported by the host's time tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Create a clock time.
    ///
    /// # Errors
    /// Returns an error if hour > 23 or minute > 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ControllerError> {
        if hour > 23 {
            return Err(ControllerError::InvalidParameter {
                name: "hour",
                message: "Parameter \"hour\" must be between 0..23".to_string(),
            });
        }
        if minute > 59 {
            return Err(ControllerError::InvalidParameter {
                name: "minute",
                message: "Parameter \"minute\" must be between 0..59".to_string(),
            });
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    /// Hour of day (0-23).
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute (0-59).
    pub fn minute(&self) -> u8 {
        self.minute
    }
}

/// Four digits, `HHMM`, for the display.
impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour, self.minute)
    }
}

/// Host notifications the controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// The sun rose.
    Sunrise,
    /// The sun set.
    Sunset,
    /// Periodic current-time tick.
    TimeNow(ClockTime),
    /// Render request carrying a message.
    DisplayMessage(String),
    /// Number of alarms currently active.
    AlarmCount(u32),
}

impl HostEvent {
    /// Build an event from its bus name and parameters.
    ///
    /// Names are matched by suffix (`parameters.time.sunset` is a sunset). Returns `Ok(None)`
    /// for events this module does not handle.
    pub fn parse(name: &str, params: &Value) -> Result<Option<Self>, ControllerError> {
        let event = if name.ends_with("time.sunrise") {
            HostEvent::Sunrise
        } else if name.ends_with("time.sunset") {
            HostEvent::Sunset
        } else if name.ends_with("time.now") {
            let hour = params::integer(params, "hour")?;
            let minute = params::integer(params, "minute")?;
            let hour = u32::try_from(hour).unwrap_or(u32::MAX);
            let minute = u32::try_from(minute).unwrap_or(u32::MAX);
            HostEvent::TimeNow(ClockTime::new(hour, minute)?)
        } else if name.ends_with("display.message") {
            HostEvent::DisplayMessage(params::string(params, "message")?)
        } else if name.ends_with("alarm.count") {
            let count = params::integer(params, "count")?;
            HostEvent::AlarmCount(u32::try_from(count.max(0)).unwrap_or(u32::MAX))
        } else {
            return Ok(None);
        };
        Ok(Some(event))
    }
}
