//! Validation of loosely typed command and event parameters.
//!
//! Hosts hand parameters over as JSON objects. These helpers turn a missing or `null`
//! entry into [`ControllerError::MissingParameter`] and a mistyped one into
//! [`ControllerError::InvalidParameter`].

use crate::brightness::Brightness;
use crate::error::ControllerError;
use serde_json::Value;

fn required<'a>(params: &'a Value, name: &'static str) -> Result<&'a Value, ControllerError> {
    match params.get(name) {
        None | Some(Value::Null) => Err(ControllerError::MissingParameter(name)),
        Some(value) => Ok(value),
    }
}

fn invalid(name: &'static str, value: &Value) -> ControllerError {
    let specified = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    ControllerError::InvalidParameter {
        name,
        message: format!("Parameter \"{}\" is invalid (specified=\"{}\")", name, specified),
    }
}

/// A required boolean.
pub fn boolean(params: &Value, name: &'static str) -> Result<bool, ControllerError> {
    let value = required(params, name)?;
    value.as_bool().ok_or_else(|| invalid(name, value))
}

/// A required integer.
pub fn integer(params: &Value, name: &'static str) -> Result<i64, ControllerError> {
    let value = required(params, name)?;
    value.as_i64().ok_or_else(|| invalid(name, value))
}

/// A required string.
pub fn string(params: &Value, name: &'static str) -> Result<String, ControllerError> {
    let value = required(params, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(name, value))
}

/// A required brightness. Non-integers and out-of-range values get the range message.
pub fn brightness(params: &Value, name: &'static str) -> Result<Brightness, ControllerError> {
    let value = required(params, name)?;
    value
        .as_i64()
        .ok_or_else(|| ControllerError::brightness_out_of_range(name))
        .and_then(|v| {
            Brightness::try_from(v).map_err(|_| ControllerError::brightness_out_of_range(name))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null() {
        let err = boolean(&json!({}), "enable").unwrap_err();
        assert_eq!(err.to_string(), "Parameter \"enable\" is missing");

        let err = boolean(&json!({ "enable": null }), "enable").unwrap_err();
        assert!(matches!(err, ControllerError::MissingParameter("enable")));
    }

    #[test]
    fn test_invalid_boolean() {
        let err = boolean(&json!({ "enable": "test" }), "enable").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter \"enable\" is invalid (specified=\"test\")"
        );
    }

    #[test]
    fn test_brightness_messages() {
        assert_eq!(
            brightness(&json!({ "brightness": 12 }), "brightness")
                .unwrap()
                .value(),
            12
        );
        for bad in [json!("helo"), json!(20), json!(-1), json!(2.5)] {
            let err = brightness(&json!({ "brightness": bad }), "brightness").unwrap_err();
            assert_eq!(
                err.to_string(),
                "Parameter \"brightness\" must be between 0..15"
            );
        }
        let err = brightness(&json!({}), "brightness").unwrap_err();
        assert_eq!(err.to_string(), "Parameter \"brightness\" is missing");
    }

    #[test]
    fn test_integer_and_string() {
        let params = json!({ "hour": 7, "message": "helo" });
        assert_eq!(integer(&params, "hour").unwrap(), 7);
        assert_eq!(string(&params, "message").unwrap(), "helo");
        assert!(integer(&json!({ "hour": "7" }), "hour").is_err());
        assert!(string(&json!({ "message": 3 }), "message").is_err());
    }
}
