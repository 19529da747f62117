//! JSON-lines request handling.
//!
//! Each input line is either a command or a host event:
//!
//! ```text
//! {"command": "set_brightness", "params": {"brightness": 8}}
//! {"event": "parameters.time.sunset"}
//! ```
//!
//! Each line gets exactly one response line: `{"ok": true, "result": ...}` or
//! `{"ok": false, "error": "..."}`.

use anyhow::{Result, bail};
use fourletter_core::{
    CELL_COUNT, ClockTime, ControllerError, FourLetterController, HardwarePolicy, HostEvent, params,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::{BufRead, Write};

/// One decoded input line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Request {
    Command {
        command: String,
        #[serde(default)]
        params: Value,
    },
    Event {
        event: String,
        #[serde(default)]
        params: Value,
    },
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: (!result.is_null()).then_some(result),
            error: None,
        }
    }

    fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

fn indicators(params: &Value) -> Result<[bool; CELL_COUNT], ControllerError> {
    let invalid = || ControllerError::InvalidParameter {
        name: "indicators",
        message: format!("Parameter \"indicators\" must be {} booleans", CELL_COUNT),
    };
    let values = match params.get("indicators") {
        None | Some(Value::Null) => return Err(ControllerError::MissingParameter("indicators")),
        Some(value) => value.as_array().ok_or_else(invalid)?,
    };
    if values.len() != CELL_COUNT {
        return Err(invalid());
    }
    let mut out = [false; CELL_COUNT];
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = value.as_bool().ok_or_else(invalid)?;
    }
    Ok(out)
}

fn module_config(controller: &FourLetterController) -> Value {
    let state = controller.state();
    json!({
        "brightness": state.brightness.value(),
        "nightmode": state.night_mode,
        "nightbrightness": state.night_brightness.value(),
        "night": state.is_night_state(),
        "indicators": state.indicators,
        "installed": controller.is_installed(),
    })
}

/// Run one command against the controller.
pub fn execute_command(
    controller: &mut FourLetterController,
    name: &str,
    params: &Value,
) -> Result<Value> {
    match name {
        "set_brightness" => {
            controller.set_brightness(params::brightness(params, "brightness")?)?;
        }
        "set_night_mode_brightness" => {
            controller.set_night_brightness(params::brightness(params, "brightness")?)?;
        }
        "enable_night_mode" => {
            controller.enable_night_mode(params::boolean(params, "enable")?)?;
        }
        "display_message" => {
            controller.display_message(&params::string(params, "message")?)?;
        }
        "set_indicator" => {
            let cell = params::integer(params, "cell")?;
            let on = params::boolean(params, "on")?;
            controller.set_indicator(usize::try_from(cell).unwrap_or(usize::MAX), on)?;
        }
        "set_indicators" => {
            controller.set_indicators(indicators(params)?)?;
        }
        "clear" => controller.clear()?,
        "get_module_config" => return Ok(module_config(controller)),
        "is_installed" => return Ok(Value::Bool(controller.is_installed())),
        "install" => controller.install()?,
        "uninstall" => controller.uninstall(),
        _ => bail!("Unknown command \"{}\"", name),
    }
    Ok(Value::Null)
}

/// Answer one request.
pub fn dispatch(controller: &mut FourLetterController, request: &Request) -> Response {
    let result = match request {
        Request::Command { command, params } => execute_command(controller, command, params),
        Request::Event { event, params } => match HostEvent::parse(event, params) {
            Ok(Some(parsed)) => controller
                .handle_event(&parsed)
                .map(|_| Value::Null)
                .map_err(Into::into),
            Ok(None) => {
                debug!("ignoring event {}", event);
                Ok(Value::Null)
            }
            Err(e) => Err(e.into()),
        },
    };
    match result {
        Ok(value) => Response::success(value),
        Err(e) => {
            warn!("request failed: {:#}", e);
            Response::failure(e)
        }
    }
}

/// Answer one raw input line.
pub fn handle_line(controller: &mut FourLetterController, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(controller, &request),
        Err(e) => Response::failure(format!("Invalid request: {}", e)),
    }
}

/// Serve requests until `input` is exhausted.
pub fn serve(
    controller: &mut FourLetterController,
    input: impl BufRead,
    mut output: impl Write,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(controller, &line);
        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }
    Ok(())
}

/// Start the display, serve `input`, then clear the display even if serving failed.
pub fn run_session(
    controller: &mut FourLetterController,
    now: ClockTime,
    input: impl BufRead,
    output: impl Write,
) -> Result<()> {
    controller.start(now, HardwarePolicy::IgnoreAbsent)?;
    let served = serve(controller, input, output);
    let stopped = controller.stop(HardwarePolicy::IgnoreAbsent);
    served?;
    stopped?;
    Ok(())
}
