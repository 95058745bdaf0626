//! Action grammar shared by the command line and any other front end:
//! `get`, `set <0-100>`, `+<n>`, `-<n>`, `off`, `on`, `max`, `min`, `serve`.

use crate::brightness::BrightnessPolicy;
use crate::error::{Result, TouchlightError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Get,
    Set(f64),
    Increase(f64),
    Decrease(f64),
    Off,
    On,
    Max,
    Min,
    /// Run the long-lived wake service
    Serve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Action {
    /// Parse an action word plus its optional value; no action means `get`
    pub fn parse(action: Option<&str>, value: Option<&str>) -> Result<Self> {
        let Some(action) = action else {
            return Ok(Action::Get);
        };
        let action = action.trim().to_lowercase();

        let parsed = match action.as_str() {
            "get" => Action::Get,
            "set" => {
                let value = value.ok_or_else(|| {
                    TouchlightError::Usage("'set' requires a value (0-100)".to_string())
                })?;
                Action::Set(parse_percent(value)?)
            }
            "off" => Action::Off,
            "on" => Action::On,
            "max" => Action::Max,
            "min" => Action::Min,
            "serve" => Action::Serve,
            _ => {
                if let Some(delta) = action.strip_prefix('+') {
                    Action::Increase(parse_percent(delta)?)
                } else if let Some(delta) = action.strip_prefix('-') {
                    Action::Decrease(parse_percent(delta)?)
                } else {
                    return Err(TouchlightError::Usage(format!(
                        "Unknown action '{}'",
                        action
                    )));
                }
            }
        };

        if value.is_some() && !matches!(parsed, Action::Set(_)) {
            return Err(TouchlightError::Usage(format!(
                "'{}' does not take a value",
                action
            )));
        }
        Ok(parsed)
    }
}

fn parse_percent(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TouchlightError::invalid_range(value, 0, 100))
}

/// Run `action` against the policy and render the message printed on success
pub fn execute(policy: &BrightnessPolicy, action: Action, format: OutputFormat) -> Result<String> {
    let (status, message) = match action {
        Action::Get => {
            let status = policy.get()?;
            (status, status.to_string())
        }
        Action::Set(percent) => {
            let percent = percent.clamp(0.0, 100.0);
            let status = policy.set_percentage(percent)?;
            (status, format!("Brightness set to {}%", percent))
        }
        Action::Increase(delta) => {
            let adjustment = policy.adjust_percentage(delta)?;
            (
                adjustment.status,
                format!("Brightness increased to {}%", adjustment.requested),
            )
        }
        Action::Decrease(delta) => {
            let adjustment = policy.adjust_percentage(-delta)?;
            (
                adjustment.status,
                format!("Brightness decreased to {}%", adjustment.requested),
            )
        }
        Action::Off => (policy.turn_off()?, "Backlight turned off".to_string()),
        Action::On => (policy.turn_on()?, "Backlight turned on".to_string()),
        Action::Max => (
            policy.set_max()?,
            "Brightness set to maximum (100%)".to_string(),
        ),
        Action::Min => (
            policy.set_min()?,
            "Brightness set to minimum (1%)".to_string(),
        ),
        Action::Serve => {
            return Err(TouchlightError::Usage(
                "'serve' runs the wake service and cannot be executed as a one-shot action"
                    .to_string(),
            ))
        }
    };

    match format {
        OutputFormat::Text => Ok(message),
        OutputFormat::Json => serde_json::to_string(&status)
            .map_err(|e| TouchlightError::system(format!("Failed to encode status: {}", e))),
    }
}
