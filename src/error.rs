use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TouchlightError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Device unavailable: {device}: {reason}")]
    DeviceUnavailable { device: String, reason: String },

    #[error("Failed to read {}: {details}", path.display())]
    DeviceRead { path: PathBuf, details: String },

    #[error("Failed to write {}: {details}", path.display())]
    DeviceWrite { path: PathBuf, details: String },

    #[error("Value {value} is out of range ({min}..={max})")]
    InvalidRange { value: String, min: u32, max: u32 },

    #[error("{0}")]
    Usage(String),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },
}

impl TouchlightError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn unavailable<D: Into<String>, R: Into<String>>(device: D, reason: R) -> Self {
        Self::DeviceUnavailable {
            device: device.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_range<V: ToString>(value: V, min: u32, max: u32) -> Self {
        Self::InvalidRange {
            value: value.to_string(),
            min,
            max,
        }
    }

    /// Whether the failure only disables the subsystem that raised it.
    ///
    /// A missing touch device leaves brightness control fully usable, so the
    /// service keeps running without wake support.
    pub fn is_subsystem_local(&self) -> bool {
        matches!(self, TouchlightError::DeviceUnavailable { .. })
    }
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Event bus channel closed")]
    ChannelClosed,

    #[error("Receiver lagged behind by {0} events")]
    Lagged(u64),
}

pub type Result<T> = std::result::Result<T, TouchlightError>;
