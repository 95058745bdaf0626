use crate::error::TouchlightError;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

/// A single contact edge reported by the touch surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub contact_active: bool,
    pub timestamp_millis: u64,
}

impl TouchEvent {
    pub fn press(timestamp_millis: u64) -> Self {
        Self {
            contact_active: true,
            timestamp_millis,
        }
    }

    pub fn release(timestamp_millis: u64) -> Self {
        Self {
            contact_active: false,
            timestamp_millis,
        }
    }

    pub fn is_press(&self) -> bool {
        self.contact_active
    }
}

pub fn millis_since_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Map a failure to open a touch device into a user-facing error
pub fn open_error(device_path: &str, error: io::Error) -> TouchlightError {
    let reason = match error.kind() {
        io::ErrorKind::NotFound => "touch device not found".to_string(),
        io::ErrorKind::PermissionDenied => {
            "permission denied (is the user in the input group?)".to_string()
        }
        _ => format!("failed to open: {}", error),
    };
    TouchlightError::unavailable(device_path, reason)
}
