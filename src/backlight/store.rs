use super::BacklightDevice;
use crate::error::{Result, TouchlightError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Reads and writes the brightness and power attributes of one device.
///
/// Every write renders the full decimal value first and overwrites the
/// attribute in a single call, so a failed write leaves the previous value.
#[derive(Debug, Clone)]
pub struct BacklightStore {
    device: BacklightDevice,
}

impl BacklightStore {
    pub fn new(device: BacklightDevice) -> Self {
        Self { device }
    }

    pub fn max_brightness(&self) -> u32 {
        self.device.max_brightness
    }

    pub fn read_brightness(&self) -> Result<u32> {
        read_attribute(&self.device.brightness_path)
    }

    pub fn write_brightness(&self, level: u32) -> Result<()> {
        if level > self.device.max_brightness {
            return Err(TouchlightError::invalid_range(
                level,
                0,
                self.device.max_brightness,
            ));
        }

        write_attribute(&self.device.brightness_path, level)?;
        debug!("Brightness set to {}/{}", level, self.device.max_brightness);
        Ok(())
    }

    /// `true` when the backlight is powered.
    pub fn read_power(&self) -> Result<bool> {
        Ok(read_attribute(&self.device.power_path)? == 0)
    }

    pub fn write_power(&self, on: bool) -> Result<()> {
        let power_value = if on { 0 } else { 1 };
        write_attribute(&self.device.power_path, power_value)?;
        debug!(
            "Backlight set to: {} (power value: {})",
            if on { "ON" } else { "OFF" },
            power_value
        );
        Ok(())
    }
}

fn read_attribute(path: &Path) -> Result<u32> {
    let contents = fs::read_to_string(path).map_err(|e| TouchlightError::DeviceRead {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    contents
        .trim()
        .parse::<u32>()
        .map_err(|e| TouchlightError::DeviceRead {
            path: path.to_path_buf(),
            details: format!("invalid value {:?}: {}", contents.trim(), e),
        })
}

fn write_attribute(path: &Path, value: u32) -> Result<()> {
    let write_error = |e: std::io::Error| TouchlightError::DeviceWrite {
        path: path.to_path_buf(),
        details: e.to_string(),
    };

    let rendered = value.to_string();
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_error)?;
    file.write_all(rendered.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)
}
