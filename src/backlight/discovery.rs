use super::{FILE_BL_POWER, FILE_BRIGHTNESS, FILE_MAX_BRIGHTNESS};
use crate::error::{Result, TouchlightError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A backlight node under the sysfs backlight class directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklightDevice {
    pub name: String,
    pub brightness_path: PathBuf,
    pub power_path: PathBuf,
    pub max_brightness: u32,
}

impl BacklightDevice {
    /// Scan `class_dir` and open the single backlight device found there.
    ///
    /// `preferred` pins a device by name when the directory lists several.
    pub fn discover<P: AsRef<Path>>(class_dir: P, preferred: Option<&str>) -> Result<Self> {
        let class_dir = class_dir.as_ref();
        let entries = fs::read_dir(class_dir).map_err(|e| {
            TouchlightError::unavailable(class_dir.display().to_string(), e.to_string())
        })?;

        let names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        debug!("Backlight candidates in {}: {:?}", class_dir.display(), names);

        let name = select_device(&names, preferred)?;
        Self::open(class_dir.join(name))
    }

    /// Open a backlight device directory and read its maximum brightness
    pub fn open<P: AsRef<Path>>(device_dir: P) -> Result<Self> {
        let device_dir = device_dir.as_ref();
        let name = device_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| device_dir.display().to_string());

        let max_path = device_dir.join(FILE_MAX_BRIGHTNESS);
        let max_brightness = fs::read_to_string(&max_path)
            .map_err(|e| TouchlightError::unavailable(&name, e.to_string()))?
            .trim()
            .parse::<u32>()
            .map_err(|e| {
                TouchlightError::unavailable(&name, format!("invalid max_brightness: {}", e))
            })?;

        if max_brightness == 0 {
            return Err(TouchlightError::unavailable(
                &name,
                "max_brightness is 0",
            ));
        }

        info!(
            "Using backlight device {} (max brightness {})",
            name, max_brightness
        );

        Ok(Self {
            brightness_path: device_dir.join(FILE_BRIGHTNESS),
            power_path: device_dir.join(FILE_BL_POWER),
            name,
            max_brightness,
        })
    }
}

/// Pick the backlight device from a directory listing.
///
/// Exactly one entry must remain after applying `preferred`; zero or several
/// candidates mean the hardware cannot be identified.
pub fn select_device(names: &[String], preferred: Option<&str>) -> Result<String> {
    if let Some(wanted) = preferred {
        return names
            .iter()
            .find(|name| name.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                TouchlightError::unavailable(wanted, "configured backlight device not present")
            });
    }

    match names {
        [] => Err(TouchlightError::unavailable(
            "backlight",
            "no backlight devices found",
        )),
        [only] => Ok(only.clone()),
        many => {
            let mut sorted = many.to_vec();
            sorted.sort();
            Err(TouchlightError::unavailable(
                "backlight",
                format!(
                    "ambiguous backlight devices: {} (set backlight.device)",
                    sorted.join(", ")
                ),
            ))
        }
    }
}
