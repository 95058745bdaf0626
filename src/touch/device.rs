use super::TouchSourceOpener;
#[cfg(all(feature = "touch", target_os = "linux"))]
use super::{millis_since_epoch, open_error, TouchEvent, TouchSource};
use crate::config::TouchConfig;
use crate::error::{Result, TouchlightError};
use std::path::{Path, PathBuf};
#[cfg(all(feature = "touch", target_os = "linux"))]
use tracing::{debug, info};

#[cfg(all(feature = "touch", target_os = "linux"))]
use async_trait::async_trait;
#[cfg(all(feature = "touch", target_os = "linux"))]
use evdev::{Device, EventStream, InputEventKind, Key};

/// Opens the touchscreen through evdev, discovering it when not configured
#[derive(Debug, Clone)]
pub struct EvdevTouchOpener {
    device: Option<PathBuf>,
    input_dir: PathBuf,
    name_hint: String,
}

impl EvdevTouchOpener {
    pub fn new(config: &TouchConfig) -> Self {
        Self {
            device: config.device.as_ref().map(PathBuf::from),
            input_dir: PathBuf::from(&config.input_dir),
            name_hint: config.name_hint.clone(),
        }
    }

    fn resolve_device(&self) -> Result<PathBuf> {
        match &self.device {
            Some(path) => Ok(path.clone()),
            None => discover_touch_device(&self.input_dir, &self.name_hint),
        }
    }
}

#[cfg(all(feature = "touch", target_os = "linux"))]
impl TouchSourceOpener for EvdevTouchOpener {
    fn open(&self) -> Result<Box<dyn TouchSource>> {
        let path = self.resolve_device()?;
        let path_str = path.display().to_string();

        let device = Device::open(&path).map_err(|e| open_error(&path_str, e))?;
        info!(
            "Touch device opened successfully: {} ({})",
            path_str,
            device.name().unwrap_or("Unknown")
        );

        if !supports_touch(&device) {
            return Err(TouchlightError::unavailable(
                path_str,
                "device does not report BTN_TOUCH",
            ));
        }

        let stream = device
            .into_event_stream()
            .map_err(|e| open_error(&path_str, e))?;

        Ok(Box::new(EvdevTouchSource {
            stream,
            path: path_str,
        }))
    }
}

#[cfg(not(all(feature = "touch", target_os = "linux")))]
impl TouchSourceOpener for EvdevTouchOpener {
    fn open(&self) -> Result<Box<dyn super::TouchSource>> {
        let path = self.resolve_device().unwrap_or_else(|_| self.input_dir.clone());
        Err(TouchlightError::unavailable(
            path.display().to_string(),
            "touch input support is not compiled in",
        ))
    }
}

/// Evdev event stream filtered down to `BTN_TOUCH` edges
#[cfg(all(feature = "touch", target_os = "linux"))]
struct EvdevTouchSource {
    stream: EventStream,
    path: String,
}

#[cfg(all(feature = "touch", target_os = "linux"))]
#[async_trait]
impl TouchSource for EvdevTouchSource {
    async fn next_event(&mut self) -> Result<TouchEvent> {
        loop {
            let event = self
                .stream
                .next_event()
                .await
                .map_err(|e| TouchlightError::DeviceRead {
                    path: PathBuf::from(&self.path),
                    details: e.to_string(),
                })?;

            if let InputEventKind::Key(Key::BTN_TOUCH) = event.kind() {
                let timestamp_millis = millis_since_epoch(event.timestamp());
                match event.value() {
                    1 => return Ok(TouchEvent::press(timestamp_millis)),
                    0 => return Ok(TouchEvent::release(timestamp_millis)),
                    other => debug!("Ignoring BTN_TOUCH value {}", other),
                }
            }
        }
    }
}

#[cfg(all(feature = "touch", target_os = "linux"))]
fn supports_touch(device: &Device) -> bool {
    device
        .supported_keys()
        .map(|keys| keys.contains(Key::BTN_TOUCH))
        .unwrap_or(false)
}

/// Find the first `event*` node whose name matches `name_hint` and reports touch
#[cfg(all(feature = "touch", target_os = "linux"))]
pub fn discover_touch_device(input_dir: &Path, name_hint: &str) -> Result<PathBuf> {
    let names = list_dir(input_dir)?;

    for node in event_nodes(&names) {
        let path = input_dir.join(&node);
        let Ok(device) = Device::open(&path) else {
            continue;
        };
        let device_name = device.name().unwrap_or("Unknown");

        if matches_name_hint(device_name, name_hint) && supports_touch(&device) {
            info!(
                "Found touch device: {} ({})",
                path.display(),
                device_name
            );
            return Ok(path);
        }
        debug!("Skipping input device {} ({})", path.display(), device_name);
    }

    Err(TouchlightError::unavailable(
        input_dir.display().to_string(),
        format!("no touch device matching {:?}", name_hint),
    ))
}

#[cfg(not(all(feature = "touch", target_os = "linux")))]
pub fn discover_touch_device(input_dir: &Path, _name_hint: &str) -> Result<PathBuf> {
    Err(TouchlightError::unavailable(
        input_dir.display().to_string(),
        "touch input support is not compiled in",
    ))
}

#[cfg(all(feature = "touch", target_os = "linux"))]
fn list_dir(dir: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| TouchlightError::unavailable(dir.display().to_string(), e.to_string()))?;
    Ok(entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect())
}

/// `event<N>` entries of an input directory listing, ordered by `N`
pub fn event_nodes(names: &[String]) -> Vec<String> {
    let mut nodes: Vec<(u32, String)> = names
        .iter()
        .filter_map(|name| {
            name.strip_prefix("event")
                .and_then(|index| index.parse::<u32>().ok())
                .map(|index| (index, name.clone()))
        })
        .collect();
    nodes.sort();
    nodes.into_iter().map(|(_, name)| name).collect()
}

pub fn matches_name_hint(device_name: &str, name_hint: &str) -> bool {
    device_name
        .to_lowercase()
        .contains(&name_hint.to_lowercase())
}
