use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Default location of the configuration file; it is optional.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/touchlight/touchlight.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TouchlightConfig {
    pub backlight: BacklightConfig,
    pub touch: TouchConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BacklightConfig {
    /// Parent directory holding one subdirectory per backlight device
    #[serde(default = "default_class_dir")]
    pub class_dir: String,

    /// Device name to use when the class directory lists more than one
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TouchConfig {
    /// Enable double-tap wake
    #[serde(default = "default_touch_enabled")]
    pub enabled: bool,

    /// Directory scanned for input event devices
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Explicit touch event device; skips discovery
    #[serde(default)]
    pub device: Option<String>,

    /// Case-insensitive substring matched against input device names
    #[serde(default = "default_name_hint")]
    pub name_hint: String,

    /// Maximum gap between the two presses of a double tap
    #[serde(default = "default_double_tap_window_ms")]
    pub double_tap_window_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServiceConfig {
    /// How often the service re-reads the backlight power state
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

impl TouchConfig {
    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_window_ms)
    }
}

impl ServiceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl TouchlightConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("backlight.class_dir", default_class_dir())?
            .set_default("touch.enabled", default_touch_enabled())?
            .set_default("touch.input_dir", default_input_dir())?
            .set_default("touch.name_hint", default_name_hint())?
            .set_default(
                "touch.double_tap_window_ms",
                default_double_tap_window_ms(),
            )?
            .set_default("service.poll_interval_ms", default_poll_interval_ms())?
            .set_default(
                "service.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // e.g. TOUCHLIGHT_TOUCH__DOUBLE_TAP_WINDOW_MS=400
            .add_source(
                Environment::with_prefix("TOUCHLIGHT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: TouchlightConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backlight.class_dir.is_empty() {
            return Err(ConfigError::Message(
                "Backlight class_dir must not be empty".to_string(),
            ));
        }

        if self.touch.double_tap_window_ms == 0 {
            return Err(ConfigError::Message(
                "Touch double_tap_window_ms must be greater than 0".to_string(),
            ));
        }

        if self.service.poll_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Service poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.service.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for TouchlightConfig {
    fn default() -> Self {
        Self {
            backlight: BacklightConfig {
                class_dir: default_class_dir(),
                device: None,
            },
            touch: TouchConfig {
                enabled: default_touch_enabled(),
                input_dir: default_input_dir(),
                device: None,
                name_hint: default_name_hint(),
                double_tap_window_ms: default_double_tap_window_ms(),
            },
            service: ServiceConfig {
                poll_interval_ms: default_poll_interval_ms(),
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

fn default_class_dir() -> String {
    "/sys/class/backlight".to_string()
}

fn default_touch_enabled() -> bool {
    true
}
fn default_input_dir() -> String {
    "/dev/input".to_string()
}
fn default_name_hint() -> String {
    "touch".to_string()
}
fn default_double_tap_window_ms() -> u64 {
    500
}

fn default_poll_interval_ms() -> u64 {
    500
}
fn default_event_bus_capacity() -> usize {
    32
}
