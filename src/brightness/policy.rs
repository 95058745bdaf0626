use super::status::{percent_to_raw, raw_to_percent, BrightnessStatus, MIN_PERCENT};
use crate::backlight::BacklightStore;
use crate::error::{Result, TouchlightError};
use crate::events::{EventBus, TouchlightEvent};
use parking_lot::Mutex;
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// In-memory view of the backlight, owned by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessState {
    pub current_level: u32,
    pub is_powered: bool,
    /// Level restored on wake; never 0
    pub last_non_zero_level: u32,
}

impl BrightnessState {
    fn record_level(&mut self, level: u32) {
        self.current_level = level;
        if level > 0 {
            self.last_non_zero_level = level;
        }
    }
}

/// Outcome of a relative change: the clamped percentage that was asked for
/// and the status the device ended up in after rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub requested: f64,
    pub status: BrightnessStatus,
}

struct Inner {
    store: BacklightStore,
    state: BrightnessState,
}

/// User-facing brightness operations over a [`BacklightStore`].
///
/// The store lives behind the same lock as the cached state, so every device
/// access from the CLI, a GUI, or the wake pipeline is serialized.
pub struct BrightnessPolicy {
    inner: Mutex<Inner>,
    max_brightness: u32,
    event_bus: Option<EventBus>,
}

impl BrightnessPolicy {
    /// Build the policy, seeding the cache from the device
    pub fn new(store: BacklightStore) -> Result<Self> {
        let max_brightness = store.max_brightness();
        let current_level = store.read_brightness()?;
        let is_powered = store.read_power()?;

        let state = BrightnessState {
            current_level,
            is_powered,
            last_non_zero_level: if current_level > 0 {
                current_level
            } else {
                max_brightness
            },
        };
        debug!("Initial brightness state: {:?}", state);

        Ok(Self {
            inner: Mutex::new(Inner { store, state }),
            max_brightness,
            event_bus: None,
        })
    }

    /// Publish state changes on `event_bus`
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Cached state without touching the device
    pub fn state(&self) -> BrightnessState {
        self.inner.lock().state
    }

    pub fn is_powered(&self) -> bool {
        self.inner.lock().state.is_powered
    }

    /// Read the device and report percentage, raw level and maximum
    pub fn get(&self) -> Result<BrightnessStatus> {
        let mut inner = self.inner.lock();
        self.sync_from_device(&mut inner)?;
        Ok(self.status(&inner.state))
    }

    /// Re-read the device so changes made by other processes are noticed
    pub fn refresh(&self) -> Result<BrightnessState> {
        let mut inner = self.inner.lock();
        self.sync_from_device(&mut inner)?;
        Ok(inner.state)
    }

    pub fn set_percentage(&self, percent: f64) -> Result<BrightnessStatus> {
        let mut inner = self.inner.lock();
        self.apply_percentage(&mut inner, percent)
    }

    pub fn adjust_percentage(&self, delta: f64) -> Result<Adjustment> {
        if !delta.is_finite() {
            return Err(TouchlightError::invalid_range(delta, 0, 100));
        }

        let mut inner = self.inner.lock();
        let current = inner.store.read_brightness()?;
        inner.state.record_level(current);

        let requested = (f64::from(raw_to_percent(current, self.max_brightness)) + delta)
            .clamp(0.0, 100.0);
        let status = self.apply_percentage(&mut inner, requested)?;
        Ok(Adjustment { requested, status })
    }

    pub fn set_max(&self) -> Result<BrightnessStatus> {
        self.set_percentage(100.0)
    }

    /// Lowest visible brightness; never writes a raw 0
    pub fn set_min(&self) -> Result<BrightnessStatus> {
        let mut inner = self.inner.lock();
        let level = percent_to_raw(MIN_PERCENT, self.max_brightness).max(1);
        self.write_level(&mut inner, level)?;
        Ok(self.status(&inner.state))
    }

    /// Power the backlight down, keeping the current level for wake
    pub fn turn_off(&self) -> Result<BrightnessStatus> {
        let mut inner = self.inner.lock();
        inner.store.write_power(false)?;
        self.record_power(&mut inner, false);
        Ok(self.status(&inner.state))
    }

    /// Power the backlight up, restoring the last non-zero level if dark
    pub fn turn_on(&self) -> Result<BrightnessStatus> {
        let mut inner = self.inner.lock();
        // Another process may have darkened the device since the last poll
        let current = inner.store.read_brightness()?;
        inner.state.record_level(current);

        if inner.state.current_level == 0 {
            let level = inner.state.last_non_zero_level;
            info!("Restoring brightness level {}", level);
            self.write_level(&mut inner, level)?;
        }
        inner.store.write_power(true)?;
        self.record_power(&mut inner, true);
        Ok(self.status(&inner.state))
    }

    fn apply_percentage(&self, inner: &mut Inner, percent: f64) -> Result<BrightnessStatus> {
        if !percent.is_finite() {
            return Err(TouchlightError::invalid_range(percent, 0, 100));
        }

        let level = percent_to_raw(percent, self.max_brightness);
        self.write_level(inner, level)?;
        Ok(self.status(&inner.state))
    }

    fn write_level(&self, inner: &mut Inner, level: u32) -> Result<()> {
        inner.store.write_brightness(level)?;
        let changed = inner.state.current_level != level;
        inner.state.record_level(level);

        if changed {
            self.publish(TouchlightEvent::BrightnessChanged {
                raw: level,
                max: self.max_brightness,
                timestamp: SystemTime::now(),
            });
        }
        Ok(())
    }

    fn sync_from_device(&self, inner: &mut Inner) -> Result<()> {
        let level = inner.store.read_brightness()?;
        let powered = inner.store.read_power()?;
        inner.state.record_level(level);
        self.record_power(inner, powered);
        Ok(())
    }

    fn record_power(&self, inner: &mut Inner, powered: bool) {
        if inner.state.is_powered == powered {
            return;
        }
        inner.state.is_powered = powered;
        info!("Backlight power {}", if powered { "on" } else { "off" });
        self.publish(TouchlightEvent::PowerChanged {
            powered,
            timestamp: SystemTime::now(),
        });
    }

    fn status(&self, state: &BrightnessState) -> BrightnessStatus {
        BrightnessStatus::new(state.current_level, self.max_brightness, state.is_powered)
    }

    fn publish(&self, event: TouchlightEvent) {
        if let Some(event_bus) = &self.event_bus {
            if let Err(e) = event_bus.publish(event) {
                warn!("Failed to publish brightness event: {}", e);
            }
        }
    }
}
