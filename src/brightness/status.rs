use serde::Serialize;
use std::fmt;

/// Lowest percentage reachable through `min`; `off` is the only way to go dark.
pub const MIN_PERCENT: f64 = 1.0;

/// Snapshot returned by every policy operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrightnessStatus {
    pub percentage: u32,
    pub raw: u32,
    pub max: u32,
    pub powered: bool,
}

impl BrightnessStatus {
    pub fn new(raw: u32, max: u32, powered: bool) -> Self {
        Self {
            percentage: raw_to_percent(raw, max),
            raw,
            max,
            powered,
        }
    }
}

impl fmt::Display for BrightnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% ({}/{})", self.percentage, self.raw, self.max)?;
        if !self.powered {
            write!(f, " (OFF)")?;
        }
        Ok(())
    }
}

/// Convert a percentage to a raw level, rounding halves up.
///
/// The percentage is clamped to `0..=100` first.
pub fn percent_to_raw(percent: f64, max: u32) -> u32 {
    let percent = percent.clamp(0.0, 100.0);
    let raw = (percent * f64::from(max) / 100.0 + 0.5).floor() as u32;
    raw.min(max)
}

/// Convert a raw level to a whole percentage, rounding halves up.
pub fn raw_to_percent(raw: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let raw = u64::from(raw.min(max));
    let max = u64::from(max);
    ((2 * raw * 100 + max) / (2 * max)) as u32
}
