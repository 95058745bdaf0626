mod discovery;
mod store;
#[cfg(test)]
mod tests;

pub use discovery::{select_device, BacklightDevice};
pub use store::BacklightStore;

/// Current brightness level, `0..=max_brightness`
pub const FILE_BRIGHTNESS: &str = "brightness";
/// Immutable maximum level, read once at discovery
pub const FILE_MAX_BRIGHTNESS: &str = "max_brightness";
/// Power flag: `0` is on, anything else is off
pub const FILE_BL_POWER: &str = "bl_power";

#[cfg(test)]
pub(crate) mod fixture;
