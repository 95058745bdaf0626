mod policy;
mod status;

pub use policy::{Adjustment, BrightnessPolicy, BrightnessState};
pub use status::{percent_to_raw, raw_to_percent, BrightnessStatus, MIN_PERCENT};
