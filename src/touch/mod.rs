mod device;
mod mock;
mod source;
mod types;

pub use device::{discover_touch_device, event_nodes, matches_name_hint, EvdevTouchOpener};
pub use mock::{MockTouchHandle, MockTouchOpener, MockTouchSource};
pub use source::{TouchSource, TouchSourceOpener};
pub use types::{millis_since_epoch, open_error, TouchEvent};
