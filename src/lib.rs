pub mod backlight;
pub mod brightness;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod gesture;
pub mod service;
pub mod touch;
pub mod wake;

pub use backlight::{BacklightDevice, BacklightStore};
pub use brightness::{Adjustment, BrightnessPolicy, BrightnessState, BrightnessStatus};
pub use cli::{Action, OutputFormat};
pub use config::TouchlightConfig;
pub use error::{Result, TouchlightError};
pub use events::{EventBus, EventFilter, EventReceiver, TouchlightEvent};
pub use gesture::{DoubleTap, DoubleTapRecognizer, TapState};
pub use service::TouchlightService;
pub use touch::{EvdevTouchOpener, MockTouchOpener, TouchEvent, TouchSource, TouchSourceOpener};
pub use wake::WakeController;
