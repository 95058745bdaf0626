use crate::touch::TouchEvent;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(500);

/// Rolling memory of the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapState {
    /// No pending tap
    Idle,
    /// One press seen, waiting for a second inside the window
    OneTapPending { last_tap_millis: u64 },
}

/// Signal emitted when two presses land inside the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoubleTap {
    pub first_tap_millis: u64,
    pub second_tap_millis: u64,
}

/// Counts contact presses and reports a [`DoubleTap`] when two arrive within
/// the window (inclusive). Releases are consumed but never counted. After a
/// detection the machine re-arms in [`TapState::Idle`].
#[derive(Debug, Clone)]
pub struct DoubleTapRecognizer {
    window_millis: u64,
    state: TapState,
}

impl DoubleTapRecognizer {
    pub fn new(window: Duration) -> Self {
        Self {
            window_millis: window.as_millis() as u64,
            state: TapState::Idle,
        }
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    pub fn observe(&mut self, event: TouchEvent) -> Option<DoubleTap> {
        if !event.is_press() {
            return None;
        }

        let now = event.timestamp_millis;
        match self.state {
            TapState::Idle => {
                self.state = TapState::OneTapPending {
                    last_tap_millis: now,
                };
                None
            }
            TapState::OneTapPending { last_tap_millis } => {
                // A timestamp that runs backwards starts over as a first tap
                match now.checked_sub(last_tap_millis) {
                    Some(gap) if gap <= self.window_millis => {
                        debug!("Double tap recognized ({} ms apart)", gap);
                        self.state = TapState::Idle;
                        Some(DoubleTap {
                            first_tap_millis: last_tap_millis,
                            second_tap_millis: now,
                        })
                    }
                    _ => {
                        self.state = TapState::OneTapPending {
                            last_tap_millis: now,
                        };
                        None
                    }
                }
            }
        }
    }
}

impl Default for DoubleTapRecognizer {
    fn default() -> Self {
        Self::new(DEFAULT_DOUBLE_TAP_WINDOW)
    }
}
