use crate::error::EventBusError;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Events that can occur in the touchlight system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TouchlightEvent {
    /// The backlight power attribute changed
    PowerChanged {
        powered: bool,
        timestamp: SystemTime,
    },
    /// A new brightness level was written
    BrightnessChanged {
        raw: u32,
        max: u32,
        timestamp: SystemTime,
    },
    /// Two presses landed inside the double-tap window
    DoubleTapDetected {
        first_tap_millis: u64,
        second_tap_millis: u64,
    },
    /// The backlight was restored by a double tap
    WakeTriggered { raw: u32, timestamp: SystemTime },
    /// A system error occurred in a component
    SystemError { component: String, error: String },
}

impl TouchlightEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            TouchlightEvent::PowerChanged { powered, .. } => {
                format!("Backlight power {}", if *powered { "on" } else { "off" })
            }
            TouchlightEvent::BrightnessChanged { raw, max, .. } => {
                format!("Brightness changed to {}/{}", raw, max)
            }
            TouchlightEvent::DoubleTapDetected {
                first_tap_millis,
                second_tap_millis,
            } => format!(
                "Double tap detected ({} ms apart)",
                second_tap_millis.saturating_sub(*first_tap_millis)
            ),
            TouchlightEvent::WakeTriggered { raw, .. } => {
                format!("Backlight woken at level {}", raw)
            }
            TouchlightEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            TouchlightEvent::PowerChanged { .. } => "power_changed",
            TouchlightEvent::BrightnessChanged { .. } => "brightness_changed",
            TouchlightEvent::DoubleTapDetected { .. } => "double_tap_detected",
            TouchlightEvent::WakeTriggered { .. } => "wake_triggered",
            TouchlightEvent::SystemError { .. } => "system_error",
        }
    }
}

/// Async event bus for component coordination using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TouchlightEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<TouchlightEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped
    /// and `Ok(0)` is returned. CLI invocations run without any listener.
    pub fn publish(&self, event: TouchlightEvent) -> Result<usize, EventBusError> {
        match &event {
            TouchlightEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            TouchlightEvent::WakeTriggered { raw, .. } => {
                info!("Backlight woken by double tap (level {})", raw);
            }
            _ => debug!("Event: {}", event.description()),
        }

        if self.sender.receiver_count() == 0 {
            return Ok(0);
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &TouchlightEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<TouchlightEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    pub fn new(
        receiver: broadcast::Receiver<TouchlightEvent>,
        filter: EventFilter,
        name: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            filter,
            name: name.into(),
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<TouchlightEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    return Err(EventBusError::Lagged(n));
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}
