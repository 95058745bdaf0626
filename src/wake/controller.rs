use crate::brightness::BrightnessPolicy;
use crate::error::Result;
use crate::events::{EventBus, TouchlightEvent};
use crate::gesture::DoubleTapRecognizer;
use crate::touch::{TouchSource, TouchSourceOpener};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

struct Subscription {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Turns the backlight back on when a double tap is seen while it is off.
///
/// At most one touch subscription exists at a time. The slot lock is held
/// while a subscription is torn down, so a new one can only open after the
/// previous pipeline has exited and released the device.
pub struct WakeController {
    policy: Arc<BrightnessPolicy>,
    opener: Arc<dyn TouchSourceOpener>,
    window: Duration,
    event_bus: Option<EventBus>,
    slot: Mutex<Option<Subscription>>,
}

impl WakeController {
    pub fn new(
        policy: Arc<BrightnessPolicy>,
        opener: Arc<dyn TouchSourceOpener>,
        window: Duration,
    ) -> Self {
        Self {
            policy,
            opener,
            window,
            event_bus: None,
            slot: Mutex::new(None),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Start listening for double taps if the backlight is off.
    ///
    /// Returns `true` when a new subscription was started. Fails with
    /// `DeviceUnavailable` when the touch device cannot be opened.
    pub async fn activate(&self) -> Result<bool> {
        let mut slot = self.slot.lock().await;

        if let Some(subscription) = slot.as_ref() {
            if !subscription.handle.is_finished() {
                debug!("Wake subscription already active");
                return Ok(false);
            }
        }
        if let Some(finished) = slot.take() {
            if let Err(e) = finished.handle.await {
                warn!("Previous wake pipeline ended abnormally: {}", e);
            }
        }

        if self.policy.is_powered() {
            debug!("Backlight is on; wake subscription not needed");
            return Ok(false);
        }

        let source = self.opener.open()?;
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_pipeline(
            source,
            DoubleTapRecognizer::new(self.window),
            Arc::clone(&self.policy),
            self.event_bus.clone(),
            cancel.clone(),
        ));

        *slot = Some(Subscription { cancel, handle });
        info!("Double-tap wake armed");
        Ok(true)
    }

    /// Tear down the active subscription, waiting for its pipeline to exit.
    ///
    /// Returns `true` when a running subscription was stopped.
    pub async fn deactivate(&self) -> bool {
        let mut slot = self.slot.lock().await;
        let Some(subscription) = slot.take() else {
            return false;
        };

        let was_running = !subscription.handle.is_finished();
        subscription.cancel.cancel();
        if let Err(e) = subscription.handle.await {
            warn!("Wake pipeline ended abnormally: {}", e);
        }

        if was_running {
            info!("Double-tap wake disarmed");
        }
        was_running
    }

    /// Whether a pipeline is currently listening
    pub async fn is_active(&self) -> bool {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|subscription| !subscription.handle.is_finished())
            .unwrap_or(false)
    }

    /// Arm while the backlight is off, disarm while it is on
    pub async fn sync_with_power(&self, powered: bool) -> Result<()> {
        if powered {
            self.deactivate().await;
            Ok(())
        } else {
            self.activate().await.map(|_| ())
        }
    }
}

async fn run_pipeline(
    mut source: Box<dyn TouchSource>,
    mut recognizer: DoubleTapRecognizer,
    policy: Arc<BrightnessPolicy>,
    event_bus: Option<EventBus>,
    cancel: CancellationToken,
) {
    let publish = |event: TouchlightEvent| {
        if let Some(event_bus) = &event_bus {
            if let Err(e) = event_bus.publish(event) {
                warn!("Failed to publish wake event: {}", e);
            }
        }
    };

    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Wake pipeline cancelled");
                break;
            }
            event = source.next_event() => event,
        };

        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Touch monitor stopped, double-tap wake disabled: {}", e);
                publish(TouchlightEvent::SystemError {
                    component: "touch_monitor".to_string(),
                    error: e.to_string(),
                });
                break;
            }
        };

        let Some(tap) = recognizer.observe(event) else {
            continue;
        };
        publish(TouchlightEvent::DoubleTapDetected {
            first_tap_millis: tap.first_tap_millis,
            second_tap_millis: tap.second_tap_millis,
        });

        if policy.is_powered() {
            debug!("Double tap ignored; backlight already on");
            break;
        }

        match policy.turn_on() {
            Ok(status) => {
                publish(TouchlightEvent::WakeTriggered {
                    raw: status.raw,
                    timestamp: SystemTime::now(),
                });
                break;
            }
            Err(e) => {
                error!("Failed to wake backlight: {}", e);
                publish(TouchlightEvent::SystemError {
                    component: "wake_controller".to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    // Dropping the source closes the touch device
    drop(source);
}
