use crate::backlight::{BacklightDevice, BacklightStore};
use crate::brightness::BrightnessPolicy;
use crate::config::TouchlightConfig;
use crate::error::{EventBusError, Result};
use crate::events::{EventBus, EventFilter, EventReceiver, TouchlightEvent};
use crate::touch::EvdevTouchOpener;
use crate::wake::WakeController;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Discover the configured backlight and build a policy over it
pub fn open_policy(config: &TouchlightConfig) -> Result<BrightnessPolicy> {
    let device = BacklightDevice::discover(
        &config.backlight.class_dir,
        config.backlight.device.as_deref(),
    )?;
    BrightnessPolicy::new(BacklightStore::new(device))
}

/// Long-running supervisor keeping double-tap wake in step with backlight power.
///
/// Power changes made in-process arrive on the event bus; changes made by
/// other processes (a CLI `off`) are picked up by polling the device.
pub struct TouchlightService {
    policy: Arc<BrightnessPolicy>,
    wake: Option<Arc<WakeController>>,
    event_bus: EventBus,
    poll_interval: Duration,
    cancellation_token: CancellationToken,
}

impl TouchlightService {
    pub fn new(config: &TouchlightConfig) -> Result<Self> {
        let event_bus = EventBus::new(config.service.event_bus_capacity);
        let policy = Arc::new(open_policy(config)?.with_event_bus(event_bus.clone()));

        let wake = if config.touch.enabled {
            let opener = Arc::new(EvdevTouchOpener::new(&config.touch));
            Some(Arc::new(
                WakeController::new(
                    Arc::clone(&policy),
                    opener,
                    config.touch.double_tap_window(),
                )
                .with_event_bus(event_bus.clone()),
            ))
        } else {
            info!("Double-tap wake disabled by configuration");
            None
        };

        Ok(Self::from_parts(
            policy,
            wake,
            event_bus,
            config.service.poll_interval(),
        ))
    }

    pub fn from_parts(
        policy: Arc<BrightnessPolicy>,
        wake: Option<Arc<WakeController>>,
        event_bus: EventBus,
        poll_interval: Duration,
    ) -> Self {
        Self {
            policy,
            wake,
            event_bus,
            poll_interval,
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn policy(&self) -> Arc<BrightnessPolicy> {
        Arc::clone(&self.policy)
    }

    /// Token that stops [`TouchlightService::run`] when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Run until SIGINT/SIGTERM
    pub async fn run_with_signals(&self) -> Result<()> {
        self.setup_signal_handlers();
        self.run().await
    }

    /// Run until the cancellation token fires
    pub async fn run(&self) -> Result<()> {
        info!("Touchlight service is running");

        let mut power_events = EventReceiver::new(
            self.event_bus.subscribe(),
            EventFilter::EventTypes(vec!["power_changed"]),
            "wake_supervisor",
        );

        let initial = self.policy.refresh()?;
        self.sync_wake(initial.is_powered).await;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Touchlight service stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.policy.refresh() {
                        warn!("Failed to refresh backlight state: {}", e);
                    }
                }
                event = power_events.recv() => match event {
                    Ok(TouchlightEvent::PowerChanged { powered, .. }) => {
                        self.sync_wake(powered).await;
                    }
                    Ok(_) => {}
                    Err(EventBusError::Lagged(n)) => {
                        warn!("Wake supervisor lagged behind by {} events", n);
                        self.sync_wake(self.policy.is_powered()).await;
                    }
                    Err(e) => {
                        error!("Wake supervisor lost the event bus: {}", e);
                        break;
                    }
                },
            }
        }

        if let Some(wake) = &self.wake {
            wake.deactivate().await;
        }
        info!("Touchlight service stopped");
        Ok(())
    }

    async fn sync_wake(&self, powered: bool) {
        let Some(wake) = &self.wake else {
            return;
        };

        debug!("Syncing wake controller with power state: {}", powered);
        if let Err(e) = wake.sync_with_power(powered).await {
            if e.is_subsystem_local() {
                warn!("Double-tap wake unavailable: {}", e);
            } else {
                error!("Failed to arm double-tap wake: {}", e);
            }
        }
    }

    fn setup_signal_handlers(&self) {
        #[cfg(unix)]
        {
            let token = self.cancellation_token.clone();
            tokio::spawn(async move {
                use tokio::signal::unix::{signal, SignalKind};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        if sigterm.recv().await.is_some() {
                            info!("Received SIGTERM signal");
                            token.cancel();
                        }
                    }
                    Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
                }
            });
        }

        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received SIGINT signal (Ctrl+C)");
                token.cancel();
            }
        });
    }
}
