use super::*;
use crate::backlight::fixture::FakeBacklight;
use crate::brightness::BrightnessPolicy;
use crate::error::TouchlightError;
use crate::events::{EventBus, TouchlightEvent};
use crate::touch::{MockTouchOpener, TouchEvent, TouchSource, TouchSourceOpener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

const WINDOW: Duration = Duration::from_millis(500);

async fn wait_until<F: Fn() -> bool>(condition: F) {
    timeout(Duration::from_secs(2), async {
        while !condition() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Backlight off with a dark level and 20 remembered for wake
fn dark_policy(fake: &FakeBacklight) -> Arc<BrightnessPolicy> {
    let policy = BrightnessPolicy::new(fake.store()).unwrap();
    policy.set_percentage(64.5).unwrap();
    policy.set_percentage(0.0).unwrap();
    policy.turn_off().unwrap();
    assert_eq!(policy.state().last_non_zero_level, 20);
    Arc::new(policy)
}

#[tokio::test]
async fn test_double_tap_wakes_backlight() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    let touch = opener.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW);

    assert!(controller.activate().await.unwrap());
    assert!(touch.tap(1_000));
    assert!(touch.tap(1_300));

    wait_until(|| policy.is_powered()).await;
    let state = policy.state();
    assert_eq!(state.current_level, 20);
    assert_eq!(fake.power(), "0");
    assert_eq!(fake.brightness(), "20");

    // The pipeline exits after waking and releases the device
    wait_until(|| touch.is_closed()).await;
    assert!(!controller.is_active().await);
}

#[tokio::test]
async fn test_slow_taps_do_not_wake() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    let touch = opener.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW);

    controller.activate().await.unwrap();
    touch.tap(0);
    touch.tap(600);
    touch.tap(1_200);
    sleep(Duration::from_millis(50)).await;

    assert!(!policy.is_powered());
    assert!(controller.is_active().await);
    assert!(controller.deactivate().await);
}

#[tokio::test]
async fn test_activate_while_powered_is_noop() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = Arc::new(BrightnessPolicy::new(fake.store()).unwrap());
    let opener = Arc::new(MockTouchOpener::new());
    opener.push_source();
    let controller = WakeController::new(policy, opener.clone(), WINDOW);

    assert!(!controller.activate().await.unwrap());
    assert_eq!(opener.opened(), 0);
    assert!(!controller.is_active().await);
}

#[tokio::test]
async fn test_single_subscription() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    let first = opener.push_source();
    opener.push_source();
    let controller = WakeController::new(policy, opener.clone(), WINDOW);

    assert!(controller.activate().await.unwrap());
    assert!(!controller.activate().await.unwrap());
    assert_eq!(opener.opened(), 1);

    assert!(controller.deactivate().await);
    assert!(first.is_closed());
    assert!(!controller.is_active().await);
    assert!(!controller.deactivate().await);

    // Re-arming opens a fresh source
    assert!(controller.activate().await.unwrap());
    assert_eq!(opener.opened(), 2);
    controller.deactivate().await;
}

#[tokio::test]
async fn test_missing_touch_device_degrades() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    let controller = WakeController::new(Arc::clone(&policy), opener, WINDOW);

    let err = controller.activate().await.unwrap_err();
    assert!(matches!(err, TouchlightError::DeviceUnavailable { .. }));
    assert!(!controller.is_active().await);

    // Brightness control keeps working
    assert_eq!(policy.set_percentage(100.0).unwrap().raw, 31);
}

#[tokio::test]
async fn test_touch_device_disappearing_ends_pipeline() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let event_bus = EventBus::new(16);
    let mut receiver = event_bus.subscribe();
    let opener = Arc::new(MockTouchOpener::new());
    let touch = opener.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW)
        .with_event_bus(event_bus);

    controller.activate().await.unwrap();
    drop(touch);

    let event = timeout(Duration::from_secs(1), receiver.recv())
        .await
        .unwrap()
        .unwrap();
    match event {
        TouchlightEvent::SystemError { component, .. } => assert_eq!(component, "touch_monitor"),
        other => panic!("Unexpected event: {:?}", other),
    }
    assert!(!policy.is_powered());
    controller.deactivate().await;
    assert!(!controller.is_active().await);
}

#[tokio::test]
async fn test_wake_publishes_events() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let event_bus = EventBus::new(16);
    let mut receiver = event_bus.subscribe();
    let opener = Arc::new(MockTouchOpener::new());
    let touch = opener.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW)
        .with_event_bus(event_bus);

    controller.activate().await.unwrap();
    touch.send(TouchEvent::press(0));
    touch.send(TouchEvent::press(500));

    let mut seen = Vec::new();
    while !seen.contains(&"wake_triggered") {
        let event = timeout(Duration::from_secs(1), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(event.event_type());
    }
    assert!(seen.contains(&"double_tap_detected"));
}

#[tokio::test]
async fn test_sync_with_power() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    opener.push_source();
    let controller = WakeController::new(policy, opener.clone(), WINDOW);

    controller.sync_with_power(false).await.unwrap();
    assert!(controller.is_active().await);

    controller.sync_with_power(true).await.unwrap();
    assert!(!controller.is_active().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_wake_and_direct_writes_do_not_interleave() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(MockTouchOpener::new());
    let touch = opener.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW);
    controller.activate().await.unwrap();

    let writer = {
        let policy = Arc::clone(&policy);
        tokio::task::spawn_blocking(move || {
            for i in 0..200u32 {
                policy.set_percentage(f64::from(i % 101)).unwrap();
            }
        })
    };
    touch.tap(0);
    touch.tap(200);

    writer.await.unwrap();
    wait_until(|| policy.is_powered()).await;
    wait_until(|| touch.is_closed()).await;

    let state = policy.state();
    assert_eq!(fake.brightness(), state.current_level.to_string());
    assert_eq!(fake.power(), "0");
    assert_ne!(state.last_non_zero_level, 0);
}

struct FaultySource;

#[async_trait::async_trait]
impl TouchSource for FaultySource {
    async fn next_event(&mut self) -> crate::error::Result<TouchEvent> {
        panic!("touch driver fault");
    }
}

/// First subscription gets a source that panics, later ones come from `inner`
struct FaultyFirstOpener {
    faulted: AtomicBool,
    inner: MockTouchOpener,
}

impl TouchSourceOpener for FaultyFirstOpener {
    fn open(&self) -> crate::error::Result<Box<dyn TouchSource>> {
        if !self.faulted.swap(true, Ordering::SeqCst) {
            return Ok(Box::new(FaultySource));
        }
        self.inner.open()
    }
}

#[tokio::test]
async fn test_rearm_after_panicked_pipeline() {
    let fake = FakeBacklight::new(31, 10, true);
    let policy = dark_policy(&fake);
    let opener = Arc::new(FaultyFirstOpener {
        faulted: AtomicBool::new(false),
        inner: MockTouchOpener::new(),
    });
    let touch = opener.inner.push_source();
    let controller = WakeController::new(Arc::clone(&policy), opener.clone(), WINDOW);

    assert!(controller.activate().await.unwrap());
    timeout(Duration::from_secs(1), async {
        while controller.is_active().await {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    // The dead pipeline is reaped and a fresh subscription takes its place
    assert!(controller.activate().await.unwrap());
    touch.tap(0);
    touch.tap(200);
    wait_until(|| policy.is_powered()).await;
}
