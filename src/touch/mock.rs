use super::{TouchEvent, TouchSource, TouchSourceOpener};
use crate::error::{Result, TouchlightError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// Touch source fed from a channel, for running without real hardware
pub struct MockTouchSource {
    receiver: mpsc::UnboundedReceiver<TouchEvent>,
}

/// Sending side of a [`MockTouchSource`]
#[derive(Clone)]
pub struct MockTouchHandle {
    sender: mpsc::UnboundedSender<TouchEvent>,
}

impl MockTouchSource {
    pub fn new() -> (Self, MockTouchHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, MockTouchHandle { sender })
    }
}

impl MockTouchHandle {
    /// Send a press followed by a release at `timestamp_millis`.
    ///
    /// Returns `false` once the source has been dropped.
    pub fn tap(&self, timestamp_millis: u64) -> bool {
        self.send(TouchEvent::press(timestamp_millis))
            && self.send(TouchEvent::release(timestamp_millis + 40))
    }

    pub fn send(&self, event: TouchEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    /// Whether the receiving source has been closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[async_trait]
impl TouchSource for MockTouchSource {
    async fn next_event(&mut self) -> Result<TouchEvent> {
        self.receiver.recv().await.ok_or_else(|| TouchlightError::DeviceRead {
            path: "mock-touch".into(),
            details: "touch source closed".to_string(),
        })
    }
}

/// Hands out queued mock sources; fails like a missing device once empty
#[derive(Default)]
pub struct MockTouchOpener {
    sources: Mutex<VecDeque<MockTouchSource>>,
    opened: AtomicUsize,
}

impl MockTouchOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a source for the next `open` and return its handle
    pub fn push_source(&self) -> MockTouchHandle {
        let (source, handle) = MockTouchSource::new();
        self.sources.lock().push_back(source);
        handle
    }

    /// Number of sources opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl TouchSourceOpener for MockTouchOpener {
    fn open(&self) -> Result<Box<dyn TouchSource>> {
        let source = self
            .sources
            .lock()
            .pop_front()
            .ok_or_else(|| TouchlightError::unavailable("mock-touch", "touch device not found"))?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        debug!("Mock touch source opened");
        Ok(Box::new(source))
    }
}
