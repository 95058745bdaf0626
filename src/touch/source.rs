use super::TouchEvent;
use crate::error::Result;
use async_trait::async_trait;

/// A lazy, non-restartable sequence of touch contact events.
///
/// `next_event` suspends until the next press or release arrives. Dropping
/// the source closes the underlying device.
#[async_trait]
pub trait TouchSource: Send {
    async fn next_event(&mut self) -> Result<TouchEvent>;
}

/// Opens a fresh [`TouchSource`] for each wake subscription
pub trait TouchSourceOpener: Send + Sync {
    fn open(&self) -> Result<Box<dyn TouchSource>>;
}
