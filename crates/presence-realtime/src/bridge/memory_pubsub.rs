//! In-memory pub/sub for single-process deployments and tests.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use presence_core::result::AppResult;
use presence_core::traits::EventBus;

/// In-memory event bus.
///
/// Every subscriber of a channel, the publisher's own subscription included,
/// receives every payload. A slow subscriber that falls more than
/// `buffer_size` messages behind loses the oldest ones.
#[derive(Debug)]
pub struct MemoryPubSub {
    /// Channel name → broadcast sender
    channels: DashMap<String, broadcast::Sender<String>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryPubSub {
    /// Create a new in-memory pub/sub
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Number of live subscribers on a channel.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .get(channel)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl EventBus for MemoryPubSub {
    async fn publish(&self, channel: &str, payload: String) -> AppResult<()> {
        if let Some(tx) = self.channels.get(channel) {
            // no subscribers is not a failure on a fan-out bus
            let _ = tx.send(payload);
        }
        Ok(())
    }

    async fn subscribe(&self, channel: &str) -> AppResult<broadcast::Receiver<String>> {
        let tx = self
            .channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        Ok(tx.subscribe())
    }
}
