//! Event bus trait for pluggable pub/sub transports.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::result::AppResult;

/// Fan-out publish/subscribe channel carrying serialized assertions.
///
/// Delivery is at-least-once at best: implementations may drop, duplicate
/// or reorder messages, and a publisher normally receives its own messages
/// back on its subscription. Payloads are opaque strings; decoding and
/// validation happen on the receiving side.
#[async_trait]
pub trait EventBus: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a payload to a channel.
    async fn publish(&self, channel: &str, payload: String) -> AppResult<()>;

    /// Subscribe to a channel.
    async fn subscribe(&self, channel: &str) -> AppResult<broadcast::Receiver<String>>;
}
