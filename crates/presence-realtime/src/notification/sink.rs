//! Outbound notification sinks.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

use super::intent::NotificationIntent;

/// Receives notification intents. Fire-and-forget: no acknowledgment, and
/// delivery must not block the engine.
pub trait NotificationSink: Send + Sync + std::fmt::Debug + 'static {
    /// Hands over one intent.
    fn deliver(&self, intent: NotificationIntent);
}

/// Sink forwarding intents into a bounded channel.
///
/// When the consumer falls behind, new intents are dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<NotificationIntent>,
}

impl ChannelSink {
    /// Creates a sink and the receiving end for the consumer.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<NotificationIntent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn deliver(&self, intent: NotificationIntent) {
        match self.tx.try_send(intent) {
            Ok(()) => {}
            Err(TrySendError::Full(intent)) => {
                warn!(kind = intent.kind.as_str(), actor_id = %intent.actor_id, "Notification consumer lagging; intent dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Notification consumer gone");
            }
        }
    }
}

/// Sink that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&self, intent: NotificationIntent) {
        info!(
            kind = intent.kind.as_str(),
            actor_id = %intent.actor_id,
            subject_id = %intent.subject_id,
            "Presence notification"
        );
    }
}
