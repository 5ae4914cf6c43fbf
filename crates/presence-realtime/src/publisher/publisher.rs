//! Publishes the local session's presence assertions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace, warn};

use presence_core::traits::{Clock, EventBus};
use presence_core::types::{ActorId, DeviceClass, EditingState, FocusState, SessionId};

use crate::message::serializer;
use crate::message::types::PresenceAssertion;

/// What a publish attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Handed to the bus.
    Published,
    /// Nothing changed since the last successful publish.
    Suppressed,
    /// The bus rejected it; logged.
    Failed,
}

/// Assertion publisher for one local session.
///
/// Transport failures are logged and reported as [`PublishOutcome::Failed`],
/// never returned as errors. A failed publish leaves the last published
/// state untouched so the next change or heartbeat retries it.
#[derive(Debug)]
pub struct AssertionPublisher {
    /// Event bus.
    bus: Arc<dyn EventBus>,
    /// Subject channel.
    channel: String,
    /// Local actor.
    actor_id: ActorId,
    /// Local session.
    session_id: SessionId,
    /// Local device class.
    device_class: DeviceClass,
    /// Timestamp source.
    clock: Arc<dyn Clock>,
    /// State to assert on the next heartbeat.
    current: (FocusState, EditingState),
    /// State of the last successful publish.
    last_published: Option<(FocusState, EditingState)>,
    /// Timestamp of the last assertion built.
    last_timestamp: Option<DateTime<Utc>>,
}

impl AssertionPublisher {
    /// Creates a publisher. Nothing is sent until the first publish.
    pub fn new(
        bus: Arc<dyn EventBus>,
        channel: impl Into<String>,
        actor_id: ActorId,
        session_id: SessionId,
        device_class: DeviceClass,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bus,
            channel: channel.into(),
            actor_id,
            session_id,
            device_class,
            clock,
            current: (FocusState::Idle, EditingState::None),
            last_published: None,
            last_timestamp: None,
        }
    }

    /// Local session id.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// State of the last successful publish.
    pub fn last_published(&self) -> Option<(FocusState, EditingState)> {
        self.last_published
    }

    /// Publishes the given state unless it equals the last successful one.
    pub async fn publish(&mut self, focus: FocusState, editing: EditingState) -> PublishOutcome {
        self.current = (focus, editing);
        if self.last_published == Some(self.current) {
            trace!(session_id = %self.session_id, "Unchanged presence not republished");
            return PublishOutcome::Suppressed;
        }
        self.send_current().await
    }

    /// Re-publishes the current state regardless of the last one.
    pub async fn heartbeat(&mut self) -> PublishOutcome {
        self.send_current().await
    }

    /// Sends one best-effort departure. Not retried.
    pub async fn depart(mut self) -> PublishOutcome {
        let timestamp = self.next_timestamp();
        let assertion = PresenceAssertion::departed(
            self.actor_id,
            self.session_id,
            timestamp,
            self.device_class,
        );
        let outcome = self.send(&assertion).await;
        debug!(session_id = %self.session_id, outcome = ?outcome, "Departure sent");
        outcome
    }

    async fn send_current(&mut self) -> PublishOutcome {
        let (focus, editing) = self.current;
        let timestamp = self.next_timestamp();
        let assertion = PresenceAssertion::live(
            self.actor_id,
            self.session_id,
            focus,
            editing,
            timestamp,
            self.device_class,
        );
        let outcome = self.send(&assertion).await;
        if outcome == PublishOutcome::Published {
            self.last_published = Some(self.current);
        }
        outcome
    }

    async fn send(&self, assertion: &PresenceAssertion) -> PublishOutcome {
        let payload = match serializer::encode_assertion(assertion) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode presence assertion");
                return PublishOutcome::Failed;
            }
        };

        match self.bus.publish(&self.channel, payload).await {
            Ok(()) => {
                trace!(
                    channel = %self.channel,
                    state = ?assertion.state,
                    editing = assertion.editing.as_str(),
                    "Presence assertion published"
                );
                PublishOutcome::Published
            }
            Err(e) => {
                warn!(channel = %self.channel, error = %e, "Presence publish failed");
                PublishOutcome::Failed
            }
        }
    }

    /// Timestamps are strictly increasing per publisher even if the clock
    /// stalls or steps back.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}
