//! Per-session records held by the ledger.

use chrono::{DateTime, Duration, Utc};

use presence_core::types::{ActorId, DeviceClass, EditingState, FocusState, SessionId};

use crate::message::types::PresenceAssertion;

/// Ledger key: one entry per `(actor, session)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    /// Owning actor.
    pub actor_id: ActorId,
    /// Session instance.
    pub session_id: SessionId,
}

impl SessionKey {
    /// Key of the session an assertion speaks for.
    pub fn of(assertion: &PresenceAssertion) -> Self {
        Self {
            actor_id: assertion.actor_id,
            session_id: assertion.session_id,
        }
    }
}

/// Expiration windows by session class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindows {
    /// Silence allowed for normal sessions.
    pub expiration: Duration,
    /// Silence allowed for constrained sessions, and the post-departure
    /// grace for them.
    pub constrained_grace: Duration,
}

/// One live session of an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Owning actor.
    pub actor_id: ActorId,
    /// Session instance.
    pub session_id: SessionId,
    /// Device class from the latest accepted assertion.
    pub device_class: DeviceClass,
    /// Focus state from the latest accepted assertion.
    pub focus: FocusState,
    /// Editing state from the latest accepted assertion.
    pub editing: EditingState,
    /// Sender timestamp of the latest accepted assertion. Never decreases.
    pub last_seen_at: DateTime<Utc>,
    /// Local time the session was last refreshed; expiry ages from here.
    pub refreshed_at: DateTime<Utc>,
    /// Local time a constrained session announced departure.
    pub departing_since: Option<DateTime<Utc>>,
    /// Session belongs to the local actor.
    pub is_self: bool,
}

impl SessionRecord {
    /// Creates a record from the first assertion seen for a session.
    pub fn new(
        assertion: &PresenceAssertion,
        focus: FocusState,
        now: DateTime<Utc>,
        is_self: bool,
    ) -> Self {
        Self {
            actor_id: assertion.actor_id,
            session_id: assertion.session_id,
            device_class: assertion.device_class,
            focus,
            editing: assertion.editing,
            last_seen_at: assertion.timestamp,
            refreshed_at: now,
            departing_since: None,
            is_self,
        }
    }

    /// Ledger key of this record.
    pub fn key(&self) -> SessionKey {
        SessionKey {
            actor_id: self.actor_id,
            session_id: self.session_id,
        }
    }

    /// Applies a live assertion no older than the current one. Cancels a
    /// pending departure.
    ///
    /// Only a strictly newer timestamp renews the lease: a redelivered copy
    /// carries no evidence that the sender is still there.
    pub fn apply(&mut self, assertion: &PresenceAssertion, focus: FocusState, now: DateTime<Utc>) {
        if assertion.timestamp > self.last_seen_at {
            self.refreshed_at = now;
        }
        self.device_class = assertion.device_class;
        self.focus = focus;
        self.editing = assertion.editing;
        self.last_seen_at = assertion.timestamp;
        self.departing_since = None;
    }

    /// Whether a constrained departure is pending.
    pub fn is_departing(&self) -> bool {
        self.departing_since.is_some()
    }

    /// Whether the session has outlived the window for its class.
    pub fn is_expired(&self, now: DateTime<Utc>, windows: &ExpiryWindows) -> bool {
        if let Some(since) = self.departing_since {
            return now - since > windows.constrained_grace;
        }

        let window = if self.device_class.is_constrained() {
            windows.constrained_grace
        } else {
            windows.expiration
        };
        now - self.refreshed_at > window
    }
}
