//! Presence assertion wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use presence_core::types::{ActorId, DeviceClass, EditingState, FocusState, SessionId};

/// State asserted by a session: a focus state, or terminal departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertedState {
    /// Session is being looked at.
    Active,
    /// Session is open but not being looked at.
    Idle,
    /// Session is going away.
    Departed,
}

impl AssertedState {
    /// The focus state carried by a live assertion; `None` for departures.
    pub fn focus(&self) -> Option<FocusState> {
        match self {
            Self::Active => Some(FocusState::Active),
            Self::Idle => Some(FocusState::Idle),
            Self::Departed => None,
        }
    }

    /// Whether this is a departure.
    pub fn is_departed(&self) -> bool {
        matches!(self, Self::Departed)
    }
}

impl From<FocusState> for AssertedState {
    fn from(focus: FocusState) -> Self {
        match focus {
            FocusState::Active => Self::Active,
            FocusState::Idle => Self::Idle,
        }
    }
}

/// One session's current state as published on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceAssertion {
    /// Actor owning the session.
    pub actor_id: ActorId,
    /// Session instance.
    pub session_id: SessionId,
    /// Focus state or departure.
    pub state: AssertedState,
    /// Editing state.
    #[serde(default)]
    pub editing: EditingState,
    /// Sender's clock at publication; the only ordering signal.
    pub timestamp: DateTime<Utc>,
    /// Device class of the session.
    #[serde(default)]
    pub device_class: DeviceClass,
}

impl PresenceAssertion {
    /// Build a live assertion.
    pub fn live(
        actor_id: ActorId,
        session_id: SessionId,
        focus: FocusState,
        editing: EditingState,
        timestamp: DateTime<Utc>,
        device_class: DeviceClass,
    ) -> Self {
        Self {
            actor_id,
            session_id,
            state: focus.into(),
            editing,
            timestamp,
            device_class,
        }
    }

    /// Build a departure assertion.
    pub fn departed(
        actor_id: ActorId,
        session_id: SessionId,
        timestamp: DateTime<Utc>,
        device_class: DeviceClass,
    ) -> Self {
        Self {
            actor_id,
            session_id,
            state: AssertedState::Departed,
            editing: EditingState::None,
            timestamp,
            device_class,
        }
    }
}

/// Messages carried on a presence channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMessage {
    /// A presence assertion.
    PresenceAssertion(PresenceAssertion),
}
