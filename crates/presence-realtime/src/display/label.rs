//! Per-actor labels and badges.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presence::actor::ActorPresence;
use crate::presence::status::PresenceStatus;

/// Status label of one present actor.
///
/// Idle actors carry the time of their last activity, not its age, so the
/// label is identical across re-renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PresenceLabel {
    /// Active and editing.
    Editing,
    /// Active, not editing.
    Active,
    /// Not active.
    IdleSince {
        /// Last activity of the actor.
        since: DateTime<Utc>,
    },
}

impl PresenceLabel {
    /// Label for one actor.
    pub fn of(presence: &ActorPresence) -> Self {
        match presence.status() {
            PresenceStatus::Editing => Self::Editing,
            PresenceStatus::Active => Self::Active,
            PresenceStatus::Idle => Self::IdleSince {
                since: presence.last_activity_at,
            },
        }
    }
}

impl fmt::Display for PresenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => write!(f, "Editing"),
            Self::Active => write!(f, "Active"),
            Self::IdleSince { since } => write!(f, "Idle since {}", since.format("%H:%M")),
        }
    }
}

/// Small marker shown next to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// The actor is editing.
    Editing,
    /// Every session of the actor is on a constrained device.
    Mobile,
}

impl Badge {
    /// Badge for one actor; editing wins over mobile.
    pub fn of(presence: &ActorPresence) -> Option<Self> {
        if presence.is_editing {
            Some(Self::Editing)
        } else if presence.constrained_only {
            Some(Self::Mobile)
        } else {
            None
        }
    }
}
