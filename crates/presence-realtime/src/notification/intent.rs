//! Notification intents handed to the host's notification surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use presence_core::types::{ActorId, SubjectId};

/// Kind of presence transition worth telling the observer about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Absent → present.
    Joined,
    /// Present → absent, by departure or expiry.
    Departed,
    /// `is_editing` false → true.
    EditingStarted,
    /// `is_editing` true → false.
    EditingStopped,
}

impl IntentKind {
    /// Convert to string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Joined => "joined",
            Self::Departed => "departed",
            Self::EditingStarted => "editing_started",
            Self::EditingStopped => "editing_stopped",
        }
    }
}

/// One fire-and-forget notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationIntent {
    /// What happened.
    pub kind: IntentKind,
    /// Who it happened to.
    pub actor_id: ActorId,
    /// Subject the presence is scoped to.
    pub subject_id: SubjectId,
    /// When the transition was observed locally.
    pub at: DateTime<Utc>,
}
