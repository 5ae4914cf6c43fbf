//! Presence status definitions.

use serde::{Deserialize, Serialize};

/// Display-level status of a present actor. Absence is not a status: an
/// actor without live sessions is simply not in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    /// Active and editing.
    Editing,
    /// Active, not editing.
    Active,
    /// No session is active.
    Idle,
}

impl PresenceStatus {
    /// Status for an actor's aggregated flags.
    pub fn from_flags(is_active: bool, is_editing: bool) -> Self {
        match (is_active, is_editing) {
            (true, true) => Self::Editing,
            (true, false) => Self::Active,
            (false, _) => Self::Idle,
        }
    }

    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Editing => "editing",
            Self::Active => "active",
            Self::Idle => "idle",
        }
    }
}
