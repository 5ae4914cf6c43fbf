//! Presence state enums shared by the session clock, publisher and ledger.

use serde::{Deserialize, Serialize};

/// Whether a session is being looked at right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusState {
    /// Visible, focused and in the viewport.
    Active,
    /// Anything else.
    Idle,
}

impl FocusState {
    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
        }
    }

    /// Whether this is the active state.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Whether a session holds an in-progress edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditingState {
    /// Not editing.
    #[default]
    None,
    /// Edit mode entered or a fresh draft exists.
    Editing,
}

impl EditingState {
    /// Builds the state from a boolean flag.
    pub fn from_flag(editing: bool) -> Self {
        if editing { Self::Editing } else { Self::None }
    }

    /// Whether this is the editing state.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing)
    }

    /// Converts to string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Editing => "editing",
        }
    }
}

/// Device class of a session. Constrained devices (mobile) are expired with
/// a shorter window and get a grace period on departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// Desktop-class session.
    #[default]
    Normal,
    /// Mobile or otherwise suspend-prone session.
    Constrained,
}

impl DeviceClass {
    /// Builds the class from the host's boolean form-factor input.
    pub fn from_constrained(constrained: bool) -> Self {
        if constrained { Self::Constrained } else { Self::Normal }
    }

    /// Whether this is a constrained device.
    pub fn is_constrained(&self) -> bool {
        matches!(self, Self::Constrained)
    }
}
