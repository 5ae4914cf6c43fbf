//! Notification category toggles.

use serde::{Deserialize, Serialize};

/// Which notification intents the engine emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Emit an intent when an actor appears.
    #[serde(default = "default_true")]
    pub joined: bool,
    /// Emit an intent when an actor disappears.
    #[serde(default = "default_true")]
    pub departed: bool,
    /// Emit an intent when an actor starts editing.
    #[serde(default = "default_true")]
    pub editing_started: bool,
    /// Emit an intent when an actor stops editing.
    #[serde(default = "default_true")]
    pub editing_stopped: bool,
    /// Identical intents for the same actor inside this window are dropped.
    /// `0` disables the rate gate.
    #[serde(default)]
    pub rate_window_ms: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            joined: true,
            departed: true,
            editing_started: true,
            editing_stopped: true,
            rate_window_ms: 0,
        }
    }
}

fn default_true() -> bool {
    true
}
