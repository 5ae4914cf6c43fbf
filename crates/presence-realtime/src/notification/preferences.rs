//! Per-category notification toggles.

use presence_core::config::notifications::NotificationsConfig;

use super::intent::IntentKind;

/// Decides which intent kinds are delivered at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationPreferences {
    joined: bool,
    departed: bool,
    editing_started: bool,
    editing_stopped: bool,
}

impl NotificationPreferences {
    /// Reads the toggles from configuration.
    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self {
            joined: config.joined,
            departed: config.departed,
            editing_started: config.editing_started,
            editing_stopped: config.editing_stopped,
        }
    }

    /// Every kind enabled.
    pub fn all() -> Self {
        Self {
            joined: true,
            departed: true,
            editing_started: true,
            editing_stopped: true,
        }
    }

    /// Whether intents of this kind are wanted.
    pub fn allows(&self, kind: IntentKind) -> bool {
        match kind {
            IntentKind::Joined => self.joined,
            IntentKind::Departed => self.departed,
            IntentKind::EditingStarted => self.editing_started,
            IntentKind::EditingStopped => self.editing_stopped,
        }
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self::all()
    }
}
