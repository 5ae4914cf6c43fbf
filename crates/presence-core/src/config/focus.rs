//! Session clock configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Focus derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Delay applied to focus-loss transitions, in milliseconds.
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
    /// Fallback poll interval for hosts whose focus events do not bubble.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl FocusConfig {
    /// Debounce as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_debounce() -> u64 {
    100
}

fn default_poll_interval() -> u64 {
    2000
}
