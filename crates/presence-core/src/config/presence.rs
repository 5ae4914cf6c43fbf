//! Liveness configuration: heartbeat, expiration and polling windows.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence liveness configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Subject type used to scope the bus channel (`presence:<type>:<id>`).
    #[serde(default = "default_subject_type")]
    pub subject_type: String,
    /// Interval between lease-refresh assertions in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Silence after which a normal session is expired, in seconds.
    #[serde(default = "default_expiration_window")]
    pub expiration_window_seconds: u64,
    /// Silence (or post-departure grace) after which a constrained session
    /// is removed, in seconds.
    #[serde(default = "default_constrained_grace")]
    pub constrained_grace_seconds: u64,
    /// Interval between expiration sweeps in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Age under which a draft still counts as an in-progress edit, in seconds.
    #[serde(default = "default_draft_staleness")]
    pub draft_staleness_seconds: u64,
    /// Interval between draft-signal polls in seconds.
    #[serde(default = "default_draft_poll_interval")]
    pub draft_poll_interval_seconds: u64,
    /// Whether this instance runs on a constrained (mobile) device.
    #[serde(default)]
    pub constrained_device: bool,
}

impl PresenceConfig {
    /// Heartbeat interval as a duration.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_seconds.max(1))
    }

    /// Normal-session expiration window.
    pub fn expiration_window(&self) -> Duration {
        Duration::from_secs(self.expiration_window_seconds)
    }

    /// Constrained-session grace window.
    pub fn constrained_grace(&self) -> Duration {
        Duration::from_secs(self.constrained_grace_seconds)
    }

    /// Sweep interval as a duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds.max(1))
    }

    /// Draft staleness window.
    pub fn draft_staleness(&self) -> Duration {
        Duration::from_secs(self.draft_staleness_seconds)
    }

    /// Draft poll interval as a duration.
    pub fn draft_poll_interval(&self) -> Duration {
        Duration::from_secs(self.draft_poll_interval_seconds.max(1))
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            subject_type: default_subject_type(),
            heartbeat_interval_seconds: default_heartbeat_interval(),
            expiration_window_seconds: default_expiration_window(),
            constrained_grace_seconds: default_constrained_grace(),
            sweep_interval_seconds: default_sweep_interval(),
            draft_staleness_seconds: default_draft_staleness(),
            draft_poll_interval_seconds: default_draft_poll_interval(),
            constrained_device: false,
        }
    }
}

fn default_subject_type() -> String {
    "document".to_string()
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_expiration_window() -> u64 {
    600
}

fn default_constrained_grace() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    10
}

fn default_draft_staleness() -> u64 {
    300
}

fn default_draft_poll_interval() -> u64 {
    10
}
