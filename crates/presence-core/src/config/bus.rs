//! Event bus configuration.

use serde::{Deserialize, Serialize};

/// Event bus backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// `"memory"` (single process) or `"redis"` (requires the `redis-pubsub` feature).
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Buffer size for broadcast channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            redis_url: default_redis_url(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_channel_buffer() -> usize {
    256
}
