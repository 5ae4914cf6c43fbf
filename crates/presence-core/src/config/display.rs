//! Display projection configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::id::ActorId;

/// Display list settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of entries in the compact view; the rest is an overflow count.
    #[serde(default = "default_cap")]
    pub cap: usize,
    /// Actors to highlight, mapped to the label shown next to them.
    #[serde(default)]
    pub highlights: HashMap<ActorId, String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cap: default_cap(),
            highlights: HashMap::new(),
        }
    }
}

fn default_cap() -> usize {
    5
}
