//! Display projector: snapshot → ordered, capped display list.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use presence_core::config::display::DisplayConfig;
use presence_core::types::ActorId;

use crate::presence::actor::{ActorPresence, PresenceSnapshot};

use super::label::{Badge, PresenceLabel};

/// Opacity of active actors.
pub const ACTIVE_OPACITY: f32 = 1.0;
/// Opacity of idle actors.
pub const IDLE_OPACITY: f32 = 0.5;

/// One display-ready actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEntry {
    /// The actor.
    pub actor_id: ActorId,
    /// Status label.
    pub label: PresenceLabel,
    /// Rendering opacity.
    pub opacity: f32,
    /// Optional badge.
    pub badge: Option<Badge>,
    /// Highlight label from settings.
    pub highlight: Option<String>,
    /// Last activity, for tooltips.
    pub last_activity_at: DateTime<Utc>,
}

/// Ordered display list with its overflow count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    /// Every present actor, in display order.
    pub entries: Vec<DisplayEntry>,
    /// Entries beyond the cap.
    pub overflow: usize,
    /// Size of the compact view.
    pub cap: usize,
}

impl DisplayList {
    /// Compact view: the first `cap` entries.
    pub fn capped(&self) -> &[DisplayEntry] {
        &self.entries[..self.entries.len().min(self.cap)]
    }

    /// Actor ids in display order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.entries.iter().map(|e| e.actor_id).collect()
    }
}

/// Pure projection of snapshots into display lists.
#[derive(Debug, Clone)]
pub struct DisplayProjector {
    cap: usize,
    highlights: HashMap<ActorId, String>,
}

impl DisplayProjector {
    /// Creates a projector from the display settings.
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            cap: config.cap,
            highlights: config.highlights.clone(),
        }
    }

    /// Editing actors first, then most recent activity first. Equal keys keep
    /// snapshot order.
    pub fn project(&self, snapshot: &PresenceSnapshot) -> DisplayList {
        let mut actors: Vec<&ActorPresence> = snapshot.actors().iter().collect();
        actors.sort_by_key(|a| (!a.is_editing, Reverse(a.last_activity_at)));

        let entries: Vec<DisplayEntry> = actors.into_iter().map(|a| self.entry(a)).collect();
        let overflow = entries.len().saturating_sub(self.cap);

        DisplayList {
            entries,
            overflow,
            cap: self.cap,
        }
    }

    fn entry(&self, presence: &ActorPresence) -> DisplayEntry {
        DisplayEntry {
            actor_id: presence.actor_id,
            label: PresenceLabel::of(presence),
            opacity: if presence.is_active {
                ACTIVE_OPACITY
            } else {
                IDLE_OPACITY
            },
            badge: Badge::of(presence),
            highlight: self.highlights.get(&presence.actor_id).cloned(),
            last_activity_at: presence.last_activity_at,
        }
    }
}

impl Default for DisplayProjector {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}
