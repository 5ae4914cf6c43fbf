//! Per-actor aggregation of live sessions.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use presence_core::types::ActorId;

use super::session::SessionRecord;
use super::status::PresenceStatus;

/// Aggregated view of one actor across all of its live sessions.
///
/// Derived on demand from the session table; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPresence {
    /// The actor.
    pub actor_id: ActorId,
    /// Any live session is active.
    pub is_active: bool,
    /// Any live session is editing, or the actor has a fresh draft.
    pub is_editing: bool,
    /// Latest `last_seen_at` across sessions.
    pub last_activity_at: DateTime<Utc>,
    /// Number of live sessions.
    pub session_count: usize,
    /// Every live session is on a constrained device.
    pub constrained_only: bool,
}

impl ActorPresence {
    /// Display-level status.
    pub fn status(&self) -> PresenceStatus {
        PresenceStatus::from_flags(self.is_active, self.is_editing)
    }

    fn from_session(session: &SessionRecord) -> Self {
        Self {
            actor_id: session.actor_id,
            is_active: session.focus.is_active(),
            is_editing: session.editing.is_editing(),
            last_activity_at: session.last_seen_at,
            session_count: 1,
            constrained_only: session.device_class.is_constrained(),
        }
    }

    fn merge(&mut self, session: &SessionRecord) {
        self.is_active |= session.focus.is_active();
        self.is_editing |= session.editing.is_editing();
        self.last_activity_at = self.last_activity_at.max(session.last_seen_at);
        self.session_count += 1;
        self.constrained_only &= session.device_class.is_constrained();
    }
}

/// OR-merges sessions into one record per actor.
pub fn aggregate<'a>(
    sessions: impl IntoIterator<Item = &'a SessionRecord>,
    drafts: &HashSet<ActorId>,
) -> BTreeMap<ActorId, ActorPresence> {
    let mut actors: BTreeMap<ActorId, ActorPresence> = BTreeMap::new();
    for session in sessions {
        actors
            .entry(session.actor_id)
            .and_modify(|actor| actor.merge(session))
            .or_insert_with(|| ActorPresence::from_session(session));
    }
    for actor in actors.values_mut() {
        actor.is_editing |= drafts.contains(&actor.actor_id);
    }
    actors
}

/// Point-in-time set of present actors, ordered by actor id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    actors: Vec<ActorPresence>,
}

impl PresenceSnapshot {
    /// Builds a snapshot from already-aggregated actors.
    pub fn new(actors: Vec<ActorPresence>) -> Self {
        Self { actors }
    }

    /// Looks up one actor.
    pub fn get(&self, actor_id: &ActorId) -> Option<&ActorPresence> {
        self.actors.iter().find(|a| &a.actor_id == actor_id)
    }

    /// Whether an actor is present.
    pub fn contains(&self, actor_id: &ActorId) -> bool {
        self.get(actor_id).is_some()
    }

    /// Present actors.
    pub fn actors(&self) -> &[ActorPresence] {
        &self.actors
    }

    /// Number of present actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether nobody is present.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
