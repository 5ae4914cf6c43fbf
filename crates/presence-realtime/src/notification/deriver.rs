//! Derives notification intents from two consecutive presence snapshots.

use chrono::{DateTime, Utc};
use tracing::trace;

use presence_core::types::{ActorId, FocusState, SubjectId};

use crate::presence::actor::PresenceSnapshot;

use super::dedup::EventDeduplicator;
use super::intent::{IntentKind, NotificationIntent};
use super::preferences::NotificationPreferences;

/// Whether the local observer is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverGate {
    /// Local focus state.
    pub focus: FocusState,
    /// Host visibility.
    pub visible: bool,
}

impl ObserverGate {
    /// Gate that is always open.
    pub const OPEN: Self = Self {
        focus: FocusState::Active,
        visible: true,
    };

    /// Intents pass only while the local session is active and visible.
    pub fn is_open(&self) -> bool {
        self.focus.is_active() && self.visible
    }
}

/// Result of one derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedIntents {
    /// Intents to deliver, in actor order.
    pub intents: Vec<NotificationIntent>,
    /// Intents dropped because the observer gate was closed.
    pub gated: usize,
}

/// Compares snapshots and emits join, departure and editing-edge intents.
#[derive(Debug)]
pub struct NotificationDeriver {
    /// Subject the intents refer to.
    subject_id: SubjectId,
    /// Local actor, whose transitions are never reported.
    local_actor: ActorId,
    /// Per-kind toggles.
    preferences: NotificationPreferences,
    /// Rate gate.
    dedup: EventDeduplicator,
}

impl NotificationDeriver {
    /// Creates a deriver.
    pub fn new(
        subject_id: SubjectId,
        local_actor: ActorId,
        preferences: NotificationPreferences,
        rate_window_ms: u64,
    ) -> Self {
        Self {
            subject_id,
            local_actor,
            preferences,
            dedup: EventDeduplicator::new(rate_window_ms),
        }
    }

    /// Derives intents for the change from `before` to `after`.
    ///
    /// A closed gate drops everything; nothing is kept for later.
    pub fn derive(
        &mut self,
        before: &PresenceSnapshot,
        after: &PresenceSnapshot,
        gate: ObserverGate,
        now: DateTime<Utc>,
    ) -> DerivedIntents {
        let transitions: Vec<(IntentKind, ActorId)> = transitions(before, after)
            .into_iter()
            .filter(|(kind, actor_id)| {
                *actor_id != self.local_actor && self.preferences.allows(*kind)
            })
            .collect();

        if transitions.is_empty() {
            return DerivedIntents::default();
        }

        if !gate.is_open() {
            trace!(count = transitions.len(), "Observer not looking; intents dropped");
            return DerivedIntents {
                intents: Vec::new(),
                gated: transitions.len(),
            };
        }

        if !self.dedup.is_disabled() {
            self.dedup.cleanup(now);
        }

        let intents = transitions
            .into_iter()
            .filter(|(kind, actor_id)| self.dedup.should_dispatch(*kind, *actor_id, now))
            .map(|(kind, actor_id)| NotificationIntent {
                kind,
                actor_id,
                subject_id: self.subject_id,
                at: now,
            })
            .collect();

        DerivedIntents { intents, gated: 0 }
    }
}

fn transitions(before: &PresenceSnapshot, after: &PresenceSnapshot) -> Vec<(IntentKind, ActorId)> {
    let mut out = Vec::new();

    for actor in after.actors() {
        match before.get(&actor.actor_id) {
            None => out.push((IntentKind::Joined, actor.actor_id)),
            Some(prev) if !prev.is_editing && actor.is_editing => {
                out.push((IntentKind::EditingStarted, actor.actor_id))
            }
            Some(prev) if prev.is_editing && !actor.is_editing => {
                out.push((IntentKind::EditingStopped, actor.actor_id))
            }
            Some(_) => {}
        }
    }

    for actor in before.actors() {
        if !after.contains(&actor.actor_id) {
            out.push((IntentKind::Departed, actor.actor_id));
        }
    }

    out
}
