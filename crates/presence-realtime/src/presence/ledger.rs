//! Presence ledger: the in-memory session table and the only place presence
//! state is mutated.
//!
//! Sessions are keyed by `(actor, session)`. The per-actor view is derived
//! from the session table on every [`PresenceLedger::snapshot`] call and is
//! never stored, so it cannot drift from the sessions it summarizes.
//!
//! Ordering is decided by sender timestamps only. A session never moves
//! backwards: assertions older than the session's `last_seen_at` are
//! dropped. Sessions removed by departure or expiry leave a tombstone for
//! one expiration window so that a delayed older assertion cannot bring
//! them back.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, trace, warn};

use presence_core::config::presence::PresenceConfig;
use presence_core::traits::Clock;
use presence_core::types::ActorId;

use crate::message::serializer;
use crate::message::types::PresenceAssertion;

use super::actor::{ActorPresence, PresenceSnapshot, aggregate};
use super::session::{ExpiryWindows, SessionKey, SessionRecord};

/// What [`PresenceLedger::ingest`] did with an assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First assertion for the session; record created.
    Created,
    /// Known session refreshed.
    Updated,
    /// Older than what the ledger already knows; dropped.
    Stale,
    /// Normal session removed by departure.
    Departed,
    /// Constrained session entered its departure grace window.
    Departing,
    /// Departure for a session the ledger does not hold.
    Ignored,
    /// Payload could not be decoded; dropped.
    Malformed,
}

#[derive(Debug, Clone, Copy)]
struct Tombstone {
    /// Sender timestamp at or below which assertions are dead.
    until: DateTime<Utc>,
    /// Local time of removal; the tombstone is pruned one window later.
    removed_at: DateTime<Utc>,
}

/// Authoritative in-memory store of known sessions.
#[derive(Debug)]
pub struct PresenceLedger {
    /// The local actor; excluded from snapshots.
    local_actor: ActorId,
    /// Time source for expiry.
    clock: Arc<dyn Clock>,
    /// Expiration windows by session class.
    windows: ExpiryWindows,
    /// `(actor, session)` → session record.
    sessions: HashMap<SessionKey, SessionRecord>,
    /// Recently removed sessions.
    tombstones: HashMap<SessionKey, Tombstone>,
    /// Actors the draft signal reports with a fresh draft.
    drafts: HashSet<ActorId>,
}

impl PresenceLedger {
    /// Creates an empty ledger for the given local actor.
    pub fn new(local_actor: ActorId, clock: Arc<dyn Clock>, windows: ExpiryWindows) -> Self {
        Self {
            local_actor,
            clock,
            windows,
            sessions: HashMap::new(),
            tombstones: HashMap::new(),
            drafts: HashSet::new(),
        }
    }

    /// Creates an empty ledger with windows taken from configuration.
    pub fn from_config(local_actor: ActorId, clock: Arc<dyn Clock>, config: &PresenceConfig) -> Self {
        let windows = ExpiryWindows {
            expiration: to_chrono(config.expiration_window()),
            constrained_grace: to_chrono(config.constrained_grace()),
        };
        Self::new(local_actor, clock, windows)
    }

    /// The local actor.
    pub fn local_actor(&self) -> ActorId {
        self.local_actor
    }

    /// Decodes and ingests a raw bus payload. Malformed payloads are logged
    /// and dropped.
    pub fn ingest_raw(&mut self, raw: &str) -> IngestOutcome {
        match serializer::decode_assertion(raw) {
            Ok(assertion) => self.ingest(&assertion),
            Err(e) => {
                warn!(error = %e, "Dropping malformed presence assertion");
                IngestOutcome::Malformed
            }
        }
    }

    /// Ingests one assertion, including the local actor's own echoes.
    pub fn ingest(&mut self, assertion: &PresenceAssertion) -> IngestOutcome {
        let now = self.clock.now();
        let key = SessionKey::of(assertion);

        let Some(focus) = assertion.state.focus() else {
            return self.depart(key, assertion, now);
        };

        if let Some(tombstone) = self.tombstones.get(&key) {
            if assertion.timestamp <= tombstone.until {
                trace!(actor_id = %key.actor_id, session_id = %key.session_id, "Assertion for removed session dropped");
                return IngestOutcome::Stale;
            }
            self.tombstones.remove(&key);
        }

        match self.sessions.get_mut(&key) {
            None => {
                let is_self = key.actor_id == self.local_actor;
                self.sessions
                    .insert(key, SessionRecord::new(assertion, focus, now, is_self));
                debug!(
                    actor_id = %key.actor_id,
                    session_id = %key.session_id,
                    state = focus.as_str(),
                    is_self,
                    "Session created"
                );
                IngestOutcome::Created
            }
            Some(record) => {
                let stale = if record.is_departing() {
                    assertion.timestamp <= record.last_seen_at
                } else {
                    assertion.timestamp < record.last_seen_at
                };
                if stale {
                    trace!(actor_id = %key.actor_id, session_id = %key.session_id, "Out-of-order assertion dropped");
                    return IngestOutcome::Stale;
                }
                record.apply(assertion, focus, now);
                IngestOutcome::Updated
            }
        }
    }

    fn depart(&mut self, key: SessionKey, assertion: &PresenceAssertion, now: DateTime<Utc>) -> IngestOutcome {
        let Some(record) = self.sessions.get_mut(&key) else {
            self.bury(key, assertion.timestamp, now);
            return IngestOutcome::Ignored;
        };

        if record.device_class.is_constrained() || assertion.device_class.is_constrained() {
            if record.departing_since.is_none() {
                record.departing_since = Some(now);
            }
            record.last_seen_at = record.last_seen_at.max(assertion.timestamp);
            debug!(actor_id = %key.actor_id, session_id = %key.session_id, "Constrained session departing");
            return IngestOutcome::Departing;
        }

        let until = record.last_seen_at.max(assertion.timestamp);
        self.sessions.remove(&key);
        self.bury(key, until, now);
        debug!(actor_id = %key.actor_id, session_id = %key.session_id, "Session departed");
        IngestOutcome::Departed
    }

    fn bury(&mut self, key: SessionKey, until: DateTime<Utc>, now: DateTime<Utc>) {
        let tombstone = self.tombstones.entry(key).or_insert(Tombstone {
            until,
            removed_at: now,
        });
        tombstone.until = tombstone.until.max(until);
        tombstone.removed_at = now;
    }

    /// Replaces the set of actors holding a fresh draft.
    ///
    /// Returns whether the set changed.
    pub fn apply_drafts(&mut self, drafts: HashSet<ActorId>) -> bool {
        if self.drafts == drafts {
            return false;
        }
        self.drafts = drafts;
        true
    }

    /// Removes every session that outlived the window for its class, and
    /// prunes old tombstones. Returns the number of sessions removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<SessionKey> = self
            .sessions
            .values()
            .filter(|record| record.is_expired(now, &self.windows))
            .map(SessionRecord::key)
            .collect();

        for key in &expired {
            if let Some(record) = self.sessions.remove(key) {
                debug!(
                    actor_id = %key.actor_id,
                    session_id = %key.session_id,
                    departing = record.is_departing(),
                    "Session expired"
                );
                self.bury(*key, record.last_seen_at, now);
            }
        }

        let retention = self.windows.expiration.max(self.windows.constrained_grace);
        self.tombstones
            .retain(|_, tombstone| now - tombstone.removed_at <= retention);

        expired.len()
    }

    /// Present actors other than the local one, recomputed from live sessions.
    pub fn snapshot(&self) -> PresenceSnapshot {
        let others = self.sessions.values().filter(|s| s.actor_id != self.local_actor);
        PresenceSnapshot::new(aggregate(others, &self.drafts).into_values().collect())
    }

    /// The local actor's own aggregated presence, from its echoed assertions.
    pub fn self_presence(&self) -> Option<ActorPresence> {
        let own = self.sessions.values().filter(|s| s.is_self);
        aggregate(own, &self.drafts).remove(&self.local_actor)
    }

    /// Looks up one session.
    pub fn session(&self, key: &SessionKey) -> Option<&SessionRecord> {
        self.sessions.get(key)
    }

    /// Number of live sessions, the local actor's included.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
