//! Rate gate for repeated intents within a time window.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use presence_core::types::ActorId;

use super::intent::IntentKind;

/// Deduplication key
type DedupKey = (IntentKind, ActorId);

/// Suppresses an intent when the same kind fired for the same actor less
/// than one window ago. A zero window lets everything through.
#[derive(Debug)]
pub struct EventDeduplicator {
    /// Window duration
    window: Duration,
    /// Last dispatch time per key
    last_seen: HashMap<DedupKey, DateTime<Utc>>,
}

impl EventDeduplicator {
    /// Create a new deduplicator with the given window
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: i64::try_from(window_ms)
                .ok()
                .and_then(Duration::try_milliseconds)
                .unwrap_or(Duration::MAX),
            last_seen: HashMap::new(),
        }
    }

    /// Whether the gate is disabled.
    pub fn is_disabled(&self) -> bool {
        self.window <= Duration::zero()
    }

    /// Check if an intent should be dispatched or suppressed.
    ///
    /// Returns `true` if the intent should proceed, `false` if it's a repeat.
    pub fn should_dispatch(&mut self, kind: IntentKind, actor_id: ActorId, now: DateTime<Utc>) -> bool {
        if self.is_disabled() {
            return true;
        }

        let key = (kind, actor_id);
        if let Some(last) = self.last_seen.get(&key) {
            if now - *last < self.window {
                return false;
            }
        }

        self.last_seen.insert(key, now);
        true
    }

    /// Drop entries older than ten windows
    pub fn cleanup(&mut self, now: DateTime<Utc>) {
        let cutoff = self.window.checked_mul(10).unwrap_or(Duration::MAX);
        self.last_seen.retain(|_, v| now - *v < cutoff);
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}
