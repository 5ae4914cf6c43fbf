//! Presence engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Assertions taken off the bus
    pub assertions_received: AtomicU64,
    /// Assertions dropped as malformed
    pub assertions_malformed: AtomicU64,
    /// Assertions dropped as out of order
    pub assertions_stale: AtomicU64,
    /// Assertions published by the local session
    pub assertions_published: AtomicU64,
    /// Publishes that failed on the transport
    pub publish_failures: AtomicU64,
    /// Publishes skipped because nothing changed
    pub publishes_suppressed: AtomicU64,
    /// Sessions removed by the expiration sweep
    pub sessions_expired: AtomicU64,
    /// Notification intents delivered to the sink
    pub intents_emitted: AtomicU64,
    /// Notification intents dropped by the observer gate
    pub intents_gated: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inbound assertion
    pub fn record_received(&self) {
        self.assertions_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a malformed inbound assertion
    pub fn record_malformed(&self) {
        self.assertions_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an out-of-order inbound assertion
    pub fn record_stale(&self) {
        self.assertions_stale.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful publish
    pub fn record_published(&self) {
        self.assertions_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed publish
    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a suppressed publish
    pub fn record_suppressed(&self) {
        self.publishes_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record sessions removed by a sweep
    pub fn record_expired(&self, count: usize) {
        self.sessions_expired
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record intents delivered and intents gated by one derivation
    pub fn record_intents(&self, emitted: usize, gated: usize) {
        self.intents_emitted
            .fetch_add(emitted as u64, Ordering::Relaxed);
        self.intents_gated.fetch_add(gated as u64, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            assertions_received: self.assertions_received.load(Ordering::Relaxed),
            assertions_malformed: self.assertions_malformed.load(Ordering::Relaxed),
            assertions_stale: self.assertions_stale.load(Ordering::Relaxed),
            assertions_published: self.assertions_published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            publishes_suppressed: self.publishes_suppressed.load(Ordering::Relaxed),
            sessions_expired: self.sessions_expired.load(Ordering::Relaxed),
            intents_emitted: self.intents_emitted.load(Ordering::Relaxed),
            intents_gated: self.intents_gated.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Assertions taken off the bus
    pub assertions_received: u64,
    /// Assertions dropped as malformed
    pub assertions_malformed: u64,
    /// Assertions dropped as out of order
    pub assertions_stale: u64,
    /// Assertions published by the local session
    pub assertions_published: u64,
    /// Publishes that failed on the transport
    pub publish_failures: u64,
    /// Publishes skipped because nothing changed
    pub publishes_suppressed: u64,
    /// Sessions removed by the expiration sweep
    pub sessions_expired: u64,
    /// Notification intents delivered to the sink
    pub intents_emitted: u64,
    /// Notification intents dropped by the observer gate
    pub intents_gated: u64,
}
