//! The serialized mutation path: every ledger change goes through here so
//! that intents and published views are derived from the same before/after
//! pair.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use presence_core::traits::{Clock, HostSignals};
use presence_core::types::{ActorId, FocusState};

use crate::display::projector::{DisplayList, DisplayProjector};
use crate::metrics::EngineMetrics;
use crate::notification::deriver::{NotificationDeriver, ObserverGate};
use crate::notification::sink::NotificationSink;
use crate::presence::actor::{ActorPresence, PresenceSnapshot};
use crate::presence::ledger::{IngestOutcome, PresenceLedger};

/// Read side of the published views.
#[derive(Debug, Clone)]
pub(crate) struct Views {
    pub snapshot: watch::Receiver<PresenceSnapshot>,
    pub display: watch::Receiver<DisplayList>,
    pub self_presence: watch::Receiver<Option<ActorPresence>>,
}

/// Owns the ledger and everything derived from its changes.
#[derive(Debug)]
pub(crate) struct Reconciler {
    ledger: PresenceLedger,
    deriver: NotificationDeriver,
    projector: DisplayProjector,
    sink: Arc<dyn NotificationSink>,
    metrics: Arc<EngineMetrics>,
    clock: Arc<dyn Clock>,
    focus: watch::Receiver<FocusState>,
    signals: watch::Receiver<HostSignals>,
    snapshot_tx: watch::Sender<PresenceSnapshot>,
    display_tx: watch::Sender<DisplayList>,
    self_tx: watch::Sender<Option<ActorPresence>>,
}

impl Reconciler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: PresenceLedger,
        deriver: NotificationDeriver,
        projector: DisplayProjector,
        sink: Arc<dyn NotificationSink>,
        metrics: Arc<EngineMetrics>,
        clock: Arc<dyn Clock>,
        focus: watch::Receiver<FocusState>,
        signals: watch::Receiver<HostSignals>,
    ) -> (Self, Views) {
        let snapshot = ledger.snapshot();
        let (display_tx, display) = watch::channel(projector.project(&snapshot));
        let (snapshot_tx, snapshot) = watch::channel(snapshot);
        let (self_tx, self_presence) = watch::channel(ledger.self_presence());

        let reconciler = Self {
            ledger,
            deriver,
            projector,
            sink,
            metrics,
            clock,
            focus,
            signals,
            snapshot_tx,
            display_tx,
            self_tx,
        };
        let views = Views {
            snapshot,
            display,
            self_presence,
        };
        (reconciler, views)
    }

    /// Ingests one raw bus payload.
    pub fn ingest_raw(&mut self, raw: &str) -> IngestOutcome {
        self.metrics.record_received();
        let outcome = self.mutate(|ledger| ledger.ingest_raw(raw));
        match outcome {
            IngestOutcome::Malformed => self.metrics.record_malformed(),
            IngestOutcome::Stale => self.metrics.record_stale(),
            _ => {}
        }
        outcome
    }

    /// Runs one expiration sweep.
    pub fn sweep(&mut self) -> usize {
        let removed = self.mutate(PresenceLedger::sweep);
        if removed > 0 {
            self.metrics.record_expired(removed);
            debug!(removed, "Expired sessions swept");
        }
        removed
    }

    /// Replaces the fresh-draft set.
    pub fn apply_drafts(&mut self, drafts: HashSet<ActorId>) {
        self.mutate(|ledger| ledger.apply_drafts(drafts));
    }

    fn mutate<R>(&mut self, f: impl FnOnce(&mut PresenceLedger) -> R) -> R {
        let before = self.snapshot_tx.borrow().clone();
        let result = f(&mut self.ledger);
        self.publish(before);
        result
    }

    fn publish(&mut self, before: PresenceSnapshot) {
        let after = self.ledger.snapshot();

        let gate = ObserverGate {
            focus: *self.focus.borrow(),
            visible: self.signals.borrow().visible,
        };
        let derived = self
            .deriver
            .derive(&before, &after, gate, self.clock.now());
        self.metrics
            .record_intents(derived.intents.len(), derived.gated);
        for intent in derived.intents {
            self.sink.deliver(intent);
        }

        if after != before {
            self.display_tx.send_replace(self.projector.project(&after));
            self.snapshot_tx.send_replace(after);
        }

        let own = self.ledger.self_presence();
        self.self_tx.send_if_modified(|current| {
            if *current == own {
                return false;
            }
            *current = own;
            true
        });
    }
}
