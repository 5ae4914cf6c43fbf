//! Background tasks owned by one engine instance.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use presence_core::traits::EventBus;
use presence_core::types::{EditingState, FocusState};

use crate::draft::poller::DraftPoller;
use crate::metrics::EngineMetrics;
use crate::publisher::editing::EditingSignals;
use crate::publisher::publisher::{AssertionPublisher, PublishOutcome};

use super::reconciler::Reconciler;

/// Subscribes to `channel`, logging a failure.
pub(crate) async fn subscribe(
    bus: &Arc<dyn EventBus>,
    channel: &str,
) -> Option<broadcast::Receiver<String>> {
    match bus.subscribe(channel).await {
        Ok(rx) => Some(rx),
        Err(e) => {
            warn!(channel = %channel, error = %e, "Presence subscription failed; running local-only");
            None
        }
    }
}

/// Feeds bus payloads into the ledger. A lost subscription is retried every
/// `retry` until it comes back.
pub(crate) async fn run_inbound(
    bus: Arc<dyn EventBus>,
    channel: String,
    mut receiver: Option<broadcast::Receiver<String>>,
    reconciler: Arc<Mutex<Reconciler>>,
    retry: Duration,
    cancel: CancellationToken,
) {
    loop {
        let Some(rx) = receiver.as_mut() else {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = time::sleep(retry) => {
                    receiver = subscribe(&bus, &channel).await;
                    if receiver.is_some() {
                        info!(channel = %channel, "Presence subscription restored");
                    }
                }
            }
            continue;
        };

        let closed = tokio::select! {
            _ = cancel.cancelled() => break,
            message = rx.recv() => match message {
                Ok(raw) => {
                    reconciler.lock().await.ingest_raw(&raw);
                    false
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(channel = %channel, skipped, "Presence subscriber lagged; assertions skipped");
                    false
                }
                Err(RecvError::Closed) => {
                    warn!(channel = %channel, "Presence subscription closed");
                    true
                }
            },
        };
        if closed {
            receiver = None;
        }
    }

    debug!(channel = %channel, "Inbound task stopped");
}

/// Runs the expiration sweep on a fixed interval.
pub(crate) async fn run_sweep(
    reconciler: Arc<Mutex<Reconciler>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut interval = time::interval_at(Instant::now() + every, every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                reconciler.lock().await.sweep();
            }
        }
    }

    debug!("Sweep task stopped");
}

/// Polls the draft signal while the local session is active.
pub(crate) async fn run_drafts(
    poller: DraftPoller,
    reconciler: Arc<Mutex<Reconciler>>,
    editing: Arc<watch::Sender<EditingSignals>>,
    focus: watch::Receiver<FocusState>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut interval = time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !focus.borrow().is_active() {
                    continue;
                }
                match poller.poll_once().await {
                    Ok(poll) => {
                        reconciler.lock().await.apply_drafts(poll.drafts);
                        editing.send_if_modified(|signals| {
                            if signals.fresh_draft == poll.local {
                                return false;
                            }
                            signals.fresh_draft = poll.local;
                            true
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Draft signal poll failed; keeping previous drafts");
                    }
                }
            }
        }
    }

    debug!("Draft task stopped");
}

/// Publishes the local session's state on change and on every heartbeat.
/// On cancellation the departure is sent from a detached task so that
/// shutdown never waits on the transport.
pub(crate) async fn run_publisher(
    mut publisher: AssertionPublisher,
    mut focus: watch::Receiver<FocusState>,
    mut editing: watch::Receiver<EditingSignals>,
    metrics: Arc<EngineMetrics>,
    heartbeat: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = current(&mut focus, &mut editing);
    record(&metrics, publisher.publish(state.0, state.1).await);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = focus.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = current(&mut focus, &mut editing);
                record(&metrics, publisher.publish(state.0, state.1).await);
            }
            changed = editing.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = current(&mut focus, &mut editing);
                record(&metrics, publisher.publish(state.0, state.1).await);
            }
            _ = ticker.tick() => {
                record(&metrics, publisher.heartbeat().await);
            }
        }
    }

    let session_id = publisher.session_id();
    tokio::spawn(publisher.depart());
    debug!(session_id = %session_id, "Publisher task stopped");
}

fn current(
    focus: &mut watch::Receiver<FocusState>,
    editing: &mut watch::Receiver<EditingSignals>,
) -> (FocusState, EditingState) {
    let focus = *focus.borrow_and_update();
    let editing = editing.borrow_and_update().state();
    (focus, editing)
}

fn record(metrics: &EngineMetrics, outcome: PublishOutcome) {
    match outcome {
        PublishOutcome::Published => metrics.record_published(),
        PublishOutcome::Suppressed => metrics.record_suppressed(),
        PublishOutcome::Failed => metrics.record_publish_failure(),
    }
}
