//! Presence engine: one instance per local session, wiring the session
//! clock, publisher, ledger, deriver and projector to a bus and an explicit
//! set of background tasks.

mod reconciler;
mod tasks;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use presence_core::config::AppConfig;
use presence_core::result::AppResult;
use presence_core::traits::{Clock, DraftSignal, EventBus, HostEnvironment};
use presence_core::types::{ActorId, DeviceClass, FocusState, SessionId, SubjectId};

use crate::display::projector::{DisplayList, DisplayProjector};
use crate::draft::poller::DraftPoller;
use crate::focus::clock::{HostEvent, SessionClock};
use crate::message::channel::PresenceChannel;
use crate::message::validator;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::notification::deriver::NotificationDeriver;
use crate::notification::preferences::NotificationPreferences;
use crate::notification::sink::NotificationSink;
use crate::presence::actor::{ActorPresence, PresenceSnapshot};
use crate::presence::ledger::PresenceLedger;
use crate::publisher::editing::EditingSignals;
use crate::publisher::publisher::AssertionPublisher;

use self::reconciler::{Reconciler, Views};

/// Capacity of the host event queue.
const HOST_EVENT_BUFFER: usize = 64;

/// Who this engine instance speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineIdentity {
    /// Local actor.
    pub actor_id: ActorId,
    /// This instance; unique per engine.
    pub session_id: SessionId,
    /// Subject whose presence is tracked.
    pub subject_id: SubjectId,
}

impl EngineIdentity {
    /// Identity with a fresh random session id.
    pub fn new(actor_id: ActorId, subject_id: SubjectId) -> Self {
        Self {
            actor_id,
            session_id: SessionId::new(),
            subject_id,
        }
    }
}

/// External collaborators injected into an engine.
#[derive(Debug, Clone)]
pub struct EngineDeps {
    /// Fan-out transport.
    pub bus: Arc<dyn EventBus>,
    /// Wall-clock source for timestamps and expiry.
    pub clock: Arc<dyn Clock>,
    /// Readable host signals.
    pub host: Arc<dyn HostEnvironment>,
    /// Draft-staleness signal.
    pub drafts: Arc<dyn DraftSignal>,
    /// Notification destination.
    pub sink: Arc<dyn NotificationSink>,
}

/// Handle to a running presence engine.
///
/// Dropping the handle cancels every task; [`PresenceEngine::shutdown`]
/// additionally waits for them to finish.
#[derive(Debug)]
pub struct PresenceEngine {
    identity: EngineIdentity,
    channel: String,
    reconciler: Arc<Mutex<Reconciler>>,
    views: Views,
    focus: watch::Receiver<FocusState>,
    events_tx: mpsc::Sender<HostEvent>,
    editing_tx: Arc<watch::Sender<EditingSignals>>,
    metrics: Arc<EngineMetrics>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl PresenceEngine {
    /// Builds the engine and spawns its tasks on the current runtime.
    ///
    /// Only an unusable subject channel name is an error. A bus that cannot
    /// be reached leaves the engine running local-only until it recovers.
    pub async fn start(
        config: &AppConfig,
        identity: EngineIdentity,
        deps: EngineDeps,
    ) -> AppResult<Self> {
        let channel =
            PresenceChannel::new(config.presence.subject_type.clone(), identity.subject_id)
                .to_channel_string();
        validator::validate_channel_name(&channel)?;

        let metrics = Arc::new(EngineMetrics::new());
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let (clock, focus) = SessionClock::new(deps.host.clone(), &config.focus);
        let signals = clock.subscribe_signals();

        let ledger = PresenceLedger::from_config(identity.actor_id, deps.clock.clone(), &config.presence);
        let deriver = NotificationDeriver::new(
            identity.subject_id,
            identity.actor_id,
            NotificationPreferences::from_config(&config.notifications),
            config.notifications.rate_window_ms,
        );
        let (reconciler, views) = Reconciler::new(
            ledger,
            deriver,
            DisplayProjector::new(&config.display),
            deps.sink.clone(),
            metrics.clone(),
            deps.clock.clone(),
            focus.clone(),
            signals,
        );
        let reconciler = Arc::new(Mutex::new(reconciler));

        let (events_tx, events_rx) = mpsc::channel(HOST_EVENT_BUFFER);
        let (editing_tx, editing_rx) = watch::channel(EditingSignals::default());
        let editing_tx = Arc::new(editing_tx);

        let publisher = AssertionPublisher::new(
            deps.bus.clone(),
            channel.clone(),
            identity.actor_id,
            identity.session_id,
            DeviceClass::from_constrained(config.presence.constrained_device),
            deps.clock.clone(),
        );
        let poller = DraftPoller::new(
            deps.drafts.clone(),
            identity.subject_id,
            identity.actor_id,
            config.presence.draft_staleness(),
        );

        let receiver = tasks::subscribe(&deps.bus, &channel).await;

        tracker.spawn(clock.run(events_rx, cancel.child_token()));
        tracker.spawn(tasks::run_inbound(
            deps.bus.clone(),
            channel.clone(),
            receiver,
            reconciler.clone(),
            config.presence.heartbeat_interval(),
            cancel.child_token(),
        ));
        tracker.spawn(tasks::run_sweep(
            reconciler.clone(),
            config.presence.sweep_interval(),
            cancel.child_token(),
        ));
        tracker.spawn(tasks::run_drafts(
            poller,
            reconciler.clone(),
            editing_tx.clone(),
            focus.clone(),
            config.presence.draft_poll_interval(),
            cancel.child_token(),
        ));
        tracker.spawn(tasks::run_publisher(
            publisher,
            focus.clone(),
            editing_rx,
            metrics.clone(),
            config.presence.heartbeat_interval(),
            cancel.child_token(),
        ));
        tracker.close();

        info!(
            actor_id = %identity.actor_id,
            session_id = %identity.session_id,
            channel = %channel,
            tasks = tracker.len(),
            "Presence engine started"
        );

        Ok(Self {
            identity,
            channel,
            reconciler,
            views,
            focus,
            events_tx,
            editing_tx,
            metrics,
            cancel,
            tracker,
        })
    }

    /// Identity of this instance.
    pub fn identity(&self) -> EngineIdentity {
        self.identity
    }

    /// Bus channel this engine publishes and listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Pushes a host signal change to the session clock.
    pub fn host_event(&self, event: HostEvent) {
        if let Err(e) = self.events_tx.try_send(event) {
            warn!(event = ?event, error = %e, "Host event dropped");
        }
    }

    /// Sets the explicit edit-mode signal.
    pub fn set_edit_mode(&self, on: bool) {
        self.editing_tx.send_if_modified(|signals| {
            if signals.edit_mode == on {
                return false;
            }
            signals.edit_mode = on;
            true
        });
    }

    /// Present actors other than the local one.
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.views.snapshot.borrow().clone()
    }

    /// Receiver notified on every snapshot change.
    pub fn subscribe_snapshot(&self) -> watch::Receiver<PresenceSnapshot> {
        self.views.snapshot.clone()
    }

    /// Current display list.
    pub fn display(&self) -> DisplayList {
        self.views.display.borrow().clone()
    }

    /// Receiver notified on every display list change.
    pub fn subscribe_display(&self) -> watch::Receiver<DisplayList> {
        self.views.display.clone()
    }

    /// Local focus state as derived by the session clock.
    pub fn local_focus(&self) -> FocusState {
        *self.focus.borrow()
    }

    /// The local actor's own presence, as echoed back by the bus.
    pub fn self_presence(&self) -> Option<ActorPresence> {
        self.views.self_presence.borrow().clone()
    }

    /// Runs an expiration sweep now, outside the regular interval.
    pub async fn sweep(&self) -> usize {
        self.reconciler.lock().await.sweep()
    }

    /// Current counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Number of background tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels every task and waits for them to stop. The departure
    /// assertion is sent in the background and not awaited.
    pub async fn shutdown(&self) {
        info!(session_id = %self.identity.session_id, "Shutting down presence engine");
        self.cancel.cancel();
        self.tracker.wait().await;
        info!(session_id = %self.identity.session_id, "Presence engine shut down");
    }
}

impl Drop for PresenceEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
