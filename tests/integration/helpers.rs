//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::broadcast;

use presence_core::config::AppConfig;
use presence_core::error::AppError;
use presence_core::result::AppResult;
use presence_core::traits::{Clock, EventBus, HostSignals, ManualHost, NoDrafts, TokioClock};
use presence_core::types::{ActorId, SubjectId};
use presence_realtime::notification::{IntentKind, NotificationIntent, NotificationSink};
use presence_realtime::{EngineDeps, EngineIdentity, MemoryPubSub, PresenceEngine};

/// Fixed start time for deterministic clocks.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 12, 9, 30, 0).unwrap()
}

/// Sink that keeps every delivered intent.
#[derive(Debug, Default)]
pub struct RecordingSink {
    intents: Mutex<Vec<NotificationIntent>>,
}

impl RecordingSink {
    /// All intents delivered so far.
    pub fn intents(&self) -> Vec<NotificationIntent> {
        self.intents.lock().unwrap().clone()
    }

    /// Kinds delivered for one actor, in order.
    pub fn kinds_for(&self, actor: ActorId) -> Vec<IntentKind> {
        self.intents
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.actor_id == actor)
            .map(|i| i.kind)
            .collect()
    }

    /// Number of intents of one kind for one actor.
    pub fn count(&self, actor: ActorId, kind: IntentKind) -> usize {
        self.kinds_for(actor).into_iter().filter(|k| *k == kind).count()
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&self, intent: NotificationIntent) {
        self.intents.lock().unwrap().push(intent);
    }
}

/// Event bus whose publishing can be switched off, simulating a network
/// outage for one node.
#[derive(Debug)]
pub struct FlakyBus {
    inner: Arc<MemoryPubSub>,
    down: AtomicBool,
}

impl FlakyBus {
    /// Wraps a shared in-memory bus.
    pub fn new(inner: Arc<MemoryPubSub>) -> Self {
        Self {
            inner,
            down: AtomicBool::new(false),
        }
    }

    /// Toggle the outage.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventBus for FlakyBus {
    async fn publish(&self, channel: &str, payload: String) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::transport("network unreachable"));
        }
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> AppResult<broadcast::Receiver<String>> {
        self.inner.subscribe(channel).await
    }
}

/// One engine plus the handles a test needs to steer and observe it.
pub struct TestNode {
    pub engine: PresenceEngine,
    pub actor: ActorId,
    pub host: Arc<ManualHost>,
    pub sink: Arc<RecordingSink>,
}

/// Starts an engine for `actor` on `subject`.
pub async fn start_node(
    bus: Arc<dyn EventBus>,
    clock: Arc<dyn Clock>,
    config: &AppConfig,
    actor: ActorId,
    subject: SubjectId,
) -> TestNode {
    let host = Arc::new(ManualHost::new(HostSignals::ACTIVE));
    let sink = Arc::new(RecordingSink::default());
    let deps = EngineDeps {
        bus,
        clock,
        host: host.clone(),
        drafts: Arc::new(NoDrafts),
        sink: sink.clone(),
    };
    let engine = PresenceEngine::start(config, EngineIdentity::new(actor, subject), deps)
        .await
        .expect("engine should start");

    TestNode {
        engine,
        actor,
        host,
        sink,
    }
}

/// Clock following paused tokio time, anchored at [`epoch`].
pub fn tokio_clock() -> Arc<dyn Clock> {
    Arc::new(TokioClock::anchored_at(epoch()))
}

/// Lets spawned tasks run without moving far in (paused) time.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
