//! Engines talking to each other over a shared in-memory bus, on paused
//! tokio time.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use presence_core::config::AppConfig;
use presence_core::error::ErrorKind;
use presence_core::traits::{EventBus, HostSignals};
use presence_core::types::{ActorId, FocusState, SubjectId};
use presence_realtime::notification::IntentKind;
use presence_realtime::{EngineDeps, EngineIdentity, HostEvent, MemoryPubSub, PresenceEngine};

use helpers::{FlakyBus, RecordingSink, settle, start_node, tokio_clock};

fn shared_bus() -> Arc<MemoryPubSub> {
    Arc::new(MemoryPubSub::new(256))
}

#[tokio::test(start_paused = true)]
async fn test_join_is_seen_and_heartbeat_catches_up_late_subscriber() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;

    assert!(a.engine.snapshot().contains(&b.actor));
    assert_eq!(a.sink.count(b.actor, IntentKind::Joined), 1);
    assert!(!b.engine.snapshot().contains(&a.actor));

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(b.engine.snapshot().contains(&a.actor));
    assert_eq!(a.engine.display().actor_ids(), vec![b.actor]);

    a.engine.shutdown().await;
    b.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_local_actor_is_excluded_but_echo_is_tracked() {
    let bus = shared_bus();
    let a = start_node(bus, tokio_clock(), &AppConfig::default(), ActorId::new(), SubjectId::new()).await;
    settle().await;

    assert!(a.engine.snapshot().is_empty());
    let own = a.engine.self_presence().expect("own echo should be tracked");
    assert_eq!(own.actor_id, a.actor);
    assert!(own.is_active);
    assert!(a.sink.intents().is_empty());

    a.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_departs_and_stops_every_task() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;
    assert!(b.engine.active_tasks() > 0);

    b.engine.shutdown().await;
    assert!(b.engine.is_shutting_down());
    assert_eq!(b.engine.active_tasks(), 0);

    settle().await;
    assert!(!a.engine.snapshot().contains(&b.actor));
    assert_eq!(a.sink.kinds_for(b.actor), vec![IntentKind::Joined, IntentKind::Departed]);

    a.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_silent_peer_expires_after_window() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();
    let flaky = Arc::new(FlakyBus::new(bus.clone()));

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(flaky.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;
    assert!(a.engine.snapshot().contains(&b.actor));

    flaky.set_down(true);
    tokio::time::sleep(Duration::from_secs(590)).await;
    assert!(a.engine.snapshot().contains(&b.actor));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(!a.engine.snapshot().contains(&b.actor));
    assert_eq!(a.sink.count(b.actor, IntentKind::Departed), 1);
    assert!(a.engine.metrics().sessions_expired >= 1);
    assert!(b.engine.metrics().publish_failures >= 1);
    assert!(a.engine.self_presence().is_some());

    a.engine.shutdown().await;
    b.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_publisher_recovers_after_outage() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();
    let flaky = Arc::new(FlakyBus::new(bus.clone()));
    flaky.set_down(true);

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(flaky.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;
    assert!(!a.engine.snapshot().contains(&b.actor));
    assert_eq!(b.engine.metrics().publish_failures, 1);

    flaky.set_down(false);
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(a.engine.snapshot().contains(&b.actor));

    a.engine.shutdown().await;
    b.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_constrained_departure_waits_for_grace() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let mut phone_config = AppConfig::default();
    phone_config.presence.constrained_device = true;
    let subject = SubjectId::new();

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(bus.clone(), clock.clone(), &phone_config, ActorId::new(), subject).await;
    settle().await;

    b.engine.shutdown().await;
    settle().await;
    assert!(a.engine.snapshot().contains(&b.actor));
    assert_eq!(a.sink.count(b.actor, IntentKind::Departed), 0);

    tokio::time::sleep(Duration::from_secs(75)).await;
    assert!(!a.engine.snapshot().contains(&b.actor));
    assert_eq!(a.sink.count(b.actor, IntentKind::Departed), 1);

    a.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_edit_mode_propagates_as_editing_edges() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let b = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;

    b.engine.set_edit_mode(true);
    settle().await;
    assert!(a.engine.snapshot().get(&b.actor).unwrap().is_editing);

    b.engine.set_edit_mode(false);
    settle().await;
    assert!(!a.engine.snapshot().get(&b.actor).unwrap().is_editing);

    assert_eq!(
        a.sink.kinds_for(b.actor),
        vec![
            IntentKind::Joined,
            IntentKind::EditingStarted,
            IntentKind::EditingStopped
        ]
    );

    a.engine.shutdown().await;
    b.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_hidden_observer_gets_no_notifications() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();

    let a = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    a.host.set(HostSignals::HIDDEN);
    a.engine.host_event(HostEvent::Visibility(false));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(a.engine.local_focus(), FocusState::Idle);

    let b = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    settle().await;

    assert!(a.engine.snapshot().contains(&b.actor));
    assert!(a.sink.intents().is_empty());
    assert!(a.engine.metrics().intents_gated >= 1);

    // the observer's own idle state reaches the other side
    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(!b.engine.snapshot().get(&a.actor).unwrap().is_active);

    a.engine.shutdown().await;
    b.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_two_sessions_of_one_actor_merge() {
    let bus = shared_bus();
    let clock = tokio_clock();
    let config = AppConfig::default();
    let subject = SubjectId::new();
    let shared_actor = ActorId::new();

    let observer = start_node(bus.clone(), clock.clone(), &config, ActorId::new(), subject).await;
    let first = start_node(bus.clone(), clock.clone(), &config, shared_actor, subject).await;
    let second = start_node(bus.clone(), clock.clone(), &config, shared_actor, subject).await;
    settle().await;

    let presence = observer.engine.snapshot().get(&shared_actor).cloned().unwrap();
    assert_eq!(presence.session_count, 2);
    assert_eq!(observer.sink.count(shared_actor, IntentKind::Joined), 1);

    first.engine.shutdown().await;
    settle().await;
    assert!(observer.engine.snapshot().contains(&shared_actor));
    assert_eq!(observer.sink.count(shared_actor, IntentKind::Departed), 0);

    second.engine.shutdown().await;
    settle().await;
    assert!(!observer.engine.snapshot().contains(&shared_actor));
    assert_eq!(observer.sink.count(shared_actor, IntentKind::Departed), 1);

    observer.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_is_counted_and_skipped() {
    let bus = shared_bus();
    let a = start_node(bus.clone(), tokio_clock(), &AppConfig::default(), ActorId::new(), SubjectId::new()).await;
    settle().await;

    bus.publish(a.engine.channel(), "not json".to_string())
        .await
        .unwrap();
    settle().await;

    let metrics = a.engine.metrics();
    assert_eq!(metrics.assertions_malformed, 1);
    assert!(a.engine.self_presence().is_some());

    a.engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_invalid_subject_type_is_rejected() {
    let mut config = AppConfig::default();
    config.presence.subject_type = "not valid!".to_string();
    let deps = EngineDeps {
        bus: shared_bus(),
        clock: tokio_clock(),
        host: Arc::new(presence_core::traits::ManualHost::new(HostSignals::ACTIVE)),
        drafts: Arc::new(presence_core::traits::NoDrafts),
        sink: Arc::new(RecordingSink::default()),
    };

    let err = PresenceEngine::start(
        &config,
        EngineIdentity::new(ActorId::new(), SubjectId::new()),
        deps,
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
