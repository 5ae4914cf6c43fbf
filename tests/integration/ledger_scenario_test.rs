//! Ledger, deriver and projector driven together through full presence
//! lifecycles on a manual clock.

mod helpers;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use presence_core::traits::{Clock, ManualClock};
use presence_core::types::{ActorId, DeviceClass, EditingState, FocusState, SessionId, SubjectId};
use presence_realtime::display::label::PresenceLabel;
use presence_realtime::message::serializer;
use presence_realtime::notification::{
    IntentKind, NotificationDeriver, NotificationPreferences, ObserverGate,
};
use presence_realtime::presence::{ExpiryWindows, IngestOutcome, PresenceLedger, PresenceSnapshot};
use presence_realtime::{DisplayProjector, PresenceAssertion};

/// Observer-side pipeline: every change is pushed through the deriver the
/// same way the engine does it.
struct Observer {
    clock: Arc<ManualClock>,
    ledger: PresenceLedger,
    deriver: NotificationDeriver,
    current: PresenceSnapshot,
    kinds: Vec<(IntentKind, ActorId)>,
}

impl Observer {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(helpers::epoch()));
        let me = ActorId::new();
        let ledger = PresenceLedger::new(
            me,
            clock.clone(),
            ExpiryWindows {
                expiration: Duration::minutes(10),
                constrained_grace: Duration::seconds(60),
            },
        );
        let deriver =
            NotificationDeriver::new(SubjectId::new(), me, NotificationPreferences::all(), 0);
        Self {
            clock,
            ledger,
            deriver,
            current: PresenceSnapshot::default(),
            kinds: Vec::new(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn refresh(&mut self) {
        let after = self.ledger.snapshot();
        let derived = self
            .deriver
            .derive(&self.current, &after, ObserverGate::OPEN, self.clock.now());
        self.kinds
            .extend(derived.intents.iter().map(|i| (i.kind, i.actor_id)));
        self.current = after;
    }

    fn receive(&mut self, assertion: &PresenceAssertion) -> IngestOutcome {
        let raw = serializer::encode_assertion(assertion).unwrap();
        let outcome = self.ledger.ingest_raw(&raw);
        self.refresh();
        outcome
    }

    fn sweep(&mut self) -> usize {
        let removed = self.ledger.sweep();
        self.refresh();
        removed
    }

    fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    fn count(&self, kind: IntentKind) -> usize {
        self.kinds.iter().filter(|(k, _)| *k == kind).count()
    }
}

fn live(
    actor: ActorId,
    session: SessionId,
    focus: FocusState,
    editing: EditingState,
    at: DateTime<Utc>,
) -> PresenceAssertion {
    PresenceAssertion::live(actor, session, focus, editing, at, DeviceClass::Normal)
}

#[test]
fn test_active_editing_idle_absent_lifecycle() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    let s = SessionId::new();
    let t0 = obs.now();

    obs.receive(&live(a, s, FocusState::Active, EditingState::None, t0));
    assert!(obs.current.get(&a).unwrap().is_active);

    obs.advance(Duration::seconds(3));
    obs.receive(&live(
        a,
        s,
        FocusState::Active,
        EditingState::Editing,
        t0 + Duration::seconds(3),
    ));
    assert!(obs.current.get(&a).unwrap().is_editing);

    obs.advance(Duration::minutes(6));
    let idle_at = t0 + Duration::seconds(3) + Duration::minutes(6);
    obs.receive(&live(a, s, FocusState::Idle, EditingState::None, idle_at));
    let presence = obs.current.get(&a).unwrap().clone();
    assert!(!presence.is_active && !presence.is_editing);
    assert_eq!(presence.last_activity_at, idle_at);

    // periodic sweeps inside the window keep the actor
    for _ in 0..59 {
        obs.advance(Duration::seconds(10));
        assert_eq!(obs.sweep(), 0);
    }
    assert!(obs.current.contains(&a));

    obs.advance(Duration::seconds(20));
    assert_eq!(obs.sweep(), 1);
    assert!(!obs.current.contains(&a));

    assert_eq!(obs.count(IntentKind::Joined), 1);
    assert_eq!(obs.count(IntentKind::EditingStarted), 1);
    assert_eq!(obs.count(IntentKind::EditingStopped), 1);
    assert_eq!(obs.count(IntentKind::Departed), 1);
}

#[test]
fn test_delivery_order_does_not_change_outcome() {
    let a = ActorId::new();
    let s = SessionId::new();
    let base = helpers::epoch();
    let sequence = [
        live(a, s, FocusState::Active, EditingState::None, base),
        live(a, s, FocusState::Active, EditingState::Editing, base + Duration::seconds(1)),
        live(a, s, FocusState::Idle, EditingState::Editing, base + Duration::seconds(2)),
        live(a, s, FocusState::Idle, EditingState::None, base + Duration::seconds(3)),
    ];

    let mut orders = Vec::new();
    permutations(&mut [0, 1, 2, 3], 4, &mut orders);
    assert_eq!(orders.len(), 24);

    for order in orders {
        let mut obs = Observer::new();
        for i in order {
            obs.receive(&sequence[i]);
        }
        let presence = obs.current.get(&a).unwrap();
        assert!(!presence.is_active, "order {:?}", order);
        assert!(!presence.is_editing, "order {:?}", order);
        assert_eq!(presence.last_activity_at, base + Duration::seconds(3));
    }
}

fn permutations(items: &mut [usize; 4], k: usize, out: &mut Vec<[usize; 4]>) {
    if k == 1 {
        out.push(*items);
        return;
    }
    permutations(items, k - 1, out);
    for i in 0..k - 1 {
        if k % 2 == 0 {
            items.swap(i, k - 1);
        } else {
            items.swap(0, k - 1);
        }
        permutations(items, k - 1, out);
    }
}

#[test]
fn test_duplicate_delivery_is_idempotent() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    let assertion = live(a, SessionId::new(), FocusState::Active, EditingState::Editing, obs.now());

    obs.receive(&assertion);
    let once = obs.current.clone();
    obs.receive(&assertion);
    obs.receive(&assertion);

    assert_eq!(obs.current, once);
    assert_eq!(obs.count(IntentKind::Joined), 1);

    // a late copy of the same assertion is not a sign of life
    obs.advance(Duration::minutes(9));
    obs.receive(&assertion);
    obs.advance(Duration::minutes(1) + Duration::seconds(1));
    assert_eq!(obs.sweep(), 1);
    assert!(!obs.current.contains(&a));
    assert_eq!(obs.count(IntentKind::Departed), 1);
}

#[test]
fn test_departure_is_not_resurrected_by_late_heartbeat() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    let s = SessionId::new();
    let t0 = obs.now();

    obs.receive(&live(a, s, FocusState::Active, EditingState::None, t0));
    obs.receive(&PresenceAssertion::departed(
        a,
        s,
        t0 + Duration::seconds(5),
        DeviceClass::Normal,
    ));
    assert!(!obs.current.contains(&a));

    let late = obs.receive(&live(
        a,
        s,
        FocusState::Active,
        EditingState::None,
        t0 + Duration::seconds(2),
    ));
    assert_eq!(late, IngestOutcome::Stale);
    assert!(!obs.current.contains(&a));
    assert_eq!(obs.count(IntentKind::Departed), 1);
}

#[test]
fn test_multi_session_actor_reported_once() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    let desktop = SessionId::new();
    let phone = SessionId::new();
    let t0 = obs.now();

    obs.receive(&live(a, desktop, FocusState::Idle, EditingState::None, t0));
    obs.receive(&PresenceAssertion::live(
        a,
        phone,
        FocusState::Active,
        EditingState::None,
        t0 + Duration::seconds(1),
        DeviceClass::Constrained,
    ));
    assert_eq!(obs.current.len(), 1);
    assert!(obs.current.get(&a).unwrap().is_active);

    obs.receive(&PresenceAssertion::departed(
        a,
        desktop,
        t0 + Duration::seconds(2),
        DeviceClass::Normal,
    ));
    assert!(obs.current.contains(&a));
    assert_eq!(obs.count(IntentKind::Joined), 1);
    assert_eq!(obs.count(IntentKind::Departed), 0);
}

#[test]
fn test_constrained_grace_then_removal() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    let s = SessionId::new();
    let t0 = obs.now();

    let phone = |focus, at| {
        PresenceAssertion::live(a, s, focus, EditingState::None, at, DeviceClass::Constrained)
    };
    obs.receive(&phone(FocusState::Active, t0));
    obs.receive(&PresenceAssertion::departed(
        a,
        s,
        t0 + Duration::seconds(1),
        DeviceClass::Constrained,
    ));
    assert_eq!(obs.count(IntentKind::Departed), 0);
    assert!(obs.current.contains(&a));

    // backgrounding briefly and coming back keeps the actor present
    obs.advance(Duration::seconds(30));
    obs.receive(&phone(FocusState::Active, t0 + Duration::seconds(31)));
    obs.advance(Duration::seconds(45));
    assert_eq!(obs.sweep(), 0);
    assert!(obs.current.contains(&a));

    obs.receive(&PresenceAssertion::departed(
        a,
        s,
        t0 + Duration::seconds(80),
        DeviceClass::Constrained,
    ));
    obs.advance(Duration::seconds(61));
    assert_eq!(obs.sweep(), 1);
    assert!(!obs.current.contains(&a));
    assert_eq!(obs.count(IntentKind::Departed), 1);
}

#[test]
fn test_fresh_draft_counts_as_editing() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    obs.receive(&live(a, SessionId::new(), FocusState::Active, EditingState::None, obs.now()));

    assert!(obs.ledger.apply_drafts(HashSet::from([a])));
    obs.refresh();
    assert!(obs.current.get(&a).unwrap().is_editing);

    assert!(obs.ledger.apply_drafts(HashSet::new()));
    obs.refresh();
    assert!(!obs.current.get(&a).unwrap().is_editing);
    assert_eq!(obs.count(IntentKind::EditingStarted), 1);
    assert_eq!(obs.count(IntentKind::EditingStopped), 1);
}

#[test]
fn test_display_orders_editors_then_recency() {
    let mut obs = Observer::new();
    let now = obs.now();
    let (b, c, d) = (ActorId::new(), ActorId::new(), ActorId::new());

    obs.receive(&live(b, SessionId::new(), FocusState::Idle, EditingState::None, now - Duration::seconds(5)));
    obs.receive(&live(c, SessionId::new(), FocusState::Active, EditingState::Editing, now - Duration::seconds(50)));
    obs.receive(&live(d, SessionId::new(), FocusState::Idle, EditingState::None, now - Duration::seconds(1)));

    let list = DisplayProjector::default().project(&obs.current);
    assert_eq!(list.actor_ids(), vec![c, d, b]);
    assert_eq!(list.entries[0].label, PresenceLabel::Editing);
    assert_eq!(
        list.entries[1].label,
        PresenceLabel::IdleSince {
            since: now - Duration::seconds(1)
        }
    );
}

#[test]
fn test_malformed_payload_leaves_ledger_untouched() {
    let mut obs = Observer::new();
    let a = ActorId::new();
    obs.receive(&live(a, SessionId::new(), FocusState::Active, EditingState::None, obs.now()));
    let before = obs.current.clone();

    assert_eq!(obs.ledger.ingest_raw("{\"type\":\"presence_assertion\"}"), IngestOutcome::Malformed);
    assert_eq!(obs.ledger.ingest_raw("garbage"), IngestOutcome::Malformed);
    obs.refresh();

    assert_eq!(obs.current, before);
}
