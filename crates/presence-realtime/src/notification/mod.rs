//! Notification intents: derivation from snapshot transitions, per-kind
//! toggles, rate gating and delivery sinks.

pub mod dedup;
pub mod deriver;
pub mod intent;
pub mod preferences;
pub mod sink;

pub use deriver::{DerivedIntents, NotificationDeriver, ObserverGate};
pub use intent::{IntentKind, NotificationIntent};
pub use preferences::NotificationPreferences;
pub use sink::{ChannelSink, LogSink, NotificationSink};
