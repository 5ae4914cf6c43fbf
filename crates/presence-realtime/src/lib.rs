//! # presence-realtime
//!
//! Presence reconciliation engine. Provides:
//!
//! - Session clock deriving the local focus state from host signals
//! - Assertion publisher with heartbeat and change-driven publishing
//! - Presence ledger merging sessions per actor with class-specific expiry
//! - Notification deriver emitting join/leave/editing intents
//! - Display projector producing an ordered, capped presence list
//! - In-memory and Redis pub/sub bridges for the event bus

pub mod bridge;
pub mod display;
pub mod draft;
pub mod engine;
pub mod focus;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod presence;
pub mod publisher;

pub use bridge::memory_pubsub::MemoryPubSub;
pub use display::projector::{DisplayList, DisplayProjector};
pub use engine::{EngineDeps, EngineIdentity, PresenceEngine};
pub use focus::clock::{HostEvent, SessionClock};
pub use message::types::PresenceAssertion;
pub use notification::sink::NotificationSink;
pub use presence::ledger::PresenceLedger;
pub use publisher::publisher::AssertionPublisher;
