//! Assertion publisher: change-driven and heartbeat publishing of the local
//! session's presence.

pub mod editing;
pub mod publisher;

pub use editing::EditingSignals;
pub use publisher::{AssertionPublisher, PublishOutcome};
