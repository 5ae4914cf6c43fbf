//! Presence wire protocol: assertion types, channel naming, serialization
//! and validation.

pub mod channel;
pub mod serializer;
pub mod types;
pub mod validator;

pub use channel::PresenceChannel;
pub use types::{AssertedState, BusMessage, PresenceAssertion};
