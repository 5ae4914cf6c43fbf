//! Presence ledger: session table, per-actor aggregation and expiry.

pub mod actor;
pub mod ledger;
pub mod session;
pub mod status;

pub use actor::{ActorPresence, PresenceSnapshot};
pub use ledger::{IngestOutcome, PresenceLedger};
pub use session::{ExpiryWindows, SessionKey, SessionRecord};
pub use status::PresenceStatus;
