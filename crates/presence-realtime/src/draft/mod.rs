//! Draft-staleness signal polling.

pub mod poller;

pub use poller::{DraftPoll, DraftPoller};
