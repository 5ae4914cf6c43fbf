//! Display projection of presence snapshots.

pub mod label;
pub mod projector;

pub use label::{Badge, PresenceLabel};
pub use projector::{DisplayEntry, DisplayList, DisplayProjector};
