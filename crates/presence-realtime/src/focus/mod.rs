//! Session clock: local focus state from host visibility, focus and
//! viewport signals.

pub mod clock;
pub mod debouncer;

pub use clock::{HostEvent, SessionClock};
pub use debouncer::FocusDebouncer;
