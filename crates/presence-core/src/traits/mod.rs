//! Boundary traits defined in `presence-core` and implemented by the engine
//! crate or by the host application.

pub mod bus;
pub mod clock;
pub mod draft;
pub mod host;

pub use bus::EventBus;
pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use draft::{DraftSignal, NoDrafts};
pub use host::{HostEnvironment, HostSignals, ManualHost};
