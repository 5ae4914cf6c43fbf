//! Core type definitions used across the presence workspace.

pub mod id;
pub mod presence;

pub use id::*;
pub use presence::{DeviceClass, EditingState, FocusState};
