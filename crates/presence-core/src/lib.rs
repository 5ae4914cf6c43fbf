//! # presence-core
//!
//! Core crate for the subject presence engine. Contains configuration
//! schemas, typed identifiers, the presence state enums shared by every
//! component, the boundary traits (clock, event bus, draft signal, host
//! environment) and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
