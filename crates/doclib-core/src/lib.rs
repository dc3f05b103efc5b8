//! # doclib-core
//!
//! Core crate for DocLib. Contains the unified error system, configuration
//! schemas, domain audit events, pagination types, and the traits through
//! which the engine talks to its external collaborators (blob storage,
//! audit log, notifications).
//!
//! This crate has **no** internal dependencies on other DocLib crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
