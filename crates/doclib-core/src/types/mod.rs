//! Core type definitions used across the DocLib workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
