//! # doclib-entity
//!
//! Domain entity models for DocLib. Every struct in this crate represents
//! a database table row or a domain value object. All entities derive
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and database entities
//! additionally derive `sqlx::FromRow`.
//!
//! The crate also carries the pure domain logic with non-trivial
//! invariants: the access resolver, the request status state machine,
//! and the hierarchy tree index.

pub mod access;
pub mod download;
pub mod favorite;
pub mod file;
pub mod hierarchy;
pub mod request;
