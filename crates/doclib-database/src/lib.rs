//! # doclib-database
//!
//! PostgreSQL access for DocLib: connection pool management, the
//! migration runner, and one repository per aggregate. Multi-row
//! mutations run inside a single transaction so partial writes are
//! never observable.

pub mod connection;
pub mod migration;
pub mod repositories;
