//! Traits through which the engine talks to external collaborators.
//!
//! The traits are defined here in `doclib-core` and implemented in the
//! satellite crates (`doclib-storage` for [`BlobStore`],
//! `doclib-database` for the database-backed [`AuditSink`]).

pub mod audit;
pub mod notify;
pub mod storage;

pub use audit::AuditSink;
pub use notify::NotificationSink;
pub use storage::{BlobStore, ByteStream, StoredBlob};
