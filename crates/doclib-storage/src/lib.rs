//! # doclib-storage
//!
//! Blob storage for DocLib asset payloads. The database layer persists
//! only the opaque handles produced here; the bytes themselves never
//! touch PostgreSQL.

pub mod local;
pub mod reclaim;

pub use local::LocalBlobStore;
pub use reclaim::BlobReclaimer;
