//! File repository services.

pub mod service;
pub mod version;

pub use service::{CreateFileItemRequest, FileService, UpdateAccessRequest};
pub use version::VersionService;
