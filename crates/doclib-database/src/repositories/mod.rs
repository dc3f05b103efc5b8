//! Repository implementations, one per aggregate.

pub mod audit;
pub mod download;
pub mod favorite;
pub mod file;
pub mod hierarchy;
pub mod request;

pub use audit::{AuditLogEntry, DatabaseAuditSink};
pub use download::DownloadRepository;
pub use favorite::FavoriteRepository;
pub use file::FileItemRepository;
pub use hierarchy::{CategoryRepository, DepartmentRepository};
pub use request::{ApprovalOutcome, CreateRequest, RequestRepository};
