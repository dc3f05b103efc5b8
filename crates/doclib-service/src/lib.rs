//! # doclib-service
//!
//! Business logic services for DocLib. Each service orchestrates
//! repositories, blob storage, and event dispatch to implement one area
//! of the engine: the department/category trees, the versioned file
//! repository, the publication request workflow, favorites, and the
//! download ledger.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references. The caller supplies an
//! [`Actor`] for every operation; authentication itself happens outside
//! this crate.

pub mod dispatch;
pub mod download;
pub mod favorite;
pub mod file;
pub mod hierarchy;
pub mod input;
pub mod request;
pub mod trash;

pub use doclib_entity::access::Actor;

pub use dispatch::EventDispatcher;
pub use download::DownloadService;
pub use favorite::FavoriteService;
pub use file::{FileService, VersionService};
pub use hierarchy::HierarchyService;
pub use input::TranslationPayload;
pub use request::RequestService;
pub use trash::TrashService;
