//! File repository entities: items, versions, assets, and translations.

pub mod asset;
pub mod model;
pub mod translation;
pub mod version;

pub use asset::FileVersionAsset;
pub use model::{CreateFileItem, FileItem};
pub use translation::{Translation, TranslationInput};
pub use version::FileVersion;
