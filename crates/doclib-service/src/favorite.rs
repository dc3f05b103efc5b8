//! Per-user favorites.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use doclib_core::error::AppError;
use doclib_core::result::AppResult;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_database::repositories::{FavoriteRepository, FileItemRepository};
use doclib_entity::access::{can_view, AccessLists, Actor};
use doclib_entity::file::FileItem;

/// Manages each user's favorites set. Both add and remove are
/// idempotent.
#[derive(Debug, Clone)]
pub struct FavoriteService {
    /// Favorites repository.
    favorites: Arc<FavoriteRepository>,
    /// File repository, for existence and visibility checks.
    files: Arc<FileItemRepository>,
}

impl FavoriteService {
    /// Create a new favorite service.
    pub fn new(favorites: Arc<FavoriteRepository>, files: Arc<FileItemRepository>) -> Self {
        Self { favorites, files }
    }

    /// Add a file item to the actor's favorites. Repeating the call is
    /// a no-op.
    pub async fn add(&self, actor: &Actor, file_item_id: Uuid) -> AppResult<()> {
        let item = self
            .files
            .find_by_id(file_item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File item {file_item_id} not found")))?;

        let (departments, users) = self.files.find_access_lists(file_item_id).await?;
        if !can_view(actor, &item, &AccessLists::new(departments, users)) {
            return Err(AppError::forbidden("You may not view this file item"));
        }

        self.favorites.add(file_item_id, actor.user_id).await?;
        debug!(file_item_id = %file_item_id, user_id = %actor.user_id, "Favorite added");
        Ok(())
    }

    /// Remove a file item from the actor's favorites. Removing an
    /// absent favorite is a no-op.
    pub async fn remove(&self, actor: &Actor, file_item_id: Uuid) -> AppResult<()> {
        self.favorites.remove(file_item_id, actor.user_id).await?;
        debug!(file_item_id = %file_item_id, user_id = %actor.user_id, "Favorite removed");
        Ok(())
    }

    /// Whether the actor has favorited the item.
    pub async fn is_favorite(&self, actor: &Actor, file_item_id: Uuid) -> AppResult<bool> {
        self.favorites.exists(file_item_id, actor.user_id).await
    }

    /// The actor's favorited items, newest favorite first. Trashed items
    /// are omitted; they reappear on restore.
    pub async fn list(
        &self,
        actor: &Actor,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileItem>> {
        self.favorites.find_items_for_user(actor.user_id, page).await
    }
}
