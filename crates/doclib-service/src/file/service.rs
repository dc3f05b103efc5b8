//! File item operations: creation, metadata, translations, access.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use doclib_core::error::AppError;
use doclib_core::events::{EventPayload, FileEvent};
use doclib_core::result::AppResult;
use doclib_core::types::pagination::{PageRequest, PageResponse};
use doclib_database::repositories::FileItemRepository;
use doclib_entity::access::{can_view, AccessLists, AccessType, Actor};
use doclib_entity::file::{CreateFileItem, FileItem, FileVersion, Translation};

use crate::dispatch::EventDispatcher;
use crate::input::{self, TranslationPayload};

/// File item CRUD with access policy enforcement.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File repository.
    files: Arc<FileItemRepository>,
    /// Audit dispatch.
    events: EventDispatcher,
}

/// Data for creating a file item directly (bypassing the request
/// workflow, e.g. by librarians).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFileItemRequest {
    /// The section to file the item under.
    pub section_id: Uuid,
    /// The category within the section.
    pub category_id: Uuid,
    /// The access policy.
    pub access_type: AccessType,
    /// Whether non-current versions are downloadable.
    pub allow_version_access: bool,
    /// Translation set; at least one is required.
    #[validate(length(min = 1, message = "At least one translation is required"), nested)]
    pub translations: Vec<TranslationPayload>,
    /// Department allow-list for restricted/department-closed policies.
    pub access_departments: Vec<Uuid>,
    /// User allow-list for the restricted policy.
    pub access_users: Vec<Uuid>,
}

/// Data for replacing a file item's access policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAccessRequest {
    /// The new access policy.
    pub access_type: AccessType,
    /// Whether non-current versions are downloadable.
    pub allow_version_access: bool,
    /// The new department allow-list.
    pub access_departments: Vec<Uuid>,
    /// The new user allow-list.
    pub access_users: Vec<Uuid>,
}

impl FileService {
    /// Create a new file service.
    pub fn new(files: Arc<FileItemRepository>, events: EventDispatcher) -> Self {
        Self { files, events }
    }

    /// Create a file item with its initial version #1 and translations.
    ///
    /// The current-version pointer stays unset until the first asset is
    /// uploaded to version #1.
    pub async fn create_file_item(
        &self,
        actor: &Actor,
        req: CreateFileItemRequest,
    ) -> AppResult<(FileItem, FileVersion)> {
        input::check(&req)?;
        let translations = input::translation_inputs(req.translations)?;

        let data = CreateFileItem {
            section_id: req.section_id,
            category_id: req.category_id,
            access_type: req.access_type,
            allow_version_access: req.allow_version_access,
            created_by: actor.user_id,
        };
        let (item, version) = self
            .files
            .create_with_initial_version(
                &data,
                &translations,
                &req.access_departments,
                &req.access_users,
            )
            .await?;

        info!(
            file_item_id = %item.id,
            category_id = %item.category_id,
            actor_id = %actor.user_id,
            "File item created"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::ItemCreated {
                file_item_id: item.id,
                section_id: item.section_id,
                category_id: item.category_id,
            }),
        );
        Ok((item, version))
    }

    /// Get a file item the actor is allowed to see.
    pub async fn get_file_item(&self, actor: &Actor, id: Uuid) -> AppResult<FileItem> {
        let item = self
            .files
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File item {id} not found")))?;

        let lists = self.access_lists(id).await?;
        if !can_view(actor, &item, &lists) {
            return Err(AppError::forbidden("You may not view this file item"));
        }
        Ok(item)
    }

    /// List the live items of a category, filtered down to what the
    /// actor may see. Totals reflect the unfiltered repository count.
    pub async fn list_by_category(
        &self,
        actor: &Actor,
        category_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<FileItem>> {
        let mut response = self.files.find_by_category(category_id, page).await?;

        let mut visible = Vec::with_capacity(response.items.len());
        for item in response.items {
            let lists = self.access_lists(item.id).await?;
            if can_view(actor, &item, &lists) {
                visible.push(item);
            }
        }
        response.items = visible;
        Ok(response)
    }

    /// The item's translation set.
    pub async fn translations(&self, actor: &Actor, id: Uuid) -> AppResult<Vec<Translation>> {
        self.get_file_item(actor, id).await?;
        self.files.find_translations(id).await
    }

    /// Replace the item's translation set.
    pub async fn update_translations(
        &self,
        actor: &Actor,
        id: Uuid,
        translations: Vec<TranslationPayload>,
    ) -> AppResult<Vec<Translation>> {
        let inputs = input::translation_inputs(translations)?;

        let item = self
            .files
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File item {id} not found")))?;
        if item.is_deleted() {
            return Err(AppError::invalid_state(
                "Cannot edit translations of a deleted file item",
            ));
        }

        let langs: Vec<String> = inputs.iter().map(|t| t.lang.clone()).collect();
        let rows = self.files.replace_translations(id, &inputs).await?;

        info!(file_item_id = %id, actor_id = %actor.user_id, "Translations replaced");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::TranslationsUpdated {
                file_item_id: id,
                langs,
            }),
        );
        Ok(rows)
    }

    /// Replace the item's access policy and allow-lists.
    pub async fn update_access(
        &self,
        actor: &Actor,
        id: Uuid,
        req: UpdateAccessRequest,
    ) -> AppResult<FileItem> {
        let item = self
            .files
            .replace_access(
                id,
                req.access_type,
                req.allow_version_access,
                &req.access_departments,
                &req.access_users,
            )
            .await?;

        info!(
            file_item_id = %id,
            access_type = %req.access_type,
            actor_id = %actor.user_id,
            "Access policy replaced"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::File(FileEvent::AccessUpdated { file_item_id: id }),
        );
        Ok(item)
    }

    /// Load an item's allow-lists as sets for the pure resolver.
    pub async fn access_lists(&self, id: Uuid) -> AppResult<AccessLists> {
        let (departments, users) = self.files.find_access_lists(id).await?;
        Ok(AccessLists::new(departments, users))
    }
}
