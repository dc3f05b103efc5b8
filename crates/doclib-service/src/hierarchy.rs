//! Department and category tree operations.

use std::sync::Arc;

use moka::future::Cache;
use tracing::info;
use uuid::Uuid;

use doclib_core::error::AppError;
use doclib_core::events::{EventPayload, HierarchyEvent};
use doclib_core::result::AppResult;
use doclib_database::repositories::{CategoryRepository, DepartmentRepository};
use doclib_entity::access::Actor;
use doclib_entity::file::Translation;
use doclib_entity::hierarchy::{Category, Department, TreeIndex};

use crate::dispatch::EventDispatcher;
use crate::input::{self, TranslationPayload};

/// Manages the department and category trees: creation, re-parenting
/// with cycle rejection and subtree depth recomputation, deletion, and
/// root-to-node path resolution.
///
/// Paths are fronted by an advisory in-process cache, invalidated on
/// every mutating tree operation. The database rows stay authoritative.
#[derive(Debug, Clone)]
pub struct HierarchyService {
    /// Department tree repository.
    departments: Arc<DepartmentRepository>,
    /// Category tree repository.
    categories: Arc<CategoryRepository>,
    /// Path cache keyed by `"dept:{id}"` / `"cat:{id}"`.
    path_cache: Cache<String, Vec<String>>,
    /// Audit dispatch.
    events: EventDispatcher,
}

impl HierarchyService {
    /// Create a new hierarchy service.
    pub fn new(
        departments: Arc<DepartmentRepository>,
        categories: Arc<CategoryRepository>,
        events: EventDispatcher,
    ) -> Self {
        let path_cache = Cache::builder().max_capacity(10_000).build();
        Self {
            departments,
            categories,
            path_cache,
            events,
        }
    }

    // --- departments ---

    /// Create a department under an optional parent.
    pub async fn create_department(
        &self,
        actor: &Actor,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Department> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Department name cannot be empty"));
        }

        let depth = match parent_id {
            Some(pid) => {
                let parent = self
                    .departments
                    .find_by_id(pid)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Department {pid} not found")))?;
                parent.depth + 1
            }
            None => 1,
        };

        let department = self.departments.create(parent_id, name, depth).await?;
        self.path_cache.invalidate_all();

        info!(department_id = %department.id, depth, "Department created");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeCreated {
                tree: "department".to_string(),
                node_id: department.id,
                parent_id,
            }),
        );
        Ok(department)
    }

    /// Re-parent a department. Moving a node under itself or one of its
    /// descendants is rejected with `Conflict`; on success the depths of
    /// the whole moved subtree are recomputed breadth-first.
    pub async fn move_department(
        &self,
        actor: &Actor,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Department> {
        let tree = self.department_tree().await?;
        check_move(&tree, id, new_parent_id, "Department")?;

        let assignments = tree.recompute_depths(id, new_parent_id);
        let department = self.departments.reparent(id, new_parent_id, &assignments).await?;
        self.path_cache.invalidate_all();

        info!(
            department_id = %id,
            subtree_size = assignments.len(),
            "Department moved"
        );
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeMoved {
                tree: "department".to_string(),
                node_id: id,
                new_parent_id,
            }),
        );
        Ok(department)
    }

    /// Delete a department. The cascading foreign key removes the whole
    /// subtree, so the delete is refused with `Conflict` while file item
    /// allow-lists reference the department or any of its descendants.
    pub async fn delete_department(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let tree = self.department_tree().await?;
        if !tree.contains(id) {
            return Err(AppError::not_found(format!("Department {id} not found")));
        }
        let mut subtree = vec![id];
        subtree.extend(tree.descendants_of(id));

        let references = self.departments.count_file_references(&subtree).await?;
        if references > 0 {
            return Err(AppError::conflict(format!(
                "Department subtree is referenced by {references} file access rule(s)"
            )));
        }

        if !self.departments.delete(id).await? {
            return Err(AppError::not_found(format!("Department {id} not found")));
        }
        self.path_cache.invalidate_all();

        info!(department_id = %id, "Department deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeDeleted {
                tree: "department".to_string(),
                node_id: id,
            }),
        );
        Ok(())
    }

    /// Root-to-node department names.
    pub async fn department_path(&self, id: Uuid) -> AppResult<Vec<String>> {
        let key = format!("dept:{id}");
        if let Some(path) = self.path_cache.get(&key).await {
            return Ok(path);
        }

        let tree = self.department_tree().await?;
        if !tree.contains(id) {
            return Err(AppError::not_found(format!("Department {id} not found")));
        }
        let path = tree.path_of(id);
        self.path_cache.insert(key, path.clone()).await;
        Ok(path)
    }

    /// All departments, for tree rendering by callers.
    pub async fn list_departments(&self) -> AppResult<Vec<Department>> {
        self.departments.find_all().await
    }

    async fn department_tree(&self) -> AppResult<TreeIndex> {
        let rows = self.departments.find_all().await?;
        Ok(TreeIndex::from_rows(
            rows.into_iter().map(|d| (d.id, d.parent_id, d.depth, d.name)),
        ))
    }

    // --- categories ---

    /// Create a category in a section, under an optional parent.
    pub async fn create_category(
        &self,
        actor: &Actor,
        section_id: Uuid,
        parent_id: Option<Uuid>,
        title: &str,
    ) -> AppResult<Category> {
        if title.trim().is_empty() {
            return Err(AppError::validation("Category title cannot be empty"));
        }

        let depth = match parent_id {
            Some(pid) => {
                let parent = self
                    .categories
                    .find_by_id(pid)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Category {pid} not found")))?;
                if parent.section_id != section_id {
                    return Err(AppError::validation(
                        "Parent category belongs to a different section",
                    ));
                }
                parent.depth + 1
            }
            None => 1,
        };

        let category = self
            .categories
            .create(section_id, parent_id, title, depth)
            .await?;
        self.path_cache.invalidate_all();

        info!(category_id = %category.id, section_id = %section_id, depth, "Category created");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeCreated {
                tree: "category".to_string(),
                node_id: category.id,
                parent_id,
            }),
        );
        Ok(category)
    }

    /// Re-parent a category with the same cycle and depth rules as
    /// [`Self::move_department`].
    pub async fn move_category(
        &self,
        actor: &Actor,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Category> {
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        let tree = self.category_tree(category.section_id).await?;
        check_move(&tree, id, new_parent_id, "Category")?;

        let assignments = tree.recompute_depths(id, new_parent_id);
        let category = self.categories.reparent(id, new_parent_id, &assignments).await?;
        self.path_cache.invalidate_all();

        info!(category_id = %id, subtree_size = assignments.len(), "Category moved");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeMoved {
                tree: "category".to_string(),
                node_id: id,
                new_parent_id,
            }),
        );
        Ok(category)
    }

    /// Delete a category. Refused with `Conflict` while file items or
    /// publication requests are still filed under it. Children are
    /// detached: their parent becomes NULL and each detached subtree
    /// gets root-based depths again.
    pub async fn delete_category(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        let references = self.categories.count_file_references(id).await?;
        if references > 0 {
            return Err(AppError::conflict(format!(
                "Category still holds {references} file item(s) or request(s)"
            )));
        }

        // The children are promoted to roots, so every detached subtree
        // needs its depths rebased.
        let tree = self.category_tree(category.section_id).await?;
        let mut assignments = Vec::new();
        for child in tree.children_of(id) {
            assignments.extend(tree.recompute_depths(*child, None));
        }

        if !self.categories.delete_detaching_children(id, &assignments).await? {
            return Err(AppError::not_found(format!("Category {id} not found")));
        }
        self.path_cache.invalidate_all();

        info!(category_id = %id, detached = tree.children_of(id).len(), "Category deleted");
        self.events.emit(
            Some(actor.user_id),
            EventPayload::Hierarchy(HierarchyEvent::NodeDeleted {
                tree: "category".to_string(),
                node_id: id,
            }),
        );
        Ok(())
    }

    /// Root-to-node category titles.
    pub async fn category_path(&self, id: Uuid) -> AppResult<Vec<String>> {
        let key = format!("cat:{id}");
        if let Some(path) = self.path_cache.get(&key).await {
            return Ok(path);
        }

        let category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
        let tree = self.category_tree(category.section_id).await?;
        let path = tree.path_of(id);
        self.path_cache.insert(key, path.clone()).await;
        Ok(path)
    }

    /// Categories of a section.
    pub async fn list_categories(&self, section_id: Uuid) -> AppResult<Vec<Category>> {
        self.categories.find_by_section(section_id).await
    }

    /// Replace a category's translation set.
    pub async fn update_category_translations(
        &self,
        actor: &Actor,
        id: Uuid,
        translations: Vec<TranslationPayload>,
    ) -> AppResult<Vec<Translation>> {
        let inputs = input::translation_inputs(translations)?;

        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        let rows = self.categories.replace_translations(id, &inputs).await?;
        info!(category_id = %id, actor_id = %actor.user_id, "Category translations replaced");
        Ok(rows)
    }

    async fn category_tree(&self, section_id: Uuid) -> AppResult<TreeIndex> {
        let rows = self.categories.find_by_section(section_id).await?;
        Ok(TreeIndex::from_rows(
            rows.into_iter().map(|c| (c.id, c.parent_id, c.depth, c.title)),
        ))
    }
}

/// Shared move validation: existence, parent existence, cycle rejection.
fn check_move(
    tree: &TreeIndex,
    id: Uuid,
    new_parent_id: Option<Uuid>,
    kind: &str,
) -> AppResult<()> {
    if !tree.contains(id) {
        return Err(AppError::not_found(format!("{kind} {id} not found")));
    }
    if let Some(parent) = new_parent_id {
        if !tree.contains(parent) {
            return Err(AppError::not_found(format!("{kind} {parent} not found")));
        }
        if parent == id || tree.would_create_cycle(id, parent) {
            return Err(AppError::conflict(format!(
                "Moving the {} under its own subtree would create a cycle",
                kind.to_lowercase()
            )));
        }
    }
    Ok(())
}
