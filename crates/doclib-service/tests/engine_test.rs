//! End-to-end engine tests over a live PostgreSQL instance.

mod helpers;

use bytes::Bytes;
use uuid::Uuid;

use doclib_core::error::ErrorKind;
use doclib_core::traits::storage::StoredBlob;
use doclib_core::types::pagination::PageRequest;
use doclib_entity::access::AccessType;
use doclib_entity::request::{RequestStatus, RequestType};
use doclib_service::file::CreateFileItemRequest;
use doclib_service::request::SubmitRequest;

use helpers::{librarian, member, translations, TestEngine};

fn new_item_request(category_id: Uuid) -> CreateFileItemRequest {
    CreateFileItemRequest {
        section_id: Uuid::new_v4(),
        category_id,
        access_type: AccessType::Public,
        allow_version_access: false,
        translations: translations("Operating manual"),
        access_departments: Vec::new(),
        access_users: Vec::new(),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_new_request_approval_end_to_end() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let submitter = member(None);
    let approver = librarian();

    let request = engine
        .requests
        .submit(
            &submitter,
            SubmitRequest {
                section_id: Uuid::new_v4(),
                category_id: category.id,
                access_type: AccessType::Public,
                request_type: RequestType::New,
                file_item_id: None,
                comment: Some("Initial publication".to_string()),
                translations: vec![
                    doclib_service::TranslationPayload {
                        lang: "ru".to_string(),
                        title: "Руководство".to_string(),
                        description: None,
                    },
                    doclib_service::TranslationPayload {
                        lang: "en".to_string(),
                        title: "Manual".to_string(),
                        description: None,
                    },
                ],
                access_departments: Vec::new(),
                access_users: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    engine
        .requests
        .upload_staged_asset(
            &submitter,
            request.id,
            "ru",
            "manual_ru.pdf",
            Some("application/pdf"),
            Bytes::from("russian payload"),
        )
        .await
        .unwrap();
    engine
        .requests
        .upload_staged_asset(
            &submitter,
            request.id,
            "en",
            "manual_en.pdf",
            Some("application/pdf"),
            Bytes::from("english payload"),
        )
        .await
        .unwrap();

    let outcome = engine.requests.approve(&approver, request.id).await.unwrap();
    assert_eq!(outcome.version.version_number, 1);

    // Staged rows moved, not copied.
    let staged = engine.requests.staged_assets(request.id).await.unwrap();
    assert!(staged.is_empty());
    let assets = engine.versions.list_assets(outcome.version.id).await.unwrap();
    assert_eq!(assets.len(), 2);

    // The promoted version is current and downloadable.
    let item = engine
        .files
        .get_file_item(&submitter, outcome.file_item_id)
        .await
        .unwrap();
    assert_eq!(item.current_version_id, Some(outcome.version.id));
    let (asset, _stream) = engine
        .downloads
        .download_asset(&submitter, assets[0].id)
        .await
        .unwrap();
    assert_eq!(asset.version_id, outcome.version.id);

    // A second resolution attempt fails cleanly.
    let err = engine.requests.approve(&approver, request.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
    let err = engine
        .requests
        .reject(&approver, request.id, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_current_version_requires_reassignment_before_delete() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (item, v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();

    // No asset yet, so nothing is current.
    assert_eq!(item.current_version_id, None);

    // The first upload promotes version #1 to current.
    engine
        .versions
        .upload_asset(&actor, v1.id, "en", "doc.pdf", None, Bytes::from("v1"))
        .await
        .unwrap();
    let item = engine.files.get_file_item(&actor, item.id).await.unwrap();
    assert_eq!(item.current_version_id, Some(v1.id));

    let v2 = engine
        .versions
        .create_version(&actor, item.id, Some("revised"))
        .await
        .unwrap();
    assert_eq!(v2.version_number, 2);

    // Deleting the current version is refused until reassigned.
    let err = engine.versions.delete_version(&actor, v1.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    engine
        .versions
        .set_current_version(&actor, item.id, v2.id)
        .await
        .unwrap();
    engine.versions.delete_version(&actor, v1.id).await.unwrap();

    // A deleted version cannot become current again.
    let err = engine
        .versions
        .set_current_version(&actor, item.id, v1.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_concurrent_version_numbers_stay_distinct() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (item, _v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        engine.versions.create_version(&actor, item.id, None),
        engine.versions.create_version(&actor, item.id, None),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.version_number, b.version_number);
    assert_eq!(
        {
            let mut numbers = vec![a.version_number, b.version_number];
            numbers.sort_unstable();
            numbers
        },
        vec![2, 3]
    );
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_duplicate_asset_language_conflict() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (_item, v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();

    engine
        .versions
        .upload_asset(&actor, v1.id, "en", "a.pdf", None, Bytes::from("one"))
        .await
        .unwrap();
    let err = engine
        .versions
        .upload_asset(&actor, v1.id, "en", "b.pdf", None, Bytes::from("two"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_asset_insert_rechecks_version_liveness() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (item, v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();
    engine
        .versions
        .upload_asset(&actor, v1.id, "en", "doc.pdf", None, Bytes::from("v1"))
        .await
        .unwrap();
    let v2 = engine
        .versions
        .create_version(&actor, item.id, None)
        .await
        .unwrap();
    engine.versions.delete_version(&actor, v2.id).await.unwrap();

    // Even when callers skip the pre-check, the repository refuses to
    // attach an asset to a deleted or missing version.
    let blob = StoredBlob {
        path: "aa/bb/orphan.bin".to_string(),
        checksum_sha256: "0".repeat(64),
        size_bytes: 4,
    };
    let err = engine
        .file_repo
        .insert_asset(v2.id, "en", "late.pdf", None, &blob)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    let err = engine
        .file_repo
        .insert_asset(Uuid::new_v4(), "en", "late.pdf", None, &blob)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_category_delete_blocked_by_request() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let submitter = member(None);

    engine
        .requests
        .submit(
            &submitter,
            SubmitRequest {
                section_id: Uuid::new_v4(),
                category_id: category.id,
                access_type: AccessType::Public,
                request_type: RequestType::New,
                file_item_id: None,
                comment: None,
                translations: translations("Draft"),
                access_departments: Vec::new(),
                access_users: Vec::new(),
            },
        )
        .await
        .unwrap();

    // No file item exists yet, but the request alone pins the category.
    let err = engine
        .hierarchy
        .delete_category(&librarian(), category.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_missing_ids_report_not_found() {
    let engine = TestEngine::new().await;
    let actor = librarian();
    let missing = Uuid::new_v4();

    let err = engine.trash.delete_file_item(&actor, missing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = engine.versions.delete_version(&actor, missing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = engine.requests.approve(&actor, missing).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = engine
        .requests
        .upload_staged_asset(&actor, missing, "en", "a.pdf", None, Bytes::from("x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_trash_restore_and_update_request_guard() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (item, _v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();

    engine.trash.delete_file_item(&actor, item.id).await.unwrap();

    // Update requests may not target trashed items.
    let err = engine
        .requests
        .submit(
            &member(None),
            SubmitRequest {
                section_id: item.section_id,
                category_id: category.id,
                access_type: AccessType::Public,
                request_type: RequestType::Update,
                file_item_id: Some(item.id),
                comment: None,
                translations: translations("Update"),
                access_departments: Vec::new(),
                access_users: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidState);

    // Trash is privileged; restore brings the item back.
    let err = engine
        .trash
        .list_trash(&member(None), &PageRequest::new(1, 20))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let restored = engine.trash.restore_file_item(&actor, item.id).await.unwrap();
    assert!(restored.deleted_at.is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_favorites_are_idempotent() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let actor = librarian();

    let (item, _v1) = engine
        .files
        .create_file_item(&actor, new_item_request(category.id))
        .await
        .unwrap();

    engine.favorites.add(&actor, item.id).await.unwrap();
    engine.favorites.add(&actor, item.id).await.unwrap();
    assert!(engine.favorites.is_favorite(&actor, item.id).await.unwrap());

    let page = engine
        .favorites
        .list(&actor, &PageRequest::new(1, 20))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);

    engine.favorites.remove(&actor, item.id).await.unwrap();
    engine.favorites.remove(&actor, item.id).await.unwrap();
    assert!(!engine.favorites.is_favorite(&actor, item.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_department_closed_access_and_ledger() {
    let engine = TestEngine::new().await;
    let category = engine.category().await;
    let admin = librarian();

    let parent = engine
        .hierarchy
        .create_department(&admin, None, "Engineering")
        .await
        .unwrap();
    let department = engine
        .hierarchy
        .create_department(&admin, Some(parent.id), "Firmware")
        .await
        .unwrap();

    let (item, v1) = engine
        .files
        .create_file_item(
            &admin,
            CreateFileItemRequest {
                access_type: AccessType::DepartmentClosed,
                access_departments: vec![department.id],
                ..new_item_request(category.id)
            },
        )
        .await
        .unwrap();
    engine
        .versions
        .upload_asset(&admin, v1.id, "en", "spec.pdf", None, Bytes::from("body"))
        .await
        .unwrap();
    let assets = engine.versions.list_assets(v1.id).await.unwrap();

    let insider = member(Some(department.id));
    let outsider = member(None);

    engine
        .downloads
        .download_asset(&insider, assets[0].id)
        .await
        .unwrap();
    let err = engine
        .downloads
        .download_asset(&outsider, assets[0].id)
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    // Only the successful download hit the ledger.
    assert_eq!(engine.downloads.download_count(item.id).await.unwrap(), 1);

    // The department is now referenced by an allow-list row.
    let err = engine
        .hierarchy
        .delete_department(&admin, department.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    // Deleting the parent would cascade over the referenced child, so
    // it is refused too.
    let err = engine
        .hierarchy
        .delete_department(&admin, parent.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}
