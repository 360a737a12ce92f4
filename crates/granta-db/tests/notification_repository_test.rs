//! Integration tests for the notification repository using in-memory
//! SurrealDB: append-only log semantics, ordering, and read-state
//! transitions.

use granta_core::models::notification::AppendNotification;
use granta_core::models::permission::{CreatePermission, UpdatePermission};
use granta_core::models::user::CreateUser;
use granta_core::repository::{NotificationRepository, PermissionRepository, UserRepository};
use granta_db::repository::{
    SurrealNotificationRepository, SurrealPermissionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create two users.
async fn setup() -> (
    SurrealNotificationRepository<surrealdb::engine::local::Db>,
    Uuid, // user_a
    Uuid, // user_b
    Surreal<surrealdb::engine::local::Db>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    granta_db::run_migrations(&db).await.unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    let a = user_repo
        .create(CreateUser {
            username: "alice".into(),
            display_name: "Alice".into(),
            hierarchy_node_id: None,
        })
        .await
        .unwrap();
    let b = user_repo
        .create(CreateUser {
            username: "bob".into(),
            display_name: "Bob".into(),
            hierarchy_node_id: None,
        })
        .await
        .unwrap();

    (
        SurrealNotificationRepository::new(db.clone()),
        a.id,
        b.id,
        db,
    )
}

async fn append(
    repo: &SurrealNotificationRepository<surrealdb::engine::local::Db>,
    user_id: Uuid,
    message: &str,
) -> Uuid {
    repo.append(AppendNotification {
        user_id,
        message: message.into(),
        origin_node_id: None,
    })
    .await
    .unwrap()
    .id
}

#[tokio::test]
async fn append_creates_unread_with_storage_timestamp() {
    let (repo, user_a, _user_b, _db) = setup().await;

    let notification = repo
        .append(AppendNotification {
            user_id: user_a,
            message: "hello".into(),
            origin_node_id: None,
        })
        .await
        .unwrap();

    assert_eq!(notification.user_id, user_a);
    assert_eq!(notification.message, "hello");
    assert_eq!(notification.origin_node_id, None);
    assert!(!notification.read);

    let fetched = repo.get_by_id(notification.id).await.unwrap().unwrap();
    assert_eq!(fetched.created_at, notification.created_at);
}

#[tokio::test]
async fn origin_node_is_preserved() {
    let (repo, user_a, _user_b, _db) = setup().await;
    let origin = Uuid::new_v4();

    let notification = repo
        .append(AppendNotification {
            user_id: user_a,
            message: "fanned out".into(),
            origin_node_id: Some(origin),
        })
        .await
        .unwrap();

    assert_eq!(notification.origin_node_id, Some(origin));
}

#[tokio::test]
async fn listings_are_newest_first() {
    let (repo, user_a, user_b, _db) = setup().await;

    append(&repo, user_a, "first").await;
    append(&repo, user_b, "second").await;
    append(&repo, user_a, "third").await;

    let all = repo.list().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].message, "third");
    assert_eq!(all[2].message, "first");

    let for_a = repo.list_by_user(user_a, false).await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert_eq!(for_a[0].message, "third");
    assert_eq!(for_a[1].message, "first");
}

#[tokio::test]
async fn unread_filter_hides_read_rows() {
    let (repo, user_a, _user_b, _db) = setup().await;

    let first = append(&repo, user_a, "first").await;
    append(&repo, user_a, "second").await;

    assert!(repo.mark_read(first).await.unwrap());

    let unread = repo.list_by_user(user_a, true).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].message, "second");

    let all = repo.list_by_user(user_a, false).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let (repo, user_a, _user_b, _db) = setup().await;

    let id = append(&repo, user_a, "once").await;

    assert!(repo.mark_read(id).await.unwrap());
    assert!(repo.mark_read(id).await.unwrap());
    assert!(repo.get_by_id(id).await.unwrap().unwrap().read);

    assert!(!repo.mark_read(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn mark_all_read_counts_flips_once() {
    let (repo, user_a, user_b, _db) = setup().await;

    append(&repo, user_a, "one").await;
    append(&repo, user_a, "two").await;
    let read_already = append(&repo, user_a, "three").await;
    append(&repo, user_b, "other user").await;

    assert!(repo.mark_read(read_already).await.unwrap());

    // Exactly the two still-unread rows flip.
    assert_eq!(repo.mark_all_read(user_a).await.unwrap(), 2);
    // Immediately after, nothing is left to flip.
    assert_eq!(repo.mark_all_read(user_a).await.unwrap(), 0);

    // The other user's row is untouched.
    let for_b = repo.list_by_user(user_b, true).await.unwrap();
    assert_eq!(for_b.len(), 1);
}

#[tokio::test]
async fn delete_reports_existence() {
    let (repo, user_a, _user_b, _db) = setup().await;

    let id = append(&repo, user_a, "short-lived").await;

    assert!(repo.delete(id).await.unwrap());
    assert!(!repo.delete(id).await.unwrap());
    assert!(repo.get_by_id(id).await.unwrap().is_none());
}

// -----------------------------------------------------------------------
// Permission repository
// -----------------------------------------------------------------------

#[tokio::test]
async fn permission_crud_and_unique_code() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    granta_db::run_migrations(&db).await.unwrap();
    let repo = SurrealPermissionRepository::new(db);

    let permission = repo
        .create(CreatePermission {
            code: "users.manage".into(),
            description: "Manage users".into(),
        })
        .await
        .unwrap();

    let by_code = repo.get_by_code("users.manage").await.unwrap().unwrap();
    assert_eq!(by_code.id, permission.id);
    assert!(repo.get_by_code("users.nothing").await.unwrap().is_none());

    let err = repo
        .create(CreatePermission {
            code: "users.manage".into(),
            description: "Duplicate".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        granta_core::error::GrantaError::AlreadyExists { .. }
    ));

    let updated = repo
        .update(
            permission.id,
            UpdatePermission {
                description: Some("Manage all users".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, permission.id);
    assert_eq!(updated.code, "users.manage"); // unchanged
    assert_eq!(updated.description, "Manage all users");

    assert!(repo.delete(permission.id).await.unwrap());
    assert!(!repo.delete(permission.id).await.unwrap());
}
