//! Integration tests for the grant repository using in-memory
//! SurrealDB: lifecycle, direct-only permission resolution, and the
//! cascade rules touching grants.

use granta_core::models::grant::{CreateGrant, GrantTarget, UpdateGrant};
use granta_core::models::hierarchy::CreateHierarchyNode;
use granta_core::models::notification::AppendNotification;
use granta_core::models::permission::CreatePermission;
use granta_core::models::user::CreateUser;
use granta_core::repository::{
    GrantRepository, HierarchyNodeRepository, NotificationRepository, PermissionRepository,
    UserRepository,
};
use granta_db::repository::{
    SurrealGrantRepository, SurrealHierarchyNodeRepository, SurrealNotificationRepository,
    SurrealPermissionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create one
/// permission, one user, and one node.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // permission_id
    Uuid, // user_id
    Uuid, // node_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    granta_db::run_migrations(&db).await.unwrap();

    let permission = SurrealPermissionRepository::new(db.clone())
        .create(CreatePermission {
            code: "reports.export".into(),
            description: "Export reports".into(),
        })
        .await
        .unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            username: "alice".into(),
            display_name: "Alice".into(),
            hierarchy_node_id: None,
        })
        .await
        .unwrap();

    let node = SurrealHierarchyNodeRepository::new(db.clone())
        .create(CreateHierarchyNode {
            name: "Operations".into(),
            parent_id: None,
        })
        .await
        .unwrap();

    (db, permission.id, user.id, node.id)
}

#[tokio::test]
async fn create_and_get_grant() {
    let (db, permission_id, user_id, _node_id) = setup().await;
    let repo = SurrealGrantRepository::new(db);

    let grant = repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::User(user_id),
        })
        .await
        .unwrap();

    assert_eq!(grant.permission_id, permission_id);
    assert_eq!(grant.target, GrantTarget::User(user_id));

    let fetched = repo.get_by_id(grant.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, grant.id);
    assert_eq!(fetched.target, GrantTarget::User(user_id));
    assert_eq!(fetched.assigned_at, grant.assigned_at);

    assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_grant_replaces_target() {
    let (db, permission_id, user_id, node_id) = setup().await;
    let repo = SurrealGrantRepository::new(db);

    let grant = repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::User(user_id),
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            grant.id,
            UpdateGrant {
                target: Some(GrantTarget::Node(node_id)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, grant.id);
    assert_eq!(updated.target, GrantTarget::Node(node_id));
    assert_eq!(updated.permission_id, permission_id); // unchanged

    assert!(
        repo.update(Uuid::new_v4(), UpdateGrant::default())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn permissions_for_user_is_direct_only() {
    let (db, permission_id, user_id, _node_id) = setup().await;
    let repo = SurrealGrantRepository::new(db);

    assert!(repo.permissions_for_user(user_id).await.unwrap().is_empty());

    repo.create(CreateGrant {
        permission_id,
        target: GrantTarget::User(user_id),
    })
    .await
    .unwrap();

    let permissions = repo.permissions_for_user(user_id).await.unwrap();
    assert_eq!(permissions.len(), 1);
    assert_eq!(permissions[0].id, permission_id);
    assert_eq!(permissions[0].code, "reports.export");

    // A user-targeted grant never shows up under a node id.
    assert!(repo.permissions_for_node(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn permissions_for_node_ignores_parent_and_child_grants() {
    let (db, permission_id, _user_id, node_id) = setup().await;
    let node_repo = SurrealHierarchyNodeRepository::new(db.clone());
    let grant_repo = SurrealGrantRepository::new(db);

    let child = node_repo
        .create(CreateHierarchyNode {
            name: "Child".into(),
            parent_id: Some(node_id),
        })
        .await
        .unwrap();

    // Grant on the parent node only.
    grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::Node(node_id),
        })
        .await
        .unwrap();

    assert_eq!(
        grant_repo.permissions_for_node(node_id).await.unwrap().len(),
        1
    );
    // Nothing propagates to the child in either direction.
    assert!(
        grant_repo
            .permissions_for_node(child.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn delete_grant_keeps_past_notifications() {
    let (db, permission_id, user_id, _node_id) = setup().await;
    let grant_repo = SurrealGrantRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db);

    let grant = grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::User(user_id),
        })
        .await
        .unwrap();

    let notification = notification_repo
        .append(AppendNotification {
            user_id,
            message: "You have been granted the permission 'Export reports'.".into(),
            origin_node_id: None,
        })
        .await
        .unwrap();

    assert!(grant_repo.delete(grant.id).await.unwrap());
    assert!(!grant_repo.delete(grant.id).await.unwrap());

    // The grant is gone from resolution results...
    assert!(
        grant_repo
            .permissions_for_user(user_id)
            .await
            .unwrap()
            .is_empty()
    );
    // ...but the notification it produced is untouched.
    let kept = notification_repo
        .get_by_id(notification.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.message, notification.message);
    assert!(!kept.read);
}

#[tokio::test]
async fn deleting_permission_cascades_its_grants() {
    let (db, permission_id, user_id, node_id) = setup().await;
    let permission_repo = SurrealPermissionRepository::new(db.clone());
    let grant_repo = SurrealGrantRepository::new(db);

    let user_grant = grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::User(user_id),
        })
        .await
        .unwrap();
    let node_grant = grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::Node(node_id),
        })
        .await
        .unwrap();

    assert!(permission_repo.delete(permission_id).await.unwrap());

    assert!(grant_repo.get_by_id(user_grant.id).await.unwrap().is_none());
    assert!(grant_repo.get_by_id(node_grant.id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_user_cascades_grants_and_notifications() {
    let (db, permission_id, user_id, _node_id) = setup().await;
    let user_repo = SurrealUserRepository::new(db.clone());
    let grant_repo = SurrealGrantRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db);

    let grant = grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::User(user_id),
        })
        .await
        .unwrap();
    let notification = notification_repo
        .append(AppendNotification {
            user_id,
            message: "for the doomed user".into(),
            origin_node_id: None,
        })
        .await
        .unwrap();

    assert!(user_repo.delete(user_id).await.unwrap());

    assert!(grant_repo.get_by_id(grant.id).await.unwrap().is_none());
    assert!(
        notification_repo
            .get_by_id(notification.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn deleting_node_cascades_targeted_grants_and_originated_notifications() {
    let (db, permission_id, user_id, node_id) = setup().await;
    let node_repo = SurrealHierarchyNodeRepository::new(db.clone());
    let grant_repo = SurrealGrantRepository::new(db.clone());
    let notification_repo = SurrealNotificationRepository::new(db);

    let node_grant = grant_repo
        .create(CreateGrant {
            permission_id,
            target: GrantTarget::Node(node_id),
        })
        .await
        .unwrap();
    let originated = notification_repo
        .append(AppendNotification {
            user_id,
            message: "from the doomed node".into(),
            origin_node_id: Some(node_id),
        })
        .await
        .unwrap();
    let direct = notification_repo
        .append(AppendNotification {
            user_id,
            message: "unrelated".into(),
            origin_node_id: None,
        })
        .await
        .unwrap();

    assert!(node_repo.delete(node_id).await.unwrap());

    assert!(grant_repo.get_by_id(node_grant.id).await.unwrap().is_none());
    assert!(
        notification_repo
            .get_by_id(originated.id)
            .await
            .unwrap()
            .is_none()
    );
    // Direct notifications are untouched by node deletion.
    assert!(
        notification_repo
            .get_by_id(direct.id)
            .await
            .unwrap()
            .is_some()
    );
}
