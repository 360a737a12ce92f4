//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Absence of a referenced record
//! is reported as `Option`/`bool` to the caller, never as an error;
//! `GrantaError` is reserved for validation conflicts, structural
//! violations, and storage failures.

use uuid::Uuid;

use crate::error::GrantaResult;
use crate::models::{
    grant::{CreateGrant, Grant, UpdateGrant},
    hierarchy::{CreateHierarchyNode, HierarchyNode, UpdateHierarchyNode},
    notification::{AppendNotification, Notification},
    permission::{CreatePermission, Permission, UpdatePermission},
    user::{CreateUser, UpdateUser, User},
};

pub trait HierarchyNodeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateHierarchyNode,
    ) -> impl Future<Output = GrantaResult<HierarchyNode>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrantaResult<Option<HierarchyNode>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateHierarchyNode,
    ) -> impl Future<Output = GrantaResult<Option<HierarchyNode>>> + Send;
    /// Rejected with a validation error while child nodes or attached
    /// users exist. Cascades deletion of grants targeting the node and
    /// notifications originating from it. Returns whether a node
    /// existed.
    fn delete(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    fn list(&self) -> impl Future<Output = GrantaResult<Vec<HierarchyNode>>> + Send;
    /// Direct children only (nodes whose `parent_id` equals
    /// `parent_id`). An absent parent yields an empty set.
    fn children(
        &self,
        parent_id: Uuid,
    ) -> impl Future<Output = GrantaResult<Vec<HierarchyNode>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = GrantaResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrantaResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = GrantaResult<Option<User>>> + Send;
    /// Cascades deletion of the user's grants and notifications.
    /// Returns whether a user existed.
    fn delete(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    fn list(&self) -> impl Future<Output = GrantaResult<Vec<User>>> + Send;
    /// Users directly attached to the node (`hierarchy_node_id` equals
    /// `node_id` exactly; no traversal). An absent node yields an
    /// empty set.
    fn list_by_node(&self, node_id: Uuid) -> impl Future<Output = GrantaResult<Vec<User>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// `code` is unique across permissions.
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = GrantaResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrantaResult<Option<Permission>>> + Send;
    fn get_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = GrantaResult<Option<Permission>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = GrantaResult<Option<Permission>>> + Send;
    /// Cascades deletion of grants referencing the permission. Returns
    /// whether a permission existed.
    fn delete(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    fn list(&self) -> impl Future<Output = GrantaResult<Vec<Permission>>> + Send;
}

pub trait GrantRepository: Send + Sync {
    /// Storage-level insert. Permission existence is validated by the
    /// grant service before this is called.
    fn create(&self, input: CreateGrant) -> impl Future<Output = GrantaResult<Grant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrantaResult<Option<Grant>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateGrant,
    ) -> impl Future<Output = GrantaResult<Option<Grant>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    fn list(&self) -> impl Future<Output = GrantaResult<Vec<Grant>>> + Send;
    /// Permissions from grants whose target is exactly this user.
    fn permissions_for_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = GrantaResult<Vec<Permission>>> + Send;
    /// Permissions from grants whose target is exactly this node.
    /// Deliberately non-traversing: a grant on a parent or child never
    /// appears here.
    fn permissions_for_node(
        &self,
        node_id: Uuid,
    ) -> impl Future<Output = GrantaResult<Vec<Permission>>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    /// Appends a new unread notification stamped with the storage
    /// clock.
    fn append(
        &self,
        input: AppendNotification,
    ) -> impl Future<Output = GrantaResult<Notification>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = GrantaResult<Option<Notification>>> + Send;
    /// All notifications, newest first.
    fn list(&self) -> impl Future<Output = GrantaResult<Vec<Notification>>> + Send;
    /// One user's notifications, newest first, optionally unread only.
    fn list_by_user(
        &self,
        user_id: Uuid,
        only_unread: bool,
    ) -> impl Future<Output = GrantaResult<Vec<Notification>>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    /// Idempotent: true whenever the id exists, read or not; false if
    /// it never did.
    fn mark_read(&self, id: Uuid) -> impl Future<Output = GrantaResult<bool>> + Send;
    /// Flips every currently-unread notification for the user and
    /// returns the count flipped. An immediate second call returns 0.
    fn mark_all_read(&self, user_id: Uuid) -> impl Future<Output = GrantaResult<u64>> + Send;
}
