//! Grant lifecycle service.
//!
//! Creating a grant automatically notifies its target: a user-targeted
//! grant notifies that one user, a node-targeted grant fans out to
//! every user transitively under the node. The notification message
//! embeds the granted permission's description.

use granta_core::error::{GrantaError, GrantaResult};
use granta_core::models::grant::{CreateGrant, Grant, GrantTarget, UpdateGrant};
use granta_core::models::permission::Permission;
use granta_core::repository::{
    GrantRepository, HierarchyNodeRepository, NotificationRepository, PermissionRepository,
    UserRepository,
};
use uuid::Uuid;

use crate::dispatch::FanoutDispatcher;

fn grant_message(description: &str) -> String {
    format!("You have been granted the permission '{description}'.")
}

/// Grant lifecycle plus automatic fan-out on creation.
pub struct GrantService<G, P, U, H, N>
where
    G: GrantRepository,
    P: PermissionRepository,
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    grants: G,
    permissions: P,
    dispatcher: FanoutDispatcher<U, H, N>,
}

impl<G, P, U, H, N> GrantService<G, P, U, H, N>
where
    G: GrantRepository,
    P: PermissionRepository,
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    pub fn new(grants: G, permissions: P, dispatcher: FanoutDispatcher<U, H, N>) -> Self {
        Self {
            grants,
            permissions,
            dispatcher,
        }
    }

    /// Creates a grant and notifies its target.
    ///
    /// The referenced permission must exist. The grant insert is
    /// authoritative: a fan-out failure afterwards propagates to the
    /// caller but does not undo the grant.
    pub async fn create(&self, input: CreateGrant) -> GrantaResult<Grant> {
        let permission = self
            .permissions
            .get_by_id(input.permission_id)
            .await?
            .ok_or_else(|| GrantaError::Validation {
                message: format!(
                    "grant references missing permission {}",
                    input.permission_id
                ),
            })?;

        let grant = self.grants.create(input).await?;

        let message = grant_message(&permission.description);
        match grant.target {
            GrantTarget::User(user_id) => {
                self.dispatcher.notify_user(user_id, &message).await?;
            }
            GrantTarget::Node(node_id) => {
                self.dispatcher.notify_hierarchy(node_id, &message).await?;
            }
        }

        Ok(grant)
    }

    pub async fn get(&self, id: Uuid) -> GrantaResult<Option<Grant>> {
        self.grants.get_by_id(id).await
    }

    pub async fn list(&self) -> GrantaResult<Vec<Grant>> {
        self.grants.list().await
    }

    /// Replaces permission/target fields of an existing grant. No
    /// fan-out is triggered on update. Returns `None` if the grant
    /// does not exist.
    pub async fn update(&self, id: Uuid, input: UpdateGrant) -> GrantaResult<Option<Grant>> {
        if let Some(permission_id) = input.permission_id {
            if self.permissions.get_by_id(permission_id).await?.is_none() {
                return Err(GrantaError::Validation {
                    message: format!("grant references missing permission {permission_id}"),
                });
            }
        }
        self.grants.update(id, input).await
    }

    /// Removes the grant. Past notifications produced by its creation
    /// are untouched.
    pub async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        self.grants.delete(id).await
    }

    /// Permissions granted directly to the user.
    pub async fn permissions_for_user(&self, user_id: Uuid) -> GrantaResult<Vec<Permission>> {
        self.grants.permissions_for_user(user_id).await
    }

    /// Permissions granted directly to the node. Grants on ancestors
    /// or descendants never appear here.
    pub async fn permissions_for_node(&self, node_id: Uuid) -> GrantaResult<Vec<Permission>> {
        self.grants.permissions_for_node(node_id).await
    }
}
