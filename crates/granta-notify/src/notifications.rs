//! Notification lifecycle surface.
//!
//! Thin orchestration over the notification log and the fan-out
//! dispatcher: collaborators drive listing, read-state mutation, and
//! the explicit notify entry points through this one type.

use granta_core::error::GrantaResult;
use granta_core::models::notification::Notification;
use granta_core::repository::{
    HierarchyNodeRepository, NotificationRepository, UserRepository,
};
use uuid::Uuid;

use crate::dispatch::FanoutDispatcher;

pub struct NotificationService<U, H, N>
where
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    notifications: N,
    dispatcher: FanoutDispatcher<U, H, N>,
}

impl<U, H, N> NotificationService<U, H, N>
where
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    pub fn new(notifications: N, dispatcher: FanoutDispatcher<U, H, N>) -> Self {
        Self {
            notifications,
            dispatcher,
        }
    }

    pub async fn get(&self, id: Uuid) -> GrantaResult<Option<Notification>> {
        self.notifications.get_by_id(id).await
    }

    /// All notifications, newest first.
    pub async fn list(&self) -> GrantaResult<Vec<Notification>> {
        self.notifications.list().await
    }

    /// One user's notifications, newest first, optionally unread only.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        only_unread: bool,
    ) -> GrantaResult<Vec<Notification>> {
        self.notifications.list_by_user(user_id, only_unread).await
    }

    pub async fn delete(&self, id: Uuid) -> GrantaResult<bool> {
        self.notifications.delete(id).await
    }

    /// Idempotent; true whenever the id exists.
    pub async fn mark_read(&self, id: Uuid) -> GrantaResult<bool> {
        self.notifications.mark_read(id).await
    }

    /// Returns the number of notifications flipped from unread to
    /// read.
    pub async fn mark_all_read(&self, user_id: Uuid) -> GrantaResult<u64> {
        self.notifications.mark_all_read(user_id).await
    }

    pub async fn notify_user(&self, user_id: Uuid, message: &str) -> GrantaResult<Notification> {
        self.dispatcher.notify_user(user_id, message).await
    }

    pub async fn notify_hierarchy(&self, node_id: Uuid, message: &str) -> GrantaResult<u64> {
        self.dispatcher.notify_hierarchy(node_id, message).await
    }
}
