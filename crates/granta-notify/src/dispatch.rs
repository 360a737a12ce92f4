//! The notification fan-out dispatcher.
//!
//! For each recipient the durable log write comes first and is
//! authoritative; the live push is attempted afterwards and its
//! outcome is logged, never surfaced. A hierarchy fan-out walks the
//! subtree breadth-first, one repository round trip per node and per
//! recipient. There is no batching, no parallel delivery, and no
//! rollback of rows already written when a walk fails partway.

use granta_core::error::GrantaResult;
use granta_core::models::notification::{AppendNotification, Notification};
use granta_core::repository::{
    HierarchyNodeRepository, NotificationRepository, UserRepository,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::push::{PushOutcome, PushRegistry};
use crate::tree::HierarchyWalker;

/// Resolves notification targets to individual recipients and drives
/// durable-then-live delivery for each.
#[derive(Clone)]
pub struct FanoutDispatcher<U, H, N>
where
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    users: U,
    walker: HierarchyWalker<H>,
    notifications: N,
    push: PushRegistry,
}

impl<U, H, N> FanoutDispatcher<U, H, N>
where
    U: UserRepository + Clone,
    H: HierarchyNodeRepository + Clone,
    N: NotificationRepository + Clone,
{
    pub fn new(users: U, nodes: H, notifications: N, push: PushRegistry) -> Self {
        Self {
            users,
            walker: HierarchyWalker::new(nodes),
            notifications,
            push,
        }
    }

    /// Notifies a single user: one durable unread notification row,
    /// then one best-effort live push.
    pub async fn notify_user(&self, user_id: Uuid, message: &str) -> GrantaResult<Notification> {
        self.notify_one(user_id, message, None).await
    }

    /// Notifies every user transitively under `node_id`: the node's
    /// directly attached users first, then each child subtree. Each
    /// recipient's row records the node it is attached to as the
    /// origin. Returns the number of recipients notified.
    ///
    /// A cycle in the parent relation fails recipient resolution
    /// before any delivery. A failure partway through delivery leaves
    /// the rows already written in place (no rollback).
    pub async fn notify_hierarchy(&self, node_id: Uuid, message: &str) -> GrantaResult<u64> {
        let mut nodes = vec![node_id];
        nodes.extend(self.walker.descendants(node_id).await?);

        let mut notified = 0u64;
        for node in nodes {
            for user in self.users.list_by_node(node).await? {
                self.notify_one(user.id, message, Some(node)).await?;
                notified += 1;
            }
        }

        debug!(
            node_id = %node_id,
            recipients = notified,
            "hierarchy fan-out complete"
        );
        Ok(notified)
    }

    async fn notify_one(
        &self,
        user_id: Uuid,
        message: &str,
        origin_node_id: Option<Uuid>,
    ) -> GrantaResult<Notification> {
        let notification = self
            .notifications
            .append(AppendNotification {
                user_id,
                message: message.to_owned(),
                origin_node_id,
            })
            .await?;

        match self.push.push(user_id, message) {
            PushOutcome::Delivered => {
                debug!(user_id = %user_id, "live push delivered");
            }
            PushOutcome::NotConnected => {
                debug!(user_id = %user_id, "recipient not connected, skipped live push");
            }
            PushOutcome::BufferFull => {
                warn!(user_id = %user_id, "push buffer full, live event dropped");
            }
            PushOutcome::ConnectionClosed => {
                debug!(user_id = %user_id, "stale connection dropped during push");
            }
        }

        Ok(notification)
    }
}
