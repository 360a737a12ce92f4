//! Grant domain model.
//!
//! A grant binds one permission to exactly one target: a user or a
//! hierarchy node. The target is a two-variant enum, so "both set" and
//! "neither set" are unrepresentable rather than runtime validation
//! gaps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single target of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum GrantTarget {
    /// Granted directly to one user.
    User(Uuid),
    /// Granted to a hierarchy node. Permission lookup stays
    /// direct-only; only the grant notification fans out to the
    /// subtree.
    Node(Uuid),
}

impl GrantTarget {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            GrantTarget::User(id) => Some(*id),
            GrantTarget::Node(_) => None,
        }
    }

    pub fn node_id(&self) -> Option<Uuid> {
        match self {
            GrantTarget::User(_) => None,
            GrantTarget::Node(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub id: Uuid,
    pub permission_id: Uuid,
    pub target: GrantTarget,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGrant {
    pub permission_id: Uuid,
    pub target: GrantTarget,
}

/// Replaces permission/target fields of an existing grant; the id and
/// the original `assigned_at` are immutable.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateGrant {
    pub permission_id: Option<Uuid>,
    pub target: Option<GrantTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_accessors_are_mutually_exclusive() {
        let id = Uuid::new_v4();

        let user_target = GrantTarget::User(id);
        assert_eq!(user_target.user_id(), Some(id));
        assert_eq!(user_target.node_id(), None);

        let node_target = GrantTarget::Node(id);
        assert_eq!(node_target.user_id(), None);
        assert_eq!(node_target.node_id(), Some(id));
    }

    #[test]
    fn target_serializes_with_kind_discriminant() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(GrantTarget::Node(id)).unwrap();
        assert_eq!(json["kind"], "Node");
        assert_eq!(json["id"], id.to_string());
    }
}
