//! SurrealDB repository implementations.

mod grant;
mod hierarchy;
mod notification;
mod permission;
mod user;

pub use grant::SurrealGrantRepository;
pub use hierarchy::SurrealHierarchyNodeRepository;
pub use notification::SurrealNotificationRepository;
pub use permission::SurrealPermissionRepository;
pub use user::SurrealUserRepository;
