//! GRANTA Notify — hierarchy traversal, live push delivery, and the
//! notification fan-out engine.
//!
//! This crate provides:
//! - Cycle-guarded tree traversal ([`HierarchyWalker`])
//! - The live push connection registry ([`PushRegistry`])
//! - The fan-out dispatcher ([`FanoutDispatcher`]): durable
//!   notification append first, best-effort live push second
//! - The grant lifecycle service ([`GrantService`]), which fans out a
//!   notification to the grant's target on creation
//! - The notification lifecycle surface ([`NotificationService`])
//!
//! Generic over the `granta-core` repository traits so that the
//! fan-out layer has no dependency on the database crate.

pub mod config;
pub mod dispatch;
pub mod grants;
pub mod notifications;
pub mod push;
pub mod tree;

pub use config::NotifyConfig;
pub use dispatch::FanoutDispatcher;
pub use grants::GrantService;
pub use notifications::NotificationService;
pub use push::{PushEvent, PushOutcome, PushRegistry};
pub use tree::HierarchyWalker;
