//! Live push delivery to connected recipients.
//!
//! An explicit process-owned registry maps a user identity to the
//! send half of a bounded channel. The identity mapping is established
//! once at connect time; there is no separate subscribe protocol.
//! Delivery is best-effort: a recipient with no live connection is a
//! silent no-op, and no outcome is ever surfaced as an error to the
//! notifying caller.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::config::NotifyConfig;

/// Event delivered over a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// On-connect acknowledgement.
    Connected { message: String },
    /// A new notification for the connected recipient.
    Notification { message: String },
}

/// Outcome of a single push attempt. Informational only; the
/// dispatcher logs it and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// No live connection for the recipient.
    NotConnected,
    /// The recipient's event buffer is full; the event is dropped,
    /// the connection kept.
    BufferFull,
    /// The receive half is gone; the stale registration was dropped.
    ConnectionClosed,
}

/// Registry of live connections, keyed by user identity.
///
/// Owned by the process, shared across requests. The lock is never
/// held across an await: senders are cloned out before use.
#[derive(Clone)]
pub struct PushRegistry {
    config: NotifyConfig,
    connections: Arc<RwLock<HashMap<Uuid, mpsc::Sender<PushEvent>>>>,
}

impl PushRegistry {
    pub fn new(config: NotifyConfig) -> Self {
        Self {
            config,
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a live connection for `user_id` and returns its event
    /// stream. The first event on the stream is the on-connect
    /// acknowledgement. A previous connection for the same identity is
    /// replaced; its stream yields nothing further.
    pub fn connect(&self, user_id: Uuid) -> mpsc::Receiver<PushEvent> {
        let (tx, rx) = mpsc::channel(self.config.push_buffer_capacity);

        // The buffer of a fresh channel always has room for the ack.
        let _ = tx.try_send(PushEvent::Connected {
            message: self.config.connect_ack_message.clone(),
        });

        let replaced = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, tx)
            .is_some();
        if replaced {
            debug!(user_id = %user_id, "replaced existing live connection");
        }

        rx
    }

    /// Drops the registration for `user_id`. Returns whether one
    /// existed.
    pub fn disconnect(&self, user_id: Uuid) -> bool {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id)
            .is_some()
    }

    pub fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&user_id)
    }

    /// Best-effort delivery of a notification event to `user_id`.
    pub fn push(&self, user_id: Uuid, message: &str) -> PushOutcome {
        let sender = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned();

        let Some(sender) = sender else {
            return PushOutcome::NotConnected;
        };

        match sender.try_send(PushEvent::Notification {
            message: message.to_owned(),
        }) {
            Ok(()) => PushOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(_)) => PushOutcome::BufferFull,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.disconnect(user_id);
                PushOutcome::ConnectionClosed
            }
        }
    }
}
