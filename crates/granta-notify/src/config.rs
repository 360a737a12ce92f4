//! Notification configuration.

/// Configuration for live push delivery.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Bounded capacity of each connection's event buffer
    /// (default: 64). A full buffer drops events rather than blocking
    /// the fan-out.
    pub push_buffer_capacity: usize,
    /// Acknowledgement text delivered to a recipient on connect.
    pub connect_ack_message: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            push_buffer_capacity: 64,
            connect_ack_message: "Connected to the notification server.".into(),
        }
    }
}
