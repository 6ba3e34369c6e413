use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::error::TransportError;

/// Identity of a streaming subscriber, unique for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outbound half of a streaming subscriber
///
/// The transport itself (websocket, channel...) lives behind this trait; the
/// registry only pushes text payloads and closes.
#[async_trait]
pub trait Connection: Send + Sync {
    fn id(&self) -> ConnectionId;

    /// Deliver one payload
    async fn send(&self, payload: &str) -> Result<(), TransportError>;

    /// Close the connection. Closing twice is not an error.
    async fn close(&self) -> Result<(), TransportError>;
}
