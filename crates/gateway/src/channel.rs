//! Tokio channel-based connection for in-process subscribers
//!
//! A duplex pair of mpsc channels: the server pushes payloads to the client,
//! the client's inbound messages are drained by the registry. Dropping the
//! [`ChannelClient`] closes the inbound side, which the registry treats as a
//! disconnect.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::connection::{Connection, ConnectionId};
use crate::error::TransportError;

/// Server side of a channel subscriber
pub struct ChannelConnection {
    id: ConnectionId,
    tx: ArcSwapOption<mpsc::Sender<String>>,
}

impl ChannelConnection {
    /// Create a connected pair.
    ///
    /// Returns the server-side connection, the inbound receiver to hand to
    /// [`ConnectionRegistry::accept`](crate::ConnectionRegistry::accept), and
    /// the client end.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<String>, ChannelClient) {
        let (out_tx, out_rx) = mpsc::channel(capacity);
        let (in_tx, in_rx) = mpsc::channel(capacity);

        let connection = Self {
            id: ConnectionId::new(),
            tx: ArcSwapOption::from_pointee(out_tx),
        };
        let client = ChannelClient {
            rx: out_rx,
            tx: in_tx,
        };
        (connection, in_rx, client)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.load_full().is_none_or(|tx| tx.is_closed())
    }
}

#[async_trait]
impl Connection for ChannelConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    /// Non-blocking: a client that stopped reading fails the send instead of
    /// stalling the broadcast sweep.
    async fn send(&self, payload: &str) -> Result<(), TransportError> {
        let tx = self.tx.load_full().ok_or(TransportError::ChannelClosed)?;

        match tx.try_send(payload.to_string()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(TransportError::Send(format!(
                "client {} is not keeping up",
                self.id
            ))),
            Err(TrySendError::Closed(_)) => Err(TransportError::ChannelClosed),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.tx.store(None);
        Ok(())
    }
}

/// Client side of a channel subscriber
pub struct ChannelClient {
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
}

impl ChannelClient {
    /// Next pushed payload; `None` once the server closed the connection
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Send a message upstream (ignored by the server, keeps the link alive)
    pub async fn send(&self, message: impl Into<String>) -> Result<(), TransportError> {
        self.tx
            .send(message.into())
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_reaches_client() {
        let (conn, _inbound, mut client) = ChannelConnection::pair(4);
        conn.send("hello").await.unwrap();
        assert_eq!(client.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_full_buffer_fails_send() {
        let (conn, _inbound, _client) = ChannelConnection::pair(1);
        conn.send("one").await.unwrap();
        assert!(matches!(
            conn.send("two").await,
            Err(TransportError::Send(_))
        ));
    }

    #[tokio::test]
    async fn test_dropped_client_fails_send() {
        let (conn, _inbound, client) = ChannelConnection::pair(4);
        drop(client);
        assert!(conn.is_closed());
        assert_eq!(conn.send("x").await, Err(TransportError::ChannelClosed));
    }

    #[tokio::test]
    async fn test_close_ends_client_stream() {
        let (conn, _inbound, mut client) = ChannelConnection::pair(4);
        conn.close().await.unwrap();
        conn.close().await.unwrap();

        assert!(conn.is_closed());
        assert_eq!(client.recv().await, None);
        assert_eq!(conn.send("x").await, Err(TransportError::ChannelClosed));
    }
}
