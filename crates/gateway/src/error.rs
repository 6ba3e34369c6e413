//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors on a subscriber connection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Send failed: {0}")]
    Send(String),

    #[error("Close failed: {0}")]
    Close(String),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Failure reported by a price observer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ObserverError {
    #[error("Observer failed: {0}")]
    Failed(String),

    #[error("Observer panicked: {0}")]
    Panicked(String),
}
