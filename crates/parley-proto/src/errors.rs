//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding packets and events.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Packet text was empty.
    #[error("empty packet")]
    Empty,

    /// Engine.IO packet type digit is not one we understand.
    #[error("unknown engine packet type: {0:?}")]
    UnknownEngineType(char),

    /// Socket.IO packet type we do not handle (acks, binary events).
    #[error("unsupported socket packet type: {0:?}")]
    UnsupportedSocketType(char),

    /// Packet addressed to a namespace other than the default one.
    #[error("unsupported namespace: {0}")]
    UnsupportedNamespace(String),

    /// Event packet body was not a `["name", ...]` array.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// Event payload did not match the shape the event name requires.
    #[error("invalid payload for event {event}: {source}")]
    InvalidPayload {
        /// Wire event name.
        event: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
