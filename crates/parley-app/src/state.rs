//! Observable application state types.
//!
//! This module defines the data structures that represent the application's
//! current view of the world, such as [`HistoryEntry`] and
//! [`ConnectionState`].
//!
//! These structures serve as the "View Model" for the application. They
//! contain what the terminal needs to render, without the protocol details
//! of the underlying client.

use chrono::{DateTime, Utc};

/// Connection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected to server.
    Disconnected,
    /// Connection in progress.
    Connecting,
    /// Transport channel open.
    Connected,
}

/// Which widget receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Login prompt name field.
    Login,
    /// Message input field.
    Message,
    /// User list.
    Users,
}

/// One line of the message history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
    /// Chat message from the server.
    Chat {
        /// Sender identity.
        from: String,
        /// Message body, verbatim.
        body: String,
        /// When this client received it.
        received_at: DateTime<Utc>,
    },
    /// Transient status line, e.g. a presence change reason.
    Status {
        /// Status text.
        text: String,
    },
}
