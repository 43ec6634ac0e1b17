//! Application input events.
//!
//! This module defines [`AppEvent`], the comprehensive set of inputs that drive
//! the [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (Keyboard, Resize) and system ticks.
//! - Protocol notifications translated from the underlying client.

use chrono::{DateTime, Utc};

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection in progress.
    Connecting,

    /// Transport channel open.
    Connected,

    /// Transport channel closed.
    Disconnected {
        /// Why it closed.
        reason: String,
    },

    /// Show the login prompt.
    LoginPromptShown {
        /// Server rejection to display. `None` on a fresh prompt.
        rejection: Option<String>,
    },

    /// Login accepted.
    LoggedIn {
        /// Identity the server accepted.
        identity: String,
    },

    /// Presence changed.
    UsersChanged {
        /// Members, sorted.
        users: Vec<String>,
    },

    /// Status line for the message history.
    Status {
        /// Status text.
        text: String,
    },

    /// Chat message received.
    MessageReceived {
        /// Sender identity.
        from: String,
        /// Message body.
        body: String,
        /// Local receive time.
        received_at: DateTime<Utc>,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
