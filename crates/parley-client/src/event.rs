//! Client events and actions.

use chrono::{DateTime, Utc};
use parley_proto::{Inbound, Outbound};

/// Who asked for a logoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoffKind {
    /// The user chose to log off. The persisted identity is forgotten.
    User,
    /// The application logged off on its own (e.g. on exit). The persisted
    /// identity is kept for the next start.
    Programmatic,
}

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reading the persisted identity once at startup
/// - Forwarding user intents (login, send, logoff)
/// - Delivering inbound payloads in the order the channel received them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Client started. Carries the identity read from the identity store.
    Start {
        /// Stored display name. `None` or empty if nothing was stored.
        stored_identity: Option<String>,
    },

    /// User submitted the login prompt.
    SubmitLogin {
        /// Name typed by the user.
        name: String,
    },

    /// Log off the current identity.
    LogOff {
        /// Who asked for it.
        kind: LogoffKind,
    },

    /// User submitted the message field.
    SendMessage {
        /// Raw field content, possibly carrying `:priv <target>:`.
        input: String,
    },

    /// Payload received from the server.
    Received(Inbound),
}

/// Actions produced by the client for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Emit a payload on the transport channel.
    Emit(Outbound),

    /// Show the login prompt.
    ShowLoginPrompt {
        /// Server rejection to display verbatim. `None` on a fresh prompt.
        rejection: Option<String>,
    },

    /// Login accepted. Hide the prompt and show the logged-in indicator.
    LoggedIn {
        /// Identity the server accepted.
        identity: String,
    },

    /// Persist the identity for automatic login on the next start.
    PersistIdentity {
        /// Display name to store.
        identity: String,
        /// Days until the stored identity expires.
        expiry_days: u32,
    },

    /// Remove the persisted identity.
    ForgetIdentity,

    /// Presence changed. Replace the rendered user list.
    UsersChanged {
        /// Members in ascending ordinal order.
        users: Vec<String>,
    },

    /// Append a transient status line to the message history.
    Status {
        /// Status text.
        text: String,
    },

    /// Append a chat line to the message history.
    DeliverMessage {
        /// Sender identity.
        from: String,
        /// Message body.
        body: String,
        /// When this client received the message.
        received_at: DateTime<Utc>,
    },
}
