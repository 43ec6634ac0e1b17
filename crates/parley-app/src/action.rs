//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use parley_client::LogoffKind;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Log in with a display name.
    SubmitLogin {
        /// Name typed at the prompt.
        name: String,
    },

    /// Send the message field content.
    SendMessage {
        /// Raw field content, possibly addressed with `:priv <target>:`.
        input: String,
    },

    /// Log off the current identity.
    LogOff {
        /// Who asked for it.
        kind: LogoffKind,
    },
}
