//! Session state machine.
//!
//! Tracks the single identity this client is logged in (or logging in) as.
//! Login and logoff are fire-and-forget: the only acknowledgement is a
//! `loginResponse` that may arrive at any later time, or never.
//!
//! ```text
//!                  stored identity / submit
//!   LoggedOut ──────────────────────────────> AwaitingLoginResponse
//!       ^  ^                                      │         │
//!       │  └──────────── status != "OK" ──────────┘         │ status == "OK"
//!       │                                                   v
//!       └────────────────────── logoff ─────────────── LoggedIn
//! ```

use parley_proto::{LoginResponse, Outbound};

use crate::{ClientAction, LogoffKind, identity_store::IDENTITY_EXPIRY_DAYS};

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No identity held.
    #[default]
    LoggedOut,
    /// Login emitted, waiting for the server's verdict.
    AwaitingLoginResponse {
        /// Identity the login was requested for.
        identity: String,
    },
    /// Server accepted the identity.
    LoggedIn {
        /// Accepted identity.
        identity: String,
    },
}

/// Owns login/logoff transitions and the current identity.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Create a logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether the server accepted our identity.
    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    /// Accepted identity. `None` unless logged in.
    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn { identity } => Some(identity),
            SessionState::LoggedOut | SessionState::AwaitingLoginResponse { .. } => None,
        }
    }

    /// Startup: log in with the stored identity, or ask the user for one.
    ///
    /// Only meaningful from `LoggedOut`; ignored otherwise.
    pub fn start(&mut self, stored_identity: Option<&str>) -> Vec<ClientAction> {
        if self.state != SessionState::LoggedOut {
            tracing::debug!(state = ?self.state, "ignoring start outside logged-out state");
            return vec![];
        }

        match stored_identity.filter(|name| !name.is_empty()) {
            Some(identity) => {
                tracing::info!(%identity, "logging in with stored identity");
                self.request_login(identity)
            },
            None => vec![ClientAction::ShowLoginPrompt { rejection: None }],
        }
    }

    /// User submitted a name at the login prompt. Empty names are ignored.
    pub fn submit_login(&mut self, name: &str) -> Vec<ClientAction> {
        if name.is_empty() {
            return vec![];
        }

        if let SessionState::LoggedIn { identity } = &self.state {
            tracing::debug!(%identity, "ignoring login submission while logged in");
            return vec![];
        }

        self.request_login(name)
    }

    /// Apply the server's verdict on a login request.
    ///
    /// Responses are applied whenever they arrive, including when no login
    /// is pending. The accepted identity is the one the server names.
    pub fn apply_login_response(&mut self, response: LoginResponse) -> Vec<ClientAction> {
        if !matches!(self.state, SessionState::AwaitingLoginResponse { .. }) {
            tracing::debug!(username = %response.username, "login response without pending login");
        }

        if response.is_ok() {
            tracing::info!(identity = %response.username, "logged in");
            self.state = SessionState::LoggedIn { identity: response.username.clone() };
            vec![
                ClientAction::PersistIdentity {
                    identity: response.username.clone(),
                    expiry_days: IDENTITY_EXPIRY_DAYS,
                },
                ClientAction::LoggedIn { identity: response.username },
            ]
        } else {
            tracing::info!(
                username = %response.username,
                status = %response.status,
                "login rejected"
            );
            self.state = SessionState::LoggedOut;
            vec![ClientAction::ShowLoginPrompt { rejection: Some(response.status) }]
        }
    }

    /// Log off the current identity. Ignored unless logged in.
    pub fn log_off(&mut self, kind: LogoffKind) -> Vec<ClientAction> {
        let SessionState::LoggedIn { identity } = &self.state else {
            tracing::debug!(?kind, "logoff while not logged in");
            return vec![];
        };
        let identity = identity.clone();
        self.state = SessionState::LoggedOut;

        tracing::info!(%identity, ?kind, "logging off");

        let mut actions = vec![ClientAction::Emit(Outbound::Logoff(identity))];
        if kind == LogoffKind::User {
            actions.push(ClientAction::ForgetIdentity);
        }
        actions.push(ClientAction::ShowLoginPrompt { rejection: None });
        actions
    }

    fn request_login(&mut self, identity: &str) -> Vec<ClientAction> {
        self.state = SessionState::AwaitingLoginResponse { identity: identity.to_owned() };
        vec![ClientAction::Emit(Outbound::Login(identity.to_owned()))]
    }
}
