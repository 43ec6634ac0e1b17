//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use parley_app::{App, ConnectionState, HistoryEntry};
use serde::Serialize;

/// Snapshot of the entire system state.
///
/// Contains observable state from one or more clients for invariant checking.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemSnapshot {
    /// Per-client state snapshots.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no clients).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot with a single client.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Create a snapshot from multiple clients.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }

    /// Add a client snapshot.
    pub fn add_client(&mut self, client: ClientSnapshot) {
        self.clients.push(client);
    }
}

/// Snapshot of a single client's observable state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientSnapshot {
    /// Client identifier.
    pub id: u64,
    /// Transport channel open.
    pub connected: bool,
    /// Accepted identity. `None` while logged out.
    pub identity: Option<String>,
    /// Login prompt shown.
    pub login_visible: bool,
    /// Last login rejection.
    pub rejection: Option<String>,
    /// User list as displayed.
    pub users: Vec<String>,
    /// User list cursor.
    pub selected: Option<usize>,
    /// History lines as `from: body` or `* status`.
    pub history: Vec<String>,
    /// Configured history cap.
    pub history_limit: usize,
    /// Message field content.
    pub message_field: String,
}

impl ClientSnapshot {
    /// Create a new client snapshot.
    pub fn new(id: u64) -> Self {
        Self { id, ..Default::default() }
    }

    /// Capture the observable state of an [`App`].
    pub fn from_app(id: u64, app: &App) -> Self {
        let history = app
            .history()
            .iter()
            .map(|entry| match entry {
                HistoryEntry::Chat { from, body, .. } => format!("{from}: {body}"),
                HistoryEntry::Status { text } => format!("* {text}"),
            })
            .collect();

        Self {
            id,
            connected: *app.connection_state() == ConnectionState::Connected,
            identity: app.identity().map(str::to_owned),
            login_visible: app.login_visible(),
            rejection: app.rejection().map(str::to_owned),
            users: app.users().to_vec(),
            selected: app.selected(),
            history,
            history_limit: app.config().history_limit,
            message_field: app.message_field().text().to_owned(),
        }
    }

    /// Set the accepted identity.
    #[must_use]
    pub fn with_identity(mut self, identity: &str) -> Self {
        self.identity = Some(identity.to_owned());
        self
    }

    /// Set the displayed users.
    #[must_use]
    pub fn with_users(mut self, users: &[&str]) -> Self {
        self.users = users.iter().map(|u| (*u).to_owned()).collect();
        self
    }
}
