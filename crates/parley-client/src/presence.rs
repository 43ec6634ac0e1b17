//! Presence registry.
//!
//! Holds the last presence snapshot pushed by the server. Every snapshot
//! replaces the previous one wholesale; there is no incremental add/remove.

use parley_proto::UsersList;

use crate::ClientAction;

/// Who is online, as of the last snapshot.
///
/// # Invariants
///
/// - `members()` is sorted ascending by ordinal (byte) comparison.
/// - Duplicates from the server are kept; uniqueness is the server's job.
#[derive(Debug, Clone, Default)]
pub struct PresenceRegistry {
    members: Vec<String>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of the last snapshot, sorted.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Whether `identity` appears in the last snapshot.
    pub fn contains(&self, identity: &str) -> bool {
        self.members.binary_search_by(|member| member.as_str().cmp(identity)).is_ok()
    }

    /// Replace the registry with `snapshot`.
    ///
    /// Returns the re-render of the user list followed by the snapshot's
    /// reason as a status line (omitted when the server sent none).
    pub fn apply(&mut self, snapshot: UsersList) -> Vec<ClientAction> {
        let UsersList { reason, users_list: mut members } = snapshot;
        members.sort();

        tracing::debug!(count = members.len(), %reason, "presence snapshot");
        self.members = members;

        let mut actions = vec![ClientAction::UsersChanged { users: self.members.clone() }];
        if !reason.is_empty() {
            actions.push(ClientAction::Status { text: reason });
        }
        actions
    }
}
