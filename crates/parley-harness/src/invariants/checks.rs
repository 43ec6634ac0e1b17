//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// The login prompt and an accepted identity never coexist.
///
/// A visible prompt means the session is logged out, so no identity may be
/// shown as the current user.
pub struct PromptExcludesIdentity;

impl Invariant for PromptExcludesIdentity {
    fn name(&self) -> &'static str {
        "prompt_excludes_identity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if client.login_visible {
                if let Some(identity) = &client.identity {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: prompt visible while logged in as {identity}",
                            client.id
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// The displayed user list is in ascending ordinal order.
pub struct UsersSorted;

impl Invariant for UsersSorted {
    fn name(&self) -> &'static str {
        "users_sorted"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(pair) = client.users.windows(2).find(|w| w[0] > w[1]) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: {:?} listed before {:?}",
                        client.id, pair[0], pair[1]
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The user list cursor points at a listed user.
pub struct SelectionInBounds;

impl Invariant for SelectionInBounds {
    fn name(&self) -> &'static str {
        "selection_in_bounds"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            if let Some(selected) = client.selected {
                if selected >= client.users.len() {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: selected {selected} of {} users",
                            client.id,
                            client.users.len()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// History never grows past its cap.
pub struct HistoryBounded;

impl Invariant for HistoryBounded {
    fn name(&self) -> &'static str {
        "history_bounded"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let limit = client.history_limit.max(1);
            if client.history.len() > limit {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {}: {} history lines, limit {limit}",
                        client.id,
                        client.history.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Logged-in clients agree on who is online.
///
/// Only holds once every presence broadcast has been delivered, so check it
/// at quiescence rather than after each step.
pub struct PresenceConvergence;

impl Invariant for PresenceConvergence {
    fn name(&self) -> &'static str {
        "presence_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut logged_in = state.clients.iter().filter(|c| c.identity.is_some());
        let Some(first) = logged_in.next() else {
            return Ok(());
        };

        for client in logged_in {
            if client.users != first.users {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "client {} sees {:?}, client {} sees {:?}",
                        first.id, first.users, client.id, client.users
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientSnapshot;

    #[test]
    fn prompt_with_identity_violates() {
        let mut client = ClientSnapshot::new(1).with_identity("alice");
        client.login_visible = true;

        let result = PromptExcludesIdentity.check(&SystemSnapshot::single(client));
        assert!(result.is_err());
    }

    #[test]
    fn unsorted_users_violate() {
        let client = ClientSnapshot::new(1).with_users(&["bob", "Alice"]);
        assert!(UsersSorted.check(&SystemSnapshot::single(client)).is_err());

        let client = ClientSnapshot::new(1).with_users(&["Alice", "bob", "bob"]);
        assert!(UsersSorted.check(&SystemSnapshot::single(client)).is_ok());
    }

    #[test]
    fn dangling_selection_violates() {
        let mut client = ClientSnapshot::new(1).with_users(&["alice"]);
        client.selected = Some(1);

        assert!(SelectionInBounds.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn history_over_limit_violates() {
        let mut client = ClientSnapshot::new(1);
        client.history_limit = 1;
        client.history = vec!["* a".into(), "* b".into()];

        assert!(HistoryBounded.check(&SystemSnapshot::single(client)).is_err());
    }

    #[test]
    fn divergent_presence_violates_only_for_logged_in() {
        let alice = ClientSnapshot::new(1).with_identity("alice").with_users(&["alice", "bob"]);
        let bob = ClientSnapshot::new(2).with_identity("bob").with_users(&["alice"]);
        let lurker = ClientSnapshot::new(3).with_users(&[]);

        let diverged = SystemSnapshot::from_clients(vec![alice.clone(), bob]);
        assert!(PresenceConvergence.check(&diverged).is_err());

        let converged = SystemSnapshot::from_clients(vec![alice, lurker]);
        assert!(PresenceConvergence.check(&converged).is_ok());
    }
}
