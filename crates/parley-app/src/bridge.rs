//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the Sans-IO [`parley_client::Client`] and adapts it to
//! the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Reads the persisted identity at startup and feeds it to the client.
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Executes identity persistence against the [`IdentityStore`].
//! - Accumulates outgoing [`Outbound`] payloads to be sent by the driver in
//!   the next I/O cycle.
//! - Converts client actions back into [`crate::AppEvent`]s to update the UI.

use parley_client::{
    Client, ClientAction, ClientEvent, Environment, IDENTITY_KEY, IdentityStore, Inbound,
    Outbound,
};

use crate::{AppAction, AppEvent};

/// Bridge between App and Client protocol logic.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    env: E,
    client: Client<E>,
    store: Box<dyn IdentityStore>,
    outgoing: Vec<Outbound>,
}

impl<E: Environment> Bridge<E> {
    /// Create a new Bridge with the given environment and identity store.
    pub fn new(env: E, store: Box<dyn IdentityStore>) -> Self {
        let client = Client::new(env.clone());
        Self { env, client, store, outgoing: Vec::new() }
    }

    /// Underlying client.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Identity store.
    pub fn store(&self) -> &dyn IdentityStore {
        self.store.as_ref()
    }

    /// Start the session from the persisted identity.
    ///
    /// An unreadable store is reported and treated as empty, so the user is
    /// prompted instead.
    pub fn start(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();

        let stored_identity = match self.store.get(IDENTITY_KEY, self.env.now()) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored identity");
                events.push(AppEvent::Error { message: e.to_string() });
                None
            },
        };

        let actions = self.client.handle(ClientEvent::Start { stored_identity });
        events.extend(self.process_client_actions(actions));
        events
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::SubmitLogin { name } => ClientEvent::SubmitLogin { name },
            AppAction::SendMessage { input } => ClientEvent::SendMessage { input },
            AppAction::LogOff { kind } => ClientEvent::LogOff { kind },
            AppAction::Render | AppAction::Quit => return vec![],
        };

        let actions = self.client.handle(event);
        self.process_client_actions(actions)
    }

    /// Handle a payload from the server.
    pub fn handle_inbound(&mut self, inbound: Inbound) -> Vec<AppEvent> {
        let mut events = Vec::new();
        if let Inbound::Disconnect { reason } = &inbound {
            events.push(AppEvent::Disconnected { reason: reason.clone() });
        }

        let actions = self.client.handle(ClientEvent::Received(inbound));
        events.extend(self.process_client_actions(actions));
        events
    }

    /// Take pending outgoing payloads.
    pub fn take_outgoing(&mut self) -> Vec<Outbound> {
        std::mem::take(&mut self.outgoing)
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Emit(outbound) => {
                    self.outgoing.push(outbound);
                },
                ClientAction::ShowLoginPrompt { rejection } => {
                    events.push(AppEvent::LoginPromptShown { rejection });
                },
                ClientAction::LoggedIn { identity } => {
                    events.push(AppEvent::LoggedIn { identity });
                },
                ClientAction::PersistIdentity { identity, expiry_days } => {
                    if let Err(e) =
                        self.store.set(IDENTITY_KEY, &identity, expiry_days, self.env.now())
                    {
                        tracing::warn!(error = %e, "failed to persist identity");
                        events.push(AppEvent::Error { message: e.to_string() });
                    }
                },
                ClientAction::ForgetIdentity => {
                    if let Err(e) = self.store.delete(IDENTITY_KEY) {
                        tracing::warn!(error = %e, "failed to forget identity");
                        events.push(AppEvent::Error { message: e.to_string() });
                    }
                },
                ClientAction::UsersChanged { users } => {
                    events.push(AppEvent::UsersChanged { users });
                },
                ClientAction::Status { text } => {
                    events.push(AppEvent::Status { text });
                },
                ClientAction::DeliverMessage { from, body, received_at } => {
                    events.push(AppEvent::MessageReceived { from, body, received_at });
                },
            }
        }

        events
    }
}
