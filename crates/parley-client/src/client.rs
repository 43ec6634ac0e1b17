//! Client state machine.
//!
//! The `Client` is the top-level state machine. It routes events to the
//! session, the presence registry and the message router, and stamps inbound
//! chat messages with the local receive time.

use parley_proto::{Inbound, IncomingMessage, Outbound, OutgoingMessage};

use crate::{
    ClientAction, ClientEvent, Environment, PresenceRegistry, Session,
    addressing::{self, Route},
};

/// Chat client for a Parley server.
///
/// # Invariants
///
/// - Events are handled one at a time, in delivery order.
/// - A `message` is only emitted while logged in, and never with an empty
///   body.
/// - No client-side echo: own messages appear only when the server sends
///   them back.
pub struct Client<E: Environment> {
    /// Clock for receive timestamps.
    env: E,

    /// Login state and identity.
    session: Session,

    /// Last presence snapshot.
    presence: PresenceRegistry,
}

impl<E: Environment> Client<E> {
    /// Create a logged-out client.
    pub fn new(env: E) -> Self {
        Self { env, session: Session::new(), presence: PresenceRegistry::new() }
    }

    /// Session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Presence registry.
    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    /// Accepted identity. `None` unless logged in.
    pub fn identity(&self) -> Option<&str> {
        self.session.identity()
    }

    /// Process an event and return actions for the caller to execute.
    pub fn handle(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        match event {
            ClientEvent::Start { stored_identity } => {
                self.session.start(stored_identity.as_deref())
            },
            ClientEvent::SubmitLogin { name } => self.session.submit_login(&name),
            ClientEvent::LogOff { kind } => self.session.log_off(kind),
            ClientEvent::SendMessage { input } => self.handle_send_message(&input),
            ClientEvent::Received(inbound) => self.handle_inbound(inbound),
        }
    }

    fn handle_send_message(&self, input: &str) -> Vec<ClientAction> {
        let addressed = addressing::decode(input);
        if addressed.is_empty() {
            tracing::debug!("empty message body, not sending");
            return vec![];
        }

        let Some(from) = self.session.identity() else {
            tracing::debug!("not logged in, dropping message");
            return vec![];
        };

        if let Route::Private(target) = &addressed.route {
            tracing::debug!(%target, "sending private message");
        }

        vec![ClientAction::Emit(Outbound::Message(OutgoingMessage {
            from: from.to_owned(),
            to: addressed.route.target().to_owned(),
            message: addressed.body,
        }))]
    }

    fn handle_inbound(&mut self, inbound: Inbound) -> Vec<ClientAction> {
        match inbound {
            Inbound::LoginResponse(response) => self.session.apply_login_response(response),
            Inbound::UsersList(snapshot) => self.presence.apply(snapshot),
            Inbound::Message(IncomingMessage { username, message }) => {
                vec![ClientAction::DeliverMessage {
                    from: username,
                    body: message,
                    received_at: self.env.now(),
                }]
            },
            Inbound::Disconnect { reason } => {
                tracing::warn!(%reason, "disconnected from server");
                vec![]
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use parley_proto::{LoginResponse, UsersList};

    use super::*;
    use crate::LogoffKind;

    #[derive(Clone)]
    struct FixedEnv(DateTime<Utc>);

    impl Environment for FixedEnv {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    fn logged_in(identity: &str) -> Client<FixedEnv> {
        let mut client = Client::new(FixedEnv(noon()));
        let _ = client.handle(ClientEvent::SubmitLogin { name: identity.into() });
        let _ =
            client.handle(ClientEvent::Received(Inbound::LoginResponse(LoginResponse::accepted(
                identity,
            ))));
        client
    }

    fn send(client: &mut Client<FixedEnv>, input: &str) -> Vec<ClientAction> {
        client.handle(ClientEvent::SendMessage { input: input.into() })
    }

    #[test]
    fn private_send_keeps_leading_space() {
        let mut client = logged_in("alice");
        let actions = send(&mut client, ":priv dave: hi there");

        assert_eq!(actions, vec![ClientAction::Emit(Outbound::Message(OutgoingMessage {
            from: "alice".into(),
            to: "dave".into(),
            message: " hi there".into(),
        }))]);
    }

    #[test]
    fn plain_send_is_broadcast() {
        let mut client = logged_in("alice");
        let actions = send(&mut client, "hello");

        assert_eq!(actions, vec![ClientAction::Emit(Outbound::Message(OutgoingMessage {
            from: "alice".into(),
            to: String::new(),
            message: "hello".into(),
        }))]);
    }

    #[test]
    fn malformed_private_send_is_broadcast() {
        let mut client = logged_in("alice");
        let actions = send(&mut client, ":priv : oops");

        let [ClientAction::Emit(Outbound::Message(message))] = actions.as_slice() else {
            panic!("expected one message, got {actions:?}");
        };
        assert!(message.is_broadcast());
        assert_eq!(message.message, " oops");
    }

    #[test]
    fn empty_body_is_suppressed() {
        let mut client = logged_in("alice");
        for input in ["", ":priv bob", ":priv bob:", ":priv bob: ", ":priv : ", ":priv: "] {
            assert!(send(&mut client, input).is_empty(), "input: {input:?}");
        }
    }

    #[test]
    fn send_while_logged_out_is_dropped() {
        let mut client = Client::new(FixedEnv(noon()));
        assert!(send(&mut client, "hello").is_empty());

        let _ = client.handle(ClientEvent::SubmitLogin { name: "alice".into() });
        assert!(send(&mut client, "hello").is_empty());
    }

    #[test]
    fn inbound_message_stamped_on_receipt() {
        let mut client = logged_in("bob");
        let actions = client.handle(ClientEvent::Received(Inbound::Message(IncomingMessage {
            username: "alice".into(),
            message: " hey".into(),
        })));

        assert_eq!(actions, vec![ClientAction::DeliverMessage {
            from: "alice".into(),
            body: " hey".into(),
            received_at: noon(),
        }]);
    }

    #[test]
    fn users_list_updates_presence() {
        let mut client = logged_in("alice");
        let _ = client.handle(ClientEvent::Received(Inbound::UsersList(UsersList {
            reason: "bob joined".into(),
            users_list: vec!["bob".into(), "alice".into()],
        })));

        assert_eq!(client.presence().members(), ["alice", "bob"]);
    }

    #[test]
    fn disconnect_produces_no_actions() {
        let mut client = logged_in("alice");
        let disconnect = Inbound::Disconnect { reason: "transport close".into() };
        let actions = client.handle(ClientEvent::Received(disconnect));

        assert!(actions.is_empty());
        // Session is untouched
        assert_eq!(client.identity(), Some("alice"));
    }

    #[test]
    fn logoff_then_send_is_dropped() {
        let mut client = logged_in("alice");
        let _ = client.handle(ClientEvent::LogOff { kind: LogoffKind::User });

        assert!(!client.session().is_logged_in());
        assert!(send(&mut client, "hello").is_empty());
    }
}
