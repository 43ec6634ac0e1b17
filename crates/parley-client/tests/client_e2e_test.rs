//! End-to-end client tests over whole event sequences.
//!
//! Unit tests cover each transition in isolation. These drive the public
//! [`Client`] API the way a runtime does and check the properties that only
//! show up across several steps:
//! - Startup with and without a stored identity
//! - Rejection followed by a successful retry
//! - Persistence actions match the kind of logoff
//! - Arbitrary event sequences never emit a message while logged out

#![allow(clippy::expect_used)]

use chrono::{DateTime, TimeZone, Utc};
use parley_client::{
    Client, ClientAction, ClientEvent, Environment, Inbound, LogoffKind, Outbound, SessionState,
};
use parley_proto::{IncomingMessage, LoginResponse, UsersList};
use proptest::prelude::*;

#[derive(Clone)]
struct FixedEnv(DateTime<Utc>);

impl Environment for FixedEnv {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn client() -> Client<FixedEnv> {
    let t = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp");
    Client::new(FixedEnv(t))
}

fn response(response: LoginResponse) -> ClientEvent {
    ClientEvent::Received(Inbound::LoginResponse(response))
}

/// Extract emitted payloads
fn emitted(actions: &[ClientAction]) -> Vec<Outbound> {
    actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Emit(outbound) => Some(outbound.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn stored_identity_logs_in_without_prompt() {
    let mut client = client();
    let mut actions = client.handle(ClientEvent::Start { stored_identity: Some("alice".into()) });
    actions.extend(client.handle(response(LoginResponse::accepted("alice"))));

    assert_eq!(emitted(&actions), vec![Outbound::Login("alice".into())]);
    assert!(!actions.iter().any(|a| matches!(a, ClientAction::ShowLoginPrompt { .. })));
    assert!(actions.contains(&ClientAction::PersistIdentity {
        identity: "alice".into(),
        expiry_days: 7
    }));
    assert_eq!(client.session().state(), &SessionState::LoggedIn { identity: "alice".into() });
}

#[test]
fn rejection_then_retry() {
    let mut client = client();

    let actions = client.handle(ClientEvent::Start { stored_identity: None });
    assert_eq!(actions, vec![ClientAction::ShowLoginPrompt { rejection: None }]);

    let _ = client.handle(ClientEvent::SubmitLogin { name: "alice".into() });
    let actions = client.handle(response(LoginResponse::rejected("alice", "Username taken")));
    assert_eq!(actions, vec![ClientAction::ShowLoginPrompt {
        rejection: Some("Username taken".into())
    }]);

    let actions = client.handle(ClientEvent::SubmitLogin { name: "alicia".into() });
    assert_eq!(emitted(&actions), vec![Outbound::Login("alicia".into())]);

    let _ = client.handle(response(LoginResponse::accepted("alicia")));
    assert_eq!(client.identity(), Some("alicia"));
}

#[test]
fn user_and_programmatic_logoff_differ_only_in_persistence() {
    for (kind, forgets) in [(LogoffKind::User, true), (LogoffKind::Programmatic, false)] {
        let mut client = client();
        let _ = client.handle(ClientEvent::SubmitLogin { name: "alice".into() });
        let _ = client.handle(response(LoginResponse::accepted("alice")));

        let actions = client.handle(ClientEvent::LogOff { kind });

        assert_eq!(emitted(&actions), vec![Outbound::Logoff("alice".into())]);
        assert_eq!(actions.contains(&ClientAction::ForgetIdentity), forgets, "kind: {kind:?}");
        assert!(actions.contains(&ClientAction::ShowLoginPrompt { rejection: None }));
        assert_eq!(client.session().state(), &SessionState::LoggedOut);
    }
}

#[test]
fn presence_survives_logoff_until_next_snapshot() {
    let mut client = client();
    let _ = client.handle(ClientEvent::SubmitLogin { name: "alice".into() });
    let _ = client.handle(response(LoginResponse::accepted("alice")));
    let _ = client.handle(ClientEvent::Received(Inbound::UsersList(UsersList {
        reason: String::new(),
        users_list: vec!["carol".into(), "Alice".into(), "bob".into()],
    })));

    let _ = client.handle(ClientEvent::LogOff { kind: LogoffKind::User });
    assert_eq!(client.presence().members(), ["Alice", "bob", "carol"]);
}

/// Strategy for one event a runtime might feed the client
fn arbitrary_event() -> impl Strategy<Value = ClientEvent> {
    let name = prop_oneof![Just("alice".to_owned()), Just("bob".to_owned()), Just(String::new())];
    let input = prop_oneof![
        Just(String::new()),
        Just(":priv bob: hi".to_owned()),
        Just(":priv bob:".to_owned()),
        Just(":priv : x".to_owned()),
        "[a-z :]{0,12}",
    ];

    prop_oneof![
        proptest::option::of(name.clone())
            .prop_map(|stored_identity| ClientEvent::Start { stored_identity }),
        name.clone().prop_map(|name| ClientEvent::SubmitLogin { name }),
        prop_oneof![Just(LogoffKind::User), Just(LogoffKind::Programmatic)]
            .prop_map(|kind| ClientEvent::LogOff { kind }),
        input.prop_map(|input| ClientEvent::SendMessage { input }),
        (name.clone(), any::<bool>()).prop_map(|(username, ok)| {
            let verdict = if ok {
                LoginResponse::accepted(username)
            } else {
                LoginResponse::rejected(username, "taken")
            };
            ClientEvent::Received(Inbound::LoginResponse(verdict))
        }),
        proptest::collection::vec(name.clone(), 0..4).prop_map(|users_list| {
            ClientEvent::Received(Inbound::UsersList(UsersList {
                reason: "changed".into(),
                users_list,
            }))
        }),
        name.prop_map(|username| ClientEvent::Received(Inbound::Message(IncomingMessage {
            username,
            message: "hi".into(),
        }))),
        Just(ClientEvent::Received(Inbound::Disconnect { reason: "gone".into() })),
    ]
}

#[test]
fn prop_messages_only_sent_as_current_identity() {
    proptest!(|(events in proptest::collection::vec(arbitrary_event(), 0..40))| {
        let mut client = client();

        for event in events {
            let identity_before = client.identity().map(str::to_owned);
            let actions = client.handle(event);

            for outbound in emitted(&actions) {
                if let Outbound::Message(message) = outbound {
                    // PROPERTY: Sender is the logged-in identity, body is never empty
                    prop_assert_eq!(Some(message.from.as_str()), identity_before.as_deref());
                    prop_assert!(!message.message.is_empty());
                }
            }

            // PROPERTY: A visible prompt means we are not logged in
            if actions.iter().any(|a| matches!(a, ClientAction::ShowLoginPrompt { .. })) {
                prop_assert!(!client.session().is_logged_in());
            }

            // PROPERTY: Presence is always sorted
            let members = client.presence().members();
            prop_assert!(members.windows(2).all(|w| w[0] <= w[1]));
        }
    });
}
