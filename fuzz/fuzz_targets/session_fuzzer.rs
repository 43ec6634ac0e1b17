//! Fuzz target for the client session
//!
//! Drives a [`Client`] with arbitrary user input and server payloads.
//!
//! # Invariants
//!
//! - Chat messages are only emitted while logged in, from the current
//!   identity, and never with an empty body
//! - The presence registry is always sorted
//! - Logging in emits exactly one login request

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use parley_client::{
    Client, ClientAction, ClientEvent, Inbound, LogoffKind, Outbound, SystemEnv,
};
use parley_proto::{IncomingMessage, LoginResponse, UsersList};

#[derive(Debug, Arbitrary)]
enum Step {
    Start { stored: Option<String> },
    SubmitLogin { name: String },
    LogOff { user: bool },
    Send { input: String },
    LoginResponse { ok: bool, message: String, username: String },
    UsersList { reason: String, users: Vec<String> },
    Message { from: String, body: String },
    Disconnect,
}

impl Step {
    fn into_event(self) -> ClientEvent {
        match self {
            Self::Start { stored } => ClientEvent::Start { stored_identity: stored },
            Self::SubmitLogin { name } => ClientEvent::SubmitLogin { name },
            Self::LogOff { user } => ClientEvent::LogOff {
                kind: if user { LogoffKind::User } else { LogoffKind::Programmatic },
            },
            Self::Send { input } => ClientEvent::SendMessage { input },
            Self::LoginResponse { ok, message, username } => {
                let response = if ok {
                    LoginResponse::accepted(username)
                } else {
                    LoginResponse::rejected(username, message)
                };
                ClientEvent::Received(Inbound::LoginResponse(response))
            },
            Self::UsersList { reason, users } => {
                ClientEvent::Received(Inbound::UsersList(UsersList { reason, users_list: users }))
            },
            Self::Message { from, body } => {
                let message = IncomingMessage { username: from, message: body };
                ClientEvent::Received(Inbound::Message(message))
            },
            Self::Disconnect => {
                ClientEvent::Received(Inbound::Disconnect { reason: "transport close".into() })
            },
        }
    }
}

fuzz_target!(|steps: Vec<Step>| {
    let mut client = Client::new(SystemEnv::new());

    for step in steps {
        let identity_before = client.identity().map(str::to_owned);
        let logged_in_before = client.session().is_logged_in();
        let actions = client.handle(step.into_event());

        let mut logins = 0;
        for action in &actions {
            match action {
                ClientAction::Emit(Outbound::Message(message)) => {
                    assert!(logged_in_before, "message sent while logged out");
                    assert_eq!(Some(&message.from), identity_before.as_ref());
                    let body = if message.is_broadcast() {
                        message.message.as_str()
                    } else {
                        message.message.strip_prefix(' ').unwrap_or(&message.message)
                    };
                    assert!(!body.is_empty(), "empty message sent");
                },
                ClientAction::Emit(Outbound::Login(_)) => logins += 1,
                _ => {},
            }
        }
        assert!(logins <= 1);

        let members = client.presence().members();
        assert!(members.windows(2).all(|pair| pair[0] <= pair[1]));
    }
});
