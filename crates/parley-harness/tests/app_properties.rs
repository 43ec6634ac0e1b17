//! Property-based tests for App state machine.
//!
//! Tests verify that invariants hold under arbitrary event sequences.
//! This ensures behavioral correctness across all possible execution paths.

use chrono::DateTime;
use parley_app::{App, AppConfig, AppEvent, KeyInput};
use parley_harness::{ClientSnapshot, InvariantRegistry, SystemSnapshot};
use proptest::prelude::*;

/// Generate random printable characters for input.
fn printable_char() -> impl Strategy<Value = char> {
    prop::char::range(' ', '~')
}

/// Generate random key inputs.
fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        6 => printable_char().prop_map(KeyInput::Char),
        1 => Just(KeyInput::Enter),
        1 => Just(KeyInput::Backspace),
        1 => Just(KeyInput::Delete),
        1 => Just(KeyInput::Tab),
        1 => Just(KeyInput::Left),
        1 => Just(KeyInput::Right),
        1 => Just(KeyInput::Up),
        1 => Just(KeyInput::Down),
        1 => Just(KeyInput::Home),
        1 => Just(KeyInput::End),
        1 => Just(KeyInput::Ctrl('o')),
    ]
}

/// Sorted user list, as the client always delivers it.
fn users_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z]{1,6}", 0..6).prop_map(|mut users| {
        users.sort();
        users
    })
}

/// Generate random app events, including what the bridge produces.
fn event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        8 => key_strategy().prop_map(AppEvent::Key),
        1 => Just(AppEvent::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        1 => Just(AppEvent::Connected),
        1 => Just(AppEvent::Disconnected { reason: "transport close".into() }),
        1 => proptest::option::of("[a-z ]{1,20}")
            .prop_map(|rejection| AppEvent::LoginPromptShown { rejection }),
        1 => "[a-z]{1,8}".prop_map(|identity| AppEvent::LoggedIn { identity }),
        2 => users_strategy().prop_map(|users| AppEvent::UsersChanged { users }),
        1 => "[a-z ]{0,20}".prop_map(|text| AppEvent::Status { text }),
        2 => ("[a-z]{1,8}", "[ -~]{0,20}").prop_map(|(from, body)| AppEvent::MessageReceived {
            from,
            body,
            received_at: DateTime::default(),
        }),
    ]
}

fn snapshot(app: &App) -> SystemSnapshot {
    SystemSnapshot::single(ClientSnapshot::from_app(0, app))
}

proptest! {
    /// App invariants hold under arbitrary event sequences.
    #[test]
    fn prop_app_invariants_hold(
        history_limit in 0usize..8,
        events in prop::collection::vec(event_strategy(), 0..80),
    ) {
        let mut app = App::new(AppConfig { history_limit, ..AppConfig::default() });
        let invariants = InvariantRegistry::standard();

        for event in events {
            let _ = app.handle(event.clone());

            prop_assert!(
                invariants.check_all(&snapshot(&app)).is_ok(),
                "Invariant violated after {:?}", event
            );
        }
    }

    /// Typing at the prompt only ever changes the login field.
    #[test]
    fn prop_prompt_typing_is_local(keys in prop::collection::vec(key_strategy(), 0..40)) {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: None });
        let users_before = app.users().to_vec();

        for key in keys {
            let _ = app.handle(AppEvent::Key(key));
        }

        prop_assert!(app.login_visible());
        prop_assert!(app.message_field().is_empty());
        prop_assert_eq!(app.users(), users_before.as_slice());
    }

    /// The field cursor never leaves the text.
    #[test]
    fn prop_cursor_stays_in_text(keys in prop::collection::vec(key_strategy(), 0..60)) {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoggedIn { identity: "alice".into() });

        for key in keys {
            let _ = app.handle(AppEvent::Key(key));
            let field = app.message_field();
            prop_assert!(field.cursor() <= field.text().chars().count());
        }
    }
}
