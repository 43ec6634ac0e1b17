//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the interactive
//! state of the application completely decoupled from I/O and protocol
//! mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Login prompt visibility, the typed name and the last rejection.
//! - The sorted user list and the selection cursor. Selecting a user
//!   re-addresses the message field to them.
//! - Message history, bounded to a configurable length.
//! - The message field and keyboard focus.

use std::collections::VecDeque;

use parley_client::{LogoffKind, addressing};

use crate::{AppAction, AppEvent, ConnectionState, Focus, HistoryEntry, KeyInput, TextField};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Server base URL, shown in the status bar.
    pub server: String,
    /// Maximum retained history lines. Oldest lines are dropped first.
    pub history_limit: usize,
    /// Log off (keeping the stored identity) when quitting while logged in.
    pub logoff_on_exit: bool,
}

impl AppConfig {
    /// Default history cap.
    pub const DEFAULT_HISTORY_LIMIT: usize = 1000;
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:3000".into(),
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
            logoff_on_exit: false,
        }
    }
}

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
///
/// # Invariants
///
/// - `identity()` is `Some` iff the login prompt is hidden after an accepted
///   login.
/// - `history().len() <= history_limit`.
/// - `selected()` indexes into `users()` or is `None`.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    /// Connection state.
    connection: ConnectionState,
    /// Accepted identity. `None` while logged out.
    identity: Option<String>,
    /// Login prompt shown.
    login_visible: bool,
    /// Name being typed at the prompt.
    login_field: TextField,
    /// Last server rejection, shown in the prompt.
    rejection: Option<String>,
    /// Members, sorted.
    users: Vec<String>,
    /// User list cursor.
    selected: Option<usize>,
    /// Chat and status lines, oldest first.
    history: VecDeque<HistoryEntry>,
    /// Message being composed.
    message_field: TextField,
    /// Widget receiving keys.
    focus: Focus,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Error or notice for the status bar. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            connection: ConnectionState::Disconnected,
            identity: None,
            login_visible: false,
            login_field: TextField::new(),
            rejection: None,
            users: Vec::new(),
            selected: None,
            history: VecDeque::new(),
            message_field: TextField::new(),
            focus: Focus::Message,
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Connecting => {
                self.connection = ConnectionState::Connecting;
                vec![AppAction::Render]
            },
            AppEvent::Connected => {
                self.connection = ConnectionState::Connected;
                vec![AppAction::Render]
            },
            AppEvent::Disconnected { .. } => {
                self.connection = ConnectionState::Disconnected;
                vec![AppAction::Render]
            },
            AppEvent::LoginPromptShown { rejection } => {
                self.identity = None;
                self.login_visible = true;
                self.rejection = rejection;
                self.focus = Focus::Login;
                vec![AppAction::Render]
            },
            AppEvent::LoggedIn { identity } => {
                self.identity = Some(identity);
                self.login_visible = false;
                self.rejection = None;
                self.focus = Focus::Message;
                vec![AppAction::Render]
            },
            AppEvent::UsersChanged { users } => {
                self.replace_users(users);
                vec![AppAction::Render]
            },
            AppEvent::Status { text } => {
                self.push_history(HistoryEntry::Status { text });
                vec![AppAction::Render]
            },
            AppEvent::MessageReceived { from, body, received_at } => {
                self.push_history(HistoryEntry::Chat { from, body, received_at });
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if matches!(key, KeyInput::Esc | KeyInput::Ctrl('c')) {
            return self.quit();
        }

        match self.focus {
            Focus::Login => match key {
                KeyInput::Enter => self.submit_login(),
                key => self.edit(key),
            },
            Focus::Message => match key {
                KeyInput::Enter => self.send_message(),
                KeyInput::Tab => self.set_focus(Focus::Users),
                KeyInput::Up => self.move_selection(false),
                KeyInput::Down => self.move_selection(true),
                KeyInput::Ctrl('o') => self.log_off(),
                key => self.edit(key),
            },
            Focus::Users => match key {
                KeyInput::Enter => self.address_selected(),
                KeyInput::Tab => self.set_focus(Focus::Message),
                KeyInput::Up => self.move_selection(false),
                KeyInput::Down => self.move_selection(true),
                KeyInput::Ctrl('o') => self.log_off(),
                _ => vec![],
            },
        }
    }

    fn edit(&mut self, key: KeyInput) -> Vec<AppAction> {
        let field = match self.focus {
            Focus::Login => &mut self.login_field,
            Focus::Message => &mut self.message_field,
            Focus::Users => return vec![],
        };
        if field.edit(key) { vec![AppAction::Render] } else { vec![] }
    }

    /// Submit the name typed at the login prompt.
    ///
    /// The name stays in the field so a rejected name can be corrected.
    pub fn submit_login(&mut self) -> Vec<AppAction> {
        let name = self.login_field.text().to_owned();
        if name.is_empty() {
            return vec![];
        }
        vec![AppAction::SubmitLogin { name }, AppAction::Render]
    }

    /// Send the message field. The field is cleared and refocused whether or
    /// not anything is emitted.
    pub fn send_message(&mut self) -> Vec<AppAction> {
        let input = self.message_field.take();
        self.focus = Focus::Message;
        vec![AppAction::SendMessage { input }, AppAction::Render]
    }

    /// Address the message field to the selected user and refocus it.
    pub fn address_selected(&mut self) -> Vec<AppAction> {
        let Some(target) = self.selected_user().map(str::to_owned) else {
            return vec![];
        };
        self.address_to(&target)
    }

    /// Address the message field to `target`, keeping the typed body.
    pub fn address_to(&mut self, target: &str) -> Vec<AppAction> {
        let addressed = addressing::retarget(self.message_field.text(), target);
        self.message_field.set(addressed);
        self.focus = Focus::Message;
        vec![AppAction::Render]
    }

    /// User-initiated logoff. Ignored while logged out.
    pub fn log_off(&self) -> Vec<AppAction> {
        if self.identity.is_none() {
            return vec![];
        }
        vec![AppAction::LogOff { kind: LogoffKind::User }, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        if self.config.logoff_on_exit && self.identity.is_some() {
            vec![AppAction::LogOff { kind: LogoffKind::Programmatic }, AppAction::Quit]
        } else {
            vec![AppAction::Quit]
        }
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    fn set_focus(&mut self, focus: Focus) -> Vec<AppAction> {
        self.focus = focus;
        vec![AppAction::Render]
    }

    fn move_selection(&mut self, down: bool) -> Vec<AppAction> {
        let Some(last) = self.users.len().checked_sub(1) else {
            return vec![];
        };

        self.selected = Some(match (self.selected, down) {
            (None, _) => 0,
            (Some(i), true) => i.saturating_add(1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        });
        vec![AppAction::Render]
    }

    fn replace_users(&mut self, users: Vec<String>) {
        let previous = self.selected_user().map(str::to_owned);
        self.users = users;

        self.selected = match previous {
            _ if self.users.is_empty() => None,
            Some(name) => self
                .users
                .iter()
                .position(|u| *u == name)
                .or_else(|| self.selected.map(|i| i.min(self.users.len().saturating_sub(1)))),
            None => None,
        };
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        let limit = self.config.history_limit.max(1);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.connection
    }

    /// Accepted identity. `None` while logged out.
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether the login prompt is shown.
    pub fn login_visible(&self) -> bool {
        self.login_visible
    }

    /// Login prompt name field.
    pub fn login_field(&self) -> &TextField {
        &self.login_field
    }

    /// Last login rejection. `None` if the last attempt was not rejected.
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    /// Online users, sorted.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// User list cursor. `None` if nothing is selected.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Selected user. `None` if nothing is selected.
    pub fn selected_user(&self) -> Option<&str> {
        self.selected.and_then(|i| self.users.get(i)).map(String::as_str)
    }

    /// Message history, oldest first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    /// Message field.
    pub fn message_field(&self) -> &TextField {
        &self.message_field
    }

    /// Widget receiving keys.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Error or notice for the status bar. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in_app() -> App {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoggedIn { identity: "alice".into() });
        let _ = app.handle(AppEvent::UsersChanged {
            users: vec!["alice".into(), "bob".into(), "carol".into()],
        });
        app
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
    }

    #[test]
    fn prompt_takes_focus_and_clears_identity() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: Some("taken".into()) });

        assert!(app.login_visible());
        assert_eq!(app.identity(), None);
        assert_eq!(app.rejection(), Some("taken"));
        assert_eq!(app.focus(), Focus::Login);
    }

    #[test]
    fn login_hides_prompt_and_clears_rejection() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: Some("taken".into()) });
        let _ = app.handle(AppEvent::LoggedIn { identity: "alice".into() });

        assert!(!app.login_visible());
        assert_eq!(app.rejection(), None);
        assert_eq!(app.focus(), Focus::Message);
    }

    #[test]
    fn enter_at_prompt_submits_name() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: None });
        type_text(&mut app, "alice");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(actions, vec![
            AppAction::SubmitLogin { name: "alice".into() },
            AppAction::Render
        ]);
    }

    #[test]
    fn empty_name_is_not_submitted() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: None });

        assert!(app.handle(AppEvent::Key(KeyInput::Enter)).is_empty());
    }

    #[test]
    fn send_clears_and_refocuses_field() {
        let mut app = logged_in_app();
        type_text(&mut app, "hello");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(actions, vec![
            AppAction::SendMessage { input: "hello".into() },
            AppAction::Render
        ]);
        assert!(app.message_field().is_empty());
        assert_eq!(app.focus(), Focus::Message);
    }

    #[test]
    fn selecting_user_addresses_message_field() {
        let mut app = logged_in_app();
        type_text(&mut app, "hello");

        let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.selected_user(), Some("bob"));

        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(app.message_field().text(), ":priv bob: hello");
        assert_eq!(app.focus(), Focus::Message);

        // Retarget keeps the body
        let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(app.message_field().text(), ":priv carol: hello");
    }

    #[test]
    fn selection_follows_user_across_snapshots() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        assert_eq!(app.selected_user(), Some("bob"));

        let _ = app.handle(AppEvent::UsersChanged {
            users: vec!["Zed".into(), "alice".into(), "bob".into()],
        });
        assert_eq!(app.selected_user(), Some("bob"));

        let _ = app.handle(AppEvent::UsersChanged { users: vec!["Zed".into()] });
        assert_eq!(app.selected_user(), Some("Zed"));

        let _ = app.handle(AppEvent::UsersChanged { users: vec![] });
        assert_eq!(app.selected(), None);
    }

    #[test]
    fn history_is_bounded() {
        let mut app = App::new(AppConfig { history_limit: 3, ..AppConfig::default() });
        for i in 0..5 {
            let _ = app.handle(AppEvent::Status { text: format!("line {i}") });
        }

        assert_eq!(app.history().len(), 3);
        assert_eq!(app.history().front(), Some(&HistoryEntry::Status { text: "line 2".into() }));
    }

    #[test]
    fn ctrl_o_logs_off_only_when_logged_in() {
        let mut app = logged_in_app();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Ctrl('o'))), vec![
            AppAction::LogOff { kind: LogoffKind::User },
            AppAction::Render
        ]);

        let mut app = App::new(AppConfig::default());
        assert!(app.handle(AppEvent::Key(KeyInput::Ctrl('o'))).is_empty());
    }

    #[test]
    fn quit_logs_off_when_configured() {
        let mut app = logged_in_app();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), vec![AppAction::Quit]);

        let mut app = App::new(AppConfig { logoff_on_exit: true, ..AppConfig::default() });
        let _ = app.handle(AppEvent::LoggedIn { identity: "alice".into() });
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Ctrl('c'))), vec![
            AppAction::LogOff { kind: LogoffKind::Programmatic },
            AppAction::Quit
        ]);
    }
}
