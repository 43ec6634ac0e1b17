//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! drawing into the frame.

mod chat;
mod header;
mod input;
mod login;
mod status;
mod users;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
};

use crate::App;

/// Border style for the focused widget.
fn border_style(focused: bool) -> Style {
    if focused { Style::default().fg(Color::Yellow) } else { Style::default() }
}

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const HEADER_HEIGHT: u16 = 1;
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [header_area, main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    header::render(frame, app, *header_area);
    render_main_area(frame, app, *main_area);
    status::render(frame, app, *status_area);

    // The prompt owns the cursor while it is up
    if app.login_visible() {
        input::render(frame, app, *input_area, false);
        login::render(frame, app, frame.area());
    } else {
        input::render(frame, app, *input_area, true);
    }
}

/// Render the main area (users sidebar + history).
fn render_main_area(frame: &mut Frame, app: &App, area: Rect) {
    const USER_SIDEBAR_WIDTH: u16 = 18;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(USER_SIDEBAR_WIDTH), Constraint::Min(CHAT_AREA_MIN_WIDTH)])
        .split(area);

    let [users_area, chat_area] = chunks.as_ref() else {
        return;
    };

    users::render(frame, app, *users_area);
    chat::render(frame, app, *chat_area);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    use crate::App;

    /// Draw with `draw` on a `width` x `height` test terminal and return the
    /// rows, trailing spaces trimmed.
    pub fn draw_rows(
        width: u16,
        height: u16,
        draw: impl FnOnce(&mut ratatui::Frame),
    ) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(draw).unwrap();
        rows(terminal.backend().buffer())
    }

    /// Render the whole UI for `app`.
    pub fn render_app(app: &App, width: u16, height: u16) -> Vec<String> {
        draw_rows(width, height, |frame| super::render(frame, app))
    }

    fn rows(buffer: &Buffer) -> Vec<String> {
        let area = buffer.area;
        (area.top()..area.bottom())
            .map(|y| {
                let row: String =
                    (area.left()..area.right()).map(|x| buffer[(x, y)].symbol()).collect();
                row.trim_end().to_owned()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use parley_app::{AppConfig, AppEvent};

    use super::test_support::render_app;
    use crate::App;

    #[test]
    fn prompt_covers_screen_until_login() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: None });
        let screen = render_app(&app, 60, 20).join("\n");
        assert!(screen.contains("Log in"));

        let _ = app.handle(AppEvent::LoggedIn { identity: "alice".into() });
        let screen = render_app(&app, 60, 20).join("\n");
        assert!(!screen.contains("Log in"));
        assert!(screen.contains("alice"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let mut app = App::new(AppConfig::default());
        let _ = app.handle(AppEvent::LoginPromptShown { rejection: Some("taken".into()) });
        let _ = render_app(&app, 4, 3);
    }
}
