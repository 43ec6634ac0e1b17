//! Status bar
//!
//! Displays connection status, the server and the last error.

use parley_app::{App, ConnectionState};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mut spans = vec![
        Span::raw(" "),
        connection_status,
        Span::raw(format!(" | {}", app.config().server)),
    ];
    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::LightRed)));
    }
    spans.push(Span::styled(
        " | Tab: users  Ctrl-O: log off  Esc: quit",
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
