//! Header line
//!
//! Shows who the user is logged in as.

use parley_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the header line.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let identity = match app.identity() {
        Some(identity) => Span::styled(
            format!("logged in as {identity}"),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("not logged in", Style::default().fg(Color::DarkGray)),
    };

    let line = Line::from(vec![
        Span::styled(" Parley ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("| "),
        identity,
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
