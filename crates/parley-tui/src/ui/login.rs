//! Login prompt
//!
//! Centred modal asking for a display name, with the server's last
//! rejection under the field.

use parley_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const WIDTH: u16 = 44;
const HEIGHT: u16 = 7;
const NAME_LABEL: &str = "Name: ";
const NAME_LINE: u16 = 2;

/// Rectangle of at most `width` x `height` centred in `area`.
fn centred(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render the login prompt over `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let modal = centred(area, WIDTH, HEIGHT);
    let field = app.login_field();

    let rejection = app.rejection().map_or_else(Line::default, |reason| {
        Line::from(Span::styled(reason.to_owned(), Style::default().fg(Color::Red)))
    });

    let lines = vec![
        Line::from("Choose a name to chat with."),
        Line::default(),
        Line::from(vec![
            Span::raw(NAME_LABEL),
            Span::styled(field.text(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        rejection,
        Line::from(Span::styled("Enter: log in   Esc: quit", Style::default().fg(Color::DarkGray))),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Log in ");

    frame.render_widget(Clear, modal);
    frame.render_widget(Paragraph::new(lines).block(block), modal);

    let cursor_offset = u16::try_from(NAME_LABEL.len() + field.cursor()).unwrap_or(u16::MAX);
    let cursor_x = modal
        .x
        .saturating_add(1)
        .saturating_add(cursor_offset)
        .min(modal.right().saturating_sub(2));
    let cursor_y = modal.y.saturating_add(1 + NAME_LINE);
    frame.set_cursor_position((cursor_x, cursor_y));
}
