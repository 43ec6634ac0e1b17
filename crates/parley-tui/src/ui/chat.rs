//! Message history
//!
//! Chat lines with local receive times, and presence status lines.

use chrono::{DateTime, Local, Utc};
use parley_app::{App, HistoryEntry};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Receive time as local `HH:MM:SS`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn entry_line(entry: &HistoryEntry) -> Line<'_> {
    match entry {
        HistoryEntry::Chat { from, body, received_at } => Line::from(vec![
            Span::styled(
                format!("[{}] ", timestamp(*received_at)),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("<{from}>"),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(body.as_str()),
        ]),
        HistoryEntry::Status { text } => Line::from(Span::styled(
            format!("* {text}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    }
}

/// Render the message history.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Messages ");

    let items: Vec<ListItem> = if app.history().is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No messages yet",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        app.history().iter().map(|entry| ListItem::new(entry_line(entry))).collect()
    };

    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE));
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    let list = List::new(visible_items).block(block);

    frame.render_widget(list, area);
}
