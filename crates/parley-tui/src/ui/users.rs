//! Users sidebar
//!
//! Displays who is online, sorted, with the selection cursor.

use parley_app::{App, Focus};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use super::border_style;

const HIGHLIGHT_SYMBOL: &str = ">";

/// Render the users sidebar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .users()
        .iter()
        .map(|user| {
            if app.identity() == Some(user.as_str()) {
                ListItem::new(user.as_str()).style(Style::default().fg(Color::Green))
            } else {
                ListItem::new(user.as_str())
            }
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus() == Focus::Users))
        .title(format!(" Users ({}) ", app.users().len()));

    let list = List::new(items)
        .block(block)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default().with_selected(app.selected());
    frame.render_stateful_widget(list, area, &mut state);
}
