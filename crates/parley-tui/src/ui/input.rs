//! Input line
//!
//! Displays the message field with cursor. The title names the recipient
//! when the field is privately addressed.

use parley_app::{App, Focus};
use parley_client::{Route, addressing};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

use super::border_style;

const PROMPT_WIDTH: u16 = 3; // "> " inside left border
const INPUT_LINE_OFFSET_Y: u16 = 1; // inside top border
const RIGHT_PADDING: u16 = 1; // inside right border

/// Render the input line. The cursor is placed only when `show_cursor` is
/// set.
pub fn render(frame: &mut Frame, app: &App, area: Rect, show_cursor: bool) {
    let field = app.message_field();
    let title = match addressing::decode(field.text()).route {
        Route::Private(target) => format!(" To {target} "),
        Route::Broadcast => " Message ".to_owned(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app.focus() == Focus::Message))
        .title(title);

    let input_text = format!("> {}", field.text());
    let paragraph =
        Paragraph::new(input_text).style(Style::default().fg(Color::White)).block(block);

    frame.render_widget(paragraph, area);

    if !show_cursor || app.focus() != Focus::Message {
        return;
    }

    let available_width = area.width.saturating_sub(PROMPT_WIDTH + RIGHT_PADDING);
    let cursor_offset = u16::try_from(field.cursor()).unwrap_or(u16::MAX).min(available_width);

    let cursor_x = area.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_offset);
    let cursor_y = area.y.saturating_add(INPUT_LINE_OFFSET_Y);
    let max_x = area.x.saturating_add(area.width).saturating_sub(RIGHT_PADDING);
    let cursor_x = cursor_x.min(max_x);

    frame.set_cursor_position((cursor_x, cursor_y));
}
