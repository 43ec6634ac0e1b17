//! Terminal-agnostic keyboard input and single-line text editing.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Character with Control held (lowercase).
    Ctrl(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Tab key (toggle message field and user list).
    Tab,
    /// Escape key (quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Single-line text buffer with a cursor.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    buffer: String,
    /// Cursor position in characters, `0..=char_count`.
    cursor: usize,
}

impl TextField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the field is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the content and put the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.char_count();
    }

    /// Take the content, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Apply an editing key. Returns `false` if the key is not an edit.
    pub fn edit(&mut self, key: KeyInput) -> bool {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor = self.cursor.saturating_add(1);
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor = self.cursor.saturating_sub(1);
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => {
                if self.cursor < self.char_count() {
                    self.cursor = self.cursor.saturating_add(1);
                }
            },
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.char_count(),
            KeyInput::Ctrl(_)
            | KeyInput::Enter
            | KeyInput::Tab
            | KeyInput::Esc
            | KeyInput::Up
            | KeyInput::Down => return false,
        }
        true
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}
