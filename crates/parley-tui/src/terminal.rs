//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The network side is the
//! Socket.IO transport from `parley-client`.

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use parley_app::{App, AppEvent, Driver, KeyInput};
use parley_client::transport::{self, ConnectedClient, TransportError};
use parley_proto::{Inbound, Outbound};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::sync::mpsc::error::TryRecvError;

use crate::ui;

/// Idle time before the driver reports a tick.
const TICK: Duration = Duration::from_millis(100);

/// How long `stop` waits for queued payloads to go out.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Log subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the server
/// connection (WebSocket).
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    connection: Option<ConnectedClient>,
}

impl TerminalDriver {
    /// Create a new terminal driver, taking over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, connection: None })
    }

    /// Convert a crossterm key event to `KeyInput`.
    pub fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char(c) => Some(KeyInput::Ctrl(c.to_ascii_lowercase())),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab | KeyCode::BackTab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            // Terminal events
            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key).map(AppEvent::Key))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => Ok(Some(AppEvent::Resize(cols, rows))),
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(None),
                }
            }

            // Tick timeout
            () = tokio::time::sleep(TICK) => Ok(Some(AppEvent::Tick)),
        }
    }

    async fn send(&mut self, outbound: Outbound) -> Result<(), Self::Error> {
        let Some(conn) = &self.connection else {
            tracing::warn!(event = outbound.event_name(), "not connected, dropping event");
            return Ok(());
        };

        let event = outbound.event_name();
        if conn.to_server.send(outbound).await.is_err() {
            // Task already ended; its disconnect is still queued for recv
            tracing::warn!(event, "connection closed, dropping event");
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<Inbound> {
        let conn = self.connection.as_mut()?;
        match conn.from_server.try_recv() {
            Ok(Inbound::Disconnect { reason }) => {
                self.connection = None;
                Some(Inbound::Disconnect { reason })
            },
            Ok(inbound) => Some(inbound),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.connection = None;
                None
            },
        }
    }

    async fn connect(&mut self, server: &str) -> Result<(), Self::Error> {
        let client = transport::connect(server).await?;
        self.connection = Some(client);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close(CLOSE_GRACE).await;
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.stop();
        }
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
