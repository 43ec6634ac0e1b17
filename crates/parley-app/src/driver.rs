//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

use parley_proto::{Inbound, Outbound};

use crate::{App, AppEvent};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in production TUI and simulation.
///
/// # Implementations
///
/// - **TUI**: Uses crossterm for terminal events, WebSocket for transport
/// - **Simulation**: Scripted events and an in-memory server
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Poll for the next input event.
    ///
    /// Returns `None` if no event arrived within the driver's tick.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Send a payload to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or send fails.
    fn send(&mut self, outbound: Outbound) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next payload from the server, if one is ready.
    ///
    /// Returns `None` if nothing is pending or the connection is closed.
    fn recv(&mut self) -> impl Future<Output = Option<Inbound>> + Send;

    /// Establish connection to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if connection cannot be established.
    fn connect(&mut self, server: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Check if connected to server.
    fn is_connected(&self) -> bool;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Flush pending payloads, close the connection and clean up resources.
    fn stop(&mut self) -> impl Future<Output = ()> + Send;
}
