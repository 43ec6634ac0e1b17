//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`parley_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use parley_app::{App, AppEvent, Driver, KeyInput};
use parley_proto::{Inbound, Outbound};

use crate::{
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot, Violation},
    sim_server::{ConnectionId, SharedSimServer},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

impl From<Vec<Violation>> for SimDriverError {
    fn from(violations: Vec<Violation>) -> Self {
        let messages: Vec<_> = violations.iter().map(ToString::to_string).collect();
        Self(messages.join("; "))
    }
}

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_events: VecDeque<AppEvent>,
    incoming: VecDeque<Inbound>,
    outgoing: Vec<Outbound>,
    connected: bool,
    connection: Option<ConnectionId>,
    refuse_connect: bool,
    renders: usize,
    last_render: Option<ClientSnapshot>,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test keeps one handle to inject input and
/// inspect output while the [`parley_app::Runtime`] owns the other.
///
/// Without a server attached, sent payloads are only captured and inbound
/// payloads must be injected. With a [`SharedSimServer`] attached, `connect`
/// opens a server connection and payloads flow through it.
#[derive(Clone)]
pub struct SimDriver {
    state: Arc<Mutex<SharedState>>,
    server: Option<SharedSimServer>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl Default for SimDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDriver {
    /// Create a new simulation driver.
    pub fn new() -> Self {
        Self { state: Arc::new(Mutex::new(SharedState::default())), server: None, invariants: None }
    }

    /// Route payloads through a simulated server.
    #[must_use]
    pub fn with_server(mut self, server: SharedSimServer) -> Self {
        self.server = Some(server);
        self
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Make the next `connect` fail.
    pub fn refuse_connect(&self) {
        self.lock().refuse_connect = true;
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.lock().pending_events.push_back(event);
    }

    /// Inject a key press.
    pub fn inject_key(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject typed text followed by Enter.
    pub fn inject_line(&self, text: &str) {
        let mut state = self.lock();
        state.pending_events.extend(text.chars().map(|c| AppEvent::Key(KeyInput::Char(c))));
        state.pending_events.push_back(AppEvent::Key(KeyInput::Enter));
    }

    /// Inject a payload as if the server had sent it.
    pub fn inject_inbound(&self, inbound: Inbound) {
        self.lock().incoming.push_back(inbound);
    }

    /// Simulate the transport closing.
    ///
    /// The disconnect is delivered like any other payload; the driver
    /// reports itself disconnected once it has been read.
    pub fn drop_connection(&self, reason: &str) {
        let connection = {
            let mut state = self.lock();
            state.incoming.push_back(Inbound::Disconnect { reason: reason.into() });
            state.connection.take()
        };
        if let (Some(server), Some(id)) = (&self.server, connection) {
            lock_server(server).disconnect(id);
        }
    }

    /// Take all captured outgoing payloads.
    pub fn take_outgoing(&self) -> Vec<Outbound> {
        std::mem::take(&mut self.lock().outgoing)
    }

    /// Check if there are pending events to process.
    pub fn has_pending(&self) -> bool {
        let (local, connection) = {
            let state = self.lock();
            let local = !state.pending_events.is_empty() || !state.incoming.is_empty();
            (local, state.connection)
        };
        local
            || match (&self.server, connection) {
                (Some(server), Some(id)) => lock_server(server).has_inbound(id),
                _ => false,
            }
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    /// Snapshot taken at the last render.
    pub fn last_render(&self) -> Option<ClientSnapshot> {
        self.lock().last_render.clone()
    }

    /// Server connection, while connected.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.lock().connection
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_server(server: &SharedSimServer) -> MutexGuard<'_, crate::SimServer> {
    server.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.lock().pending_events.pop_front())
    }

    async fn send(&mut self, outbound: Outbound) -> Result<(), Self::Error> {
        let connection = {
            let mut state = self.lock();
            state.outgoing.push(outbound.clone());
            state.connection
        };
        if let (Some(server), Some(id)) = (&self.server, connection) {
            lock_server(server).handle(id, outbound);
        }
        Ok(())
    }

    async fn recv(&mut self) -> Option<Inbound> {
        let (local, connection) = {
            let mut state = self.lock();
            (state.incoming.pop_front(), state.connection)
        };

        let inbound = match (local, &self.server, connection) {
            (Some(inbound), ..) => Some(inbound),
            (None, Some(server), Some(id)) => lock_server(server).next_inbound(id),
            _ => None,
        };

        if matches!(inbound, Some(Inbound::Disconnect { .. })) {
            self.lock().connected = false;
        }
        inbound
    }

    async fn connect(&mut self, server: &str) -> Result<(), Self::Error> {
        if std::mem::take(&mut self.lock().refuse_connect) {
            return Err(SimDriverError(format!("connection to {server} refused")));
        }

        let connection = self.server.as_ref().map(|s| lock_server(s).connect());
        let mut state = self.lock();
        state.connected = true;
        state.connection = connection;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let snapshot = ClientSnapshot::from_app(0, app);
        {
            let mut state = self.lock();
            state.renders += 1;
            state.last_render = Some(snapshot.clone());
        }

        if let Some(registry) = &self.invariants {
            registry.check_all(&SystemSnapshot::single(snapshot))?;
        }
        Ok(())
    }

    async fn stop(&mut self) {
        let connection = {
            let mut state = self.lock();
            state.connected = false;
            state.connection.take()
        };
        if let (Some(server), Some(id)) = (&self.server, connection) {
            lock_server(server).disconnect(id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parley_proto::LoginResponse;

    use super::*;
    use crate::create_shared_server;

    #[test]
    fn inject_event_queues_event() {
        let driver = SimDriver::new();
        driver.inject_event(AppEvent::Tick);

        assert!(driver.has_pending());
    }

    #[tokio::test]
    async fn clones_share_queues() {
        let handle = SimDriver::new();
        let mut driver = handle.clone();
        handle.inject_key(KeyInput::Enter);

        let event = driver.poll_event().await.unwrap();
        assert_eq!(event, Some(AppEvent::Key(KeyInput::Enter)));
        assert!(!handle.has_pending());
    }

    #[tokio::test]
    async fn send_captures_outgoing() {
        let mut driver = SimDriver::new();
        driver.send(Outbound::Login("alice".into())).await.unwrap();

        assert_eq!(driver.take_outgoing(), vec![Outbound::Login("alice".into())]);
    }

    #[tokio::test]
    async fn attached_server_answers() {
        let server = create_shared_server();
        let mut driver = SimDriver::new().with_server(server);
        driver.connect("sim").await.unwrap();
        driver.send(Outbound::Login("alice".into())).await.unwrap();

        assert!(driver.has_pending());
        assert_eq!(
            driver.recv().await,
            Some(Inbound::LoginResponse(LoginResponse::accepted("alice")))
        );
    }

    #[tokio::test]
    async fn disconnect_is_read_before_going_offline() {
        let mut driver = SimDriver::new();
        driver.connect("sim").await.unwrap();
        driver.drop_connection("transport close");

        assert!(driver.is_connected());
        assert!(matches!(driver.recv().await, Some(Inbound::Disconnect { .. })));
        assert!(!driver.is_connected());
    }

    #[tokio::test]
    async fn refused_connect_fails_once() {
        let mut driver = SimDriver::new();
        driver.refuse_connect();

        assert!(driver.connect("sim").await.is_err());
        assert!(driver.connect("sim").await.is_ok());
    }
}
