//! In-memory stand-in for the chat server.
//!
//! `SimServer` implements the server side of the event contract the client
//! relies on, without sockets:
//!
//! - `login` is rejected when the name is empty or held by another
//!   connection, otherwise accepted and followed by a presence broadcast.
//! - `logoff` releases the name and broadcasts presence.
//! - `message` with an empty `to` goes to every logged-in connection; a
//!   private message goes to the target and back to the sender. The sender
//!   always sees its own message through the echo.
//!
//! Payloads for each connection queue up until the driver reads them, so
//! delivery order per connection is the order the server produced them.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};

use parley_proto::{Inbound, IncomingMessage, LoginResponse, Outbound, OutgoingMessage, UsersList};

/// Server-side connection handle.
pub type ConnectionId = u64;

/// Rejection status for a name already in use.
pub const NAME_TAKEN: &str = "Username already taken";

/// Rejection status for an empty name.
pub const NAME_EMPTY: &str = "Username must not be empty";

/// Server shared between simulated drivers.
pub type SharedSimServer = Arc<Mutex<SimServer>>;

/// Create a server that several drivers can attach to.
pub fn create_shared_server() -> SharedSimServer {
    Arc::new(Mutex::new(SimServer::new()))
}

#[derive(Debug, Default)]
struct SimConnection {
    username: Option<String>,
    outbox: VecDeque<Inbound>,
}

/// Scripted chat server.
#[derive(Debug, Default)]
pub struct SimServer {
    connections: BTreeMap<ConnectionId, SimConnection>,
    next_connection_id: ConnectionId,
}

impl SimServer {
    /// Create a server with no connections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a new connection and return its ID.
    pub fn connect(&mut self) -> ConnectionId {
        self.next_connection_id += 1;
        let id = self.next_connection_id;
        self.connections.insert(id, SimConnection::default());
        tracing::debug!(connection = id, "connection accepted");
        id
    }

    /// Drop a connection, releasing its name.
    pub fn disconnect(&mut self, id: ConnectionId) {
        let Some(connection) = self.connections.remove(&id) else {
            return;
        };
        tracing::debug!(connection = id, "connection closed");
        if let Some(name) = connection.username {
            self.broadcast_presence(format!("{name} left"));
        }
    }

    /// Handle one client event.
    ///
    /// Events from unknown connections are ignored.
    pub fn handle(&mut self, id: ConnectionId, outbound: Outbound) {
        if !self.connections.contains_key(&id) {
            tracing::warn!(connection = id, "event from unknown connection");
            return;
        }

        match outbound {
            Outbound::Login(name) => self.login(id, name),
            Outbound::Logoff(_) => self.logoff(id),
            Outbound::Message(message) => self.route(id, message),
        }
    }

    /// Pop the next payload queued for a connection.
    pub fn next_inbound(&mut self, id: ConnectionId) -> Option<Inbound> {
        self.connections.get_mut(&id).and_then(|c| c.outbox.pop_front())
    }

    /// Whether a connection has payloads waiting.
    pub fn has_inbound(&self, id: ConnectionId) -> bool {
        self.connections.get(&id).is_some_and(|c| !c.outbox.is_empty())
    }

    /// Logged-in names, in connection order.
    pub fn users(&self) -> Vec<String> {
        self.connections.values().filter_map(|c| c.username.clone()).collect()
    }

    /// Name held by a connection.
    pub fn username(&self, id: ConnectionId) -> Option<&str> {
        self.connections.get(&id).and_then(|c| c.username.as_deref())
    }

    fn login(&mut self, id: ConnectionId, name: String) {
        let taken = self
            .connections
            .iter()
            .any(|(other, c)| *other != id && c.username.as_deref() == Some(name.as_str()));

        let rejection = if name.is_empty() {
            Some(NAME_EMPTY)
        } else if taken {
            Some(NAME_TAKEN)
        } else {
            None
        };

        if let Some(reason) = rejection {
            tracing::debug!(connection = id, %name, reason, "login rejected");
            self.push(id, Inbound::LoginResponse(LoginResponse::rejected(name, reason)));
            return;
        }

        if let Some(connection) = self.connections.get_mut(&id) {
            connection.username = Some(name.clone());
        }
        self.push(id, Inbound::LoginResponse(LoginResponse::accepted(name.as_str())));
        self.broadcast_presence(format!("{name} joined"));
    }

    fn logoff(&mut self, id: ConnectionId) {
        let Some(name) = self.connections.get_mut(&id).and_then(|c| c.username.take()) else {
            return;
        };
        self.broadcast_presence(format!("{name} left"));
    }

    fn route(&mut self, id: ConnectionId, message: OutgoingMessage) {
        // Sender identity comes from the connection, not the payload
        let Some(from) = self.username(id).map(str::to_owned) else {
            tracing::warn!(connection = id, "message from logged-out connection dropped");
            return;
        };

        let delivery = IncomingMessage { username: from, message: message.message };
        let recipients: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|(other, c)| match c.username.as_deref() {
                None => false,
                Some(_) if **other == id => true,
                Some(name) => message.to.is_empty() || name == message.to,
            })
            .map(|(other, _)| *other)
            .collect();

        for recipient in recipients {
            self.push(recipient, Inbound::Message(delivery.clone()));
        }
    }

    fn broadcast_presence(&mut self, reason: String) {
        let snapshot = UsersList { reason, users_list: self.users() };
        for connection in self.connections.values_mut() {
            connection.outbox.push_back(Inbound::UsersList(snapshot.clone()));
        }
    }

    fn push(&mut self, id: ConnectionId, inbound: Inbound) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.outbox.push_back(inbound);
        }
    }
}
