//! Event payloads.
//!
//! Every event is a name plus one JSON argument. The payload type is
//! determined by the event name and the direction, so the same name
//! (`message`) maps to a different shape depending on who sends it.
//!
//! # Invariants
//!
//! Each variant maps to exactly one wire event name (enforced by match
//! exhaustiveness). Decoding an encoded variant yields the same variant.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    Packet, SocketPacket,
    errors::{ProtocolError, Result},
};

/// Wire event names.
pub mod event {
    /// Client requests a session for a display name.
    pub const LOGIN: &str = "login";
    /// Client ends its session.
    pub const LOGOFF: &str = "logoff";
    /// Chat message (both directions, different shapes).
    pub const MESSAGE: &str = "message";
    /// Server verdict on a login request.
    pub const LOGIN_RESPONSE: &str = "loginResponse";
    /// Server push of the full presence list.
    pub const USERS_LIST: &str = "usersList";
    /// Connection closed. Reserved by Socket.IO, never emitted as an event.
    pub const DISCONNECT: &str = "disconnect";
}

/// Chat message emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Sender identity.
    pub from: String,
    /// Recipient identity. Empty for a broadcast.
    pub to: String,
    /// Message body.
    pub message: String,
}

impl OutgoingMessage {
    /// Whether this message goes to every participant.
    pub fn is_broadcast(&self) -> bool {
        self.to.is_empty()
    }
}

/// Server verdict on a login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Identity the verdict applies to.
    pub username: String,
    /// `"OK"` on success, otherwise a human-readable rejection.
    pub status: String,
}

impl LoginResponse {
    /// Status value that marks an accepted login.
    pub const OK: &'static str = "OK";

    /// Accepted login for `username`.
    pub fn accepted(username: impl Into<String>) -> Self {
        Self { username: username.into(), status: Self::OK.to_owned() }
    }

    /// Rejected login for `username` with a reason shown to the user.
    pub fn rejected(username: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { username: username.into(), status: reason.into() }
    }

    /// Whether the server accepted the login.
    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}

/// Full presence snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersList {
    /// What changed, e.g. `"alice joined"`.
    #[serde(default)]
    pub reason: String,
    /// Connected identities, unordered.
    #[serde(rename = "usersList", default)]
    pub users_list: Vec<String>,
}

/// Chat message pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Sender identity.
    pub username: String,
    /// Message body.
    pub message: String,
}

/// Events the client emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// `login` with the requested identity.
    Login(String),
    /// `logoff` with the identity being released.
    Logoff(String),
    /// `message` with routing metadata.
    Message(OutgoingMessage),
}

impl Outbound {
    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Login(_) => event::LOGIN,
            Self::Logoff(_) => event::LOGOFF,
            Self::Message(_) => event::MESSAGE,
        }
    }

    /// Event argument as JSON.
    pub fn to_data(&self) -> Result<Value> {
        let data = match self {
            Self::Login(identity) | Self::Logoff(identity) => Value::String(identity.clone()),
            Self::Message(message) => serde_json::to_value(message)?,
        };
        Ok(data)
    }

    /// Wrap into an event packet.
    pub fn into_packet(self) -> Result<Packet> {
        let data = self.to_data()?;
        Ok(Packet::event(self.event_name(), data))
    }

    /// Decode a client event. `None` if the name is not a client event.
    pub fn from_event(name: &str, data: Value) -> Result<Option<Self>> {
        let outbound = match name {
            event::LOGIN => Self::Login(decode_data(name, data)?),
            event::LOGOFF => Self::Logoff(decode_data(name, data)?),
            event::MESSAGE => Self::Message(decode_data(name, data)?),
            _ => return Ok(None),
        };
        Ok(Some(outbound))
    }
}

/// Events the client receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `loginResponse`.
    LoginResponse(LoginResponse),
    /// `usersList`.
    UsersList(UsersList),
    /// `message`.
    Message(IncomingMessage),
    /// Connection closed. Produced by the transport, not sent by the server.
    Disconnect {
        /// Why the connection closed.
        reason: String,
    },
}

impl Inbound {
    /// Wire event name.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::LoginResponse(_) => event::LOGIN_RESPONSE,
            Self::UsersList(_) => event::USERS_LIST,
            Self::Message(_) => event::MESSAGE,
            Self::Disconnect { .. } => event::DISCONNECT,
        }
    }

    /// Wrap into a packet. A disconnect becomes a Socket.IO disconnect packet.
    pub fn into_packet(self) -> Result<Packet> {
        let name = self.event_name();
        let data = match self {
            Self::LoginResponse(response) => serde_json::to_value(response)?,
            Self::UsersList(list) => serde_json::to_value(list)?,
            Self::Message(message) => serde_json::to_value(message)?,
            Self::Disconnect { .. } => return Ok(Packet::Message(SocketPacket::Disconnect)),
        };
        Ok(Packet::event(name, data))
    }

    /// Decode a server event. `None` if the name is not a server event.
    pub fn from_event(name: &str, data: Value) -> Result<Option<Self>> {
        let inbound = match name {
            event::LOGIN_RESPONSE => Self::LoginResponse(decode_data(name, data)?),
            event::USERS_LIST => Self::UsersList(decode_data(name, data)?),
            event::MESSAGE => Self::Message(decode_data(name, data)?),
            _ => return Ok(None),
        };
        Ok(Some(inbound))
    }
}

fn decode_data<T: DeserializeOwned>(name: &str, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|source| ProtocolError::InvalidPayload { event: name.to_owned(), source })
}
