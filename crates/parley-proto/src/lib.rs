//! Parley wire protocol
//!
//! The chat server speaks a small set of named events carried over Socket.IO
//! (v4) on top of Engine.IO (v4). This crate owns both layers:
//!
//! - [`payloads`]: the event contract. [`Outbound`] covers what the client
//!   emits (`login`, `logoff`, `message`), [`Inbound`] what the server pushes
//!   (`loginResponse`, `usersList`, `message`).
//! - [`packet`]: the text packet codec ([`Packet`], [`SocketPacket`]) that
//!   frames events on the WebSocket.
//!
//! Event names are a bit-exact contract with the server. Nothing here
//! performs I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod packet;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use packet::{Handshake, Packet, SocketPacket};
pub use payloads::{Inbound, IncomingMessage, LoginResponse, Outbound, OutgoingMessage, UsersList};
