//! Client
//!
//! Action-based client state machine for the Parley chat protocol. Owns the
//! login session, the presence list, and the private-addressing convention
//! that lets one free-text field carry a message recipient.
//!
//! # Architecture
//!
//! The client is Sans-IO. It receives events ([`ClientEvent`]), processes
//! them through pure state machine logic, and returns actions
//! ([`ClientAction`]) for the caller to execute: payloads to emit, identity
//! to persist, things to render.
//!
//! # Components
//!
//! - [`Client`]: Top-level state machine
//! - [`Session`]: Login/logoff transitions and the current identity
//! - [`PresenceRegistry`]: Last presence snapshot, sorted for display
//! - [`addressing`]: Encode/decode of `:priv <target>: <body>`
//! - [`IdentityStore`]: Persisted display name with expiry
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides:
//! - [`transport::ConnectedClient`]: Socket.IO channel over WebSocket
//! - [`transport::connect`]: Connect to a server

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod addressing;
mod client;
pub mod env;
mod event;
pub mod identity_store;
mod presence;
mod session;

#[cfg(feature = "transport")]
pub mod transport;

pub use addressing::{Addressed, Route};
pub use client::Client;
pub use env::{Environment, SystemEnv};
pub use event::{ClientAction, ClientEvent, LogoffKind};
pub use identity_store::{
    FileIdentityStore, IDENTITY_EXPIRY_DAYS, IDENTITY_KEY, IdentityStore, MemoryIdentityStore,
    StoreError,
};
pub use parley_proto::{Inbound, Outbound};
pub use presence::PresenceRegistry;
pub use session::{Session, SessionState};
