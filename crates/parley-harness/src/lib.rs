//! Deterministic simulation harness for Parley client testing.
//!
//! In-memory implementations of the Environment and Driver traits, plus a
//! scripted stand-in for the chat server, so the production
//! [`parley_app::Runtime`] can be exercised without a terminal or a socket.
//!
//! # Multi-client worlds
//!
//! [`SimWorld`] runs several runtimes against one [`SimServer`] and steps
//! them until no client has work left, which is enough to check message
//! routing and presence convergence end to end.
//!
//! # Invariant Testing
//!
//! The `invariants` module provides behavioral testing through invariant
//! checks. Invariants verify WHAT must be true across all execution paths, not
//! specific scenarios. Use [`InvariantRegistry::standard()`] for common
//! App invariants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_server;
pub mod world;

pub use invariants::{
    ClientSnapshot, HistoryBounded, Invariant, InvariantRegistry, InvariantResult,
    PresenceConvergence, PromptExcludesIdentity, SelectionInBounds, SystemSnapshot, UsersSorted,
    Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
pub use sim_server::{ConnectionId, SharedSimServer, SimServer, create_shared_server};
pub use world::{ClientId, SimWorld};
