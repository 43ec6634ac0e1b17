//! Terminal UI for Parley
//!
//! A thin shell over [`parley_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`parley_app::Runtime`].
//!
//! This crate only handles terminal rendering, the WebSocket connection,
//! command-line configuration and log setup.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod logging;
pub mod terminal;
pub mod ui;

pub use config::{Args, Config};
pub use parley_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
