//! Parley terminal client entry point.
//!
//! # Usage
//!
//! ```bash
//! # Connect to a local server
//! parley
//!
//! # Connect elsewhere without remembering the name between runs
//! parley --server https://chat.example.org --no-persist
//! ```

use clap::Parser;
use parley_client::SystemEnv;
use parley_tui::{Args, Config, Runtime, TerminalDriver, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from(Args::parse());
    let log_file = logging::init(&config)?;

    tracing::info!(server = %config.server, log_file = %log_file.display(), "parley starting");

    let store = config.identity_store();
    let driver = TerminalDriver::new()?;
    let runtime = Runtime::new(driver, SystemEnv::new(), store, config.app_config());

    runtime.run().await?;

    tracing::info!("parley exiting");
    Ok(())
}
