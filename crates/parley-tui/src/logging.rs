//! Log setup.
//!
//! The terminal belongs to the UI, so logs go to a file with ANSI colours
//! off. `RUST_LOG` wins over the configured level.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Config, TerminalError};

/// Install the global subscriber, appending to the configured log file.
///
/// Returns the log file path.
pub fn init(config: &Config) -> Result<PathBuf, TerminalError> {
    let file = open_log_file(&config.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(filter)
        .try_init()?;

    Ok(config.log_file.clone())
}

/// Open `path` for appending, creating it and its parent directories.
pub fn open_log_file(path: &Path) -> Result<File, TerminalError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}
