//! Command-line configuration.
//!
//! Every option can also come from the environment, so a wrapper script or
//! shell profile can pin the server without repeating flags.

use std::path::PathBuf;

use clap::Parser;
use parley_app::AppConfig;
use parley_client::{FileIdentityStore, IdentityStore, MemoryIdentityStore};

/// Directory under the home directory holding the identity file and log.
pub const DATA_DIR_NAME: &str = ".parley";

/// Parley terminal chat client
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "parley")]
#[command(about = "Terminal client for Parley chat servers")]
#[command(version)]
pub struct Args {
    /// Server base URL
    #[arg(short, long, env = "PARLEY_SERVER", default_value = "http://localhost:3000")]
    pub server: String,

    /// File remembering the logged-in name between runs
    #[arg(long, env = "PARLEY_IDENTITY_FILE")]
    pub identity_file: Option<PathBuf>,

    /// Do not remember the name between runs
    #[arg(long)]
    pub no_persist: bool,

    /// Maximum history lines kept on screen
    #[arg(long, default_value_t = AppConfig::DEFAULT_HISTORY_LIMIT)]
    pub history_limit: usize,

    /// Log off when quitting, keeping the remembered name
    #[arg(long)]
    pub logoff_on_exit: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file
    #[arg(long, env = "PARLEY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Server base URL.
    pub server: String,
    /// Identity file. `None` keeps the identity in memory only.
    pub identity_file: Option<PathBuf>,
    /// History cap.
    pub history_limit: usize,
    /// Log off when quitting.
    pub logoff_on_exit: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log file.
    pub log_file: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let data_dir = data_dir();
        let identity_file = if args.no_persist {
            None
        } else {
            Some(args.identity_file.unwrap_or_else(|| data_dir.join("identity.json")))
        };

        Self {
            server: args.server,
            identity_file,
            history_limit: args.history_limit,
            logoff_on_exit: args.logoff_on_exit,
            log_level: args.log_level,
            log_file: args.log_file.unwrap_or_else(|| data_dir.join("parley.log")),
        }
    }
}

impl Config {
    /// Application settings.
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            server: self.server.clone(),
            history_limit: self.history_limit,
            logoff_on_exit: self.logoff_on_exit,
        }
    }

    /// Identity store for this configuration.
    pub fn identity_store(&self) -> Box<dyn IdentityStore> {
        match &self.identity_file {
            Some(path) => Box::new(FileIdentityStore::new(path.clone())),
            None => Box::new(MemoryIdentityStore::new()),
        }
    }
}

/// `~/.parley`, or `./.parley` when there is no home directory.
pub fn data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(DATA_DIR_NAME)
}
