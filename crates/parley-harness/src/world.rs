//! Multi-client simulation.
//!
//! A [`SimWorld`] owns one [`SimServer`](crate::SimServer), one shared
//! [`SimEnv`] clock and any number of production [`Runtime`]s, each driven
//! by a [`SimDriver`] attached to the server. Tests script input through
//! the drivers and call [`SimWorld::run_until_quiet`] to let every client
//! process its input and the server's replies.

use parley_app::{App, AppConfig, Driver, Runtime};
use parley_client::{IdentityStore, MemoryIdentityStore};

use crate::{
    ClientSnapshot, InvariantRegistry, SharedSimServer, SimDriver, SimDriverError, SimEnv,
    SystemSnapshot, create_shared_server,
};

/// Index of a client within a [`SimWorld`].
pub type ClientId = usize;

/// Upper bound on runtime cycles per [`SimWorld::run_until_quiet`] call.
pub const MAX_STEPS: usize = 10_000;

struct SimClient {
    runtime: Runtime<SimDriver, SimEnv>,
    driver: SimDriver,
    quit: bool,
}

/// Several clients talking to one simulated server.
pub struct SimWorld {
    env: SimEnv,
    server: SharedSimServer,
    clients: Vec<SimClient>,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self { env: SimEnv::new(), server: create_shared_server(), clients: Vec::new() }
    }

    /// Shared clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Shared server.
    pub fn server(&self) -> &SharedSimServer {
        &self.server
    }

    /// Add a client with the given store and configuration.
    ///
    /// Standard invariants are checked on every render.
    pub fn add_client(&mut self, store: Box<dyn IdentityStore>, config: AppConfig) -> ClientId {
        let driver = SimDriver::new()
            .with_server(self.server.clone())
            .with_invariants(InvariantRegistry::standard());
        let runtime = Runtime::new(driver.clone(), self.env.clone(), store, config);
        self.clients.push(SimClient { runtime, driver, quit: false });
        self.clients.len() - 1
    }

    /// Add a client with an empty in-memory store and default configuration.
    pub fn add_default_client(&mut self) -> ClientId {
        self.add_client(Box::new(MemoryIdentityStore::new()), AppConfig::default())
    }

    /// Connect a client and start its session.
    pub async fn start(&mut self, id: ClientId) -> Result<(), SimDriverError> {
        self.clients[id].runtime.start().await
    }

    /// Input and inspection handle for a client.
    pub fn driver(&self, id: ClientId) -> &SimDriver {
        &self.clients[id].driver
    }

    /// Application state of a client.
    pub fn app(&self, id: ClientId) -> &App {
        self.clients[id].runtime.app()
    }

    /// Whether a client has quit.
    pub fn has_quit(&self, id: ClientId) -> bool {
        self.clients[id].quit
    }

    /// Type a line into a client and run the world until it settles.
    pub async fn type_line(&mut self, id: ClientId, text: &str) -> Result<(), SimDriverError> {
        self.clients[id].driver.inject_line(text);
        self.run_until_quiet().await
    }

    /// Step every client until none has pending input or payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if a driver reports one, including invariant
    /// violations, or if the world does not settle within [`MAX_STEPS`].
    pub async fn run_until_quiet(&mut self) -> Result<(), SimDriverError> {
        for _ in 0..MAX_STEPS {
            let mut progressed = false;

            for client in self.clients.iter_mut().filter(|c| !c.quit) {
                if !client.driver.has_pending() {
                    continue;
                }
                progressed = true;

                if client.runtime.process_cycle().await? {
                    client.quit = true;
                    client.runtime.driver_mut().stop().await;
                }
            }

            if !progressed {
                return Ok(());
            }
        }

        Err(SimDriverError(format!("world did not settle within {MAX_STEPS} steps")))
    }

    /// Observable state of every client.
    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot::from_clients(
            self.clients
                .iter()
                .enumerate()
                .map(|(id, c)| ClientSnapshot::from_app(id as u64, c.runtime.app()))
                .collect(),
        )
    }
}
