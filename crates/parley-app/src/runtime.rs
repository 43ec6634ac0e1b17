//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to Client
//! - [`Driver`]: Platform-specific I/O
//!
//! Exactly one event is handled at a time and every resulting action runs to
//! completion before the next event, so session and presence state only ever
//! change from this loop.

use parley_client::{Environment, IdentityStore};

use crate::{App, AppAction, AppConfig, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment providing the clock
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    /// Create a new runtime with the given driver, environment and store.
    pub fn new(driver: D, env: E, store: Box<dyn IdentityStore>, config: AppConfig) -> Self {
        let app = App::new(config);
        let bridge = Bridge::new(env, store);
        Self { driver, app, bridge }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Connects and starts the session from the stored identity
    /// 2. Polls for input events from the driver
    /// 3. Drains payloads received from the server
    /// 4. Sends outgoing payloads through the driver
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        self.start().await?;

        loop {
            let should_quit = self.process_cycle().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop().await;
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }

        while self.driver.is_connected() {
            let Some(inbound) = self.driver.recv().await else {
                break;
            };
            let events = self.bridge.handle_inbound(inbound);
            self.send_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),

                    // Protocol operations go through the bridge
                    AppAction::SubmitLogin { .. }
                    | AppAction::SendMessage { .. }
                    | AppAction::LogOff { .. } => {
                        let events = self.bridge.process_app_action(action);
                        for event in events {
                            let new_actions = self.app.handle(event);
                            pending_actions.extend(new_actions);
                        }
                        self.send_outgoing().await?;
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Open the transport channel and start the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot connect.
    pub async fn start(&mut self) -> Result<(), D::Error> {
        let actions = self.app.handle(AppEvent::Connecting);
        self.process_actions(actions).await?;

        let server = self.app.config().server.clone();
        if let Err(e) = self.driver.connect(&server).await {
            tracing::error!(%server, error = %e, "failed to connect");
            return Err(e);
        }

        let actions = self.app.handle(AppEvent::Connected);
        self.process_actions(actions).await?;

        let events = self.bridge.start();
        self.send_outgoing().await?;
        self.process_bridge_events(events).await?;
        Ok(())
    }

    /// Send all pending outgoing payloads to the server.
    async fn send_outgoing(&mut self) -> Result<(), D::Error> {
        for outbound in self.bridge.take_outgoing() {
            self.driver.send(outbound).await?;
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
