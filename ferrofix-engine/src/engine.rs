/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! A built engine: the registry plus its timer driver.

use crate::driver::TimerDriver;
use crate::registry::SessionRegistry;
use ferrofix_core::SessionId;
use ferrofix_session::Session;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Registered sessions and the period they are driven at.
///
/// Created by [`crate::EngineBuilder::build`].
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<SessionRegistry>,
    tick_period: Duration,
}

impl Engine {
    pub(crate) const fn new(registry: Arc<SessionRegistry>, tick_period: Duration) -> Self {
        Self {
            registry,
            tick_period,
        }
    }

    /// Returns the session registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Looks up a session.
    #[must_use]
    pub fn session(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.registry.lookup(id)
    }

    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Starts driving the timers of every registered session.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn start(&self) -> TimerDriver {
        info!(sessions = self.registry.len(), "starting engine");
        TimerDriver::spawn(Arc::clone(&self.registry), self.tick_period)
    }

    /// Stops `driver`, then disconnects and drops every session.
    pub async fn shutdown(&self, driver: TimerDriver) {
        driver.stop().await;
        self.registry.clear();
        info!("engine stopped");
    }
}
