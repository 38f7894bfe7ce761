/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Engine builder for fluent configuration.
//!
//! Collects session configurations, the application and the store factory,
//! then creates every session and registers it in a fresh
//! [`SessionRegistry`].

use crate::driver::DEFAULT_TICK_PERIOD;
use crate::engine::Engine;
use crate::registry::SessionRegistry;
use ferrofix_core::{Result, SessionId};
use ferrofix_dictionary::Dictionary;
use ferrofix_session::{Application, NoOpApplication, Session, SessionConfig};
use ferrofix_store::{MemoryStore, MessageStore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

type StoreFactory = Box<dyn Fn(&SessionId) -> Box<dyn MessageStore> + Send + Sync>;

fn memory_store(_session_id: &SessionId) -> Box<dyn MessageStore> {
    Box::new(MemoryStore::new())
}

/// Builder for configuring a FIX engine.
pub struct EngineBuilder<A: Application = NoOpApplication> {
    /// Application callback handler shared by every session.
    application: Arc<A>,
    /// Session configurations.
    sessions: Vec<SessionConfig>,
    /// Dictionary for application messages.
    app_dictionary: Option<Arc<Dictionary>>,
    /// Creates the store of each session.
    store_factory: StoreFactory,
    /// Period of the timer driver.
    tick_period: Duration,
}

impl Default for EngineBuilder<NoOpApplication> {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder<NoOpApplication> {
    /// Creates a new engine builder with in-memory stores.
    #[must_use]
    pub fn new() -> Self {
        Self {
            application: Arc::new(NoOpApplication),
            sessions: Vec::new(),
            app_dictionary: None,
            store_factory: Box::new(memory_store),
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

impl<A: Application + 'static> EngineBuilder<A> {
    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application<B: Application + 'static>(self, application: B) -> EngineBuilder<B> {
        EngineBuilder {
            application: Arc::new(application),
            sessions: self.sessions,
            app_dictionary: self.app_dictionary,
            store_factory: self.store_factory,
            tick_period: self.tick_period,
        }
    }

    /// Adds a session configuration.
    #[must_use]
    pub fn add_session(mut self, config: SessionConfig) -> Self {
        self.sessions.push(config);
        self
    }

    /// Validates application messages against `dictionary`.
    #[must_use]
    pub fn with_app_dictionary(mut self, dictionary: Arc<Dictionary>) -> Self {
        self.app_dictionary = Some(dictionary);
        self
    }

    /// Sets how each session's store is created.
    #[must_use]
    pub fn with_store_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&SessionId) -> Box<dyn MessageStore> + Send + Sync + 'static,
    {
        self.store_factory = Box::new(factory);
        self
    }

    /// Sets the timer driver period.
    #[must_use]
    pub const fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Returns the configured sessions.
    #[must_use]
    pub fn sessions(&self) -> &[SessionConfig] {
        &self.sessions
    }

    /// Returns the timer driver period.
    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Returns the application handler.
    #[must_use]
    pub fn application(&self) -> Arc<A> {
        Arc::clone(&self.application)
    }

    /// Creates and registers every session.
    ///
    /// # Errors
    /// Returns an error if a session has an unsupported BeginString, if two
    /// configurations share an identity, or if a store cannot be read.
    pub fn build(self) -> Result<Engine> {
        let registry = Arc::new(SessionRegistry::new());
        let application: Arc<dyn Application> = self.application;
        for config in self.sessions {
            let store = (self.store_factory)(&config.session_id);
            let mut session = Session::new(config, store, Arc::clone(&application))?;
            if let Some(dictionary) = &self.app_dictionary {
                session = session.with_app_dictionary(Arc::clone(dictionary));
            }
            registry.register(Arc::new(session))?;
        }
        info!(sessions = registry.len(), "engine built");
        Ok(Engine::new(registry, self.tick_period))
    }
}

impl<A: Application> fmt::Debug for EngineBuilder<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("sessions", &self.sessions.len())
            .field("app_dictionary", &self.app_dictionary.is_some())
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}
