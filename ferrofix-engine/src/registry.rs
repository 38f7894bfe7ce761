/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Owned session registry.
//!
//! Acceptors route inbound connections by [`SessionId`] and the timer driver
//! walks every registered session. The registry is an ordinary value shared
//! through `Arc`; there is no process-wide instance.

use ferrofix_core::{Result, SessionError, SessionId};
use ferrofix_session::Session;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Concurrent map of sessions keyed by identity.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a session.
    ///
    /// # Errors
    /// Returns `SessionError::DuplicateSession` if a session with the same
    /// identity is already registered.
    pub fn register(&self, session: Arc<Session>) -> Result<Arc<Session>> {
        let id = session.session_id().clone();
        let mut sessions = self.sessions.write();
        if sessions.contains_key(&id) {
            return Err(SessionError::DuplicateSession(id.to_string()).into());
        }
        info!(session = %id, "registered session");
        sessions.insert(id, Arc::clone(&session));
        Ok(session)
    }

    /// Removes a session, returning it if it was registered.
    pub fn unregister(&self, id: &SessionId) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            info!(session = %id, "unregistered session");
        }
        removed
    }

    /// Looks up a session.
    #[must_use]
    pub fn lookup(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Looks up a session that must exist.
    ///
    /// # Errors
    /// Returns `SessionError::UnknownSession` if nothing is registered under
    /// `id`.
    pub fn get(&self, id: &SessionId) -> Result<Arc<Session>> {
        self.lookup(id)
            .ok_or_else(|| SessionError::UnknownSession(id.to_string()).into())
    }

    /// Returns true if a session is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    /// Returns true when no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Returns the registered identities.
    #[must_use]
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Returns a snapshot of the registered sessions.
    ///
    /// The lock is released before the snapshot is returned, so callers may
    /// drive sessions without blocking registration.
    #[must_use]
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.read().values().cloned().collect()
    }

    /// Runs the timer checks of every session once.
    ///
    /// A failing session is logged and does not stop the others.
    ///
    /// # Returns
    /// The number of sessions whose timer check failed.
    pub fn tick_all(&self) -> usize {
        let mut failures = 0;
        for session in self.sessions() {
            if let Err(error) = session.tick() {
                warn!(session = %session.session_id(), %error, "timer check failed");
                failures += 1;
            }
        }
        debug!(sessions = self.len(), failures, "ticked sessions");
        failures
    }

    /// Disconnects and removes every session.
    pub fn clear(&self) {
        let drained: Vec<_> = self.sessions.write().drain().collect();
        for (id, session) in drained {
            if let Err(error) = session.disconnect("Registry cleared") {
                warn!(session = %id, %error, "disconnect failed");
            }
        }
    }
}
