/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Application callback interface.
//!
//! This module defines the callback interface through which a session hands
//! messages to, and takes messages from, the business application. Callbacks
//! run on the thread that drives the session and must not block for long.

use ferrofix_core::{FieldError, Message, SessionId};
use thiserror::Error;

/// Failure reported by an application callback.
///
/// The session turns each variant into the matching protocol response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// Returned from [`Application::to_app`] to suppress an outgoing message.
    #[error("message vetoed by the application")]
    DoNotSend,

    /// Returned from [`Application::from_admin`] on a Logon to refuse it.
    #[error("logon rejected: {0}")]
    RejectLogon(String),

    /// A field of the incoming message is missing or unacceptable.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The application does not handle this message type.
    #[error("unsupported message type: {0}")]
    UnsupportedMessageType(String),

    /// Any other failure. The message is treated as not yet processed.
    #[error("{0}")]
    Other(String),
}

/// Application callback interface for handling FIX messages.
///
/// Implement this trait to receive callbacks for session events
/// and message processing. Every method except [`Application::from_app`]
/// has a no-op default.
pub trait Application: Send + Sync {
    /// Called when a session is created.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    fn on_create(&self, _session_id: &SessionId) {}

    /// Called on successful logon.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    fn on_logon(&self, _session_id: &SessionId) {}

    /// Called when a logged-on (or logging-on) session disconnects.
    ///
    /// # Arguments
    /// * `session_id` - The session identifier
    fn on_logout(&self, _session_id: &SessionId) {}

    /// Called before sending an admin message.
    ///
    /// Allows modification of outgoing admin messages (Logon, Heartbeat, etc.).
    ///
    /// # Arguments
    /// * `message` - The message to be sent (mutable)
    /// * `session_id` - The session identifier
    fn to_admin(&self, _message: &mut Message, _session_id: &SessionId) {}

    /// Called when an admin message is received.
    ///
    /// # Arguments
    /// * `message` - The received message
    /// * `session_id` - The session identifier
    ///
    /// # Errors
    /// `RejectLogon` refuses a Logon; other errors are handled as for
    /// [`Application::from_app`].
    #[allow(clippy::wrong_self_convention)]
    fn from_admin(&self, _message: &Message, _session_id: &SessionId) -> Result<(), ApplicationError> {
        Ok(())
    }

    /// Called before sending an application message, including resends.
    ///
    /// # Arguments
    /// * `message` - The message to be sent (mutable)
    /// * `session_id` - The session identifier
    ///
    /// # Errors
    /// `DoNotSend` suppresses the message.
    fn to_app(&self, _message: &mut Message, _session_id: &SessionId) -> Result<(), ApplicationError> {
        Ok(())
    }

    /// Called when an application message is received.
    ///
    /// # Arguments
    /// * `message` - The received message
    /// * `session_id` - The session identifier
    ///
    /// # Errors
    /// A field error becomes a Reject or BusinessMessageReject;
    /// `UnsupportedMessageType` becomes a BusinessMessageReject. On `Other`
    /// the target sequence number is not advanced.
    #[allow(clippy::wrong_self_convention)]
    fn from_app(&self, message: &Message, session_id: &SessionId) -> Result<(), ApplicationError>;
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

impl Application for NoOpApplication {
    fn from_app(&self, _message: &Message, _session_id: &SessionId) -> Result<(), ApplicationError> {
        Ok(())
    }
}
