/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Session
//!
//! FIX session layer protocol implementation for the FerroFix engine.
//!
//! This crate provides:
//! - **Session**: Logon/Logout handshake, verification and dispatch of
//!   inbound messages, stamping and persistence of outbound messages
//! - **Sequence management**: Gap detection, message queueing, chunked
//!   ResendRequests and gap-fill replay
//! - **Heartbeat handling**: Heartbeat/TestRequest timers driven by
//!   [`Session::next_at`]
//! - **Configuration**: Session configuration options and schedules
//! - **Interfaces**: [`Application`] callbacks and the [`Responder`] transport
//!   seam

mod admin;
pub mod application;
pub mod config;
pub mod heartbeat;
mod inbound;
mod resend;
pub mod responder;
pub mod schedule;
pub mod sequence;
pub mod session;
pub mod state;
#[cfg(test)]
mod testing;

pub use application::{Application, ApplicationError, NoOpApplication};
pub use config::{SessionConfig, SessionConfigBuilder};
pub use heartbeat::HeartbeatManager;
pub use responder::Responder;
pub use schedule::SessionSchedule;
pub use sequence::{ResendRange, SequenceCheck};
pub use session::Session;
pub use state::{SessionState, SessionStatus};
