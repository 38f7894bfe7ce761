/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Engine
//!
//! Assembly of FIX sessions for the FerroFix protocol implementation.
//!
//! This crate provides:
//! - **Registry**: An owned, concurrent map from session identity to session
//! - **Timer driver**: A tokio task that runs every session's timer checks
//! - **Builder API**: Fluent configuration that creates and registers sessions

pub mod builder;
pub mod driver;
pub mod engine;
pub mod registry;

pub use builder::EngineBuilder;
pub use driver::{DEFAULT_TICK_PERIOD, TimerDriver};
pub use engine::Engine;
pub use registry::SessionRegistry;
