/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Store
//!
//! Message persistence and storage for the FerroFix FIX protocol engine.
//!
//! This crate provides:
//! - **MessageStore trait**: Sequence numbers and sent messages of one session
//! - **MemoryStore**: In-memory message store for testing and simple use cases

pub mod memory;
pub mod traits;

pub use memory::MemoryStore;
pub use traits::MessageStore;
