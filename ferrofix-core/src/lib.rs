/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Core
//!
//! Core types, codecs and error definitions for the FerroFix FIX protocol engine.
//!
//! This crate provides the fundamental building blocks used across all FerroFix crates:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Fields**: [`Field`] and [`FieldValue`], with strict codecs in [`convert`]
//! - **Containers**: [`FieldGraph`], [`Group`] and [`Message`]
//! - **Identity**: [`SessionId`]
//! - **Reject codes**: [`SessionRejectReason`] and [`BusinessRejectReason`]
//!
//! ## Raw Is Canonical
//!
//! Every field keeps its wire text next to its typed value. Typed getters
//! re-derive their value from that text, so what the application reads is
//! always what went over the wire.

pub mod convert;
pub mod error;
pub mod field;
pub mod graph;
pub mod message;
pub mod reject;
pub mod session_id;
pub mod tags;
pub mod types;

pub use error::{
    ConversionError, DecodeError, EncodeError, FieldError, FixError, Result, SessionError,
    StoreError,
};
pub use field::{Field, FieldValue};
pub use graph::{FieldGraph, FieldOrder, Group};
pub use message::{Message, MsgType, is_admin_msg_type};
pub use reject::{BusinessRejectReason, SessionRejectReason};
pub use session_id::SessionId;
pub use types::TimestampPrecision;
