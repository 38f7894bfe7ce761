/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Tag-Value
//!
//! FIX tag=value tokenizing, parsing and encoding for the FerroFix engine.
//!
//! This crate converts between wire bytes with SOH (0x01) delimiters and
//! [`Message`](ferrofix_core::Message) values.
//!
//! ## Features
//!
//! - **Zero-copy tokenizing**: Tokens are byte offsets, values are `Bytes` slices
//! - **SIMD-accelerated**: Uses `memchr` for fast delimiter search
//! - **Dictionary-driven parsing**: Header, body, trailer and nested groups
//! - **Framing**: BodyLength and CheckSum computed on encode, verified on parse

pub mod checksum;
pub mod encoder;
pub mod parser;
pub mod tokenizer;

pub use checksum::calculate_checksum;
pub use encoder::{Encoder, encode};
pub use parser::{MessageParser, ParserSettings, peek_field, peek_msg_type};
pub use tokenizer::{Token, Tokenizer};
