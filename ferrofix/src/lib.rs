/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix
//!
//! A FIX protocol engine for Rust.
//!
//! FerroFix implements the FIX tag=value wire format, dictionary-driven
//! parsing and validation, and the session layer for FIX 4.0 through
//! FIX 4.4: logon and logout, heartbeats, gap detection, resend and
//! sequence reset.
//!
//! ## Features
//!
//! - **Typed field model**: Fields keep their wire text and convert on demand
//! - **Repeating groups**: Nested groups parsed against a dictionary
//! - **Checksums and body length**: Computed on encode, verified on parse
//! - **Session recovery**: Queued early messages, chunked ResendRequests,
//!   gap-fill replay with PossDupFlag
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrofix::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_application(MyApplication)
//!     .add_session(SessionConfig::new(SessionId::new("FIX.4.4", "SENDER", "TARGET")))
//!     .build()?;
//! let session = engine.session(&SessionId::new("FIX.4.4", "SENDER", "TARGET"));
//! let driver = engine.start();
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Fields, field graphs, messages, identities and errors
//! - [`dictionary`]: Message dictionaries and validation
//! - [`tagvalue`]: Tag=value tokenizing, encoding and parsing
//! - [`session`]: Session layer protocol implementation
//! - [`store`]: Sequence numbers and sent message storage
//! - [`engine`]: Session registry and timer driver

pub mod core {
    //! Fields, field graphs, messages, identities and errors.
    pub use ferrofix_core::*;
}

pub mod dictionary {
    //! Message dictionaries and validation.
    pub use ferrofix_dictionary::*;
}

pub mod tagvalue {
    //! Tag=value tokenizing, encoding and parsing.
    pub use ferrofix_tagvalue::*;
}

pub mod session {
    //! Session layer protocol implementation.
    pub use ferrofix_session::*;
}

pub mod store {
    //! Sequence numbers and sent message storage.
    pub use ferrofix_store::*;
}

pub mod engine {
    //! Session registry and timer driver.
    pub use ferrofix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ferrofix_core::{
        BusinessRejectReason, DecodeError, EncodeError, Field, FieldError, FieldGraph,
        FieldValue, FixError, Group, Message, MsgType, Result, SessionError, SessionId,
        SessionRejectReason, StoreError, TimestampPrecision, tags,
    };

    // Dictionary
    pub use ferrofix_dictionary::{
        Dictionary, FieldDef, FieldType, GroupDef, MessageDef, ValidationSettings, Version,
        session_dictionary,
    };

    // Tag-value encoding
    pub use ferrofix_tagvalue::{MessageParser, ParserSettings, calculate_checksum, encode};

    // Session
    pub use ferrofix_session::{
        Application, ApplicationError, Responder, Session, SessionConfig, SessionSchedule,
        SessionStatus,
    };

    // Store
    pub use ferrofix_store::{MemoryStore, MessageStore};

    // Engine
    pub use ferrofix_engine::{Engine, EngineBuilder, SessionRegistry, TimerDriver};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_round_trip() {
        let mut msg = Message::of_type(&MsgType::Heartbeat);
        let header = msg.header_mut();
        header.set_string(tags::BEGIN_STRING, "FIX.4.2").unwrap();
        header.set_string(tags::SENDER_COMP_ID, "A").unwrap();
        header.set_string(tags::TARGET_COMP_ID, "B").unwrap();
        header.set_u64(tags::MSG_SEQ_NUM, 1);

        let raw = encode(&msg).unwrap();
        let parsed = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(parsed.msg_type().unwrap(), "0");
        assert_eq!(parsed.msg_seq_num().unwrap(), 1);
    }

    #[test]
    fn test_version() {
        let version = Version::Fix44;
        assert_eq!(version.begin_string(), "FIX.4.4");
    }
}
