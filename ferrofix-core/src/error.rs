/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Error types for the FerroFix FIX protocol engine.
//!
//! The hierarchy follows the protocol's own taxonomy:
//! - [`DecodeError`]: structural/framing failures. The message cannot be
//!   trusted at all and is dropped without touching sequence numbers.
//! - [`FieldError`]: field-level failures. Each one maps onto a
//!   [`SessionRejectReason`] and a tag and can be turned into a Reject.
//! - [`ConversionError`]: a raw value could not be converted to a typed value.
//! - [`SessionError`]: fatal session conditions that end the connection.
//! - [`StoreError`]: message store failures.

use crate::reject::SessionRejectReason;
use std::ops::Range;
use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FerroFix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Structural error while decoding a message.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message encoding.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Field-level error.
    #[error("field error: {0}")]
    Field(#[from] FieldError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Error in message store operations.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error from an external collaborator.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural errors found while tokenizing or parsing a FIX message.
///
/// These are always fatal to the message they were found in.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// BeginString, BodyLength and MsgType were not the first three fields.
    #[error("header fields out of order: expected tag {expected} at position {position}, found {found}")]
    HeaderOutOfOrder {
        /// Zero-based field position.
        position: usize,
        /// The tag required at that position.
        expected: u32,
        /// The tag actually found (0 when the message ended).
        found: u32,
    },

    /// No `=` separator after a tag.
    #[error("equal sign not found in field at offset {offset}")]
    MissingEquals {
        /// Byte offset of the field start.
        offset: usize,
    },

    /// Tag is not a positive decimal number.
    #[error("bad tag format: {0:?}")]
    InvalidTag(String),

    /// The value of a field is not terminated by SOH.
    #[error("SOH not found at end of field: tag {tag}")]
    MissingSoh {
        /// The tag of the unterminated field.
        tag: u32,
    },

    /// A raw data field arrived without a usable length field.
    #[error("did not find length field {length_tag} required to parse data field {tag}")]
    MissingDataLength {
        /// The data field tag.
        tag: u32,
        /// The companion length field tag.
        length_tag: u32,
    },

    /// A repeating group member appeared before the group's delimiter.
    #[error("group {count_tag} must start with delimiter {delimiter_tag}, found tag {tag}")]
    MalformedGroup {
        /// The NumInGroup tag.
        count_tag: u32,
        /// The delimiter tag the group instance must begin with.
        delimiter_tag: u32,
        /// The offending member tag.
        tag: u32,
    },

    /// CheckSum field is absent.
    #[error("missing checksum field (tag 10)")]
    MissingChecksum,

    /// CheckSum field is not three decimal digits.
    #[error("invalid checksum format: {0:?}")]
    InvalidChecksumFormat(String),

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// BodyLength does not match the byte count actually present.
    #[error("body length mismatch: declared {declared}, actual {actual}")]
    BodyLengthMismatch {
        /// Declared BodyLength value.
        declared: usize,
        /// Measured body length.
        actual: usize,
    },

    /// Message exceeds maximum allowed size.
    #[error("message too large: {size} bytes exceeds maximum {max_size}")]
    MessageTooLarge {
        /// Actual message size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max_size: usize,
    },
}

/// Errors that occur during FIX message encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A field the wire format needs is not set.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },
}

/// A raw value could not be converted into the requested typed value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot convert {raw:?} to {kind}")]
pub struct ConversionError {
    /// Name of the target type (e.g. `"int"`, `"UTCTimestamp"`).
    pub kind: &'static str,
    /// The offending raw text (lossily decoded).
    pub raw: String,
}

impl ConversionError {
    /// Creates a conversion error for the given raw bytes.
    #[must_use]
    pub fn new(kind: &'static str, raw: impl AsRef<[u8]>) -> Self {
        Self {
            kind,
            raw: String::from_utf8_lossy(raw.as_ref()).into_owned(),
        }
    }
}

/// Field-level error carrying enough information to build a session Reject.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The requested field (or group instance) is not present.
    #[error("field not found: tag {0}")]
    NotFound(u32),

    /// The raw value does not match the field's type.
    #[error("incorrect data format for tag {tag}: {source}")]
    IncorrectDataFormat {
        /// The tag whose value is malformed.
        tag: u32,
        /// The underlying conversion failure.
        source: ConversionError,
    },

    /// A protocol rule was violated.
    #[error("{reason} (tag {tag})")]
    Rejected {
        /// Session-level reject reason.
        reason: SessionRejectReason,
        /// The offending tag, or 0 when not applicable.
        tag: u32,
    },
}

impl FieldError {
    /// Shorthand for a [`FieldError::Rejected`].
    #[inline]
    #[must_use]
    pub const fn rejected(reason: SessionRejectReason, tag: u32) -> Self {
        Self::Rejected { reason, tag }
    }

    /// Returns the tag the error refers to.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Self::NotFound(tag) => *tag,
            Self::IncorrectDataFormat { tag, .. } | Self::Rejected { tag, .. } => *tag,
        }
    }

    /// Returns the session reject reason this error maps onto.
    #[must_use]
    pub const fn reject_reason(&self) -> SessionRejectReason {
        match self {
            Self::NotFound(_) => SessionRejectReason::RequiredTagMissing,
            Self::IncorrectDataFormat { .. } => SessionRejectReason::IncorrectDataFormatForValue,
            Self::Rejected { reason, .. } => *reason,
        }
    }
}

/// Errors in FIX session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A message arrived that is not allowed in the current logon state.
    #[error("logon state is not valid for message (MsgType={msg_type})")]
    InvalidLogonState {
        /// The message type that was received.
        msg_type: String,
    },

    /// BeginString does not match the session's.
    #[error("incorrect BeginString: expected {expected}, received {received}")]
    IncorrectBeginString {
        /// The session's BeginString.
        expected: String,
        /// The BeginString received.
        received: String,
    },

    /// Logon was rejected.
    #[error("logon rejected: {reason}")]
    LogonRejected {
        /// Reason for rejection.
        reason: String,
    },

    /// Heartbeat timeout, no traffic received.
    #[error("heartbeat timeout after {elapsed_ms} milliseconds")]
    HeartbeatTimeout {
        /// Elapsed time in milliseconds since last message.
        elapsed_ms: u64,
    },

    /// Sequence number too low without PossDupFlag.
    #[error("MsgSeqNum too low, expecting {expected} but received {received}")]
    SequenceTooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// The application failed while handling a callback.
    #[error("application error: {0}")]
    Application(String),

    /// No responder is attached to the session.
    #[error("session is not connected")]
    NotConnected,

    /// A session with the same identity is already registered.
    #[error("session already registered: {0}")]
    DuplicateSession(String),

    /// No session is registered under the given identity.
    #[error("unknown session: {0}")]
    UnknownSession(String),

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors in message store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Failed to store message.
    #[error("failed to store message seq={seq_num}: {reason}")]
    StoreFailed {
        /// Sequence number of the message.
        seq_num: u64,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to retrieve message.
    #[error("failed to retrieve message seq={seq_num}: {reason}")]
    RetrieveFailed {
        /// Sequence number of the message.
        seq_num: u64,
        /// Reason for failure.
        reason: String,
    },

    /// Range of messages not available.
    #[error("messages not available for range: {range:?}")]
    RangeNotAvailable {
        /// The requested range of sequence numbers.
        range: Range<u64>,
    },

    /// Store is corrupted.
    #[error("store corrupted: {reason}")]
    Corrupted {
        /// Description of the corruption.
        reason: String,
    },

    /// I/O error in persistent store.
    #[error("store i/o error: {0}")]
    Io(String),
}
