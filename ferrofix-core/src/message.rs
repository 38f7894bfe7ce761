/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Message types for FIX protocol.
//!
//! This module provides:
//! - [`MsgType`]: Enumeration of FIX message types
//! - [`Message`]: Header, body and trailer field graphs plus a deferred
//!   parse error

use crate::error::FieldError;
use crate::graph::{FieldGraph, FieldOrder};
use crate::tags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Standard FIX message types.
///
/// This enum covers the administrative messages and the most common
/// application messages. Anything else is represented as `Custom(String)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MsgType {
    /// Heartbeat (0) - Session level.
    #[default]
    Heartbeat,
    /// Test Request (1) - Session level.
    TestRequest,
    /// Resend Request (2) - Session level.
    ResendRequest,
    /// Reject (3) - Session level.
    Reject,
    /// Sequence Reset (4) - Session level.
    SequenceReset,
    /// Logout (5) - Session level.
    Logout,
    /// Execution Report (8).
    ExecutionReport,
    /// Order Cancel Reject (9).
    OrderCancelReject,
    /// Logon (A) - Session level.
    Logon,
    /// News (B).
    News,
    /// New Order Single (D).
    NewOrderSingle,
    /// Order Cancel Request (F).
    OrderCancelRequest,
    /// Order Cancel/Replace Request (G).
    OrderCancelReplaceRequest,
    /// Order Status Request (H).
    OrderStatusRequest,
    /// Market Data Request (V).
    MarketDataRequest,
    /// Market Data Snapshot/Full Refresh (W).
    MarketDataSnapshotFullRefresh,
    /// Market Data Incremental Refresh (X).
    MarketDataIncrementalRefresh,
    /// Business Message Reject (j).
    BusinessMessageReject,
    /// Custom or unknown message type.
    Custom(String),
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    /// Creates a MsgType from a string value.
    ///
    /// # Arguments
    /// * `s` - The message type string (e.g., "D" for NewOrderSingle)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "0" => Self::Heartbeat,
            "1" => Self::TestRequest,
            "2" => Self::ResendRequest,
            "3" => Self::Reject,
            "4" => Self::SequenceReset,
            "5" => Self::Logout,
            "8" => Self::ExecutionReport,
            "9" => Self::OrderCancelReject,
            "A" => Self::Logon,
            "B" => Self::News,
            "D" => Self::NewOrderSingle,
            "F" => Self::OrderCancelRequest,
            "G" => Self::OrderCancelReplaceRequest,
            "H" => Self::OrderStatusRequest,
            "V" => Self::MarketDataRequest,
            "W" => Self::MarketDataSnapshotFullRefresh,
            "X" => Self::MarketDataIncrementalRefresh,
            "j" => Self::BusinessMessageReject,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl MsgType {
    /// Returns the string representation of this message type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => "0",
            Self::TestRequest => "1",
            Self::ResendRequest => "2",
            Self::Reject => "3",
            Self::SequenceReset => "4",
            Self::Logout => "5",
            Self::ExecutionReport => "8",
            Self::OrderCancelReject => "9",
            Self::Logon => "A",
            Self::News => "B",
            Self::NewOrderSingle => "D",
            Self::OrderCancelRequest => "F",
            Self::OrderCancelReplaceRequest => "G",
            Self::OrderStatusRequest => "H",
            Self::MarketDataRequest => "V",
            Self::MarketDataSnapshotFullRefresh => "W",
            Self::MarketDataIncrementalRefresh => "X",
            Self::BusinessMessageReject => "j",
            Self::Custom(s) => s.as_str(),
        }
    }

    /// Returns true if this is an administrative message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Heartbeat
                | Self::TestRequest
                | Self::ResendRequest
                | Self::Reject
                | Self::SequenceReset
                | Self::Logout
                | Self::Logon
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns true if the raw MsgType value names a session-level message.
#[must_use]
pub fn is_admin_msg_type(msg_type: &str) -> bool {
    matches!(msg_type, "0" | "1" | "2" | "3" | "4" | "5" | "A")
}

static HEADER_ORDER: LazyLock<Arc<FieldOrder>> = LazyLock::new(|| {
    Arc::new(FieldOrder::new([
        tags::BEGIN_STRING,
        tags::BODY_LENGTH,
        tags::MSG_TYPE,
    ]))
});

static TRAILER_ORDER: LazyLock<Arc<FieldOrder>> = LazyLock::new(|| {
    Arc::new(FieldOrder::new([
        tags::SIGNATURE_LENGTH,
        tags::SIGNATURE,
        tags::CHECK_SUM,
    ]))
});

/// A FIX message: header, body and trailer.
///
/// BodyLength and CheckSum are derived by the encoder; a parsed message keeps
/// the values it arrived with until it is encoded again.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    header: FieldGraph,
    body: FieldGraph,
    trailer: FieldGraph,
    parse_error: Option<FieldError>,
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    /// Creates an empty message.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: FieldGraph::with_order(Arc::clone(&HEADER_ORDER)),
            body: FieldGraph::new(),
            trailer: FieldGraph::with_order(Arc::clone(&TRAILER_ORDER)),
            parse_error: None,
        }
    }

    /// Creates an empty message whose body follows the given ordering.
    #[must_use]
    pub fn with_body_order(order: Arc<FieldOrder>) -> Self {
        Self {
            body: FieldGraph::with_order(order),
            ..Self::new()
        }
    }

    /// Creates a message with MsgType already set.
    #[must_use]
    pub fn of_type(msg_type: &MsgType) -> Self {
        let mut msg = Self::new();
        // An empty custom type leaves MsgType unset.
        let _ = msg.header.set_string(tags::MSG_TYPE, msg_type.as_str());
        msg
    }

    /// Returns the header.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &FieldGraph {
        &self.header
    }

    /// Returns the header mutably.
    #[inline]
    pub fn header_mut(&mut self) -> &mut FieldGraph {
        &mut self.header
    }

    /// Returns the body.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> &FieldGraph {
        &self.body
    }

    /// Returns the body mutably.
    #[inline]
    pub fn body_mut(&mut self) -> &mut FieldGraph {
        &mut self.body
    }

    /// Returns the trailer.
    #[inline]
    #[must_use]
    pub const fn trailer(&self) -> &FieldGraph {
        &self.trailer
    }

    /// Returns the trailer mutably.
    #[inline]
    pub fn trailer_mut(&mut self) -> &mut FieldGraph {
        &mut self.trailer
    }

    /// Returns MsgType (35).
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when absent.
    pub fn msg_type(&self) -> Result<&str, FieldError> {
        self.header.get_string(tags::MSG_TYPE)
    }

    /// Returns MsgSeqNum (34).
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn msg_seq_num(&self) -> Result<u64, FieldError> {
        self.header.get_u64(tags::MSG_SEQ_NUM)
    }

    /// Returns BeginString (8).
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when absent.
    pub fn begin_string(&self) -> Result<&str, FieldError> {
        self.header.get_string(tags::BEGIN_STRING)
    }

    /// Returns true when MsgType names a session-level message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.msg_type().is_ok_and(is_admin_msg_type)
    }

    /// Returns true when MsgType names an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        self.msg_type().is_ok_and(|t| !is_admin_msg_type(t))
    }

    /// Returns true when PossDupFlag (43) is `Y`.
    #[must_use]
    pub fn is_poss_dup(&self) -> bool {
        self.header.get_bool(tags::POSS_DUP_FLAG).unwrap_or(false)
    }

    /// Returns the first field-level error recorded while parsing.
    #[must_use]
    pub const fn parse_error(&self) -> Option<&FieldError> {
        self.parse_error.as_ref()
    }

    /// Records a parse error. The first error recorded wins.
    pub fn set_parse_error(&mut self, error: FieldError) {
        if self.parse_error.is_none() {
            self.parse_error = Some(error);
        }
    }

    /// Removes every field from the header, body and trailer.
    pub fn clear(&mut self) {
        self.header.clear();
        self.body.clear();
        self.trailer.clear();
        self.parse_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reject::SessionRejectReason;

    #[test]
    fn test_msg_type_from_str() {
        assert_eq!("0".parse::<MsgType>().unwrap(), MsgType::Heartbeat);
        assert_eq!("A".parse::<MsgType>().unwrap(), MsgType::Logon);
        assert_eq!("D".parse::<MsgType>().unwrap(), MsgType::NewOrderSingle);
        assert_eq!("j".parse::<MsgType>().unwrap(), MsgType::BusinessMessageReject);
    }

    #[test]
    fn test_msg_type_is_admin() {
        assert!(MsgType::Heartbeat.is_admin());
        assert!(MsgType::Logon.is_admin());
        assert!(!MsgType::BusinessMessageReject.is_admin());
        assert!(MsgType::NewOrderSingle.is_app());
    }

    #[test]
    fn test_msg_type_custom() {
        let custom: MsgType = "XX".parse().unwrap();
        assert!(matches!(custom, MsgType::Custom(_)));
        assert_eq!(custom.as_str(), "XX");
    }

    #[test]
    fn test_header_order_pins_first_three() {
        let mut msg = Message::of_type(&MsgType::Logon);
        msg.header_mut().set_u64(tags::MSG_SEQ_NUM, 1);
        msg.header_mut().set_string(tags::SENDER_COMP_ID, "A").unwrap();
        msg.header_mut().set_int(tags::BODY_LENGTH, 0);
        msg.header_mut()
            .set_string(tags::BEGIN_STRING, "FIX.4.2")
            .unwrap();
        let order: Vec<u32> = msg.header().fields().map(|f| f.tag()).collect();
        assert_eq!(order, vec![8, 9, 35, 34, 49]);
    }

    #[test]
    fn test_trailer_order() {
        let mut msg = Message::new();
        msg.trailer_mut().set_string(tags::CHECK_SUM, "000").unwrap();
        msg.trailer_mut().set_string(tags::SIGNATURE, "sig").unwrap();
        msg.trailer_mut().set_int(tags::SIGNATURE_LENGTH, 3);
        let order: Vec<u32> = msg.trailer().fields().map(|f| f.tag()).collect();
        assert_eq!(order, vec![93, 89, 10]);
    }

    #[test]
    fn test_header_accessors() {
        let mut msg = Message::of_type(&MsgType::Heartbeat);
        msg.header_mut().set_u64(tags::MSG_SEQ_NUM, 7);
        msg.header_mut().set_bool(tags::POSS_DUP_FLAG, true);
        assert_eq!(msg.msg_type().unwrap(), "0");
        assert_eq!(msg.msg_seq_num().unwrap(), 7);
        assert!(msg.is_admin());
        assert!(msg.is_poss_dup());
        assert_eq!(
            msg.begin_string(),
            Err(FieldError::NotFound(tags::BEGIN_STRING))
        );
    }

    #[test]
    fn test_first_parse_error_wins() {
        let mut msg = Message::new();
        msg.set_parse_error(FieldError::rejected(
            SessionRejectReason::TagAppearsMoreThanOnce,
            55,
        ));
        msg.set_parse_error(FieldError::NotFound(34));
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::TagAppearsMoreThanOnce,
                55
            ))
        );
    }
}
