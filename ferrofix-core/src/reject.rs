/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Reject reason codes.
//!
//! [`SessionRejectReason`] is carried in tag 373 of a session-level Reject (35=3)
//! and [`BusinessRejectReason`] in tag 380 of a BusinessMessageReject (35=j).

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SessionRejectReason (tag 373) values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u32)]
pub enum SessionRejectReason {
    /// Invalid tag number.
    InvalidTagNumber = 0,
    /// Required tag missing.
    RequiredTagMissing = 1,
    /// Tag not defined for this message type.
    TagNotDefinedForThisMessageType = 2,
    /// Undefined tag.
    UndefinedTag = 3,
    /// Tag specified without a value.
    TagSpecifiedWithoutAValue = 4,
    /// Value is incorrect (out of range) for this tag.
    ValueIsIncorrect = 5,
    /// Incorrect data format for value.
    IncorrectDataFormatForValue = 6,
    /// Decryption problem.
    DecryptionProblem = 7,
    /// Signature problem.
    SignatureProblem = 8,
    /// CompID problem.
    CompIdProblem = 9,
    /// SendingTime accuracy problem.
    SendingTimeAccuracyProblem = 10,
    /// Invalid MsgType.
    InvalidMsgType = 11,
    /// XML validation error.
    XmlValidationError = 12,
    /// Tag appears more than once.
    TagAppearsMoreThanOnce = 13,
    /// Tag specified out of required order.
    TagSpecifiedOutOfRequiredOrder = 14,
    /// Repeating group fields out of order.
    RepeatingGroupFieldsOutOfOrder = 15,
    /// Incorrect NumInGroup count for repeating group.
    IncorrectNumInGroupCountForRepeatingGroup = 16,
    /// Non-data value includes field delimiter.
    NonDataValueIncludesFieldDelimiter = 17,
    /// Invalid/unsupported application version.
    InvalidUnsupportedApplicationVersion = 18,
    /// Other.
    Other = 99,
}

impl SessionRejectReason {
    /// Returns the numeric code carried on the wire.
    #[must_use]
    pub fn code(self) -> u32 {
        self.to_u32().unwrap_or(99)
    }

    /// Looks up a reason by its wire code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }

    /// Returns the standard descriptive text for this reason.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::InvalidTagNumber => "Invalid tag number",
            Self::RequiredTagMissing => "Required tag missing",
            Self::TagNotDefinedForThisMessageType => "Tag not defined for this message type",
            Self::UndefinedTag => "Undefined Tag",
            Self::TagSpecifiedWithoutAValue => "Tag specified without a value",
            Self::ValueIsIncorrect => "Value is incorrect (out of range) for this tag",
            Self::IncorrectDataFormatForValue => "Incorrect data format for value",
            Self::DecryptionProblem => "Decryption problem",
            Self::SignatureProblem => "Signature problem",
            Self::CompIdProblem => "CompID problem",
            Self::SendingTimeAccuracyProblem => "SendingTime accuracy problem",
            Self::InvalidMsgType => "Invalid MsgType",
            Self::XmlValidationError => "XML Validation error",
            Self::TagAppearsMoreThanOnce => "Tag appears more than once",
            Self::TagSpecifiedOutOfRequiredOrder => "Tag specified out of required order",
            Self::RepeatingGroupFieldsOutOfOrder => "Repeating group fields out of order",
            Self::IncorrectNumInGroupCountForRepeatingGroup => {
                "Incorrect NumInGroup count for repeating group"
            }
            Self::NonDataValueIncludesFieldDelimiter => {
                "Non Data value includes field delimiter (SOH character)"
            }
            Self::InvalidUnsupportedApplicationVersion => "Invalid/unsupported application version",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for SessionRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// BusinessRejectReason (tag 380) values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u32)]
pub enum BusinessRejectReason {
    /// Other.
    Other = 0,
    /// Unknown ID.
    UnknownId = 1,
    /// Unknown security.
    UnknownSecurity = 2,
    /// Unsupported message type.
    UnsupportedMessageType = 3,
    /// Application not available.
    ApplicationNotAvailable = 4,
    /// Conditionally required field missing.
    ConditionallyRequiredFieldMissing = 5,
    /// Not authorized.
    NotAuthorized = 6,
    /// DeliverTo firm not available at this time.
    DeliverToFirmNotAvailable = 7,
    /// Invalid price increment.
    InvalidPriceIncrement = 18,
}

impl BusinessRejectReason {
    /// Returns the numeric code carried on the wire.
    #[must_use]
    pub fn code(self) -> u32 {
        self.to_u32().unwrap_or(0)
    }

    /// Looks up a reason by its wire code.
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }

    /// Returns the standard descriptive text for this reason.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Other => "Other",
            Self::UnknownId => "Unknown ID",
            Self::UnknownSecurity => "Unknown Security",
            Self::UnsupportedMessageType => "Unsupported Message Type",
            Self::ApplicationNotAvailable => "Application not available",
            Self::ConditionallyRequiredFieldMissing => "Conditionally required field missing",
            Self::NotAuthorized => "Not authorized",
            Self::DeliverToFirmNotAvailable => "DeliverTo firm not available at this time",
            Self::InvalidPriceIncrement => "Invalid price increment",
        }
    }
}

impl fmt::Display for BusinessRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_reject_codes() {
        assert_eq!(SessionRejectReason::RequiredTagMissing.code(), 1);
        assert_eq!(
            SessionRejectReason::IncorrectNumInGroupCountForRepeatingGroup.code(),
            16
        );
        assert_eq!(SessionRejectReason::Other.code(), 99);
        assert_eq!(
            SessionRejectReason::from_code(13),
            Some(SessionRejectReason::TagAppearsMoreThanOnce)
        );
        assert_eq!(SessionRejectReason::from_code(42), None);
    }

    #[test]
    fn test_business_reject_codes() {
        assert_eq!(BusinessRejectReason::ApplicationNotAvailable.code(), 4);
        assert_eq!(
            BusinessRejectReason::from_code(18),
            Some(BusinessRejectReason::InvalidPriceIncrement)
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            SessionRejectReason::CompIdProblem.to_string(),
            "CompID problem"
        );
        assert_eq!(
            BusinessRejectReason::UnsupportedMessageType.to_string(),
            "Unsupported Message Type"
        );
    }
}
