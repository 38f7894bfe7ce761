/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Field types for FIX protocol messages.
//!
//! This module provides:
//! - [`Field`]: A tag paired with its raw wire text and typed value
//! - [`FieldValue`]: Enumeration of possible field value types
//!
//! The raw text is the source of truth on the wire. Typed getters always
//! re-derive their value from it through [`crate::convert`], so a field read
//! as a different type than it was stored with behaves like the wire would.

use crate::convert;
use crate::error::{ConversionError, FieldError};
use crate::types::TimestampPrecision;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration of possible FIX field value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Decimal/float value.
    Decimal(Decimal),
    /// Boolean value (Y/N).
    Bool(bool),
    /// Single character value.
    Char(char),
    /// Raw bytes (for data fields).
    Data(Bytes),
    /// UTC calendar date.
    UtcDate(NaiveDate),
    /// UTC time of day.
    UtcTimeOnly(NaiveTime),
    /// UTC timestamp.
    UtcTimestamp(DateTime<Utc>),
    /// NumInGroup count of a repeating group.
    GroupCount(usize),
}

impl FieldValue {
    /// Produces the wire text for this value with default formatting.
    ///
    /// Decimals carry no padding and time values use millisecond precision.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        match self {
            Self::String(s) => Bytes::copy_from_slice(s.as_bytes()),
            Self::Int(v) => Bytes::from(convert::format_int(*v)),
            Self::Decimal(v) => Bytes::from(convert::format_decimal(*v, 0)),
            Self::Bool(v) => Bytes::from_static(convert::format_bool(*v).as_bytes()),
            Self::Char(c) => Bytes::from(c.to_string()),
            Self::Data(d) => d.clone(),
            Self::UtcDate(d) => Bytes::copy_from_slice(convert::format_utc_date(*d).as_bytes()),
            Self::UtcTimeOnly(t) => Bytes::copy_from_slice(
                convert::format_utc_time_only(*t, TimestampPrecision::Millis).as_bytes(),
            ),
            Self::UtcTimestamp(ts) => Bytes::copy_from_slice(
                convert::format_utc_timestamp(ts, TimestampPrecision::Millis).as_bytes(),
            ),
            Self::GroupCount(n) => Bytes::copy_from_slice(itoa::Buffer::new().format(*n).as_bytes()),
        }
    }

    /// Returns the value as a string, if it is a String variant.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(d) => write!(f, "<{} bytes>", d.len()),
            other => write!(f, "{}", String::from_utf8_lossy(&other.encode())),
        }
    }
}

/// A single `tag=value` pair.
///
/// Equality compares the tag and the raw wire text only.
#[derive(Debug, Clone)]
pub struct Field {
    tag: u32,
    raw: Bytes,
    value: FieldValue,
}

impl Field {
    /// Creates a field from a typed value using default formatting.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The typed value
    #[must_use]
    pub fn new(tag: u32, value: FieldValue) -> Self {
        let raw = value.encode();
        Self { tag, raw, value }
    }

    /// Creates a field from raw wire text.
    ///
    /// The typed value is a `String` when the text is valid UTF-8 and
    /// `Data` otherwise.
    #[must_use]
    pub fn from_raw(tag: u32, raw: Bytes) -> Self {
        let value = match std::str::from_utf8(&raw) {
            Ok(s) => FieldValue::String(s.to_owned()),
            Err(_) => FieldValue::Data(raw.clone()),
        };
        Self { tag, raw, value }
    }

    /// Creates a string field.
    #[must_use]
    pub fn string(tag: u32, value: impl Into<String>) -> Self {
        Self::new(tag, FieldValue::String(value.into()))
    }

    /// Creates an integer field.
    #[must_use]
    pub fn int(tag: u32, value: i64) -> Self {
        Self::new(tag, FieldValue::Int(value))
    }

    /// Creates a decimal field with `padding` minimum fraction digits.
    #[must_use]
    pub fn decimal(tag: u32, value: Decimal, padding: usize) -> Self {
        Self {
            tag,
            raw: Bytes::from(convert::format_decimal(value, padding)),
            value: FieldValue::Decimal(value),
        }
    }

    /// Creates a `Y`/`N` field.
    #[must_use]
    pub fn bool(tag: u32, value: bool) -> Self {
        Self::new(tag, FieldValue::Bool(value))
    }

    /// Creates a single-character field.
    #[must_use]
    pub fn char(tag: u32, value: char) -> Self {
        Self::new(tag, FieldValue::Char(value))
    }

    /// Creates a raw data field.
    #[must_use]
    pub fn data(tag: u32, value: impl Into<Bytes>) -> Self {
        Self::new(tag, FieldValue::Data(value.into()))
    }

    /// Creates a UTC timestamp field with the given precision.
    #[must_use]
    pub fn utc_timestamp(tag: u32, value: DateTime<Utc>, precision: TimestampPrecision) -> Self {
        Self {
            tag,
            raw: Bytes::copy_from_slice(
                convert::format_utc_timestamp(&value, precision).as_bytes(),
            ),
            value: FieldValue::UtcTimestamp(value),
        }
    }

    /// Creates a UTC date field.
    #[must_use]
    pub fn utc_date(tag: u32, value: NaiveDate) -> Self {
        Self::new(tag, FieldValue::UtcDate(value))
    }

    /// Creates a UTC time-of-day field with the given precision.
    #[must_use]
    pub fn utc_time_only(tag: u32, value: NaiveTime, precision: TimestampPrecision) -> Self {
        Self {
            tag,
            raw: Bytes::copy_from_slice(convert::format_utc_time_only(value, precision).as_bytes()),
            value: FieldValue::UtcTimeOnly(value),
        }
    }

    /// Creates a NumInGroup count field.
    #[must_use]
    pub fn group_count(tag: u32, count: usize) -> Self {
        Self::new(tag, FieldValue::GroupCount(count))
    }

    /// Returns the tag number.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns the raw wire text.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Returns a cheap clone of the raw buffer.
    #[inline]
    #[must_use]
    pub fn raw_bytes(&self) -> Bytes {
        self.raw.clone()
    }

    /// Returns the typed value this field was built with.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Returns true when the raw text is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of bytes `tag=value<SOH>` takes on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        itoa::Buffer::new().format(self.tag).len() + self.raw.len() + 2
    }

    /// Returns the byte sum of `tag=value<SOH>`.
    #[must_use]
    pub fn byte_sum(&self) -> u32 {
        let tag_sum: u32 = itoa::Buffer::new()
            .format(self.tag)
            .bytes()
            .map(u32::from)
            .sum();
        let raw_sum: u32 = self.raw.iter().map(|&b| u32::from(b)).sum();
        tag_sum + raw_sum + u32::from(b'=') + 1
    }

    #[inline]
    fn convert<T>(
        &self,
        f: impl FnOnce(&[u8]) -> Result<T, ConversionError>,
    ) -> Result<T, FieldError> {
        f(&self.raw).map_err(|source| FieldError::IncorrectDataFormat {
            tag: self.tag,
            source,
        })
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&str, FieldError> {
        std::str::from_utf8(&self.raw).map_err(|_| FieldError::IncorrectDataFormat {
            tag: self.tag,
            source: ConversionError::new("string", &self.raw),
        })
    }

    /// Returns the value as an integer.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not an integer.
    pub fn to_int(&self) -> Result<i64, FieldError> {
        self.convert(convert::parse_int)
    }

    /// Returns the value as a non-negative integer.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not an
    /// integer or is negative.
    pub fn to_u64(&self) -> Result<u64, FieldError> {
        self.convert(|raw| {
            convert::parse_int(raw)
                .and_then(|v| u64::try_from(v).map_err(|_| ConversionError::new("integer", raw)))
        })
    }

    /// Returns the value as a decimal.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not a decimal.
    pub fn to_decimal(&self) -> Result<Decimal, FieldError> {
        self.convert(convert::parse_decimal)
    }

    /// Returns the value as a boolean.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not `Y`/`N`.
    pub fn to_bool(&self) -> Result<bool, FieldError> {
        self.convert(convert::parse_bool)
    }

    /// Returns the value as a single character.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` if the value is not one character.
    pub fn to_char(&self) -> Result<char, FieldError> {
        self.convert(convert::parse_char)
    }

    /// Returns the value as a UTC timestamp.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` on malformed text.
    pub fn to_utc_timestamp(&self) -> Result<DateTime<Utc>, FieldError> {
        self.convert(convert::parse_utc_timestamp)
    }

    /// Returns the value as a UTC date.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` on malformed text.
    pub fn to_utc_date(&self) -> Result<NaiveDate, FieldError> {
        self.convert(convert::parse_utc_date)
    }

    /// Returns the value as a UTC time of day.
    ///
    /// # Errors
    /// Returns `FieldError::IncorrectDataFormat` on malformed text.
    pub fn to_utc_time_only(&self) -> Result<NaiveTime, FieldError> {
        self.convert(convert::parse_utc_time_only)
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.raw == other.raw
    }
}

impl Eq for Field {}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tag, String::from_utf8_lossy(&self.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_field_raw_and_value_agree() {
        let field = Field::int(34, 12345);
        assert_eq!(field.raw(), b"12345");
        assert_eq!(field.value(), &FieldValue::Int(12345));
        assert_eq!(field.to_int().unwrap(), 12345);
    }

    #[test]
    fn test_field_equality_is_tag_and_raw() {
        let a = Field::string(44, "1.50");
        let b = Field::decimal(44, Decimal::new(15, 1), 2);
        assert_eq!(a, b);
        assert_ne!(a, Field::string(44, "1.5"));
        assert_ne!(a, Field::string(45, "1.50"));
    }

    #[test]
    fn test_typed_getters_convert_from_raw() {
        let field = Field::string(43, "Y");
        assert!(field.to_bool().unwrap());
        let field = Field::from_raw(52, Bytes::from_static(b"20240115-10:30:00.000"));
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(field.to_utc_timestamp().unwrap(), expected);
    }

    #[test]
    fn test_typed_getter_failure_names_tag() {
        let field = Field::string(34, "abc");
        match field.to_int() {
            Err(FieldError::IncorrectDataFormat { tag, source }) => {
                assert_eq!(tag, 34);
                assert_eq!(source.raw, "abc");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Field::int(34, -1).to_u64().is_err());
    }

    #[test]
    fn test_from_raw_binary_is_data() {
        let field = Field::from_raw(96, Bytes::from_static(&[0xFF, 0x01, 0x02]));
        assert!(matches!(field.value(), FieldValue::Data(_)));
        assert!(field.as_str().is_err());
    }

    #[test]
    fn test_wire_metrics() {
        let field = Field::string(35, "A");
        assert_eq!(field.encoded_len(), 5);
        let expected: u32 = b"35=A\x01".iter().map(|&b| u32::from(b)).sum();
        assert_eq!(field.byte_sum(), expected);
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::String("test".to_string()).to_string(), "test");
        assert_eq!(FieldValue::Int(42).to_string(), "42");
        assert_eq!(FieldValue::Bool(true).to_string(), "Y");
        assert_eq!(FieldValue::Bool(false).to_string(), "N");
        assert_eq!(FieldValue::GroupCount(3).to_string(), "3");
    }
}
