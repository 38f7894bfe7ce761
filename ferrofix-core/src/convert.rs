/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Conversions between raw FIX field text and typed values.
//!
//! Every parser is strict and byte-exact:
//! - booleans are exactly `Y` or `N`
//! - integers are an optional `-` followed by ASCII digits
//! - decimals allow one `.`, never `+` or an exponent
//! - dates are `YYYYMMDD`, times `HH:MM:SS[.sss]`, timestamps
//!   `YYYYMMDD-HH:MM:SS[.sss]` (6 and 9 fractional digits are also accepted)
//!
//! Failures are reported as [`ConversionError`] naming the raw text.

use crate::error::ConversionError;
use crate::types::TimestampPrecision;
use arrayvec::ArrayString;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt::Write;
use std::str::FromStr;

/// Largest number of trailing zero-padding digits for decimals.
pub const MAX_DECIMAL_PADDING: usize = 14;

const ZERO_PADDING: [&str; MAX_DECIMAL_PADDING + 1] = [
    "",
    "0",
    "00",
    "000",
    "0000",
    "00000",
    "000000",
    "0000000",
    "00000000",
    "000000000",
    "0000000000",
    "00000000000",
    "000000000000",
    "0000000000000",
    "00000000000000",
];

const POW10: [u32; 10] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
];

/// Formats a boolean as `Y`/`N`.
#[inline]
#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

/// Parses `Y`/`N`.
///
/// # Errors
/// Returns `ConversionError` for any other text.
pub fn parse_bool(raw: &[u8]) -> Result<bool, ConversionError> {
    match raw {
        b"Y" => Ok(true),
        b"N" => Ok(false),
        _ => Err(ConversionError::new("boolean", raw)),
    }
}

/// Formats an integer.
#[must_use]
pub fn format_int(value: i64) -> String {
    itoa::Buffer::new().format(value).to_owned()
}

/// Parses an optionally negative decimal integer.
///
/// # Errors
/// Returns `ConversionError` on empty input, stray characters or overflow.
pub fn parse_int(raw: &[u8]) -> Result<i64, ConversionError> {
    let err = || ConversionError::new("integer", raw);
    let (negative, digits) = match raw.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, raw),
    };
    if digits.is_empty() {
        return Err(err());
    }
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(err());
        }
        let digit = i64::from(b - b'0');
        value = value.checked_mul(10).ok_or_else(err)?;
        value = if negative {
            value.checked_sub(digit)
        } else {
            value.checked_add(digit)
        }
        .ok_or_else(err)?;
    }
    Ok(value)
}

/// Formats a decimal in plain notation with at least `padding` fraction digits.
///
/// Padding above [`MAX_DECIMAL_PADDING`] is clamped. With a padding of zero
/// the value is written without trailing zeros.
#[must_use]
pub fn format_decimal(value: Decimal, padding: usize) -> String {
    let mut text = value.normalize().to_string();
    let padding = padding.min(MAX_DECIMAL_PADDING);
    if padding > 0 {
        let fraction = text.find('.').map_or(0, |dot| text.len() - dot - 1);
        if fraction < padding {
            if fraction == 0 {
                text.push('.');
            }
            text.push_str(ZERO_PADDING[padding - fraction]);
        }
    }
    text
}

/// Parses a plain decimal.
///
/// # Errors
/// Returns `ConversionError` for a leading `+`, exponent notation, more than
/// one `.`, no digits, or a value out of range.
pub fn parse_decimal(raw: &[u8]) -> Result<Decimal, ConversionError> {
    let err = || ConversionError::new("decimal", raw);
    let digits = raw.strip_prefix(b"-").unwrap_or(raw);
    let mut seen_dot = false;
    let mut seen_digit = false;
    for &b in digits {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => return Err(err()),
        }
    }
    if !seen_digit {
        return Err(err());
    }
    let text = std::str::from_utf8(raw).map_err(|_| err())?;
    Decimal::from_str(text).map_err(|_| err())
}

/// Parses a single character.
///
/// # Errors
/// Returns `ConversionError` unless the text is exactly one character.
pub fn parse_char(raw: &[u8]) -> Result<char, ConversionError> {
    let err = || ConversionError::new("char", raw);
    let text = std::str::from_utf8(raw).map_err(|_| err())?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(err()),
    }
}

#[inline]
fn digits(raw: &[u8]) -> Option<u32> {
    raw.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + u32::from(b - b'0'))
    })
}

fn date_part(raw: &[u8]) -> Option<NaiveDate> {
    if raw.len() != 8 {
        return None;
    }
    let year = digits(&raw[0..4])?;
    let month = digits(&raw[4..6])?;
    let day = digits(&raw[6..8])?;
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn time_part(raw: &[u8]) -> Option<NaiveTime> {
    if raw.len() < 8 || raw[2] != b':' || raw[5] != b':' {
        return None;
    }
    let hour = digits(&raw[0..2])?;
    let minute = digits(&raw[3..5])?;
    let second = digits(&raw[6..8])?;
    let nanos = match &raw[8..] {
        [] => 0,
        [b'.', fraction @ ..] if matches!(fraction.len(), 3 | 6 | 9) => {
            digits(fraction)? * POW10[9 - fraction.len()]
        }
        _ => return None,
    };
    // chrono represents a leap second as 59 with an extra second of nanos.
    if second == 60 {
        NaiveTime::from_hms_nano_opt(hour, minute, 59, nanos + 1_000_000_000)
    } else {
        NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)
    }
}

/// Formats a UTC date as `YYYYMMDD`.
#[must_use]
pub fn format_utc_date(date: NaiveDate) -> ArrayString<8> {
    let mut buf = ArrayString::new();
    let _ = write!(buf, "{}", date.format("%Y%m%d"));
    buf
}

/// Parses a `YYYYMMDD` UTC date.
///
/// # Errors
/// Returns `ConversionError` for malformed text or an impossible date.
pub fn parse_utc_date(raw: &[u8]) -> Result<NaiveDate, ConversionError> {
    date_part(raw).ok_or_else(|| ConversionError::new("UTCDateOnly", raw))
}

/// Formats a UTC time-of-day as `HH:MM:SS` plus the requested fraction.
#[must_use]
pub fn format_utc_time_only(time: NaiveTime, precision: TimestampPrecision) -> ArrayString<18> {
    let mut buf = ArrayString::new();
    let _ = match precision {
        TimestampPrecision::Seconds => write!(buf, "{}", time.format("%H:%M:%S")),
        TimestampPrecision::Millis => write!(buf, "{}", time.format("%H:%M:%S%.3f")),
        TimestampPrecision::Micros => write!(buf, "{}", time.format("%H:%M:%S%.6f")),
        TimestampPrecision::Nanos => write!(buf, "{}", time.format("%H:%M:%S%.9f")),
    };
    buf
}

/// Parses a `HH:MM:SS[.sss]` UTC time-of-day.
///
/// # Errors
/// Returns `ConversionError` for malformed text or an impossible time.
pub fn parse_utc_time_only(raw: &[u8]) -> Result<NaiveTime, ConversionError> {
    time_part(raw).ok_or_else(|| ConversionError::new("UTCTimeOnly", raw))
}

/// Formats a UTC timestamp as `YYYYMMDD-HH:MM:SS` plus the requested fraction.
#[must_use]
pub fn format_utc_timestamp(
    timestamp: &DateTime<Utc>,
    precision: TimestampPrecision,
) -> ArrayString<27> {
    let mut buf = ArrayString::new();
    let _ = match precision {
        TimestampPrecision::Seconds => write!(buf, "{}", timestamp.format("%Y%m%d-%H:%M:%S")),
        TimestampPrecision::Millis => write!(buf, "{}", timestamp.format("%Y%m%d-%H:%M:%S%.3f")),
        TimestampPrecision::Micros => write!(buf, "{}", timestamp.format("%Y%m%d-%H:%M:%S%.6f")),
        TimestampPrecision::Nanos => write!(buf, "{}", timestamp.format("%Y%m%d-%H:%M:%S%.9f")),
    };
    buf
}

/// Parses a `YYYYMMDD-HH:MM:SS[.sss]` UTC timestamp.
///
/// # Errors
/// Returns `ConversionError` for malformed text or an impossible instant.
pub fn parse_utc_timestamp(raw: &[u8]) -> Result<DateTime<Utc>, ConversionError> {
    let parsed = if raw.len() >= 17 && raw[8] == b'-' {
        date_part(&raw[..8]).zip(time_part(&raw[9..]))
    } else {
        None
    };
    parsed
        .map(|(date, time)| date.and_time(time).and_utc())
        .ok_or_else(|| ConversionError::new("UTCTimestamp", raw))
}
