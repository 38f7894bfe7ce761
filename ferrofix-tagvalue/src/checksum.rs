/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX checksum calculation.
//!
//! The FIX checksum is the sum of all bytes in the message (excluding the
//! checksum field itself) modulo 256, formatted as a 3-digit zero-padded string.

use ferrofix_core::error::DecodeError;
use memchr::memmem;

/// Calculates the FIX checksum for the given data.
///
/// # Arguments
/// * `data` - The message bytes to checksum (excluding the 10=XXX| field)
///
/// # Example
/// ```
/// use ferrofix_tagvalue::calculate_checksum;
///
/// let data = b"8=FIX.4.4\x019=5\x0135=0\x01";
/// let checksum = calculate_checksum(data);
/// ```
#[inline]
#[must_use]
pub fn calculate_checksum(data: &[u8]) -> u8 {
    let sum: u32 = data.iter().map(|&b| u32::from(b)).sum();
    (sum % 256) as u8
}

/// Formats a checksum value as a 3-digit zero-padded string.
///
/// # Arguments
/// * `checksum` - The checksum value (0-255)
#[inline]
#[must_use]
pub fn format_checksum(checksum: u8) -> [u8; 3] {
    let d0 = b'0' + (checksum / 100);
    let d1 = b'0' + ((checksum / 10) % 10);
    let d2 = b'0' + (checksum % 10);
    [d0, d1, d2]
}

/// Parses a 3-digit checksum string to a u8 value.
///
/// # Arguments
/// * `bytes` - The 3-byte checksum string
///
/// # Returns
/// `Some(checksum)` if valid, `None` otherwise.
#[inline]
#[must_use]
pub fn parse_checksum(bytes: &[u8]) -> Option<u8> {
    let [d0, d1, d2] = *bytes else {
        return None;
    };
    let digit = |b: u8| b.is_ascii_digit().then(|| u16::from(b - b'0'));
    let value = digit(d0)? * 100 + digit(d1)? * 10 + digit(d2)?;
    u8::try_from(value).ok()
}

/// Verifies the trailing CheckSum of a complete raw message.
///
/// # Arguments
/// * `raw` - A full message ending in `10=XXX<SOH>`
///
/// # Errors
/// `MissingChecksum` when the message does not end with a CheckSum field,
/// `InvalidChecksumFormat` when its value is not three digits, and
/// `ChecksumMismatch` when the value is wrong.
pub fn verify(raw: &[u8]) -> Result<(), DecodeError> {
    let start = if raw.starts_with(b"10=") {
        0
    } else {
        memmem::rfind(raw, b"\x0110=")
            .map(|pos| pos + 1)
            .ok_or(DecodeError::MissingChecksum)?
    };
    let value = raw[start + 3..]
        .strip_suffix(b"\x01")
        .ok_or(DecodeError::MissingChecksum)?;
    let declared = parse_checksum(value).ok_or_else(|| {
        DecodeError::InvalidChecksumFormat(String::from_utf8_lossy(value).into_owned())
    })?;
    let calculated = calculate_checksum(&raw[..start]);
    if calculated != declared {
        return Err(DecodeError::ChecksumMismatch {
            calculated,
            declared,
        });
    }
    Ok(())
}
