/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Zero-copy `tag=value<SOH>` tokenizer.
//!
//! The tokenizer only records byte offsets into the input. Raw data fields,
//! whose values may contain SOH, are handled through a length resolver
//! supplied by the caller to [`Tokenizer::next_with`].

use ferrofix_core::error::DecodeError;
use memchr::memchr;
use std::ops::Range;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Offsets of one field inside the tokenized buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Tag number.
    pub tag: u32,
    /// Offset of the first tag digit.
    pub tag_start: usize,
    /// Offset of the `=` separator.
    pub separator: usize,
    /// Offset of the terminating SOH.
    pub field_end: usize,
}

impl Token {
    /// Returns the byte range of the value.
    #[inline]
    #[must_use]
    pub const fn value_range(&self) -> Range<usize> {
        self.separator + 1..self.field_end
    }

    /// Returns the value bytes within `input`.
    #[inline]
    #[must_use]
    pub fn value<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.value_range()]
    }

    /// Returns the number of bytes the field occupies, SOH included.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.field_end + 1 - self.tag_start
    }

    /// Returns true for a zero-length value.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.field_end == self.separator + 1
    }
}

/// Lazily scans a message buffer for fields.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over a complete message.
    ///
    /// # Arguments
    /// * `input` - The FIX message bytes to scan
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    /// Reads the next field.
    ///
    /// `data_len` is called with each tag. It returns `Ok(Some(n))` for a raw
    /// data field whose companion length field holds `n`, `Ok(None)` for an
    /// ordinary field, or an error when the length is unknown.
    ///
    /// # Returns
    /// `Ok(None)` once the buffer has been consumed.
    ///
    /// # Errors
    /// `MissingEquals`, `InvalidTag` and `MissingSoh` for malformed fields,
    /// or whatever `data_len` returns.
    pub fn next_with<F>(&mut self, data_len: F) -> Result<Option<Token>, DecodeError>
    where
        F: FnOnce(u32) -> Result<Option<usize>, DecodeError>,
    {
        if self.offset >= self.input.len() {
            return Ok(None);
        }
        let tag_start = self.offset;
        let remaining = &self.input[tag_start..];

        let eq_pos = memchr(EQUALS, remaining).ok_or(DecodeError::MissingEquals {
            offset: tag_start,
        })?;
        let tag_bytes = &remaining[..eq_pos];
        let tag = parse_tag(tag_bytes).ok_or_else(|| {
            DecodeError::InvalidTag(String::from_utf8_lossy(tag_bytes).into_owned())
        })?;

        let separator = tag_start + eq_pos;
        let value_start = separator + 1;
        // Data values may hold SOH; search from the declared length onward.
        let search_from = match data_len(tag)? {
            Some(len) => value_start + len,
            None => value_start,
        };
        let field_end = self
            .input
            .get(search_from..)
            .and_then(|rest| memchr(SOH, rest))
            .map(|pos| search_from + pos)
            .ok_or(DecodeError::MissingSoh { tag })?;

        self.offset = field_end + 1;
        Ok(Some(Token {
            tag,
            tag_start,
            separator,
            field_end,
        }))
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the underlying buffer.
    #[inline]
    #[must_use]
    pub const fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Returns the remaining bytes in the buffer.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.offset.min(self.input.len())..]
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Rewinds to the beginning of the buffer.
    #[inline]
    pub fn reset(&mut self) {
        self.offset = 0;
    }
}

/// Iterates over fields, treating every value as SOH-terminated text.
///
/// Iteration ends after the first error.
impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.next_with(|_| Ok(None));
        if result.is_err() {
            self.offset = self.input.len();
        }
        result.transpose()
    }
}

/// Parses a tag number from ASCII bytes.
///
/// # Returns
/// The parsed tag number, or `None` if invalid or zero.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    (result > 0).then_some(result)
}
