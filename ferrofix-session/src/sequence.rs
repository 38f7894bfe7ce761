/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Sequence number classification and outstanding resend ranges.
//!
//! The counters themselves live in the message store; this module only
//! decides what an incoming number means and remembers which gap has been
//! requested.

/// Outcome of comparing a received MsgSeqNum with the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// Sequence number is as expected.
    InSequence,
    /// Sequence number is lower than expected (possible duplicate).
    TooLow {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
    /// Sequence number is higher than expected (gap detected).
    TooHigh {
        /// Expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },
}

impl SequenceCheck {
    /// Classifies a received sequence number.
    ///
    /// # Arguments
    /// * `expected` - The next expected target sequence number
    /// * `received` - The MsgSeqNum of the incoming message
    #[must_use]
    pub const fn classify(expected: u64, received: u64) -> Self {
        if received == expected {
            Self::InSequence
        } else if received < expected {
            Self::TooLow { expected, received }
        } else {
            Self::TooHigh { expected, received }
        }
    }

    /// Returns true if the sequence is valid.
    #[must_use]
    pub const fn is_in_sequence(&self) -> bool {
        matches!(self, Self::InSequence)
    }

    /// Returns true if there's a gap.
    #[must_use]
    pub const fn is_too_high(&self) -> bool {
        matches!(self, Self::TooHigh { .. })
    }

    /// Returns true if the sequence is too low.
    #[must_use]
    pub const fn is_too_low(&self) -> bool {
        matches!(self, Self::TooLow { .. })
    }
}

/// The gap requested by the last ResendRequest.
///
/// A chunked request covers `begin..=chunk_end` of the full `begin..=end`
/// gap; `chunk_end` is zero when the whole gap was requested at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResendRange {
    begin: u64,
    end: u64,
    chunk_end: u64,
}

impl ResendRange {
    /// Creates a resend range.
    #[must_use]
    pub const fn new(begin: u64, end: u64, chunk_end: u64) -> Self {
        Self {
            begin,
            end,
            chunk_end,
        }
    }

    /// First requested sequence number.
    #[inline]
    #[must_use]
    pub const fn begin(&self) -> u64 {
        self.begin
    }

    /// Last sequence number of the whole gap.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Last sequence number of the chunk in flight, zero when unchunked.
    #[inline]
    #[must_use]
    pub const fn chunk_end(&self) -> u64 {
        self.chunk_end
    }

    /// Returns true while a ResendRequest is outstanding.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.begin != 0 || self.end != 0
    }

    /// Returns true when the request was split into chunks.
    #[inline]
    #[must_use]
    pub const fn is_chunked(&self) -> bool {
        self.chunk_end != 0
    }

    /// Returns true once `seq` reaches the end of the gap.
    #[inline]
    #[must_use]
    pub const fn is_satisfied_by(&self, seq: u64) -> bool {
        seq >= self.end
    }

    /// Returns true when `seq` completes the current chunk but not the gap.
    #[inline]
    #[must_use]
    pub const fn needs_next_chunk(&self, seq: u64) -> bool {
        self.is_chunked() && seq >= self.chunk_end && seq < self.end
    }

    /// Forgets the outstanding request.
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Returns the last sequence number of the first chunk of `begin..=end`.
///
/// A `chunk_size` of zero requests the whole range.
#[must_use]
pub const fn chunk_end(begin: u64, end: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return end;
    }
    let last = begin.saturating_add(chunk_size - 1);
    if last > end { end } else { last }
}
