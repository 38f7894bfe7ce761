/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Fractional-second precision for UTC time fields.

use serde::{Deserialize, Serialize};

/// Number of fractional-second digits written for UTC time fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimestampPrecision {
    /// `HH:MM:SS`
    Seconds,
    /// `HH:MM:SS.sss`
    #[default]
    Millis,
    /// `HH:MM:SS.ssssss`
    Micros,
    /// `HH:MM:SS.sssssssss`
    Nanos,
}

impl TimestampPrecision {
    /// Maps the classic "include milliseconds" flag onto a precision.
    #[inline]
    #[must_use]
    pub const fn from_millis_flag(include_millis: bool) -> Self {
        if include_millis {
            Self::Millis
        } else {
            Self::Seconds
        }
    }

    /// Returns the number of fractional digits.
    #[inline]
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Seconds => 0,
            Self::Millis => 3,
            Self::Micros => 6,
            Self::Nanos => 9,
        }
    }
}
