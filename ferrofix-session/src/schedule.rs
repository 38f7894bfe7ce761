/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Session time windows.
//!
//! A session is only active inside its configured window. Sequence numbers
//! belong to one window; crossing into the next window resets them.

use chrono::{DateTime, NaiveTime, Utc};
use std::fmt;

/// When a session is allowed to be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionSchedule {
    /// The session never leaves its window.
    #[default]
    Always,
    /// A window opening at `start` and closing at `end` every day, in UTC.
    ///
    /// An `end` earlier than `start` wraps past midnight. Equal times give a
    /// 24 hour window that rolls over at `start`.
    Daily {
        /// Window opening time.
        start: NaiveTime,
        /// Window closing time.
        end: NaiveTime,
    },
}

impl SessionSchedule {
    /// Creates a schedule that is always in session.
    #[must_use]
    pub const fn always() -> Self {
        Self::Always
    }

    /// Creates a daily schedule.
    ///
    /// # Arguments
    /// * `start` - UTC time the window opens
    /// * `end` - UTC time the window closes
    #[must_use]
    pub const fn daily(start: NaiveTime, end: NaiveTime) -> Self {
        Self::Daily { start, end }
    }

    /// Returns the opening instant of the window containing `at`.
    ///
    /// # Returns
    /// `None` when `at` falls outside every window.
    #[must_use]
    pub fn session_start(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let Self::Daily { start, end } = *self else {
            return Some(DateTime::<Utc>::MIN_UTC);
        };
        let date = at.date_naive();
        let time = at.time();
        let today = date.and_time(start).and_utc();
        let yesterday = || date.pred_opt().map(|d| d.and_time(start).and_utc());

        if start < end {
            (time >= start && time <= end).then_some(today)
        } else if time >= start {
            Some(today)
        } else if start == end || time <= end {
            yesterday()
        } else {
            None
        }
    }

    /// Returns true when `at` falls inside a window.
    #[must_use]
    pub fn is_session_time(&self, at: DateTime<Utc>) -> bool {
        self.session_start(at).is_some()
    }

    /// Returns true when both instants fall inside the same window.
    #[must_use]
    pub fn is_same_session(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        match (self.session_start(a), self.session_start(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

impl fmt::Display for SessionSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Daily { start, end } => write!(f, "daily {start}-{end} UTC"),
        }
    }
}
