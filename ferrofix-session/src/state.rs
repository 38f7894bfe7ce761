/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Mutable per-session protocol state.
//!
//! [`SessionState`] holds the logon/logout handshake flags, liveness clocks,
//! the outstanding resend range and the queue of messages that arrived ahead
//! of a gap. [`SessionStatus`] is derived from it on demand, so the flags and
//! the reported status can never disagree.

use crate::heartbeat::HeartbeatManager;
use crate::sequence::ResendRange;
use ferrofix_core::Message;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Externally visible phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// No responder attached.
    Disconnected,
    /// Connected, the logon handshake has not completed.
    LogonPending,
    /// Logon exchanged in both directions.
    LoggedOn,
    /// A Logout has been sent or received and the link is winding down.
    LogoutPending,
    /// Logged on with a ResendRequest outstanding.
    ResendPending,
}

impl SessionStatus {
    /// Returns true if the session can carry application messages.
    #[must_use]
    pub const fn is_logged_on(&self) -> bool {
        matches!(self, Self::LoggedOn | Self::ResendPending)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::LogonPending => "LogonPending",
            Self::LoggedOn => "LoggedOn",
            Self::LogoutPending => "LogoutPending",
            Self::ResendPending => "ResendPending",
        };
        f.write_str(name)
    }
}

/// Handshake flags, clocks and recovery bookkeeping of one session.
#[derive(Debug)]
pub struct SessionState {
    pub(crate) heartbeat: HeartbeatManager,
    pub(crate) logon_sent: bool,
    pub(crate) logon_received: bool,
    pub(crate) logout_sent: bool,
    pub(crate) logout_received: bool,
    pub(crate) reset_sent: bool,
    pub(crate) reset_received: bool,
    pub(crate) logout_reason: Option<String>,
    pub(crate) logon_sent_at: Option<Instant>,
    pub(crate) logout_sent_at: Option<Instant>,
    pub(crate) resend_range: ResendRange,
    queue: BTreeMap<u64, Message>,
}

impl SessionState {
    /// Creates the state of a freshly created, disconnected session.
    #[must_use]
    pub fn new(heartbeat: HeartbeatManager) -> Self {
        Self {
            heartbeat,
            logon_sent: false,
            logon_received: false,
            logout_sent: false,
            logout_received: false,
            reset_sent: false,
            reset_received: false,
            logout_reason: None,
            logon_sent_at: None,
            logout_sent_at: None,
            resend_range: ResendRange::default(),
            queue: BTreeMap::new(),
        }
    }

    /// Returns true once Logon has gone out and come back.
    #[inline]
    #[must_use]
    pub const fn is_logged_on(&self) -> bool {
        self.logon_sent && self.logon_received
    }

    /// Derives the session status.
    ///
    /// # Arguments
    /// * `connected` - Whether a responder is attached
    #[must_use]
    pub const fn status(&self, connected: bool) -> SessionStatus {
        if !connected {
            SessionStatus::Disconnected
        } else if self.logout_sent || self.logout_received {
            SessionStatus::LogoutPending
        } else if !self.is_logged_on() {
            SessionStatus::LogonPending
        } else if self.resend_range.is_pending() {
            SessionStatus::ResendPending
        } else {
            SessionStatus::LoggedOn
        }
    }

    /// Returns the outstanding resend range.
    #[inline]
    #[must_use]
    pub const fn resend_range(&self) -> ResendRange {
        self.resend_range
    }

    /// Records that Logon was sent.
    pub fn on_logon_sent(&mut self, now: Instant) {
        self.logon_sent = true;
        self.logon_sent_at = Some(now);
    }

    /// Records that Logout was sent.
    pub fn on_logout_sent(&mut self, now: Instant) {
        self.logout_sent = true;
        self.logout_sent_at = Some(now);
    }

    /// Checks whether the Logon response is overdue.
    #[must_use]
    pub fn is_logon_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        !self.logon_received
            && self
                .logon_sent_at
                .is_some_and(|sent| now.saturating_duration_since(sent) >= timeout)
    }

    /// Checks whether the Logout response is overdue.
    #[must_use]
    pub fn is_logout_timed_out(&self, now: Instant, timeout: Duration) -> bool {
        self.logout_sent
            && self
                .logout_sent_at
                .is_some_and(|sent| now.saturating_duration_since(sent) >= timeout)
    }

    /// Holds a message that arrived ahead of a gap.
    pub fn enqueue(&mut self, seq: u64, message: Message) {
        self.queue.insert(seq, message);
    }

    /// Takes the queued message numbered `expected`.
    ///
    /// Queued messages numbered below `expected` are stale and dropped.
    pub fn dequeue(&mut self, expected: u64) -> Option<Message> {
        self.queue = self.queue.split_off(&expected);
        self.queue.remove(&expected)
    }

    /// Returns the number of queued messages.
    #[inline]
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Forgets queued messages and the outstanding resend range.
    pub fn clear_recovery(&mut self) {
        self.queue.clear();
        self.resend_range.clear();
    }

    /// Returns to the disconnected state.
    ///
    /// The heartbeat interval negotiated at logon is kept.
    pub fn on_disconnect(&mut self, now: Instant) {
        self.logon_sent = false;
        self.logon_received = false;
        self.logout_sent = false;
        self.logout_received = false;
        self.reset_sent = false;
        self.reset_received = false;
        self.logout_reason = None;
        self.logon_sent_at = None;
        self.logout_sent_at = None;
        self.heartbeat.reset(now);
        self.clear_recovery();
    }
}
