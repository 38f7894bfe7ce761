/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Heartbeat and TestRequest management.
//!
//! This module handles FIX session liveness logic including:
//! - Sending heartbeats when nothing else has been sent for an interval
//! - Sending TestRequest when nothing has been received
//! - Detecting heartbeat timeouts
//!
//! Every check takes the current instant as an argument so that a timer
//! driver (or a test) controls the clock.

use std::time::{Duration, Instant};

/// TestReqID used for timer-driven TestRequests.
pub const TEST_REQ_ID: &str = "TEST";

/// Default multiple of the TestRequest delay after which the link is
/// considered dead.
pub const DEFAULT_TIMEOUT_MULTIPLIER: f64 = 1.4;

/// Default extra fraction of the interval to wait before each TestRequest.
pub const DEFAULT_TEST_REQUEST_DELAY_MULTIPLIER: f64 = 0.5;

/// Largest HeartBtInt accepted from a counterparty, in seconds.
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 86_400;

/// Tracks send/receive activity for a FIX session.
#[derive(Debug, Clone)]
pub struct HeartbeatManager {
    /// Heartbeat interval. Zero disables every check.
    interval: Duration,
    /// Time of last message sent.
    last_sent: Instant,
    /// Time of last message received.
    last_received: Instant,
    /// TestRequests sent since the last received message.
    test_request_counter: u32,
    timeout_multiplier: f64,
    test_request_delay_multiplier: f64,
}

impl HeartbeatManager {
    /// Creates a new heartbeat manager.
    ///
    /// # Arguments
    /// * `interval` - The heartbeat interval
    /// * `now` - The instant both activity clocks start from
    #[must_use]
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_sent: now,
            last_received: now,
            test_request_counter: 0,
            timeout_multiplier: DEFAULT_TIMEOUT_MULTIPLIER,
            test_request_delay_multiplier: DEFAULT_TEST_REQUEST_DELAY_MULTIPLIER,
        }
    }

    /// Sets the heartbeat timeout multiplier.
    #[must_use]
    pub const fn with_timeout_multiplier(mut self, multiplier: f64) -> Self {
        self.timeout_multiplier = multiplier;
        self
    }

    /// Sets the TestRequest delay multiplier.
    #[must_use]
    pub const fn with_test_request_delay_multiplier(mut self, multiplier: f64) -> Self {
        self.test_request_delay_multiplier = multiplier;
        self
    }

    /// Replaces the interval, typically with the one negotiated at logon.
    #[inline]
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Returns the heartbeat interval.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns false when the interval is zero.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Records that a message was sent. The clock never moves backwards.
    #[inline]
    pub fn on_sent(&mut self, now: Instant) {
        self.last_sent = self.last_sent.max(now);
    }

    /// Records that a message was received and clears pending TestRequests.
    #[inline]
    pub fn on_received(&mut self, now: Instant) {
        self.last_received = self.last_received.max(now);
        self.test_request_counter = 0;
    }

    /// Records that a TestRequest was sent.
    pub fn on_test_request_sent(&mut self, now: Instant) {
        self.test_request_counter += 1;
        self.on_sent(now);
    }

    /// Returns the number of unanswered TestRequests.
    #[inline]
    #[must_use]
    pub const fn test_request_counter(&self) -> u32 {
        self.test_request_counter
    }

    /// Returns the time since the last message was received.
    #[must_use]
    pub fn since_received(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_received)
    }

    /// Returns the time since the last message was sent.
    #[must_use]
    pub fn since_sent(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_sent)
    }

    /// Checks if the counterparty has been silent for too long.
    ///
    /// The timeout is measured in TestRequest delays, so the first
    /// TestRequest always goes out before the link is dropped.
    #[must_use]
    pub fn is_timed_out(&self, now: Instant) -> bool {
        let factor = (1.0 + self.test_request_delay_multiplier) * self.timeout_multiplier;
        self.has_elapsed_since_received(factor, now)
    }

    /// Checks if a TestRequest should be sent.
    ///
    /// Each unanswered TestRequest pushes the next one back by another
    /// delayed interval.
    #[must_use]
    pub fn is_test_request_needed(&self, now: Instant) -> bool {
        let factor = (1.0 + self.test_request_delay_multiplier)
            * f64::from(self.test_request_counter.saturating_add(1));
        self.has_elapsed_since_received(factor, now)
    }

    /// A scaled interval that does not fit in a `Duration` never elapses.
    fn has_elapsed_since_received(&self, factor: f64, now: Instant) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match Duration::try_from_secs_f64(self.interval.as_secs_f64() * factor) {
            Ok(limit) => self.since_received(now) >= limit,
            Err(_) => false,
        }
    }

    /// Checks if a heartbeat should be sent.
    ///
    /// A heartbeat goes out up to a second early so that a once-per-second
    /// driver never sends it late. No heartbeat is sent while a TestRequest
    /// is outstanding.
    #[must_use]
    pub fn is_heartbeat_needed(&self, now: Instant) -> bool {
        self.is_enabled()
            && self.test_request_counter == 0
            && self.since_sent(now) + Duration::from_secs(1) > self.interval
    }

    /// Restarts both activity clocks.
    pub fn reset(&mut self, now: Instant) {
        self.last_sent = now;
        self.last_received = now;
        self.test_request_counter = 0;
    }
}
