/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for FIX sessions.

use crate::heartbeat::{DEFAULT_TEST_REQUEST_DELAY_MULTIPLIER, DEFAULT_TIMEOUT_MULTIPLIER};
use crate::schedule::SessionSchedule;
use ferrofix_core::{SessionError, SessionId, TimestampPrecision};
use ferrofix_tagvalue::ParserSettings;
use std::time::Duration;

/// Configuration for a FIX session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session identity, including BeginString and CompIDs.
    pub session_id: SessionId,
    /// Heartbeat interval. An initiator sends it in its Logon.
    pub heartbeat_interval: Duration,
    /// Whether this side sends the first Logon.
    pub is_initiator: bool,
    /// When the session may be active.
    pub schedule: SessionSchedule,
    /// Logon timeout duration.
    pub logon_timeout: Duration,
    /// Logout timeout duration.
    pub logout_timeout: Duration,
    /// Whether to reset sequence numbers on logon.
    pub reset_on_logon: bool,
    /// Whether to reset sequence numbers on logout.
    pub reset_on_logout: bool,
    /// Whether to reset sequence numbers on disconnect.
    pub reset_on_disconnect: bool,
    /// Whether to reset the session when an incoming message fails validation.
    pub reset_on_error: bool,
    /// Whether to reload store state before processing a Logon.
    pub refresh_on_logon: bool,
    /// Whether MsgSeqNum gaps and duplicates are checked at all.
    pub validate_sequence_numbers: bool,
    /// Maximum messages per ResendRequest, zero for no limit.
    pub resend_request_chunk_size: u64,
    /// Whether a new ResendRequest may be sent while one is outstanding.
    pub send_redundant_resend_requests: bool,
    /// Whether outgoing messages are stored for resending.
    pub persist_messages: bool,
    /// Whether a store read failure during resend is replaced by a gap fill.
    pub force_resend_when_corrupted_store: bool,
    /// Whether SendingTime is compared with the local clock.
    pub check_latency: bool,
    /// Largest tolerated SendingTime skew.
    pub max_latency: Duration,
    /// Whether incoming CompIDs must match the session identity.
    pub check_comp_id: bool,
    /// Whether PossDup messages must carry OrigSendingTime.
    pub requires_orig_sending_time: bool,
    /// Fractional-second digits written in SendingTime.
    pub timestamp_precision: TimestampPrecision,
    /// Whether incoming messages are checked against the dictionary.
    pub validate_incoming_message: bool,
    /// Whether an application failure answers with BusinessMessageReject.
    pub reject_message_on_unhandled_exception: bool,
    /// Maximum message size in bytes.
    pub max_message_size: usize,
    /// Multiple of the TestRequest delay after which a silent peer is dropped.
    pub heartbeat_timeout_multiplier: f64,
    /// Extra fraction of the interval waited before each TestRequest.
    pub test_request_delay_multiplier: f64,
    /// Parser and validation switches for incoming messages.
    pub parser: ParserSettings,
}

impl SessionConfig {
    /// Creates a new session configuration with defaults.
    ///
    /// # Arguments
    /// * `session_id` - The session identity
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            heartbeat_interval: Duration::from_secs(30),
            is_initiator: false,
            schedule: SessionSchedule::default(),
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(2),
            reset_on_logon: false,
            reset_on_logout: false,
            reset_on_disconnect: false,
            reset_on_error: false,
            refresh_on_logon: false,
            validate_sequence_numbers: true,
            resend_request_chunk_size: 0,
            send_redundant_resend_requests: false,
            persist_messages: true,
            force_resend_when_corrupted_store: false,
            check_latency: true,
            max_latency: Duration::from_secs(120),
            check_comp_id: true,
            requires_orig_sending_time: true,
            timestamp_precision: TimestampPrecision::Millis,
            validate_incoming_message: true,
            reject_message_on_unhandled_exception: false,
            max_message_size: 1024 * 1024, // 1MB
            heartbeat_timeout_multiplier: DEFAULT_TIMEOUT_MULTIPLIER,
            test_request_delay_multiplier: DEFAULT_TEST_REQUEST_DELAY_MULTIPLIER,
            parser: ParserSettings::default(),
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Makes this side the initiator.
    #[must_use]
    pub const fn with_initiator(mut self, initiator: bool) -> Self {
        self.is_initiator = initiator;
        self
    }

    /// Sets the session schedule.
    #[must_use]
    pub const fn with_schedule(mut self, schedule: SessionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Sets whether to reset sequence numbers on logout.
    #[must_use]
    pub const fn with_reset_on_logout(mut self, reset: bool) -> Self {
        self.reset_on_logout = reset;
        self
    }

    /// Sets whether to reset sequence numbers on disconnect.
    #[must_use]
    pub const fn with_reset_on_disconnect(mut self, reset: bool) -> Self {
        self.reset_on_disconnect = reset;
        self
    }

    /// Sets whether to reset the session on invalid incoming messages.
    #[must_use]
    pub const fn with_reset_on_error(mut self, reset: bool) -> Self {
        self.reset_on_error = reset;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub const fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the logout timeout.
    #[must_use]
    pub const fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Sets whether sequence numbers are validated.
    #[must_use]
    pub const fn with_validate_sequence_numbers(mut self, validate: bool) -> Self {
        self.validate_sequence_numbers = validate;
        self
    }

    /// Sets the ResendRequest chunk size, zero for no limit.
    #[must_use]
    pub const fn with_resend_request_chunk_size(mut self, size: u64) -> Self {
        self.resend_request_chunk_size = size;
        self
    }

    /// Sets whether redundant ResendRequests may be sent.
    #[must_use]
    pub const fn with_send_redundant_resend_requests(mut self, allowed: bool) -> Self {
        self.send_redundant_resend_requests = allowed;
        self
    }

    /// Sets whether outgoing messages are persisted.
    #[must_use]
    pub const fn with_persist_messages(mut self, persist: bool) -> Self {
        self.persist_messages = persist;
        self
    }

    /// Sets whether store read failures during resend are gap filled.
    #[must_use]
    pub const fn with_force_resend_when_corrupted_store(mut self, force: bool) -> Self {
        self.force_resend_when_corrupted_store = force;
        self
    }

    /// Sets whether SendingTime latency is checked.
    #[must_use]
    pub const fn with_check_latency(mut self, check: bool) -> Self {
        self.check_latency = check;
        self
    }

    /// Sets the largest tolerated SendingTime skew.
    #[must_use]
    pub const fn with_max_latency(mut self, latency: Duration) -> Self {
        self.max_latency = latency;
        self
    }

    /// Sets whether incoming CompIDs are checked.
    #[must_use]
    pub const fn with_check_comp_id(mut self, check: bool) -> Self {
        self.check_comp_id = check;
        self
    }

    /// Sets whether PossDup messages need OrigSendingTime.
    #[must_use]
    pub const fn with_requires_orig_sending_time(mut self, required: bool) -> Self {
        self.requires_orig_sending_time = required;
        self
    }

    /// Sets the SendingTime precision.
    #[must_use]
    pub const fn with_timestamp_precision(mut self, precision: TimestampPrecision) -> Self {
        self.timestamp_precision = precision;
        self
    }

    /// Sets whether incoming messages are validated against the dictionary.
    #[must_use]
    pub const fn with_validate_incoming_message(mut self, validate: bool) -> Self {
        self.validate_incoming_message = validate;
        self
    }

    /// Sets whether application failures answer with BusinessMessageReject.
    #[must_use]
    pub const fn with_reject_message_on_unhandled_exception(mut self, reject: bool) -> Self {
        self.reject_message_on_unhandled_exception = reject;
        self
    }

    /// Sets the maximum message size.
    #[must_use]
    pub const fn with_max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Sets the parser settings.
    #[must_use]
    pub const fn with_parser_settings(mut self, settings: ParserSettings) -> Self {
        self.parser = settings;
        self
    }

    /// Returns the heartbeat interval in seconds.
    #[must_use]
    pub const fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    begin_string: Option<String>,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    sender_sub_id: Option<String>,
    target_sub_id: Option<String>,
    qualifier: Option<String>,
    heartbeat_interval: Option<Duration>,
    is_initiator: bool,
    reset_on_logon: bool,
    resend_request_chunk_size: u64,
    schedule: SessionSchedule,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the FIX version.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    /// Sets the sender sub ID.
    #[must_use]
    pub fn sender_sub_id(mut self, id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(id.into());
        self
    }

    /// Sets the target sub ID.
    #[must_use]
    pub fn target_sub_id(mut self, id: impl Into<String>) -> Self {
        self.target_sub_id = Some(id.into());
        self
    }

    /// Sets the session qualifier.
    #[must_use]
    pub fn qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Makes the session an initiator.
    #[must_use]
    pub const fn initiator(mut self, initiator: bool) -> Self {
        self.is_initiator = initiator;
        self
    }

    /// Sets whether to reset on logon.
    #[must_use]
    pub const fn reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    /// Sets the ResendRequest chunk size.
    #[must_use]
    pub const fn resend_request_chunk_size(mut self, size: u64) -> Self {
        self.resend_request_chunk_size = size;
        self
    }

    /// Sets the session schedule.
    #[must_use]
    pub const fn schedule(mut self, schedule: SessionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` if a CompID is missing or empty.
    pub fn build(self) -> Result<SessionConfig, SessionError> {
        let sender = self
            .sender_comp_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SessionError::Configuration("sender_comp_id is required".into()))?;
        let target = self
            .target_comp_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SessionError::Configuration("target_comp_id is required".into()))?;
        let begin_string = self.begin_string.unwrap_or_else(|| "FIX.4.4".to_string());

        let mut session_id = SessionId::new(begin_string, sender, target);
        if let Some(id) = self.sender_sub_id {
            session_id = session_id.with_sender_sub_id(id);
        }
        if let Some(id) = self.target_sub_id {
            session_id = session_id.with_target_sub_id(id);
        }
        if let Some(qualifier) = self.qualifier {
            session_id = session_id.with_qualifier(qualifier);
        }

        let mut config = SessionConfig::new(session_id)
            .with_initiator(self.is_initiator)
            .with_reset_on_logon(self.reset_on_logon)
            .with_resend_request_chunk_size(self.resend_request_chunk_size)
            .with_schedule(self.schedule);
        if let Some(interval) = self.heartbeat_interval {
            config.heartbeat_interval = interval;
        }

        Ok(config)
    }
}
