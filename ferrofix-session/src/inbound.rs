/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Inbound message processing.
//!
//! Every received message passes through [`Session::next`]: BeginString
//! check, optional dictionary validation, dispatch by MsgType, and the shared
//! `verify` step (logon state, SendingTime, CompIDs, sequence number,
//! resend-range bookkeeping, application callback). Field-level problems
//! are answered with Reject or BusinessMessageReject instead of surfacing as
//! errors.

use crate::application::ApplicationError;
use crate::heartbeat::MAX_HEARTBEAT_INTERVAL_SECS;
use crate::sequence::SequenceCheck;
use crate::session::Session;
use chrono::Utc;
use ferrofix_core::error::{EncodeError, StoreError};
use ferrofix_core::{
    BusinessRejectReason, FieldError, FixError, Message, MsgType, Result, SessionError,
    SessionRejectReason, is_admin_msg_type, tags,
};
use ferrofix_dictionary::{ValidationError, Validator};
use ferrofix_tagvalue::peek_msg_type;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Why processing of one inbound message stopped.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Answered with Reject or BusinessMessageReject.
    Field(FieldError),
    /// No handler for the message type.
    UnsupportedMessageType(String),
    /// The message belongs to another protocol version.
    IncorrectBeginString { expected: String, received: String },
    /// The application refused the Logon.
    RejectLogon(String),
    /// The application failed while handling the message.
    Application(String),
    /// Store, encoding or transport failure; returned to the caller.
    Fatal(FixError),
}

impl From<FieldError> for Failure {
    fn from(error: FieldError) -> Self {
        Self::Field(error)
    }
}

impl From<FixError> for Failure {
    fn from(error: FixError) -> Self {
        match error {
            FixError::Field(error) => Self::Field(error),
            FixError::Session(SessionError::IncorrectBeginString { expected, received }) => {
                Self::IncorrectBeginString { expected, received }
            }
            other => Self::Fatal(other),
        }
    }
}

impl From<StoreError> for Failure {
    fn from(error: StoreError) -> Self {
        Self::Fatal(error.into())
    }
}

impl From<EncodeError> for Failure {
    fn from(error: EncodeError) -> Self {
        Self::Fatal(error.into())
    }
}

impl From<ApplicationError> for Failure {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::RejectLogon(text) => Self::RejectLogon(text),
            ApplicationError::Field(error) => Self::Field(error),
            ApplicationError::UnsupportedMessageType(msg_type) => {
                Self::UnsupportedMessageType(msg_type)
            }
            other @ (ApplicationError::DoNotSend | ApplicationError::Other(_)) => {
                Self::Application(other.to_string())
            }
        }
    }
}

impl From<ValidationError> for Failure {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::UnsupportedVersion { expected, received } => {
                Self::IncorrectBeginString { expected, received }
            }
            ValidationError::Field(error) => Self::Field(error),
        }
    }
}

impl Session {
    /// Parses and processes one framed message from the transport.
    ///
    /// Oversized and unparseable messages are logged and dropped without
    /// touching sequence numbers. A Logon that cannot be parsed disconnects.
    ///
    /// # Errors
    /// See [`Session::next`].
    pub fn receive(&self, data: &[u8]) -> Result<()> {
        if data.len() > self.config.max_message_size {
            warn!(
                session = %self.session_id(),
                size = data.len(),
                max_size = self.config.max_message_size,
                "dropping oversized message"
            );
            return Ok(());
        }
        match self.parser().parse(data) {
            Ok(message) => self.next(message),
            Err(decode) => {
                error!(session = %self.session_id(), error = %decode, "dropping unparseable message");
                if peek_msg_type(data) == Some(MsgType::Logon.as_str()) {
                    self.disconnect("Logon message is not valid")?;
                }
                Ok(())
            }
        }
    }

    /// Processes one parsed message, then any queued messages it unblocked.
    ///
    /// # Errors
    /// Returns store, encoding and transport failures, and application
    /// failures that are not configured to be answered with a
    /// BusinessMessageReject.
    pub fn next(&self, message: Message) -> Result<()> {
        self.process(&message, false)
    }

    fn process(&self, message: &Message, queued: bool) -> Result<()> {
        if let Err(failure) = self.dispatch(message) {
            self.handle_failure(message, failure)?;
        }
        if !queued && self.is_logged_on() {
            self.next_queued()?;
        }
        Ok(())
    }

    fn dispatch(&self, message: &Message) -> std::result::Result<(), Failure> {
        let expected = self.session_id().begin_string();
        let received = message.begin_string()?;
        if received != expected {
            return Err(Failure::IncorrectBeginString {
                expected: expected.to_owned(),
                received: received.to_owned(),
            });
        }

        let msg_type = message.msg_type()?;
        if self.config.validate_incoming_message {
            self.validate(message, msg_type)?;
        }
        debug!(session = %self.session_id(), msg_type, "processing message");

        match msg_type.parse::<MsgType>().unwrap_or_else(|never| match never {}) {
            MsgType::Logon => self.next_logon(message),
            MsgType::Heartbeat => self.next_heartbeat(message),
            MsgType::TestRequest => self.next_test_request(message),
            MsgType::ResendRequest => self.next_resend_request(message),
            MsgType::SequenceReset => self.next_sequence_reset(message),
            MsgType::Reject => self.next_reject(message),
            MsgType::Logout => self.next_logout(message),
            _ => self.next_app(message),
        }
    }

    fn validate(&self, message: &Message, msg_type: &str) -> std::result::Result<(), Failure> {
        let dictionary = if is_admin_msg_type(msg_type) {
            Some(self.dictionary.as_ref())
        } else if let Some(app) = &self.app_dictionary {
            Some(app.as_ref())
        } else if self.dictionary.layout(msg_type).is_some() {
            Some(self.dictionary.as_ref())
        } else {
            None
        };
        match dictionary {
            Some(dictionary) => Ok(Validator::new(dictionary, self.config.parser.validation)
                .validate(message)?),
            None => match message.parse_error() {
                Some(error) => Err(Failure::Field(error.clone())),
                None => Ok(()),
            },
        }
    }

    fn handle_failure(&self, message: &Message, failure: Failure) -> Result<()> {
        let msg_type = message.msg_type().unwrap_or_default();
        let is_logon = msg_type == MsgType::Logon.as_str();
        match failure {
            Failure::Field(FieldError::Rejected {
                reason: SessionRejectReason::InvalidMsgType,
                ..
            }) => self.reject_unsupported(message, msg_type),
            Failure::Field(field) => {
                if self.config.reset_on_error {
                    error!(session = %self.session_id(), error = %field, "resetting after invalid message");
                    return self.reset();
                }
                self.reject_field(message, msg_type, &field)
            }
            Failure::UnsupportedMessageType(_) => self.reject_unsupported(message, msg_type),
            Failure::IncorrectBeginString { expected, received } => {
                let text = format!("Incorrect BeginString: expected {expected}, received {received}");
                error!(session = %self.session_id(), "{text}");
                self.generate_logout(Some(&text))?;
                self.store.incr_next_target_seq_num()?;
                self.disconnect(&text)
            }
            Failure::RejectLogon(text) => {
                warn!(session = %self.session_id(), reason = %text, "logon rejected");
                self.generate_logout(Some(&text))?;
                if is_logon && message.msg_seq_num().ok() == Some(self.next_target_seq_num()) {
                    self.store.incr_next_target_seq_num()?;
                }
                self.disconnect(&format!("Logon rejected: {text}"))
            }
            Failure::Application(text) => {
                error!(session = %self.session_id(), msg_type, error = %text, "application failure");
                if self.config.reject_message_on_unhandled_exception
                    && !is_admin_msg_type(msg_type)
                    && self.is_fix42_or_later()
                {
                    self.generate_business_reject(
                        message,
                        BusinessRejectReason::ApplicationNotAvailable,
                        0,
                    )
                } else {
                    Err(SessionError::Application(text).into())
                }
            }
            Failure::Fatal(fatal) => {
                error!(session = %self.session_id(), msg_type, error = %fatal, "message processing failed");
                if self.config.reset_on_error {
                    self.reset()?;
                }
                Err(fatal)
            }
        }
    }

    fn reject_field(&self, message: &Message, msg_type: &str, field: &FieldError) -> Result<()> {
        let is_logon = msg_type == MsgType::Logon.as_str();
        match field {
            FieldError::NotFound(tag) => {
                if !is_admin_msg_type(msg_type) && self.is_fix42_or_later() {
                    self.generate_business_reject(
                        message,
                        BusinessRejectReason::ConditionallyRequiredFieldMissing,
                        *tag,
                    )
                } else if is_logon {
                    error!(session = %self.session_id(), tag, "required field missing from logon");
                    self.disconnect("Required field missing from logon")
                } else {
                    self.generate_reject(message, SessionRejectReason::RequiredTagMissing, *tag)
                }
            }
            other if is_logon => {
                let text = other.to_string();
                self.generate_logout(Some(&text))?;
                self.disconnect(&text)
            }
            other => self.generate_reject(message, other.reject_reason(), other.tag()),
        }
    }

    fn reject_unsupported(&self, message: &Message, msg_type: &str) -> Result<()> {
        warn!(session = %self.session_id(), msg_type, "unsupported message type");
        if self.is_fix42_or_later() {
            self.generate_business_reject(message, BusinessRejectReason::UnsupportedMessageType, 0)
        } else {
            self.generate_reject(message, SessionRejectReason::InvalidMsgType, tags::MSG_TYPE)
        }
    }

    fn next_queued(&self) -> Result<()> {
        loop {
            let expected = self.next_target_seq_num();
            let Some(message) = self.state.lock().dequeue(expected) else {
                return Ok(());
            };
            info!(session = %self.session_id(), seq = expected, "processing queued message");
            let msg_type = message.msg_type().unwrap_or_default();
            if msg_type == MsgType::Logon.as_str() || msg_type == MsgType::ResendRequest.as_str() {
                self.store.incr_next_target_seq_num()?;
            } else {
                self.process(&message, true)?;
            }
        }
    }

    fn next_logon(&self, message: &Message) -> std::result::Result<(), Failure> {
        if !self.config.schedule.is_session_time(Utc::now()) {
            return Err(Failure::RejectLogon(
                "Logon attempt not within session time".to_owned(),
            ));
        }
        if self.config.refresh_on_logon {
            self.store.refresh()?;
        }

        let seq = message.msg_seq_num()?;
        let reset_flag = message
            .body()
            .field(tags::RESET_SEQ_NUM_FLAG)
            .map(|_| message.body().get_bool(tags::RESET_SEQ_NUM_FLAG))
            .transpose()?;
        let (reset_sent, reset_received, logon_sent) = {
            let mut state = self.state.lock();
            match reset_flag {
                Some(flag) => state.reset_received = flag,
                None if state.reset_sent && seq == 1 => state.reset_received = true,
                None => {}
            }
            (state.reset_sent, state.reset_received, state.logon_sent)
        };
        if reset_received && !reset_sent {
            info!(session = %self.session_id(), "logon contains ResetSeqNumFlag=Y, resetting sequence numbers");
            self.reset_state()?;
        }
        if self.config.is_initiator && !logon_sent && !reset_received {
            self.disconnect("Received logon response before sending request")?;
            return Ok(());
        }
        if !self.config.is_initiator && self.config.reset_on_logon {
            self.reset_state()?;
        }

        let validate = self.config.validate_sequence_numbers;
        if !self.verify(message, false, validate)? {
            return Ok(());
        }

        if message.body().is_field_set(tags::HEART_BT_INT) {
            let secs = message.body().get_u64(tags::HEART_BT_INT)?;
            if secs > MAX_HEARTBEAT_INTERVAL_SECS {
                error!(session = %self.session_id(), secs, "heartbeat interval out of range");
                self.generate_reject(message, SessionRejectReason::ValueIsIncorrect, tags::HEART_BT_INT)?;
                self.store.incr_next_target_seq_num()?;
                let text = format!("HeartBtInt {secs} exceeds {MAX_HEARTBEAT_INTERVAL_SECS} seconds");
                self.generate_logout(Some(&text))?;
                self.disconnect(&text)?;
                return Ok(());
            }
            self.state
                .lock()
                .heartbeat
                .set_interval(Duration::from_secs(secs));
        }
        self.state.lock().logon_received = true;
        info!(session = %self.session_id(), "received logon");

        if !self.config.is_initiator || (reset_received && !reset_sent) {
            self.generate_logon_response(message)?;
            info!(session = %self.session_id(), "responding to logon request");
        }
        {
            let mut state = self.state.lock();
            state.reset_sent = false;
            state.reset_received = false;
        }

        let expected = self.next_target_seq_num();
        if validate && seq > expected && reset_flag != Some(true) {
            self.do_target_too_high(message, expected)?;
        } else {
            self.store.incr_next_target_seq_num()?;
        }

        if self.is_logged_on() {
            self.application.on_logon(self.session_id());
        }
        Ok(())
    }

    fn next_heartbeat(&self, message: &Message) -> std::result::Result<(), Failure> {
        if self.verify_default(message)? {
            self.store.incr_next_target_seq_num()?;
        }
        Ok(())
    }

    fn next_test_request(&self, message: &Message) -> std::result::Result<(), Failure> {
        if !self.verify_default(message)? {
            return Ok(());
        }
        let test_req_id = message.body().get_string(tags::TEST_REQ_ID)?;
        self.generate_heartbeat(Some(test_req_id))?;
        info!(session = %self.session_id(), test_req_id, "received test request");
        self.store.incr_next_target_seq_num()?;
        Ok(())
    }

    fn next_resend_request(&self, message: &Message) -> std::result::Result<(), Failure> {
        if !self.verify(message, false, false)? {
            return Ok(());
        }
        let begin = message.body().get_u64(tags::BEGIN_SEQ_NO)?;
        let end = message.body().get_u64(tags::END_SEQ_NO)?;
        info!(session = %self.session_id(), begin, end, "received resend request");
        self.resend_messages(begin, end)?;

        let seq = message.msg_seq_num()?;
        let expected = self.next_target_seq_num();
        if seq == expected {
            self.store.incr_next_target_seq_num()?;
        } else if self.config.validate_sequence_numbers && seq > expected {
            self.do_target_too_high(message, expected)?;
        }
        Ok(())
    }

    fn next_sequence_reset(&self, message: &Message) -> std::result::Result<(), Failure> {
        let validate = self.config.validate_sequence_numbers;
        let gap_fill = message.body().is_field_set(tags::GAP_FILL_FLAG)
            && message.body().get_bool(tags::GAP_FILL_FLAG)?
            && validate;
        if !self.verify(message, gap_fill, gap_fill)? || !validate {
            return Ok(());
        }

        let new_seq = message.body().get_u64(tags::NEW_SEQ_NO)?;
        let expected = self.next_target_seq_num();
        if new_seq > expected {
            info!(session = %self.session_id(), gap_fill, new_seq, "received sequence reset");
            self.store.set_next_target_seq_num(new_seq)?;
            let range = self.state.lock().resend_range;
            if range.needs_next_chunk(new_seq - 1) {
                self.send_resend_request(new_seq, range.end())?;
            } else if range.is_pending() && range.is_satisfied_by(new_seq - 1) {
                info!(
                    session = %self.session_id(),
                    begin = range.begin(),
                    end = range.end(),
                    "resend request has been satisfied"
                );
                self.state.lock().resend_range.clear();
            }
        } else if new_seq < expected {
            error!(session = %self.session_id(), new_seq, expected, "invalid sequence reset");
            self.generate_reject(message, SessionRejectReason::ValueIsIncorrect, tags::NEW_SEQ_NO)?;
        }
        Ok(())
    }

    fn next_reject(&self, message: &Message) -> std::result::Result<(), Failure> {
        if !self.verify(message, false, self.config.validate_sequence_numbers)? {
            return Ok(());
        }
        let _target = self.target_lock.lock();
        if message.msg_seq_num()? == self.next_target_seq_num() {
            self.store.incr_next_target_seq_num()?;
        }
        Ok(())
    }

    fn next_logout(&self, message: &Message) -> std::result::Result<(), Failure> {
        if !self.verify(message, false, false)? {
            return Ok(());
        }
        let logout_sent = self.state.lock().logout_sent;
        let reason = if logout_sent {
            "Received logout response"
        } else {
            self.generate_logout(None)?;
            "Received logout request"
        };
        info!(session = %self.session_id(), "{reason}");
        self.state.lock().logout_received = true;
        {
            let _target = self.target_lock.lock();
            if message.msg_seq_num()? == self.next_target_seq_num() {
                self.store.incr_next_target_seq_num()?;
            }
        }
        if self.config.reset_on_logout {
            self.reset_state()?;
        }
        self.disconnect(reason)?;
        Ok(())
    }

    fn next_app(&self, message: &Message) -> std::result::Result<(), Failure> {
        if self.verify_default(message)? {
            self.store.incr_next_target_seq_num()?;
        }
        Ok(())
    }

    fn verify_default(&self, message: &Message) -> std::result::Result<bool, Failure> {
        let validate = self.config.validate_sequence_numbers;
        self.verify(message, validate, validate)
    }

    /// Applies the checks shared by every inbound message.
    ///
    /// # Returns
    /// `Ok(false)` when the message has been fully handled here (rejected,
    /// queued or discarded) and the caller must not process it further.
    pub(crate) fn verify(
        &self,
        message: &Message,
        check_too_high: bool,
        check_too_low: bool,
    ) -> std::result::Result<bool, Failure> {
        let msg_type = message.msg_type()?;
        let seq = message.msg_seq_num()?;

        if !self.is_valid_logon_state(msg_type) {
            let text = SessionError::InvalidLogonState {
                msg_type: msg_type.to_owned(),
            }
            .to_string();
            error!(session = %self.session_id(), "{text}");
            self.generate_logout(Some(&text))?;
            self.disconnect(&text)?;
            return Ok(false);
        }
        if !self.is_good_time(message)? {
            error!(session = %self.session_id(), msg_type, seq, "SendingTime accuracy problem");
            self.generate_reject(message, SessionRejectReason::SendingTimeAccuracyProblem, 0)?;
            self.generate_logout(None)?;
            return Ok(false);
        }
        if !self.is_correct_comp_id(message)? {
            error!(session = %self.session_id(), msg_type, seq, "CompID problem");
            self.generate_reject(message, SessionRejectReason::CompIdProblem, 0)?;
            self.generate_logout(None)?;
            return Ok(false);
        }

        let expected = self.next_target_seq_num();
        match SequenceCheck::classify(expected, seq) {
            SequenceCheck::TooHigh { .. } if check_too_high => {
                self.do_target_too_high(message, expected)?;
                return Ok(false);
            }
            SequenceCheck::TooLow { .. } if check_too_low => {
                self.do_target_too_low(message, expected)?;
                return Ok(false);
            }
            _ => {}
        }
        if check_too_high || check_too_low {
            self.check_resend_range(seq)?;
        }

        self.state.lock().heartbeat.on_received(Instant::now());

        if is_admin_msg_type(msg_type) {
            self.application.from_admin(message, self.session_id())?;
        } else {
            self.application.from_app(message, self.session_id())?;
        }
        Ok(true)
    }

    fn is_valid_logon_state(&self, msg_type: &str) -> bool {
        let is_logon = msg_type == MsgType::Logon.as_str();
        let is_logout = msg_type == MsgType::Logout.as_str();
        let state = self.state.lock();
        (is_logon && state.reset_sent)
            || state.reset_received
            || (is_logon && !state.logon_received)
            || (!is_logon && state.logon_received)
            || (is_logout && state.logon_sent)
            || (!is_logout && state.logout_sent)
            || msg_type == MsgType::SequenceReset.as_str()
            || msg_type == MsgType::Reject.as_str()
    }

    fn is_good_time(&self, message: &Message) -> std::result::Result<bool, FieldError> {
        if !self.config.check_latency {
            return Ok(true);
        }
        let sending_time = message.header().get_utc_timestamp(tags::SENDING_TIME)?;
        let skew = (Utc::now() - sending_time).num_milliseconds().unsigned_abs();
        Ok(u128::from(skew) <= self.config.max_latency.as_millis())
    }

    fn is_correct_comp_id(&self, message: &Message) -> std::result::Result<bool, FieldError> {
        if !self.config.check_comp_id {
            return Ok(true);
        }
        let id = self.session_id();
        let header = message.header();
        Ok(header.get_string(tags::SENDER_COMP_ID)? == id.target_comp_id()
            && header.get_string(tags::TARGET_COMP_ID)? == id.sender_comp_id())
    }

    fn do_target_too_low(&self, message: &Message, expected: u64) -> std::result::Result<(), Failure> {
        let seq = message.msg_seq_num()?;
        if !message.is_poss_dup() {
            let text = SessionError::SequenceTooLow {
                expected,
                received: seq,
            }
            .to_string();
            error!(session = %self.session_id(), "{text}");
            self.generate_logout(Some(&text))?;
            self.disconnect(&text)?;
            return Ok(());
        }
        if self.validate_poss_dup(message)? {
            debug!(session = %self.session_id(), seq, expected, "discarding possible duplicate");
        }
        Ok(())
    }

    /// Checks OrigSendingTime on a PossDup message.
    ///
    /// # Returns
    /// `Ok(false)` after answering with Reject.
    fn validate_poss_dup(&self, message: &Message) -> std::result::Result<bool, Failure> {
        let msg_type = message.msg_type()?;
        if msg_type == MsgType::SequenceReset.as_str() {
            return Ok(true);
        }
        let header = message.header();
        if header.is_field_set(tags::ORIG_SENDING_TIME) {
            let original = header.get_utc_timestamp(tags::ORIG_SENDING_TIME)?;
            let sending_time = header.get_utc_timestamp(tags::SENDING_TIME)?;
            if original > sending_time {
                self.generate_reject(message, SessionRejectReason::SendingTimeAccuracyProblem, 0)?;
                self.generate_logout(None)?;
                return Ok(false);
            }
        } else if self.config.requires_orig_sending_time {
            self.generate_reject(
                message,
                SessionRejectReason::RequiredTagMissing,
                tags::ORIG_SENDING_TIME,
            )?;
            return Ok(false);
        }
        Ok(true)
    }

    fn check_resend_range(&self, seq: u64) -> Result<()> {
        let range = self.state.lock().resend_range;
        if !range.is_pending() {
            return Ok(());
        }
        if range.is_satisfied_by(seq) {
            info!(
                session = %self.session_id(),
                begin = range.begin(),
                end = range.end(),
                "resend request has been satisfied"
            );
            self.state.lock().resend_range.clear();
        } else if range.needs_next_chunk(seq) {
            self.send_resend_request(seq + 1, range.end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionStatus;
    use crate::testing::{deliver, logged_on, logged_on_with, logon, session_with, stamped, stamped_at};
    use ferrofix_core::TimestampPrecision;
    use ferrofix_tagvalue::encode;
    use std::sync::atomic::Ordering;

    fn poss_dup(msg_type: &MsgType, seq: u64, orig_offset_secs: Option<i64>) -> Message {
        let mut msg = stamped(msg_type, seq);
        msg.header_mut().set_bool(tags::POSS_DUP_FLAG, true);
        if let Some(offset) = orig_offset_secs {
            msg.header_mut().set_utc_timestamp(
                tags::ORIG_SENDING_TIME,
                Utc::now() + chrono::Duration::seconds(offset),
                TimestampPrecision::Millis,
            );
        }
        msg
    }

    fn reject_reason(msg: &Message) -> u64 {
        msg.body().get_u64(tags::SESSION_REJECT_REASON).unwrap()
    }

    #[test]
    fn test_acceptor_logon() {
        let (session, wire, app) = session_with(|config| config);
        assert_eq!(session.status(), SessionStatus::LogonPending);

        deliver(&session, &logon(1));

        assert!(session.is_logged_on());
        assert_eq!(session.status(), SessionStatus::LoggedOn);
        let reply = wire.last();
        assert_eq!(reply.msg_type().unwrap(), "A");
        assert_eq!(reply.msg_seq_num().unwrap(), 1);
        assert_eq!(reply.body().get_u64(tags::HEART_BT_INT).unwrap(), 30);
        assert_eq!(reply.header().get_string(tags::SENDER_COMP_ID).unwrap(), "ME");
        assert_eq!(reply.header().get_string(tags::TARGET_COMP_ID).unwrap(), "YOU");
        assert_eq!(session.next_target_seq_num(), 2);
        assert_eq!(session.next_sender_seq_num(), 2);
        assert_eq!(app.logons.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_logon_with_oversized_heartbeat_interval_is_refused() {
        let (session, wire, app) = session_with(|config| config);
        let mut msg = logon(1);
        msg.body_mut().set_u64(tags::HEART_BT_INT, 9_223_372_036_854_775_807);
        deliver(&session, &msg);

        assert!(!session.is_logged_on());
        assert_eq!(wire.types(), vec!["3", "5"]);
        let reject = &wire.of_type(&MsgType::Reject)[0];
        assert_eq!(reject_reason(reject), 5);
        assert_eq!(reject.body().get_u64(tags::REF_TAG_ID).unwrap(), 108);
        assert!(wire.is_closed());
        assert_eq!(app.logons.load(Ordering::SeqCst), 0);

        session.next_at(Instant::now() + Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn test_logon_at_heartbeat_interval_limit_is_accepted() {
        let (session, wire, _app) = session_with(|config| config);
        let mut msg = logon(1);
        msg.body_mut().set_u64(tags::HEART_BT_INT, MAX_HEARTBEAT_INTERVAL_SECS);
        deliver(&session, &msg);

        assert!(session.is_logged_on());
        assert_eq!(wire.types(), vec!["A"]);
        session.next_at(Instant::now() + Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn test_logon_with_reset_flag_restarts_both_sides() {
        let (session, wire, _app) = session_with(|config| config);
        session.set_next_sender_seq_num(5).unwrap();
        session.set_next_target_seq_num(7).unwrap();

        let mut msg = logon(1);
        msg.body_mut().set_bool(tags::RESET_SEQ_NUM_FLAG, true);
        deliver(&session, &msg);

        let reply = wire.last();
        assert_eq!(reply.msg_seq_num().unwrap(), 1);
        assert!(reply.body().get_bool(tags::RESET_SEQ_NUM_FLAG).unwrap());
        assert_eq!(session.next_sender_seq_num(), 2);
        assert_eq!(session.next_target_seq_num(), 2);
    }

    #[test]
    fn test_logon_too_high_is_recovered_by_gap_fill() {
        let (session, wire, _app) = session_with(|config| config);
        deliver(&session, &logon(5));

        assert!(session.is_logged_on());
        assert_eq!(wire.types(), vec!["A", "2"]);
        let request = wire.last();
        assert_eq!(request.body().get_u64(tags::BEGIN_SEQ_NO).unwrap(), 1);
        assert_eq!(request.body().get_u64(tags::END_SEQ_NO).unwrap(), 4);
        assert_eq!(session.queued_count(), 1);
        assert_eq!(session.status(), SessionStatus::ResendPending);

        let mut gap_fill = poss_dup(&MsgType::SequenceReset, 1, Some(-5));
        gap_fill.body_mut().set_bool(tags::GAP_FILL_FLAG, true);
        gap_fill.body_mut().set_u64(tags::NEW_SEQ_NO, 5);
        deliver(&session, &gap_fill);

        assert_eq!(session.next_target_seq_num(), 6);
        assert_eq!(session.queued_count(), 0);
        assert_eq!(session.status(), SessionStatus::LoggedOn);
    }

    #[test]
    fn test_gap_is_requested_once_and_queue_replayed() {
        let (session, wire, app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::NewOrderSingle));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 5));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 6));

        let requests = wire.of_type(&MsgType::ResendRequest);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body().get_u64(tags::BEGIN_SEQ_NO).unwrap(), 3);
        assert_eq!(requests[0].body().get_u64(tags::END_SEQ_NO).unwrap(), 4);
        assert_eq!(session.queued_count(), 2);
        assert_eq!(session.next_target_seq_num(), 3);

        deliver(&session, &poss_dup(&MsgType::NewOrderSingle, 3, Some(-5)));
        assert_eq!(session.status(), SessionStatus::ResendPending);
        deliver(&session, &poss_dup(&MsgType::NewOrderSingle, 4, Some(-5)));

        assert_eq!(session.next_target_seq_num(), 7);
        assert_eq!(app.received_seqs(), vec![2, 3, 4, 5, 6]);
        assert_eq!(wire.of_type(&MsgType::ResendRequest).len(), 1);
        assert_eq!(session.queued_count(), 0);
        assert_eq!(session.status(), SessionStatus::LoggedOn);
    }

    #[test]
    fn test_redundant_resend_requests_when_allowed() {
        let (session, wire, _app, _peer) =
            logged_on_with(|config| config.with_send_redundant_resend_requests(true));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 4));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 6));

        let requests = wire.of_type(&MsgType::ResendRequest);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body().get_u64(tags::BEGIN_SEQ_NO).unwrap(), 2);
        assert_eq!(requests[1].body().get_u64(tags::END_SEQ_NO).unwrap(), 5);
    }

    #[test]
    fn test_poss_dup_with_late_orig_sending_time_is_rejected() {
        let (session, wire, _app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::Heartbeat));

        deliver(&session, &poss_dup(&MsgType::NewOrderSingle, 2, Some(60)));

        assert_eq!(wire.types(), vec!["3", "5"]);
        let reject = &wire.of_type(&MsgType::Reject)[0];
        assert_eq!(reject_reason(reject), 10);
        assert_eq!(reject.body().get_u64(tags::REF_SEQ_NUM).unwrap(), 2);
        assert_eq!(session.next_target_seq_num(), 3);
        assert_eq!(session.status(), SessionStatus::LogoutPending);
    }

    #[test]
    fn test_poss_dup_without_orig_sending_time_is_rejected() {
        let (session, wire, app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::Heartbeat));

        deliver(&session, &poss_dup(&MsgType::NewOrderSingle, 2, None));

        assert_eq!(wire.types(), vec!["3"]);
        let reject = wire.last();
        assert_eq!(reject_reason(&reject), 1);
        assert_eq!(reject.body().get_u64(tags::REF_TAG_ID).unwrap(), 122);
        assert_eq!(session.next_target_seq_num(), 3);
        assert!(app.received_seqs().is_empty());
    }

    #[test]
    fn test_poss_dup_duplicate_is_discarded() {
        let (session, wire, app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::NewOrderSingle));

        deliver(&session, &poss_dup(&MsgType::NewOrderSingle, 2, Some(-5)));

        assert!(wire.types().is_empty());
        assert_eq!(app.received_seqs(), vec![2]);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_too_low_without_poss_dup_logs_out() {
        let (session, wire, app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::Heartbeat));

        deliver(&session, &stamped(&MsgType::NewOrderSingle, 2));

        let logout = wire.last();
        assert_eq!(logout.msg_type().unwrap(), "5");
        assert_eq!(
            logout.body().get_string(tags::TEXT).unwrap(),
            "MsgSeqNum too low, expecting 3 but received 2"
        );
        assert!(wire.is_closed());
        assert!(!session.has_responder());
        assert_eq!(session.status(), SessionStatus::Disconnected);
        assert_eq!(app.logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sequence_reset_below_expected_is_rejected() {
        let (session, wire, _app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::Heartbeat));
        deliver(&session, &peer.next(&MsgType::Heartbeat));

        let mut reset = peer.next(&MsgType::SequenceReset);
        reset.body_mut().set_u64(tags::NEW_SEQ_NO, 2);
        deliver(&session, &reset);

        let reject = wire.last();
        assert_eq!(reject.msg_type().unwrap(), "3");
        assert_eq!(reject_reason(&reject), 5);
        assert_eq!(reject.body().get_u64(tags::REF_TAG_ID).unwrap(), 36);
        assert_eq!(session.next_target_seq_num(), 4);
    }

    #[test]
    fn test_sequence_reset_moves_target_forward() {
        let (session, wire, _app, _peer) = logged_on();
        let mut reset = stamped(&MsgType::SequenceReset, 99);
        reset.body_mut().set_u64(tags::NEW_SEQ_NO, 20);
        deliver(&session, &reset);

        assert!(wire.types().is_empty());
        assert_eq!(session.next_target_seq_num(), 20);
    }

    #[test]
    fn test_sending_time_accuracy_problem() {
        let (session, wire, _app, _peer) = logged_on();
        let stale = Utc::now() - chrono::Duration::seconds(600);
        deliver(&session, &stamped_at(&MsgType::Heartbeat, 2, stale));

        assert_eq!(wire.types(), vec!["3", "5"]);
        assert_eq!(reject_reason(&wire.of_type(&MsgType::Reject)[0]), 10);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_comp_id_problem() {
        let (session, wire, _app, mut peer) = logged_on();
        let mut heartbeat = peer.next(&MsgType::Heartbeat);
        heartbeat
            .header_mut()
            .set_string(tags::SENDER_COMP_ID, "OTHER")
            .unwrap();
        deliver(&session, &heartbeat);

        assert_eq!(wire.types(), vec!["3", "5"]);
        assert_eq!(reject_reason(&wire.of_type(&MsgType::Reject)[0]), 9);
    }

    #[test]
    fn test_unsupported_message_type_answers_business_reject() {
        let (session, wire, app, mut peer) = logged_on();
        app.fail_next(ApplicationError::UnsupportedMessageType("ZZ".to_string()));
        deliver(&session, &peer.next(&MsgType::Custom("ZZ".to_string())));

        let reject = wire.last();
        assert_eq!(reject.msg_type().unwrap(), "j");
        assert_eq!(reject.body().get_u64(tags::BUSINESS_REJECT_REASON).unwrap(), 3);
        assert_eq!(reject.body().get_string(tags::REF_MSG_TYPE).unwrap(), "ZZ");
        assert_eq!(reject.body().get_u64(tags::REF_SEQ_NUM).unwrap(), 2);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_application_failure_is_returned_without_advancing() {
        let (session, wire, app, mut peer) = logged_on();
        app.fail_next(ApplicationError::Other("database down".to_string()));
        let msg = peer.next(&MsgType::NewOrderSingle);

        let err = session.receive(&encode(&msg).unwrap()).unwrap_err();

        assert!(err.to_string().contains("database down"));
        assert_eq!(session.next_target_seq_num(), 2);
        assert!(wire.types().is_empty());
    }

    #[test]
    fn test_application_failure_answers_business_reject_when_configured() {
        let (session, wire, app, mut peer) =
            logged_on_with(|config| config.with_reject_message_on_unhandled_exception(true));
        app.fail_next(ApplicationError::Other("database down".to_string()));
        deliver(&session, &peer.next(&MsgType::NewOrderSingle));

        let reject = wire.last();
        assert_eq!(reject.msg_type().unwrap(), "j");
        assert_eq!(reject.body().get_u64(tags::BUSINESS_REJECT_REASON).unwrap(), 4);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_incorrect_begin_string_logs_out() {
        let (session, wire, _app, mut peer) = logged_on();
        let mut heartbeat = peer.next(&MsgType::Heartbeat);
        heartbeat
            .header_mut()
            .set_string(tags::BEGIN_STRING, "FIX.4.2")
            .unwrap();
        deliver(&session, &heartbeat);

        let logout = wire.last();
        assert_eq!(logout.msg_type().unwrap(), "5");
        assert!(
            logout
                .body()
                .get_string(tags::TEXT)
                .unwrap()
                .starts_with("Incorrect BeginString")
        );
        assert_eq!(session.next_target_seq_num(), 3);
        assert!(wire.is_closed());
    }

    #[test]
    fn test_app_message_before_logon_disconnects() {
        let (session, wire, _app) = session_with(|config| config);
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 1));

        let logout = wire.last();
        assert_eq!(logout.msg_type().unwrap(), "5");
        assert!(
            logout
                .body()
                .get_string(tags::TEXT)
                .unwrap()
                .contains("logon state is not valid")
        );
        assert!(wire.is_closed());
        assert_eq!(session.next_target_seq_num(), 1);
    }

    #[test]
    fn test_unparseable_logon_disconnects() {
        let (session, wire, _app) = session_with(|config| config);
        session
            .receive(b"8=FIX.4.4\x019=12\x0135=A\x01garbage")
            .unwrap();
        assert!(wire.is_closed());
        assert!(wire.types().is_empty());
    }

    #[test]
    fn test_unparseable_message_is_dropped() {
        let (session, wire, _app, _peer) = logged_on();
        session
            .receive(b"8=FIX.4.4\x019=12\x0135=D\x01garbage")
            .unwrap();
        assert!(!wire.is_closed());
        assert!(wire.types().is_empty());
        assert_eq!(session.next_target_seq_num(), 2);
    }

    #[test]
    fn test_oversized_message_is_dropped() {
        let (session, wire, _app) = session_with(|config| config.with_max_message_size(16));
        deliver(&session, &logon(1));
        assert!(!session.is_logged_on());
        assert!(wire.types().is_empty());
        assert_eq!(session.next_target_seq_num(), 1);
    }

    #[test]
    fn test_test_request_is_answered() {
        let (session, wire, _app, mut peer) = logged_on();
        let mut request = peer.next(&MsgType::TestRequest);
        request.body_mut().set_string(tags::TEST_REQ_ID, "PING").unwrap();
        deliver(&session, &request);

        let heartbeat = wire.last();
        assert_eq!(heartbeat.msg_type().unwrap(), "0");
        assert_eq!(heartbeat.body().get_string(tags::TEST_REQ_ID).unwrap(), "PING");
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let (session, wire, _app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::TestRequest));

        let reject = wire.last();
        assert_eq!(reject.msg_type().unwrap(), "3");
        assert_eq!(reject_reason(&reject), 1);
        assert_eq!(reject.body().get_u64(tags::REF_TAG_ID).unwrap(), 112);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_logout_request_is_answered() {
        let (session, wire, app, mut peer) = logged_on();
        deliver(&session, &peer.next(&MsgType::Logout));

        assert_eq!(wire.types(), vec!["5"]);
        assert!(wire.is_closed());
        assert_eq!(session.next_target_seq_num(), 3);
        assert_eq!(app.logouts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reject_advances_target() {
        let (session, wire, _app, mut peer) = logged_on();
        let mut reject = peer.next(&MsgType::Reject);
        reject.body_mut().set_u64(tags::REF_SEQ_NUM, 1);
        deliver(&session, &reject);

        assert!(wire.types().is_empty());
        assert_eq!(session.next_target_seq_num(), 3);
    }
}
