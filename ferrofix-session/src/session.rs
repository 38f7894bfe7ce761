/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! The FIX session.
//!
//! A [`Session`] owns one counterparty relationship: its sequence numbers
//! (through the message store), handshake state, liveness timers and the
//! recovery queue. It is driven from three directions:
//! - **Inbound**: [`Session::receive`] / [`Session::next`] with messages in
//!   delivery order
//! - **Outbound**: [`Session::send`] from any thread
//! - **Timer**: [`Session::next_at`] roughly once per second
//!
//! Locking follows a fixed order: the sender lock is taken before the state
//! lock, and the state lock is never held across application callbacks or
//! responder calls.

use crate::application::{Application, ApplicationError};
use crate::config::SessionConfig;
use crate::heartbeat::{HeartbeatManager, TEST_REQ_ID};
use crate::responder::Responder;
use crate::sequence::ResendRange;
use crate::state::{SessionState, SessionStatus};
use chrono::{DateTime, Utc};
use ferrofix_core::{
    Field, Message, MsgType, Result, SessionError, SessionId, is_admin_msg_type, tags,
};
use ferrofix_dictionary::{Dictionary, Version, session_dictionary};
use ferrofix_store::MessageStore;
use ferrofix_tagvalue::{MessageParser, encode};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// One side of a FIX session.
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) dictionary: Arc<Dictionary>,
    pub(crate) app_dictionary: Option<Arc<Dictionary>>,
    pub(crate) store: Box<dyn MessageStore>,
    pub(crate) application: Arc<dyn Application>,
    responder: Mutex<Option<Box<dyn Responder>>>,
    pub(crate) state: Mutex<SessionState>,
    /// Serializes stamp, transmit, persist and increment of outgoing messages.
    pub(crate) sender_lock: Mutex<()>,
    /// Serializes "is this the expected number" decisions on the target side.
    pub(crate) target_lock: Mutex<()>,
    resetting: AtomicBool,
    enabled: AtomicBool,
}

enum TimerAction {
    Idle,
    Disconnect(&'static str),
    TestRequest,
    Heartbeat,
}

impl Session {
    /// Creates a session and announces it to the application.
    ///
    /// The session dictionary for the configured BeginString is built in.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `store` - Sequence number and outgoing message store
    /// * `application` - Application callbacks
    ///
    /// # Errors
    /// Returns `SessionError::Configuration` for an unknown BeginString.
    pub fn new(
        config: SessionConfig,
        store: Box<dyn MessageStore>,
        application: Arc<dyn Application>,
    ) -> Result<Self> {
        let begin_string = config.session_id.begin_string();
        let version = Version::from_begin_string(begin_string).ok_or_else(|| {
            SessionError::Configuration(format!("unsupported BeginString {begin_string}"))
        })?;
        let heartbeat = HeartbeatManager::new(config.heartbeat_interval, Instant::now())
            .with_timeout_multiplier(config.heartbeat_timeout_multiplier)
            .with_test_request_delay_multiplier(config.test_request_delay_multiplier);

        let session = Self {
            config,
            dictionary: Arc::new(session_dictionary(version)),
            app_dictionary: None,
            store,
            application,
            responder: Mutex::new(None),
            state: Mutex::new(SessionState::new(heartbeat)),
            sender_lock: Mutex::new(()),
            target_lock: Mutex::new(()),
            resetting: AtomicBool::new(false),
            enabled: AtomicBool::new(true),
        };
        session.application.on_create(session.session_id());
        info!(session = %session.session_id(), "session created");
        Ok(session)
    }

    /// Replaces the session-level dictionary.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: Arc<Dictionary>) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Sets the dictionary used to parse and validate application messages.
    #[must_use]
    pub fn with_app_dictionary(mut self, dictionary: Arc<Dictionary>) -> Self {
        self.app_dictionary = Some(dictionary);
        self
    }

    /// Returns the session identity.
    #[inline]
    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.config.session_id
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the message store.
    #[must_use]
    pub fn store(&self) -> &dyn MessageStore {
        self.store.as_ref()
    }

    /// Returns the current session status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        let connected = self.has_responder();
        self.state.lock().status(connected)
    }

    /// Returns true once Logon has been exchanged in both directions.
    #[must_use]
    pub fn is_logged_on(&self) -> bool {
        self.state.lock().is_logged_on()
    }

    /// Returns the outstanding resend range.
    #[must_use]
    pub fn resend_range(&self) -> ResendRange {
        self.state.lock().resend_range()
    }

    /// Returns the number of messages held back by a gap.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.state.lock().queued()
    }

    /// Returns the sequence number the next outgoing message will carry.
    #[must_use]
    pub fn next_sender_seq_num(&self) -> u64 {
        self.store.next_sender_seq_num()
    }

    /// Returns the sequence number expected on the next incoming message.
    #[must_use]
    pub fn next_target_seq_num(&self) -> u64 {
        self.store.next_target_seq_num()
    }

    /// Overrides the next outgoing sequence number.
    ///
    /// # Errors
    /// Returns an error if the store cannot persist the value.
    pub fn set_next_sender_seq_num(&self, seq: u64) -> Result<()> {
        let _sender = self.sender_lock.lock();
        self.store.set_next_sender_seq_num(seq)?;
        Ok(())
    }

    /// Overrides the next expected incoming sequence number.
    ///
    /// # Errors
    /// Returns an error if the store cannot persist the value.
    pub fn set_next_target_seq_num(&self, seq: u64) -> Result<()> {
        let _target = self.target_lock.lock();
        self.store.set_next_target_seq_num(seq)?;
        Ok(())
    }

    /// Attaches the transport for a new connection.
    pub fn set_responder(&self, responder: Box<dyn Responder>) {
        let address = responder.remote_address();
        *self.responder.lock() = Some(responder);
        self.state.lock().heartbeat.reset(Instant::now());
        info!(session = %self.session_id(), remote = ?address, "connected");
    }

    /// Returns true while a transport is attached.
    #[must_use]
    pub fn has_responder(&self) -> bool {
        self.responder.lock().is_some()
    }

    /// Returns the peer address of the attached transport.
    #[must_use]
    pub fn remote_address(&self) -> Option<String> {
        self.responder
            .lock()
            .as_ref()
            .and_then(|responder| responder.remote_address())
    }

    /// Enables the session. An initiator logs on at the next timer tick.
    pub fn logon(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    /// Disables the session. A logged-on session sends Logout at the next
    /// timer tick.
    ///
    /// # Arguments
    /// * `reason` - Optional Text for the Logout
    pub fn logout(&self, reason: Option<&str>) {
        self.state.lock().logout_reason = reason.map(str::to_owned);
        self.enabled.store(false, Ordering::SeqCst);
    }

    /// Returns false after [`Session::logout`].
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Drops the connection.
    ///
    /// Disconnecting a disconnected session does nothing.
    ///
    /// # Errors
    /// Returns an error if a configured reset fails.
    pub fn disconnect(&self, reason: &str) -> Result<()> {
        let Some(responder) = self.responder.lock().take() else {
            debug!(session = %self.session_id(), "already disconnected");
            return Ok(());
        };
        info!(session = %self.session_id(), reason, "disconnecting");
        responder.disconnect();

        let was_logging_on = {
            let mut state = self.state.lock();
            let flag = state.logon_sent || state.logon_received;
            state.on_disconnect(Instant::now());
            flag
        };
        if was_logging_on {
            self.application.on_logout(self.session_id());
        }
        if self.config.reset_on_disconnect {
            self.reset_state()?;
        }
        Ok(())
    }

    /// Logs out if logged on, disconnects, and resets both sequence numbers.
    ///
    /// Concurrent calls collapse into one reset.
    ///
    /// # Errors
    /// Returns an error if the Logout cannot be sent or the store fails.
    pub fn reset(&self) -> Result<()> {
        if self.resetting.swap(true, Ordering::AcqRel) {
            debug!(session = %self.session_id(), "reset already in progress");
            return Ok(());
        }
        let result = self.reset_now();
        self.resetting.store(false, Ordering::Release);
        result
    }

    fn reset_now(&self) -> Result<()> {
        if self.has_responder() && self.is_logged_on() {
            let logout_sent = self.state.lock().logout_sent;
            if !logout_sent {
                self.generate_logout(None)?;
            }
            self.disconnect("Session reset")?;
        }
        self.reset_state()
    }

    /// Resets the store and forgets recovery state, leaving handshake flags.
    pub(crate) fn reset_state(&self) -> Result<()> {
        self.store.reset()?;
        self.state.lock().clear_recovery();
        info!(session = %self.session_id(), "sequence numbers reset to 1");
        Ok(())
    }

    /// Sends an application or admin message.
    ///
    /// The header is stamped with the session identity, the next sender
    /// sequence number and the current SendingTime. The message is persisted
    /// and the sender number advanced even when it cannot be transmitted yet.
    ///
    /// # Returns
    /// `true` if the message was handed to the transport.
    ///
    /// # Errors
    /// Returns an error if encoding or persisting fails, or if `to_app`
    /// fails with anything other than `DoNotSend`.
    pub fn send(&self, message: Message) -> Result<bool> {
        self.send_raw(message, 0)
    }

    /// Sends with an explicit sequence number when `num` is non-zero.
    ///
    /// An explicit number is neither persisted nor advanced.
    pub(crate) fn send_raw(&self, message: Message, num: u64) -> Result<bool> {
        let _sender = self.sender_lock.lock();
        self.send_raw_locked(message, num)
    }

    /// [`Session::send_raw`] for callers already holding the sender lock.
    pub(crate) fn send_raw_locked(&self, mut message: Message, num: u64) -> Result<bool> {
        self.initialize_header(&mut message, num)?;
        let msg_type = message.msg_type()?.to_owned();

        if is_admin_msg_type(&msg_type) {
            self.application.to_admin(&mut message, self.session_id());
            let resets = msg_type == MsgType::Logon.as_str()
                && message
                    .body()
                    .get_bool(tags::RESET_SEQ_NUM_FLAG)
                    .unwrap_or(false);
            if resets {
                let reset_received = self.state.lock().reset_received;
                if !reset_received {
                    self.reset_state()?;
                    message
                        .header_mut()
                        .set_u64(tags::MSG_SEQ_NUM, self.store.next_sender_seq_num());
                    self.state.lock().reset_sent = true;
                }
            }
        } else {
            match self.application.to_app(&mut message, self.session_id()) {
                Ok(()) => {}
                Err(ApplicationError::DoNotSend) => {
                    debug!(session = %self.session_id(), msg_type, "message vetoed by application");
                    return Ok(false);
                }
                Err(error) => return Err(SessionError::Application(error.to_string()).into()),
            }
        }

        let seq = message.msg_seq_num()?;
        let data = encode(&message)?;
        let sent = (self.is_logged_on() || is_session_control(&msg_type)) && self.transmit(&data);
        if num == 0 {
            if self.config.persist_messages {
                self.store.set(seq, &data)?;
            }
            self.store.incr_next_sender_seq_num()?;
        }
        debug!(session = %self.session_id(), msg_type, seq, sent, "message sent");
        Ok(sent)
    }

    /// Hands encoded bytes to the responder.
    pub(crate) fn transmit(&self, data: &[u8]) -> bool {
        let sent = self
            .responder
            .lock()
            .as_ref()
            .is_some_and(|responder| responder.send(data));
        if sent {
            self.state.lock().heartbeat.on_sent(Instant::now());
        }
        sent
    }

    fn initialize_header(&self, message: &mut Message, num: u64) -> Result<()> {
        let id = &self.config.session_id;
        let seq = if num == 0 {
            self.store.next_sender_seq_num()
        } else {
            num
        };
        let header = message.header_mut();
        header.set_string(tags::BEGIN_STRING, id.begin_string())?;
        header.set_string(tags::SENDER_COMP_ID, id.sender_comp_id())?;
        header.set_string(tags::TARGET_COMP_ID, id.target_comp_id())?;
        let optional = [
            (tags::SENDER_SUB_ID, id.sender_sub_id()),
            (tags::SENDER_LOCATION_ID, id.sender_location_id()),
            (tags::TARGET_SUB_ID, id.target_sub_id()),
            (tags::TARGET_LOCATION_ID, id.target_location_id()),
        ];
        for (tag, value) in optional {
            if let Some(value) = value {
                header.set_string(tag, value)?;
            }
        }
        header.set_u64(tags::MSG_SEQ_NUM, seq);
        header.set_utc_timestamp(
            tags::SENDING_TIME,
            Utc::now(),
            self.config.timestamp_precision,
        );

        let poss_dup = header.get_bool(tags::POSS_DUP_FLAG).unwrap_or(false);
        if poss_dup && !header.is_field_set(tags::ORIG_SENDING_TIME) {
            if let Some(sending_time) = header.field(tags::SENDING_TIME).map(Field::raw_bytes) {
                header.set_field(Field::from_raw(tags::ORIG_SENDING_TIME, sending_time))?;
            }
        }
        Ok(())
    }

    /// Builds a parser over the session's dictionaries.
    pub(crate) fn parser(&self) -> MessageParser<'_> {
        let parser = MessageParser::new()
            .with_session_dictionary(&self.dictionary)
            .with_settings(self.config.parser);
        match &self.app_dictionary {
            Some(app) => parser.with_app_dictionary(app),
            None => parser,
        }
    }

    /// Returns true for FIX.4.2 and later, including FIXT.
    pub(crate) fn is_fix42_or_later(&self) -> bool {
        self.session_id().begin_string() >= "FIX.4.2"
    }

    /// Runs the timer checks against the current instant.
    ///
    /// # Errors
    /// See [`Session::next_at`].
    pub fn tick(&self) -> Result<()> {
        self.next_at(Instant::now())
    }

    /// Runs the timer checks.
    ///
    /// Handles disabled sessions, the session window, initiator logon,
    /// logon/logout timeouts, heartbeat timeouts, TestRequests and
    /// Heartbeats.
    ///
    /// # Arguments
    /// * `now` - The current instant
    ///
    /// # Errors
    /// Returns an error if a message cannot be sent or the store fails.
    pub fn next_at(&self, now: Instant) -> Result<()> {
        if !self.is_enabled() {
            if !self.is_logged_on() {
                return Ok(());
            }
            let (logout_sent, reason) = {
                let state = self.state.lock();
                (state.logout_sent, state.logout_reason.clone())
            };
            if !logout_sent {
                info!(session = %self.session_id(), "initiated logout request");
                self.generate_logout(reason.as_deref())?;
            }
        }

        let wall = Utc::now();
        let schedule = self.config.schedule;
        if !schedule.is_session_time(wall) {
            if self.has_responder() || self.is_logged_on() {
                info!(session = %self.session_id(), %schedule, "outside session time");
                self.reset()?;
            }
            return Ok(());
        }
        let created = DateTime::<Utc>::from(self.store.creation_time());
        if !schedule.is_same_session(created, wall) {
            info!(session = %self.session_id(), "new session period");
            self.reset()?;
        }
        if !self.has_responder() {
            return Ok(());
        }

        let (logon_sent, logon_received, logon_timed_out) = {
            let state = self.state.lock();
            (
                state.logon_sent,
                state.logon_received,
                state.is_logon_timed_out(now, self.config.logon_timeout),
            )
        };
        if !logon_received {
            if self.config.is_initiator && !logon_sent {
                if self.is_enabled() {
                    self.generate_logon(now)?;
                    info!(session = %self.session_id(), "initiated logon request");
                }
            } else if logon_timed_out {
                self.disconnect("Timed out waiting for logon response")?;
            }
            return Ok(());
        }

        let action = {
            let state = self.state.lock();
            let heartbeat = &state.heartbeat;
            if !heartbeat.is_enabled() {
                TimerAction::Idle
            } else if state.is_logout_timed_out(now, self.config.logout_timeout) {
                TimerAction::Disconnect("Timed out waiting for logout response")
            } else if heartbeat.is_timed_out(now) {
                TimerAction::Disconnect("Timed out waiting for heartbeat")
            } else if heartbeat.is_test_request_needed(now) {
                TimerAction::TestRequest
            } else if heartbeat.is_heartbeat_needed(now) {
                TimerAction::Heartbeat
            } else {
                TimerAction::Idle
            }
        };
        match action {
            TimerAction::Idle => {}
            TimerAction::Disconnect(reason) => {
                warn!(session = %self.session_id(), reason, "timer disconnect");
                self.disconnect(reason)?;
            }
            TimerAction::TestRequest => {
                self.generate_test_request(TEST_REQ_ID, now)?;
                info!(session = %self.session_id(), "sent test request {TEST_REQ_ID}");
            }
            TimerAction::Heartbeat => {
                self.generate_heartbeat(None)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", self.session_id())
            .field("status", &self.status())
            .field("next_sender_seq_num", &self.next_sender_seq_num())
            .field("next_target_seq_num", &self.next_target_seq_num())
            .finish_non_exhaustive()
    }
}

/// Messages that establish, tear down or resynchronize a session go out
/// even before logon completes.
fn is_session_control(msg_type: &str) -> bool {
    [
        MsgType::Logon,
        MsgType::Logout,
        MsgType::ResendRequest,
        MsgType::SequenceReset,
    ]
    .iter()
    .any(|kind| kind.as_str() == msg_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::NoOpApplication;
    use crate::schedule::SessionSchedule;
    use crate::testing;
    use ferrofix_store::MemoryStore;
    use std::sync::Arc;
    use std::sync::atomic::Ordering as AtomicOrdering;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Wire(Arc<Mutex<Vec<Vec<u8>>>>);

    impl Responder for Wire {
        fn send(&self, data: &[u8]) -> bool {
            self.0.lock().push(data.to_vec());
            true
        }

        fn disconnect(&self) {}
    }

    fn session() -> Session {
        let config = SessionConfig::new(SessionId::new("FIX.4.4", "ME", "YOU"));
        Session::new(
            config,
            Box::new(MemoryStore::new()),
            Arc::new(NoOpApplication),
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_begin_string_is_rejected() {
        let config = SessionConfig::new(SessionId::new("FIX.9.9", "ME", "YOU"));
        let err = Session::new(
            config,
            Box::new(MemoryStore::new()),
            Arc::new(NoOpApplication),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unsupported BeginString"));
    }

    #[test]
    fn test_send_before_logon_is_stored_not_transmitted() {
        let session = session();
        let wire = Wire::default();
        session.set_responder(Box::new(wire.clone()));

        let sent = session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        assert!(!sent);
        assert!(wire.0.lock().is_empty());
        assert_eq!(session.next_sender_seq_num(), 2);
        assert_eq!(session.store().get(1, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_header_is_stamped() {
        let session = session();
        let wire = Wire::default();
        session.set_responder(Box::new(wire.clone()));
        session.send(Message::of_type(&MsgType::Logout)).unwrap();

        let raw = wire.0.lock()[0].clone();
        let text = String::from_utf8(raw).unwrap();
        assert!(text.starts_with("8=FIX.4.4\x01"));
        assert!(text.contains("\x0135=5\x01"));
        assert!(text.contains("\x0149=ME\x01"));
        assert!(text.contains("\x0156=YOU\x01"));
        assert!(text.contains("\x0134=1\x01"));
        assert!(text.contains("\x0152="));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let session = session();
        session.set_responder(Box::new(Wire::default()));
        assert_eq!(session.status(), SessionStatus::LogonPending);
        session.disconnect("first").unwrap();
        session.disconnect("second").unwrap();
        assert_eq!(session.status(), SessionStatus::Disconnected);
    }

    #[test]
    fn test_reset_restarts_sequence_numbers() {
        let session = session();
        session.set_next_sender_seq_num(10).unwrap();
        session.set_next_target_seq_num(20).unwrap();
        session.reset().unwrap();
        assert_eq!(session.next_sender_seq_num(), 1);
        assert_eq!(session.next_target_seq_num(), 1);
    }

    #[test]
    fn test_session_control_types() {
        assert!(is_session_control("A"));
        assert!(is_session_control("4"));
        assert!(!is_session_control("0"));
        assert!(!is_session_control("D"));
    }

    fn outside_now() -> SessionSchedule {
        let now = Utc::now().time();
        let start = now + chrono::Duration::hours(2);
        let end = now + chrono::Duration::hours(3);
        SessionSchedule::daily(start, end)
    }

    #[test]
    fn test_heartbeat_test_request_and_timeout() {
        let (session, wire, app, _peer) = testing::logged_on();
        let start = Instant::now();

        session.next_at(start + Duration::from_secs(10)).unwrap();
        assert!(wire.types().is_empty());

        session.next_at(start + Duration::from_secs(31)).unwrap();
        assert_eq!(wire.types(), vec!["0"]);

        session.next_at(start + Duration::from_secs(46)).unwrap();
        assert_eq!(wire.types(), vec!["0", "1"]);
        let request = wire.last();
        assert_eq!(request.body().get_string(tags::TEST_REQ_ID).unwrap(), "TEST");

        session.next_at(start + Duration::from_secs(64)).unwrap();
        assert!(wire.is_closed());
        assert_eq!(session.status(), SessionStatus::Disconnected);
        assert_eq!(app.logouts.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_initiator_sends_logon_and_completes_handshake() {
        let (session, wire, app) = testing::session_with(|config| config.with_initiator(true));
        session.next_at(Instant::now()).unwrap();

        let logon = wire.last();
        assert_eq!(logon.msg_type().unwrap(), "A");
        assert_eq!(logon.body().get_u64(tags::HEART_BT_INT).unwrap(), 30);
        assert_eq!(logon.body().get_u64(tags::ENCRYPT_METHOD).unwrap(), 0);
        assert!(!logon.body().is_field_set(tags::RESET_SEQ_NUM_FLAG));
        assert_eq!(session.status(), SessionStatus::LogonPending);

        testing::deliver(&session, &testing::logon(1));
        assert!(session.is_logged_on());
        assert_eq!(wire.types(), vec!["A"]);
        assert_eq!(session.next_target_seq_num(), 2);
        assert_eq!(app.logons.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_initiator_logon_times_out() {
        let (session, wire, _app) = testing::session_with(|config| config.with_initiator(true));
        let start = Instant::now();
        session.next_at(start).unwrap();
        session.next_at(start + Duration::from_secs(5)).unwrap();
        assert!(!wire.is_closed());

        session.next_at(start + Duration::from_secs(11)).unwrap();
        assert!(wire.is_closed());
        assert!(!session.has_responder());
    }

    #[test]
    fn test_reset_on_logon_announces_reset_flag() {
        let (session, wire, _app) = testing::session_with(|config| {
            config.with_initiator(true).with_reset_on_logon(true)
        });
        session.set_next_sender_seq_num(5).unwrap();
        session.set_next_target_seq_num(9).unwrap();
        session.next_at(Instant::now()).unwrap();

        let logon = wire.last();
        assert_eq!(logon.msg_seq_num().unwrap(), 1);
        assert!(logon.body().get_bool(tags::RESET_SEQ_NUM_FLAG).unwrap());

        let mut response = testing::logon(1);
        response.body_mut().set_bool(tags::RESET_SEQ_NUM_FLAG, true);
        testing::deliver(&session, &response);
        assert!(session.is_logged_on());
        assert_eq!(wire.types(), vec!["A"]);
        assert_eq!(session.next_sender_seq_num(), 2);
        assert_eq!(session.next_target_seq_num(), 2);
    }

    #[test]
    fn test_disabled_session_logs_out_then_times_out() {
        let (session, wire, _app, _peer) = testing::logged_on();
        session.logout(Some("end of day"));
        let start = Instant::now();
        session.next_at(start).unwrap();

        let logout = wire.last();
        assert_eq!(logout.msg_type().unwrap(), "5");
        assert_eq!(logout.body().get_string(tags::TEXT).unwrap(), "end of day");
        assert_eq!(session.status(), SessionStatus::LogoutPending);

        session.next_at(start + Duration::from_secs(1)).unwrap();
        assert_eq!(wire.types(), vec!["5"]);
        assert!(!wire.is_closed());

        session.next_at(start + Duration::from_secs(3)).unwrap();
        assert!(wire.is_closed());
    }

    #[test]
    fn test_outside_session_time_resets() {
        let (session, wire, _app) =
            testing::session_with(|config| config.with_schedule(outside_now()));
        session.set_next_sender_seq_num(5).unwrap();
        session.next_at(Instant::now()).unwrap();
        assert_eq!(session.next_sender_seq_num(), 1);
        assert!(wire.types().is_empty());
    }

    #[test]
    fn test_logon_outside_session_time_is_refused() {
        let (session, wire, app) =
            testing::session_with(|config| config.with_schedule(outside_now()));
        testing::deliver(&session, &testing::logon(1));

        let logout = wire.last();
        assert_eq!(logout.msg_type().unwrap(), "5");
        assert_eq!(
            logout.body().get_string(tags::TEXT).unwrap(),
            "Logon attempt not within session time"
        );
        assert!(wire.is_closed());
        assert_eq!(session.next_target_seq_num(), 2);
        assert_eq!(app.logons.load(AtomicOrdering::SeqCst), 0);
    }
}
