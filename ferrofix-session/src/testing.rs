/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Fixtures shared by the session tests: a recording transport, a recording
//! application and a scripted counterparty.

use crate::application::{Application, ApplicationError};
use crate::config::SessionConfig;
use crate::responder::Responder;
use crate::session::Session;
use chrono::{DateTime, Utc};
use ferrofix_core::{Message, MsgType, SessionId, TimestampPrecision, tags};
use ferrofix_store::{MemoryStore, MessageStore};
use ferrofix_tagvalue::{MessageParser, encode};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Clone, Default)]
pub(crate) struct Wire {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<AtomicBool>,
}

impl Responder for Wire {
    fn send(&self, data: &[u8]) -> bool {
        self.sent.lock().push(data.to_vec());
        true
    }

    fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn remote_address(&self) -> Option<String> {
        Some("127.0.0.1:9876".to_string())
    }
}

impl Wire {
    pub(crate) fn messages(&self) -> Vec<Message> {
        let parser = MessageParser::new();
        self.sent
            .lock()
            .iter()
            .map(|raw| parser.parse(raw).unwrap())
            .collect()
    }

    pub(crate) fn types(&self) -> Vec<String> {
        self.messages()
            .iter()
            .map(|msg| msg.msg_type().unwrap().to_string())
            .collect()
    }

    pub(crate) fn last(&self) -> Message {
        self.messages().pop().unwrap()
    }

    pub(crate) fn of_type(&self, msg_type: &MsgType) -> Vec<Message> {
        self.messages()
            .into_iter()
            .filter(|msg| msg.msg_type().unwrap() == msg_type.as_str())
            .collect()
    }

    pub(crate) fn clear(&self) {
        self.sent.lock().clear();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct Recorder {
    pub(crate) received: Mutex<Vec<Message>>,
    pub(crate) logons: AtomicUsize,
    pub(crate) logouts: AtomicUsize,
    pub(crate) fail_next: Mutex<Option<ApplicationError>>,
    pub(crate) veto_resend: AtomicBool,
}

impl Recorder {
    pub(crate) fn received_seqs(&self) -> Vec<u64> {
        self.received
            .lock()
            .iter()
            .map(|msg| msg.msg_seq_num().unwrap())
            .collect()
    }

    pub(crate) fn fail_next(&self, error: ApplicationError) {
        *self.fail_next.lock() = Some(error);
    }
}

impl Application for Recorder {
    fn on_logon(&self, _session_id: &SessionId) {
        self.logons.fetch_add(1, Ordering::SeqCst);
    }

    fn on_logout(&self, _session_id: &SessionId) {
        self.logouts.fetch_add(1, Ordering::SeqCst);
    }

    fn to_app(&self, message: &mut Message, _session_id: &SessionId) -> Result<(), ApplicationError> {
        if message.is_poss_dup() && self.veto_resend.load(Ordering::SeqCst) {
            return Err(ApplicationError::DoNotSend);
        }
        Ok(())
    }

    fn from_app(&self, message: &Message, _session_id: &SessionId) -> Result<(), ApplicationError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        self.received.lock().push(message.clone());
        Ok(())
    }
}

/// The counterparty of a `ME -> YOU` session.
pub(crate) struct Peer {
    pub(crate) seq: u64,
}

impl Peer {
    pub(crate) fn new() -> Self {
        Self { seq: 1 }
    }

    /// Builds the next message in the counterparty's sequence.
    pub(crate) fn next(&mut self, msg_type: &MsgType) -> Message {
        let seq = self.seq;
        self.seq += 1;
        stamped(msg_type, seq)
    }
}

pub(crate) fn stamped(msg_type: &MsgType, seq: u64) -> Message {
    stamped_at(msg_type, seq, Utc::now())
}

pub(crate) fn stamped_at(msg_type: &MsgType, seq: u64, sending_time: DateTime<Utc>) -> Message {
    let mut msg = Message::of_type(msg_type);
    let header = msg.header_mut();
    header.set_string(tags::BEGIN_STRING, "FIX.4.4").unwrap();
    header.set_string(tags::SENDER_COMP_ID, "YOU").unwrap();
    header.set_string(tags::TARGET_COMP_ID, "ME").unwrap();
    header.set_u64(tags::MSG_SEQ_NUM, seq);
    header.set_utc_timestamp(tags::SENDING_TIME, sending_time, TimestampPrecision::Millis);
    msg
}

pub(crate) fn logon(seq: u64) -> Message {
    let mut msg = stamped(&MsgType::Logon, seq);
    msg.body_mut().set_u64(tags::ENCRYPT_METHOD, 0);
    msg.body_mut().set_u64(tags::HEART_BT_INT, 30);
    msg
}

pub(crate) fn deliver(session: &Session, message: &Message) {
    session.receive(&encode(message).unwrap()).unwrap();
}

pub(crate) fn session_with(
    configure: impl FnOnce(SessionConfig) -> SessionConfig,
) -> (Session, Wire, Arc<Recorder>) {
    session_with_store(Box::new(MemoryStore::new()), configure)
}

pub(crate) fn session_with_store(
    store: Box<dyn MessageStore>,
    configure: impl FnOnce(SessionConfig) -> SessionConfig,
) -> (Session, Wire, Arc<Recorder>) {
    let config = configure(SessionConfig::new(SessionId::new("FIX.4.4", "ME", "YOU")));
    let app = Arc::new(Recorder::default());
    let session = Session::new(config, store, app.clone()).unwrap();
    let wire = Wire::default();
    session.set_responder(Box::new(wire.clone()));
    (session, wire, app)
}

/// An acceptor that has completed logon; the wire starts empty.
pub(crate) fn logged_on_with(
    configure: impl FnOnce(SessionConfig) -> SessionConfig,
) -> (Session, Wire, Arc<Recorder>, Peer) {
    let (session, wire, app) = session_with(configure);
    let mut peer = Peer::new();
    let msg = logon(peer.seq);
    peer.seq += 1;
    deliver(&session, &msg);
    assert!(session.is_logged_on());
    wire.clear();
    (session, wire, app, peer)
}

pub(crate) fn logged_on() -> (Session, Wire, Arc<Recorder>, Peer) {
    logged_on_with(|config| config)
}
