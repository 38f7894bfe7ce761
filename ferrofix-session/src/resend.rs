/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Gap recovery in both directions.
//!
//! Incoming gaps queue the early message and issue a ResendRequest, in
//! chunks when configured. Incoming ResendRequests replay stored
//! application messages with PossDupFlag set and collapse everything else
//! into SequenceReset-GapFill messages.

use crate::application::ApplicationError;
use crate::sequence::{ResendRange, chunk_end};
use crate::session::Session;
use chrono::Utc;
use ferrofix_core::{Field, Message, MsgType, Result, tags};
use ferrofix_tagvalue::encode;
use tracing::{debug, info, warn};

impl Session {
    /// Queues a message that arrived ahead of the expected sequence number
    /// and requests the missing range.
    pub(crate) fn do_target_too_high(&self, message: &Message, expected: u64) -> Result<()> {
        let seq = message.msg_seq_num()?;
        warn!(session = %self.session_id(), expected, received = seq, "MsgSeqNum too high");
        let range = {
            let mut state = self.state.lock();
            state.enqueue(seq, message.clone());
            state.resend_range
        };

        if range.is_pending()
            && !self.config.send_redundant_resend_requests
            && seq >= range.begin()
        {
            info!(
                session = %self.session_id(),
                begin = range.begin(),
                end = range.end(),
                "already sent resend request, not sending another"
            );
            return Ok(());
        }
        self.send_resend_request(expected, seq - 1)
    }

    /// Requests `begin..=end`, or its first chunk.
    pub(crate) fn send_resend_request(&self, begin: u64, end: u64) -> Result<()> {
        let chunk_size = self.config.resend_request_chunk_size;
        let last = chunk_end(begin, end, chunk_size);

        let mut request = Message::of_type(&MsgType::ResendRequest);
        request.body_mut().set_u64(tags::BEGIN_SEQ_NO, begin);
        request.body_mut().set_u64(tags::END_SEQ_NO, last);
        self.send(request)?;
        info!(session = %self.session_id(), begin, end = last, "sent resend request");

        let chunk = if chunk_size == 0 { 0 } else { last };
        self.state.lock().resend_range = ResendRange::new(begin, end, chunk);
        Ok(())
    }

    /// Answers a ResendRequest for `begin..=end`.
    ///
    /// An `end` of zero, or one at or past the next sender number, means the
    /// last message sent.
    pub(crate) fn resend_messages(&self, begin: u64, end: u64) -> Result<()> {
        let _sender = self.sender_lock.lock();
        let last_sent = self.store.next_sender_seq_num().saturating_sub(1);
        let end = if end == 0 || end > last_sent { last_sent } else { end };
        if begin == 0 || begin > end {
            warn!(session = %self.session_id(), begin, end, "ignoring resend request with empty range");
            return Ok(());
        }

        if !self.config.persist_messages {
            return self.send_gap_fill_locked(begin, end + 1);
        }

        let stored = match self.store.get(begin, end) {
            Ok(stored) => stored,
            Err(error) if self.config.force_resend_when_corrupted_store => {
                warn!(session = %self.session_id(), %error, "store unreadable, filling the gap");
                Vec::new()
            }
            Err(error) => return Err(error.into()),
        };

        let parser = self.parser();
        let mut gap_start: Option<u64> = None;
        let mut current = begin;
        for raw in stored {
            let Ok(mut message) = parser.parse_bytes(raw) else {
                warn!(session = %self.session_id(), "skipping unreadable stored message");
                continue;
            };
            let Ok(seq) = message.msg_seq_num() else {
                continue;
            };
            if seq < begin || seq > end {
                continue;
            }
            if seq > current && gap_start.is_none() {
                gap_start = Some(current);
            }
            current = seq + 1;

            if message.is_admin() || !self.prepare_resend(&mut message)? {
                gap_start.get_or_insert(seq);
                continue;
            }
            if let Some(start) = gap_start.take() {
                self.send_gap_fill_locked(start, seq)?;
            }
            let data = encode(&message)?;
            self.transmit(&data);
            debug!(session = %self.session_id(), seq, "resent message");
        }

        if current <= end {
            gap_start.get_or_insert(current);
        }
        if let Some(start) = gap_start {
            self.send_gap_fill_locked(start, end + 1)?;
        }
        Ok(())
    }

    /// Marks a stored application message as a possible duplicate and lets
    /// the application veto the resend.
    fn prepare_resend(&self, message: &mut Message) -> Result<bool> {
        let header = message.header_mut();
        header.set_bool(tags::POSS_DUP_FLAG, true);
        if let Some(sending_time) = header.field(tags::SENDING_TIME).map(Field::raw_bytes) {
            header.set_field(Field::from_raw(tags::ORIG_SENDING_TIME, sending_time))?;
        }
        header.set_utc_timestamp(
            tags::SENDING_TIME,
            Utc::now(),
            self.config.timestamp_precision,
        );

        match self.application.to_app(message, self.session_id()) {
            Ok(()) => Ok(true),
            Err(ApplicationError::DoNotSend) => Ok(false),
            Err(error) => {
                warn!(session = %self.session_id(), %error, "not resending message");
                Ok(false)
            }
        }
    }

    /// Sends SequenceReset-GapFill numbered `begin` pointing at `new_seq`.
    fn send_gap_fill_locked(&self, begin: u64, new_seq: u64) -> Result<()> {
        let mut gap_fill = Message::of_type(&MsgType::SequenceReset);
        gap_fill.header_mut().set_bool(tags::POSS_DUP_FLAG, true);
        gap_fill.body_mut().set_bool(tags::GAP_FILL_FLAG, true);
        gap_fill.body_mut().set_u64(tags::NEW_SEQ_NO, new_seq);
        self.send_raw_locked(gap_fill, begin)?;
        info!(session = %self.session_id(), begin, new_seq, "sent sequence reset gap fill");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{deliver, logged_on, logged_on_with, logon, session_with_store, stamped};
    use bytes::Bytes;
    use ferrofix_core::error::StoreError;
    use ferrofix_core::{Message, MsgType, tags};
    use ferrofix_store::{MemoryStore, MessageStore};
    use ferrofix_tagvalue::encode;
    use std::sync::atomic::Ordering;
    use std::time::SystemTime;

    fn resend_request(seq: u64, begin: u64, end: u64) -> Message {
        let mut request = stamped(&MsgType::ResendRequest, seq);
        request.body_mut().set_u64(tags::BEGIN_SEQ_NO, begin);
        request.body_mut().set_u64(tags::END_SEQ_NO, end);
        request
    }

    fn range_of(msg: &Message) -> (u64, u64) {
        (
            msg.body().get_u64(tags::BEGIN_SEQ_NO).unwrap(),
            msg.body().get_u64(tags::END_SEQ_NO).unwrap(),
        )
    }

    #[test]
    fn test_resend_replays_app_messages_and_fills_admin() {
        let (session, wire, _app, mut peer) = logged_on();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        wire.clear();

        let seq = peer.next(&MsgType::ResendRequest).msg_seq_num().unwrap();
        deliver(&session, &resend_request(seq, 1, 0));

        let sent = wire.messages();
        assert_eq!(wire.types(), vec!["4", "D", "D"]);

        let gap_fill = sent[0].clone();
        assert_eq!(gap_fill.msg_seq_num().unwrap(), 1);
        assert_eq!(gap_fill.body().get_u64(tags::NEW_SEQ_NO).unwrap(), 2);
        assert!(gap_fill.body().get_bool(tags::GAP_FILL_FLAG).unwrap());
        assert!(gap_fill.is_poss_dup());

        assert_eq!(sent[1].msg_seq_num().unwrap(), 2);
        assert!(sent[1].is_poss_dup());
        assert!(sent[1].header().is_field_set(tags::ORIG_SENDING_TIME));
        assert_eq!(sent[2].msg_seq_num().unwrap(), 3);

        assert_eq!(session.next_sender_seq_num(), 4);
        assert_eq!(session.next_target_seq_num(), 3);
    }

    #[test]
    fn test_resend_end_past_last_sent_is_clamped() {
        let (session, wire, _app, _peer) = logged_on();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        wire.clear();

        deliver(&session, &resend_request(2, 2, 99));

        assert_eq!(wire.types(), vec!["D", "D"]);
        assert_eq!(session.next_sender_seq_num(), 4);
    }

    #[test]
    fn test_vetoed_resend_becomes_gap_fill() {
        let (session, wire, app, _peer) = logged_on();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        app.veto_resend.store(true, Ordering::SeqCst);
        wire.clear();

        deliver(&session, &resend_request(2, 1, 0));

        let sent = wire.messages();
        assert_eq!(wire.types(), vec!["4"]);
        assert_eq!(sent[0].msg_seq_num().unwrap(), 1);
        assert_eq!(sent[0].body().get_u64(tags::NEW_SEQ_NO).unwrap(), 4);
    }

    #[test]
    fn test_non_persisting_session_fills_the_whole_range() {
        let (session, wire, _app, _peer) =
            logged_on_with(|config| config.with_persist_messages(false));
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        session.send(Message::of_type(&MsgType::NewOrderSingle)).unwrap();
        assert!(session.store().get(1, 3).unwrap().is_empty());
        wire.clear();

        deliver(&session, &resend_request(2, 1, 0));

        let sent = wire.messages();
        assert_eq!(wire.types(), vec!["4"]);
        assert_eq!(sent[0].body().get_u64(tags::NEW_SEQ_NO).unwrap(), 4);
    }

    #[test]
    fn test_chunked_resend_requests() {
        let (session, wire, app, _peer) =
            logged_on_with(|config| config.with_resend_request_chunk_size(2));

        deliver(&session, &stamped(&MsgType::NewOrderSingle, 7));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 2));
        deliver(&session, &stamped(&MsgType::NewOrderSingle, 3));

        let mut gap_fill = stamped(&MsgType::SequenceReset, 4);
        gap_fill.body_mut().set_bool(tags::GAP_FILL_FLAG, true);
        gap_fill.body_mut().set_u64(tags::NEW_SEQ_NO, 6);
        deliver(&session, &gap_fill);
        assert_eq!(session.next_target_seq_num(), 6);

        deliver(&session, &stamped(&MsgType::NewOrderSingle, 6));

        let ranges: Vec<_> = wire
            .of_type(&MsgType::ResendRequest)
            .iter()
            .map(range_of)
            .collect();
        assert_eq!(ranges, vec![(2, 3), (4, 5), (6, 6)]);
        assert!(!session.resend_range().is_pending());
        assert_eq!(session.queued_count(), 0);
        assert_eq!(app.received_seqs(), vec![2, 3, 6, 7]);
        assert_eq!(session.next_target_seq_num(), 8);
    }

    struct Unreadable(MemoryStore);

    impl MessageStore for Unreadable {
        fn set(&self, seq_num: u64, message: &[u8]) -> Result<bool, StoreError> {
            self.0.set(seq_num, message)
        }

        fn get(&self, begin: u64, _end: u64) -> Result<Vec<Bytes>, StoreError> {
            Err(StoreError::RetrieveFailed {
                seq_num: begin,
                reason: "corrupt".to_string(),
            })
        }

        fn next_sender_seq_num(&self) -> u64 {
            self.0.next_sender_seq_num()
        }

        fn next_target_seq_num(&self) -> u64 {
            self.0.next_target_seq_num()
        }

        fn set_next_sender_seq_num(&self, seq: u64) -> Result<(), StoreError> {
            self.0.set_next_sender_seq_num(seq)
        }

        fn set_next_target_seq_num(&self, seq: u64) -> Result<(), StoreError> {
            self.0.set_next_target_seq_num(seq)
        }

        fn reset(&self) -> Result<(), StoreError> {
            self.0.reset()
        }

        fn creation_time(&self) -> SystemTime {
            self.0.creation_time()
        }
    }

    #[test]
    fn test_unreadable_store_fails_the_resend() {
        let (session, wire, _app) =
            session_with_store(Box::new(Unreadable(MemoryStore::new())), |config| config);
        deliver(&session, &logon(1));
        wire.clear();

        let raw = encode(&resend_request(2, 1, 0)).unwrap();
        assert!(session.receive(&raw).is_err());
        assert!(wire.types().is_empty());
    }

    #[test]
    fn test_unreadable_store_is_gap_filled_when_forced() {
        let (session, wire, _app) = session_with_store(
            Box::new(Unreadable(MemoryStore::new())),
            |config| config.with_force_resend_when_corrupted_store(true),
        );
        deliver(&session, &logon(1));
        wire.clear();

        deliver(&session, &resend_request(2, 1, 0));

        let sent = wire.messages();
        assert_eq!(wire.types(), vec!["4"]);
        assert_eq!(sent[0].msg_seq_num().unwrap(), 1);
        assert_eq!(sent[0].body().get_u64(tags::NEW_SEQ_NO).unwrap(), 2);
        assert_eq!(session.next_target_seq_num(), 3);
    }
}
