/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Generation of session-level messages.

use crate::session::Session;
use ferrofix_core::{
    BusinessRejectReason, Message, MsgType, Result, SessionRejectReason, tags,
};
use std::time::Instant;
use tracing::{info, warn};

impl Session {
    /// Sends the initiator's Logon.
    pub(crate) fn generate_logon(&self, now: Instant) -> Result<()> {
        let mut logon = Message::of_type(&MsgType::Logon);
        logon.body_mut().set_u64(tags::ENCRYPT_METHOD, 0);
        logon
            .body_mut()
            .set_u64(tags::HEART_BT_INT, self.config.heartbeat_interval_secs());

        if self.config.refresh_on_logon {
            self.store.refresh()?;
        }
        if self.config.reset_on_logon {
            self.reset_state()?;
        }
        if self.is_reset_needed() {
            logon.body_mut().set_bool(tags::RESET_SEQ_NUM_FLAG, true);
        }
        {
            let mut state = self.state.lock();
            state.heartbeat.on_received(now);
            state.on_logon_sent(now);
        }
        self.send_raw(logon, 0)?;
        Ok(())
    }

    /// Answers a counterparty Logon, echoing HeartBtInt.
    pub(crate) fn generate_logon_response(&self, other: &Message) -> Result<()> {
        let mut logon = Message::of_type(&MsgType::Logon);
        logon.body_mut().set_u64(tags::ENCRYPT_METHOD, 0);
        let interval = other
            .body()
            .get_u64(tags::HEART_BT_INT)
            .unwrap_or_else(|_| self.config.heartbeat_interval_secs());
        logon.body_mut().set_u64(tags::HEART_BT_INT, interval);

        let reset_received = {
            let mut state = self.state.lock();
            state.on_logon_sent(Instant::now());
            state.reset_received
        };
        if reset_received {
            logon.body_mut().set_bool(tags::RESET_SEQ_NUM_FLAG, true);
        }
        self.send_raw(logon, 0)?;
        Ok(())
    }

    /// Sends Logout with optional Text.
    pub(crate) fn generate_logout(&self, text: Option<&str>) -> Result<()> {
        let mut logout = Message::of_type(&MsgType::Logout);
        if let Some(text) = text.filter(|text| !text.is_empty()) {
            logout.body_mut().set_string(tags::TEXT, text)?;
        }
        self.state.lock().on_logout_sent(Instant::now());
        self.send_raw(logout, 0)?;
        info!(session = %self.session_id(), reason = text.unwrap_or_default(), "sent logout");
        Ok(())
    }

    /// Sends Heartbeat, echoing a TestReqID when answering a TestRequest.
    pub(crate) fn generate_heartbeat(&self, test_req_id: Option<&str>) -> Result<()> {
        let mut heartbeat = Message::of_type(&MsgType::Heartbeat);
        if let Some(id) = test_req_id {
            heartbeat.body_mut().set_string(tags::TEST_REQ_ID, id)?;
        }
        self.send_raw(heartbeat, 0)?;
        Ok(())
    }

    pub(crate) fn generate_test_request(&self, test_req_id: &str, now: Instant) -> Result<()> {
        let mut request = Message::of_type(&MsgType::TestRequest);
        request.body_mut().set_string(tags::TEST_REQ_ID, test_req_id)?;
        self.state.lock().heartbeat.on_test_request_sent(now);
        self.send_raw(request, 0)?;
        Ok(())
    }

    /// Sends a session-level Reject for `message`.
    ///
    /// A `tag` of zero means no particular field is at fault.
    pub(crate) fn generate_reject(
        &self,
        message: &Message,
        reason: SessionRejectReason,
        tag: u32,
    ) -> Result<()> {
        let msg_type = message.msg_type().unwrap_or_default();
        let seq = message.msg_seq_num().ok();
        let fix42 = self.is_fix42_or_later();

        let mut reject = Message::of_type(&MsgType::Reject);
        let body = reject.body_mut();
        if let Some(seq) = seq {
            body.set_u64(tags::REF_SEQ_NUM, seq);
        }
        if fix42 {
            if !msg_type.is_empty() {
                body.set_string(tags::REF_MSG_TYPE, msg_type)?;
            }
            body.set_u64(tags::SESSION_REJECT_REASON, u64::from(reason.code()));
        }
        if fix42 && tag > 0 {
            body.set_u64(tags::REF_TAG_ID, u64::from(tag));
            body.set_string(tags::TEXT, reason.text())?;
        } else if tag > 0 {
            body.set_string(tags::TEXT, format!("{} ({tag})", reason.text()))?;
        } else {
            body.set_string(tags::TEXT, reason.text())?;
        }

        let advances = msg_type != MsgType::Logon.as_str()
            && msg_type != MsgType::SequenceReset.as_str();
        self.advance_target_if_expected(seq, advances)?;

        warn!(
            session = %self.session_id(),
            ref_seq_num = seq,
            ref_msg_type = msg_type,
            %reason,
            tag,
            "message rejected"
        );
        self.send_raw(reject, 0)?;
        Ok(())
    }

    /// Sends BusinessMessageReject for an application message.
    pub(crate) fn generate_business_reject(
        &self,
        message: &Message,
        reason: BusinessRejectReason,
        tag: u32,
    ) -> Result<()> {
        let msg_type = message.msg_type().unwrap_or_default();
        let seq = message.msg_seq_num().ok();

        let mut reject = Message::of_type(&MsgType::BusinessMessageReject);
        let body = reject.body_mut();
        body.set_string(tags::REF_MSG_TYPE, msg_type)?;
        if let Some(seq) = seq {
            body.set_u64(tags::REF_SEQ_NUM, seq);
        }
        body.set_u64(tags::BUSINESS_REJECT_REASON, u64::from(reason.code()));
        let text = if tag > 0 {
            format!("{} ({tag})", reason.text())
        } else {
            reason.text().to_owned()
        };
        body.set_string(tags::TEXT, text)?;

        self.advance_target_if_expected(seq, true)?;

        warn!(
            session = %self.session_id(),
            ref_seq_num = seq,
            ref_msg_type = msg_type,
            reason = reason.text(),
            "business message rejected"
        );
        self.send_raw(reject, 0)?;
        Ok(())
    }

    fn advance_target_if_expected(&self, seq: Option<u64>, advances: bool) -> Result<()> {
        let _target = self.target_lock.lock();
        if advances && seq == Some(self.store.next_target_seq_num()) {
            self.store.incr_next_target_seq_num()?;
        }
        Ok(())
    }

    /// A fresh pair of sequence numbers on a resetting session is announced
    /// with ResetSeqNumFlag.
    fn is_reset_needed(&self) -> bool {
        let config = &self.config;
        self.session_id().begin_string() >= "FIX.4.1"
            && (config.reset_on_logon || config.reset_on_logout || config.reset_on_disconnect)
            && self.store.next_sender_seq_num() == 1
            && self.store.next_target_seq_num() == 1
    }
}
