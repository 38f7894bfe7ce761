/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! The standard session-level dictionary.
//!
//! Covers the header, the trailer, every administrative message and, from
//! FIX.4.2 on, BusinessMessageReject. Application messages are added by the
//! caller on top of it.

use crate::schema::{
    Dictionary, FieldDef, FieldType, GroupDef, Layout, MessageCategory, MessageDef, Version,
};
use ferrofix_core::reject::{BusinessRejectReason, SessionRejectReason};
use ferrofix_core::tags;

const HOP_COMP_ID: u32 = 628;
const HOP_SENDING_TIME: u32 = 629;
const HOP_REF_ID: u32 = 630;
const MAX_MESSAGE_SIZE: u32 = 383;
const TEST_MESSAGE_INDICATOR: u32 = 464;

fn add_fields(dict: &mut Dictionary) {
    let plain = [
        (tags::BEGIN_SEQ_NO, "BeginSeqNo", FieldType::SeqNum),
        (tags::BEGIN_STRING, "BeginString", FieldType::String),
        (tags::BODY_LENGTH, "BodyLength", FieldType::Length),
        (tags::CHECK_SUM, "CheckSum", FieldType::String),
        (tags::END_SEQ_NO, "EndSeqNo", FieldType::SeqNum),
        (tags::MSG_SEQ_NUM, "MsgSeqNum", FieldType::SeqNum),
        (tags::MSG_TYPE, "MsgType", FieldType::String),
        (tags::NEW_SEQ_NO, "NewSeqNo", FieldType::SeqNum),
        (tags::POSS_DUP_FLAG, "PossDupFlag", FieldType::Boolean),
        (tags::REF_SEQ_NUM, "RefSeqNum", FieldType::SeqNum),
        (tags::SENDER_COMP_ID, "SenderCompID", FieldType::String),
        (tags::SENDER_SUB_ID, "SenderSubID", FieldType::String),
        (tags::SENDING_TIME, "SendingTime", FieldType::UtcTimestamp),
        (tags::TARGET_COMP_ID, "TargetCompID", FieldType::String),
        (tags::TARGET_SUB_ID, "TargetSubID", FieldType::String),
        (tags::TEXT, "Text", FieldType::String),
        (tags::SIGNATURE, "Signature", FieldType::Data),
        (tags::SECURE_DATA_LEN, "SecureDataLen", FieldType::Length),
        (tags::SECURE_DATA, "SecureData", FieldType::Data),
        (tags::SIGNATURE_LENGTH, "SignatureLength", FieldType::Length),
        (tags::RAW_DATA_LENGTH, "RawDataLength", FieldType::Length),
        (tags::RAW_DATA, "RawData", FieldType::Data),
        (tags::POSS_RESEND, "PossResend", FieldType::Boolean),
        (tags::HEART_BT_INT, "HeartBtInt", FieldType::Int),
        (tags::TEST_REQ_ID, "TestReqID", FieldType::String),
        (tags::ON_BEHALF_OF_COMP_ID, "OnBehalfOfCompID", FieldType::String),
        (tags::ON_BEHALF_OF_SUB_ID, "OnBehalfOfSubID", FieldType::String),
        (tags::ORIG_SENDING_TIME, "OrigSendingTime", FieldType::UtcTimestamp),
        (tags::GAP_FILL_FLAG, "GapFillFlag", FieldType::Boolean),
        (tags::DELIVER_TO_COMP_ID, "DeliverToCompID", FieldType::String),
        (tags::DELIVER_TO_SUB_ID, "DeliverToSubID", FieldType::String),
        (tags::RESET_SEQ_NUM_FLAG, "ResetSeqNumFlag", FieldType::Boolean),
        (tags::SENDER_LOCATION_ID, "SenderLocationID", FieldType::String),
        (tags::TARGET_LOCATION_ID, "TargetLocationID", FieldType::String),
        (tags::ON_BEHALF_OF_LOCATION_ID, "OnBehalfOfLocationID", FieldType::String),
        (tags::DELIVER_TO_LOCATION_ID, "DeliverToLocationID", FieldType::String),
        (tags::XML_DATA_LEN, "XmlDataLen", FieldType::Length),
        (tags::XML_DATA, "XmlData", FieldType::Data),
        (tags::MESSAGE_ENCODING, "MessageEncoding", FieldType::String),
        (tags::LAST_MSG_SEQ_NUM_PROCESSED, "LastMsgSeqNumProcessed", FieldType::SeqNum),
        (tags::REF_TAG_ID, "RefTagID", FieldType::Int),
        (tags::REF_MSG_TYPE, "RefMsgType", FieldType::String),
        (tags::BUSINESS_REJECT_REF_ID, "BusinessRejectRefID", FieldType::String),
        (MAX_MESSAGE_SIZE, "MaxMessageSize", FieldType::Length),
        (tags::NO_MSG_TYPES, "NoMsgTypes", FieldType::NumInGroup),
        (TEST_MESSAGE_INDICATOR, "TestMessageIndicator", FieldType::Boolean),
        (tags::USERNAME, "Username", FieldType::String),
        (tags::PASSWORD, "Password", FieldType::String),
        (tags::NO_HOPS, "NoHops", FieldType::NumInGroup),
        (HOP_COMP_ID, "HopCompID", FieldType::String),
        (HOP_SENDING_TIME, "HopSendingTime", FieldType::UtcTimestamp),
        (HOP_REF_ID, "HopRefID", FieldType::SeqNum),
        (tags::NEXT_EXPECTED_MSG_SEQ_NUM, "NextExpectedMsgSeqNum", FieldType::SeqNum),
        (tags::DEFAULT_APPL_VER_ID, "DefaultApplVerID", FieldType::String),
    ];
    for (tag, name, field_type) in plain {
        dict.add_field(FieldDef::new(tag, name, field_type));
    }

    dict.add_field(
        FieldDef::new(tags::ENCRYPT_METHOD, "EncryptMethod", FieldType::Int)
            .with_value("0", "NONE_OTHER")
            .with_value("1", "PKCS")
            .with_value("2", "DES")
            .with_value("3", "PKCS_DES")
            .with_value("4", "PGP_DES")
            .with_value("5", "PGP_DES_MD5")
            .with_value("6", "PEM_DES_MD5"),
    );
    dict.add_field(
        FieldDef::new(tags::MSG_DIRECTION, "MsgDirection", FieldType::Char)
            .with_value("S", "SEND")
            .with_value("R", "RECEIVE"),
    );

    let session_reasons = (0..=18).chain([99]).filter_map(SessionRejectReason::from_code);
    let session_reason_def = session_reasons.fold(
        FieldDef::new(tags::SESSION_REJECT_REASON, "SessionRejectReason", FieldType::Int),
        |def, reason| def.with_value(reason.code().to_string(), reason.text()),
    );
    dict.add_field(session_reason_def);

    let business_reasons = (0..=18).filter_map(BusinessRejectReason::from_code);
    let business_reason_def = business_reasons.fold(
        FieldDef::new(tags::BUSINESS_REJECT_REASON, "BusinessRejectReason", FieldType::Int),
        |def, reason| def.with_value(reason.code().to_string(), reason.text()),
    );
    dict.add_field(business_reason_def);
}

fn header(version: Version) -> Layout {
    let layout = Layout::new()
        .field(tags::BEGIN_STRING, true)
        .field(tags::BODY_LENGTH, true)
        .field(tags::MSG_TYPE, true)
        .field(tags::SENDER_COMP_ID, true)
        .field(tags::TARGET_COMP_ID, true)
        .field(tags::ON_BEHALF_OF_COMP_ID, false)
        .field(tags::DELIVER_TO_COMP_ID, false)
        .field(tags::SECURE_DATA_LEN, false)
        .field(tags::SECURE_DATA, false)
        .field(tags::MSG_SEQ_NUM, true)
        .field(tags::SENDER_SUB_ID, false)
        .field(tags::SENDER_LOCATION_ID, false)
        .field(tags::TARGET_SUB_ID, false)
        .field(tags::TARGET_LOCATION_ID, false)
        .field(tags::ON_BEHALF_OF_SUB_ID, false)
        .field(tags::ON_BEHALF_OF_LOCATION_ID, false)
        .field(tags::DELIVER_TO_SUB_ID, false)
        .field(tags::DELIVER_TO_LOCATION_ID, false)
        .field(tags::POSS_DUP_FLAG, false)
        .field(tags::POSS_RESEND, false)
        .field(tags::SENDING_TIME, true)
        .field(tags::ORIG_SENDING_TIME, false)
        .field(tags::XML_DATA_LEN, false)
        .field(tags::XML_DATA, false)
        .field(tags::MESSAGE_ENCODING, false)
        .field(tags::LAST_MSG_SEQ_NUM_PROCESSED, false);
    let layout = if version >= Version::Fix43 {
        layout.group(
            GroupDef::new(
                tags::NO_HOPS,
                Layout::new()
                    .field(HOP_COMP_ID, false)
                    .field(HOP_SENDING_TIME, false)
                    .field(HOP_REF_ID, false),
            ),
            false,
        )
    } else {
        layout
    };
    if version.uses_fixt() {
        layout.field(tags::DEFAULT_APPL_VER_ID, false)
    } else {
        layout
    }
}

fn trailer() -> Layout {
    Layout::new()
        .field(tags::SIGNATURE_LENGTH, false)
        .field(tags::SIGNATURE, false)
        .field(tags::CHECK_SUM, true)
}

fn admin(dict: &mut Dictionary, msg_type: &str, name: &str, layout: Layout) {
    dict.add_message(MessageDef::new(
        msg_type,
        name,
        MessageCategory::Admin,
        layout,
    ));
}

/// Builds the session-level dictionary for a protocol version.
#[must_use]
pub fn session_dictionary(version: Version) -> Dictionary {
    let mut dict = Dictionary::new(version);
    add_fields(&mut dict);
    dict.set_header(header(version));
    dict.set_trailer(trailer());

    admin(
        &mut dict,
        "0",
        "Heartbeat",
        Layout::new().field(tags::TEST_REQ_ID, false),
    );
    admin(
        &mut dict,
        "1",
        "TestRequest",
        Layout::new().field(tags::TEST_REQ_ID, true),
    );
    admin(
        &mut dict,
        "2",
        "ResendRequest",
        Layout::new()
            .field(tags::BEGIN_SEQ_NO, true)
            .field(tags::END_SEQ_NO, true),
    );
    admin(
        &mut dict,
        "3",
        "Reject",
        Layout::new()
            .field(tags::REF_SEQ_NUM, true)
            .field(tags::REF_TAG_ID, false)
            .field(tags::REF_MSG_TYPE, false)
            .field(tags::SESSION_REJECT_REASON, false)
            .field(tags::TEXT, false),
    );
    admin(
        &mut dict,
        "4",
        "SequenceReset",
        Layout::new()
            .field(tags::GAP_FILL_FLAG, false)
            .field(tags::NEW_SEQ_NO, true),
    );
    admin(
        &mut dict,
        "5",
        "Logout",
        Layout::new().field(tags::TEXT, false),
    );

    let mut logon = Layout::new()
        .field(tags::ENCRYPT_METHOD, true)
        .field(tags::HEART_BT_INT, true)
        .field(tags::RAW_DATA_LENGTH, false)
        .field(tags::RAW_DATA, false)
        .field(tags::RESET_SEQ_NUM_FLAG, false)
        .field(MAX_MESSAGE_SIZE, false)
        .group(
            GroupDef::new(
                tags::NO_MSG_TYPES,
                Layout::new()
                    .field(tags::REF_MSG_TYPE, false)
                    .field(tags::MSG_DIRECTION, false),
            ),
            false,
        );
    if version >= Version::Fix43 {
        logon = logon
            .field(TEST_MESSAGE_INDICATOR, false)
            .field(tags::USERNAME, false)
            .field(tags::PASSWORD, false);
    }
    if version >= Version::Fix44 {
        logon = logon.field(tags::NEXT_EXPECTED_MSG_SEQ_NUM, false);
    }
    if version.uses_fixt() {
        logon = logon.field(tags::DEFAULT_APPL_VER_ID, true);
    }
    admin(&mut dict, "A", "Logon", logon);

    if version >= Version::Fix42 {
        dict.add_message(MessageDef::new(
            "j",
            "BusinessMessageReject",
            MessageCategory::App,
            Layout::new()
                .field(tags::REF_SEQ_NUM, false)
                .field(tags::REF_MSG_TYPE, true)
                .field(tags::BUSINESS_REJECT_REF_ID, false)
                .field(tags::BUSINESS_REJECT_REASON, true)
                .field(tags::TEXT, false),
        ));
    }
    dict
}
