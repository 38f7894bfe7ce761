/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Tag numbers used by the session layer and the codec.

/// Account.
pub const ACCOUNT: u32 = 1;
/// BeginSeqNo.
pub const BEGIN_SEQ_NO: u32 = 7;
/// BeginString.
pub const BEGIN_STRING: u32 = 8;
/// BodyLength.
pub const BODY_LENGTH: u32 = 9;
/// CheckSum.
pub const CHECK_SUM: u32 = 10;
/// ClOrdID.
pub const CL_ORD_ID: u32 = 11;
/// EndSeqNo.
pub const END_SEQ_NO: u32 = 16;
/// MsgSeqNum.
pub const MSG_SEQ_NUM: u32 = 34;
/// MsgType.
pub const MSG_TYPE: u32 = 35;
/// NewSeqNo.
pub const NEW_SEQ_NO: u32 = 36;
/// PossDupFlag.
pub const POSS_DUP_FLAG: u32 = 43;
/// RefSeqNum.
pub const REF_SEQ_NUM: u32 = 45;
/// SenderCompID.
pub const SENDER_COMP_ID: u32 = 49;
/// SenderSubID.
pub const SENDER_SUB_ID: u32 = 50;
/// SendingTime.
pub const SENDING_TIME: u32 = 52;
/// Symbol.
pub const SYMBOL: u32 = 55;
/// TargetCompID.
pub const TARGET_COMP_ID: u32 = 56;
/// TargetSubID.
pub const TARGET_SUB_ID: u32 = 57;
/// Text.
pub const TEXT: u32 = 58;
/// Signature.
pub const SIGNATURE: u32 = 89;
/// SecureDataLen.
pub const SECURE_DATA_LEN: u32 = 90;
/// SecureData.
pub const SECURE_DATA: u32 = 91;
/// SignatureLength.
pub const SIGNATURE_LENGTH: u32 = 93;
/// RawDataLength.
pub const RAW_DATA_LENGTH: u32 = 95;
/// RawData.
pub const RAW_DATA: u32 = 96;
/// PossResend.
pub const POSS_RESEND: u32 = 97;
/// EncryptMethod.
pub const ENCRYPT_METHOD: u32 = 98;
/// HeartBtInt.
pub const HEART_BT_INT: u32 = 108;
/// TestReqID.
pub const TEST_REQ_ID: u32 = 112;
/// OnBehalfOfCompID.
pub const ON_BEHALF_OF_COMP_ID: u32 = 115;
/// OnBehalfOfSubID.
pub const ON_BEHALF_OF_SUB_ID: u32 = 116;
/// DeliverToCompID.
pub const DELIVER_TO_COMP_ID: u32 = 128;
/// DeliverToSubID.
pub const DELIVER_TO_SUB_ID: u32 = 129;
/// OnBehalfOfLocationID.
pub const ON_BEHALF_OF_LOCATION_ID: u32 = 144;
/// DeliverToLocationID.
pub const DELIVER_TO_LOCATION_ID: u32 = 145;
/// MessageEncoding.
pub const MESSAGE_ENCODING: u32 = 347;
/// NoHops.
pub const NO_HOPS: u32 = 627;
/// OrigSendingTime.
pub const ORIG_SENDING_TIME: u32 = 122;
/// GapFillFlag.
pub const GAP_FILL_FLAG: u32 = 123;
/// ResetSeqNumFlag.
pub const RESET_SEQ_NUM_FLAG: u32 = 141;
/// SenderLocationID.
pub const SENDER_LOCATION_ID: u32 = 142;
/// TargetLocationID.
pub const TARGET_LOCATION_ID: u32 = 143;
/// XmlDataLen.
pub const XML_DATA_LEN: u32 = 212;
/// XmlData.
pub const XML_DATA: u32 = 213;
/// RefTagID.
pub const REF_TAG_ID: u32 = 371;
/// RefMsgType.
pub const REF_MSG_TYPE: u32 = 372;
/// SessionRejectReason.
pub const SESSION_REJECT_REASON: u32 = 373;
/// BusinessRejectRefID.
pub const BUSINESS_REJECT_REF_ID: u32 = 379;
/// BusinessRejectReason.
pub const BUSINESS_REJECT_REASON: u32 = 380;
/// NoMsgTypes.
pub const NO_MSG_TYPES: u32 = 384;
/// MsgDirection.
pub const MSG_DIRECTION: u32 = 385;
/// LastMsgSeqNumProcessed.
pub const LAST_MSG_SEQ_NUM_PROCESSED: u32 = 369;
/// NextExpectedMsgSeqNum.
pub const NEXT_EXPECTED_MSG_SEQ_NUM: u32 = 789;
/// Username.
pub const USERNAME: u32 = 553;
/// Password.
pub const PASSWORD: u32 = 554;
/// DefaultApplVerID.
pub const DEFAULT_APPL_VER_ID: u32 = 1137;

/// Lowest tag number reserved for user-defined fields.
pub const USER_DEFINED_TAG_MIN: u32 = 5000;

/// Returns the companion length tag of a raw data field.
///
/// Data fields carry their byte length in the preceding tag, except
/// Signature (89) whose length lives in SignatureLength (93).
#[inline]
#[must_use]
pub const fn data_length_tag(tag: u32) -> u32 {
    if tag == SIGNATURE {
        SIGNATURE_LENGTH
    } else {
        tag - 1
    }
}

/// Returns true for the tags that make up the standard message header.
#[must_use]
pub const fn is_standard_header_tag(tag: u32) -> bool {
    matches!(
        tag,
        BEGIN_STRING
            | BODY_LENGTH
            | MSG_TYPE
            | SENDER_COMP_ID
            | TARGET_COMP_ID
            | ON_BEHALF_OF_COMP_ID
            | DELIVER_TO_COMP_ID
            | SECURE_DATA_LEN
            | SECURE_DATA
            | MSG_SEQ_NUM
            | SENDER_SUB_ID
            | SENDER_LOCATION_ID
            | TARGET_SUB_ID
            | TARGET_LOCATION_ID
            | POSS_DUP_FLAG
            | POSS_RESEND
            | SENDING_TIME
            | ORIG_SENDING_TIME
            | XML_DATA_LEN
            | XML_DATA
            | LAST_MSG_SEQ_NUM_PROCESSED
            | ON_BEHALF_OF_SUB_ID
            | DELIVER_TO_SUB_ID
            | ON_BEHALF_OF_LOCATION_ID
            | DELIVER_TO_LOCATION_ID
            | MESSAGE_ENCODING
            | NO_HOPS
            | DEFAULT_APPL_VER_ID
    )
}

/// Returns true for the tags that make up the standard message trailer.
#[must_use]
pub const fn is_standard_trailer_tag(tag: u32) -> bool {
    matches!(tag, SIGNATURE_LENGTH | SIGNATURE | CHECK_SUM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_length_tag() {
        assert_eq!(data_length_tag(RAW_DATA), RAW_DATA_LENGTH);
        assert_eq!(data_length_tag(SECURE_DATA), SECURE_DATA_LEN);
        assert_eq!(data_length_tag(SIGNATURE), SIGNATURE_LENGTH);
    }

    #[test]
    fn test_standard_header_trailer_tags() {
        assert!(is_standard_header_tag(MSG_SEQ_NUM));
        assert!(!is_standard_header_tag(TEXT));
        assert!(is_standard_trailer_tag(CHECK_SUM));
        assert!(!is_standard_trailer_tag(MSG_TYPE));
    }
}
