/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Dictionary-driven message parser.
//!
//! The parser walks the tokenizer through three phases:
//! - **Header**: `8`, `9`, `35` first, then every header-classified tag
//! - **Body**: everything up to the first trailer tag, groups included
//! - **Trailer**: `93`, `89`, `10`
//!
//! Framing problems return [`DecodeError`]. Field-level problems (ordering,
//! duplicates, bad group counts) are recorded on the returned [`Message`] as
//! its parse error so the session can answer them with a Reject.

use crate::checksum::{calculate_checksum, parse_checksum};
use crate::tokenizer::{Token, Tokenizer};
use bytes::Bytes;
use ferrofix_core::convert;
use ferrofix_core::error::{DecodeError, FieldError};
use ferrofix_core::field::Field;
use ferrofix_core::graph::FieldGraph;
use ferrofix_core::message::{Message, is_admin_msg_type};
use ferrofix_core::reject::SessionRejectReason;
use ferrofix_core::tags;
use ferrofix_dictionary::{Dictionary, GroupDef, Layout, ValidationSettings};
use smallvec::SmallVec;
use std::sync::Arc;

const LEADING_TAGS: [u32; 3] = [tags::BEGIN_STRING, tags::BODY_LENGTH, tags::MSG_TYPE];

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserSettings {
    /// Enforces `8`, `9`, `35` as the first three fields.
    pub validate: bool,
    /// Verifies CheckSum against the bytes received.
    pub validate_checksum: bool,
    /// Verifies BodyLength against the bytes received.
    pub validate_body_length: bool,
    /// Field ordering and emptiness checks.
    pub validation: ValidationSettings,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            validate: true,
            validate_checksum: true,
            validate_body_length: false,
            validation: ValidationSettings::default(),
        }
    }
}

impl ParserSettings {
    /// Sets whether the leading header fields are enforced.
    #[must_use]
    pub const fn with_validate(mut self, value: bool) -> Self {
        self.validate = value;
        self
    }

    /// Sets whether CheckSum is verified.
    #[must_use]
    pub const fn with_validate_checksum(mut self, value: bool) -> Self {
        self.validate_checksum = value;
        self
    }

    /// Sets whether BodyLength is verified.
    #[must_use]
    pub const fn with_validate_body_length(mut self, value: bool) -> Self {
        self.validate_body_length = value;
        self
    }

    /// Sets the field-level validation switches.
    #[must_use]
    pub const fn with_validation(mut self, value: ValidationSettings) -> Self {
        self.validation = value;
        self
    }
}

/// Parses raw messages into [`Message`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageParser<'d> {
    session_dictionary: Option<&'d Dictionary>,
    app_dictionary: Option<&'d Dictionary>,
    settings: ParserSettings,
}

struct Cursor<'a> {
    data: Bytes,
    tokens: Tokenizer<'a>,
    pending: Option<Token>,
    lengths: SmallVec<[(u32, usize); 4]>,
    error: Option<FieldError>,
    body_start: usize,
    checksum_start: Option<usize>,
}

impl Cursor<'_> {
    fn fail(&mut self, error: FieldError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn push_back(&mut self, token: Token) {
        self.pending = Some(token);
    }

    fn value(&self, token: &Token) -> Bytes {
        self.data.slice(token.value_range())
    }
}

impl<'d> MessageParser<'d> {
    /// Creates a parser that classifies fields by the standard header and
    /// trailer tag sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a dictionary for header, trailer and administrative messages.
    #[must_use]
    pub const fn with_session_dictionary(mut self, dictionary: &'d Dictionary) -> Self {
        self.session_dictionary = Some(dictionary);
        self
    }

    /// Uses a dictionary for application messages.
    #[must_use]
    pub const fn with_app_dictionary(mut self, dictionary: &'d Dictionary) -> Self {
        self.app_dictionary = Some(dictionary);
        self
    }

    /// Replaces the parser settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: ParserSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    /// Parses a complete message.
    ///
    /// # Arguments
    /// * `input` - One framed message, `8=` through the CheckSum SOH
    ///
    /// # Errors
    /// Returns `DecodeError` when the message cannot be framed. Field-level
    /// problems are recorded on the message instead.
    pub fn parse(&self, input: &[u8]) -> Result<Message, DecodeError> {
        self.parse_bytes(Bytes::copy_from_slice(input))
    }

    /// Parses a complete message held in a shared buffer.
    ///
    /// Field values are slices of `data`.
    ///
    /// # Errors
    /// See [`MessageParser::parse`].
    pub fn parse_bytes(&self, data: Bytes) -> Result<Message, DecodeError> {
        let input = data.clone();
        let mut cursor = Cursor {
            data,
            tokens: Tokenizer::new(&input),
            pending: None,
            lengths: SmallVec::new(),
            error: None,
            body_start: 0,
            checksum_start: None,
        };

        let mut message = Message::new();
        self.parse_header(&mut cursor, &mut message)?;

        let layout = message
            .msg_type()
            .ok()
            .and_then(|msg_type| self.message_layout(msg_type));
        if let Some(layout) = layout {
            *message.body_mut() = FieldGraph::with_order(Arc::clone(layout.order()));
        }
        self.parse_body(&mut cursor, &mut message, layout)?;
        self.parse_trailer(&mut cursor, &mut message)?;

        self.check_framing(&cursor, &message, &input)?;
        if let Some(error) = cursor.error.take() {
            message.set_parse_error(error);
        }
        Ok(message)
    }

    fn parse_header(&self, cursor: &mut Cursor<'_>, message: &mut Message) -> Result<(), DecodeError> {
        let mut position = 0;
        while let Some(token) = self.next(cursor)? {
            let tag = token.tag;
            if self.settings.validate && position < LEADING_TAGS.len() {
                let expected = LEADING_TAGS[position];
                if tag != expected {
                    return Err(DecodeError::HeaderOutOfOrder {
                        position,
                        expected,
                        found: tag,
                    });
                }
            }
            if !self.is_header_tag(tag) {
                cursor.push_back(token);
                break;
            }
            position += 1;
            if tag == tags::BODY_LENGTH && cursor.body_start == 0 {
                cursor.body_start = token.field_end + 1;
            }
            let header_group = self
                .session_dictionary
                .and_then(|dict| dict.header().group_def(tag));
            match header_group {
                Some(def) => self.parse_group(cursor, message.header_mut(), def, token)?,
                None => self.store(cursor, message.header_mut(), &token),
            }
        }
        if self.settings.validate && position < LEADING_TAGS.len() {
            return Err(DecodeError::HeaderOutOfOrder {
                position,
                expected: LEADING_TAGS[position],
                found: 0,
            });
        }
        Ok(())
    }

    fn parse_body(
        &self,
        cursor: &mut Cursor<'_>,
        message: &mut Message,
        layout: Option<&Layout>,
    ) -> Result<(), DecodeError> {
        while let Some(token) = self.next(cursor)? {
            let tag = token.tag;
            if self.is_trailer_tag(tag) {
                cursor.push_back(token);
                break;
            }
            if self.is_header_tag(tag) {
                self.store(cursor, message.header_mut(), &token);
                if self.settings.validation.check_fields_out_of_order {
                    cursor.fail(FieldError::rejected(
                        SessionRejectReason::TagSpecifiedOutOfRequiredOrder,
                        tag,
                    ));
                }
                continue;
            }
            match layout.and_then(|layout| layout.group_def(tag)) {
                Some(def) => self.parse_group(cursor, message.body_mut(), def, token)?,
                None => self.store(cursor, message.body_mut(), &token),
            }
        }
        Ok(())
    }

    fn parse_trailer(&self, cursor: &mut Cursor<'_>, message: &mut Message) -> Result<(), DecodeError> {
        while let Some(token) = self.next(cursor)? {
            let tag = token.tag;
            if tag == tags::CHECK_SUM && cursor.checksum_start.is_none() {
                cursor.checksum_start = Some(token.tag_start);
            }
            if !self.is_trailer_tag(tag) && self.settings.validation.check_fields_out_of_order {
                cursor.fail(FieldError::rejected(
                    SessionRejectReason::TagSpecifiedOutOfRequiredOrder,
                    tag,
                ));
            }
            self.store(cursor, message.trailer_mut(), &token);
        }
        Ok(())
    }

    fn parse_group(
        &self,
        cursor: &mut Cursor<'_>,
        parent: &mut FieldGraph,
        def: &GroupDef,
        count: Token,
    ) -> Result<(), DecodeError> {
        let count_tag = count.tag;
        self.store(cursor, parent, &count);
        if let Err(source) = convert::parse_int(count.value(&cursor.data)) {
            cursor.fail(FieldError::IncorrectDataFormat {
                tag: count_tag,
                source,
            });
            return Ok(());
        }

        let mut current = None;
        let mut last_position = 0;
        while let Some(token) = self.next(cursor)? {
            let tag = token.tag;
            if tag == def.delimiter_tag {
                if let Some(done) = current.take() {
                    parent.attach_group(done);
                }
                let mut instance = def.new_instance();
                self.store(cursor, &mut instance, &token);
                last_position = 0;
                current = Some(instance);
            } else if let Some(position) = def.layout.position(tag) {
                let Some(instance) = current.as_mut() else {
                    return Err(DecodeError::MalformedGroup {
                        count_tag,
                        delimiter_tag: def.delimiter_tag,
                        tag,
                    });
                };
                if position < last_position && self.settings.validation.check_unordered_group_fields {
                    cursor.fail(FieldError::rejected(
                        SessionRejectReason::RepeatingGroupFieldsOutOfOrder,
                        tag,
                    ));
                }
                last_position = position;
                match def.layout.group_def(tag) {
                    Some(nested) => self.parse_group(cursor, instance, nested, token)?,
                    None => self.store(cursor, instance, &token),
                }
            } else {
                cursor.push_back(token);
                break;
            }
        }
        if let Some(done) = current {
            parent.attach_group(done);
        }
        Ok(())
    }

    fn store(&self, cursor: &mut Cursor<'_>, graph: &mut FieldGraph, token: &Token) {
        let tag = token.tag;
        let value = cursor.value(token);
        if self.is_length_tag(tag) {
            let length = convert::parse_int(&value)
                .ok()
                .and_then(|n| usize::try_from(n).ok());
            if let Some(length) = length {
                cursor.lengths.push((tag, length));
            }
        }
        if graph.is_field_set(tag) {
            cursor.fail(FieldError::rejected(
                SessionRejectReason::TagAppearsMoreThanOnce,
                tag,
            ));
            return;
        }
        if let Err(error) = graph.set_field(Field::from_raw(tag, value)) {
            if self.settings.validation.check_fields_have_values {
                cursor.fail(error);
            }
        }
    }

    fn next(&self, cursor: &mut Cursor<'_>) -> Result<Option<Token>, DecodeError> {
        if let Some(token) = cursor.pending.take() {
            return Ok(Some(token));
        }
        let lengths = &cursor.lengths;
        cursor.tokens.next_with(|tag| {
            if !self.is_data_field(tag) {
                return Ok(None);
            }
            let length_tag = tags::data_length_tag(tag);
            lengths
                .iter()
                .rev()
                .find(|(t, _)| *t == length_tag)
                .map(|&(_, length)| Some(length))
                .ok_or(DecodeError::MissingDataLength { tag, length_tag })
        })
    }

    fn check_framing(&self, cursor: &Cursor<'_>, message: &Message, input: &[u8]) -> Result<(), DecodeError> {
        if self.settings.validate_checksum {
            let start = cursor.checksum_start.ok_or(DecodeError::MissingChecksum)?;
            let value = message
                .trailer()
                .get_bytes(tags::CHECK_SUM)
                .map_err(|_| DecodeError::MissingChecksum)?;
            let declared = parse_checksum(value).ok_or_else(|| {
                DecodeError::InvalidChecksumFormat(String::from_utf8_lossy(value).into_owned())
            })?;
            let calculated = calculate_checksum(&input[..start]);
            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }
        if self.settings.validate_body_length {
            let declared = message
                .header()
                .get_u64(tags::BODY_LENGTH)
                .ok()
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0);
            let end = cursor.checksum_start.unwrap_or(input.len());
            let actual = end.saturating_sub(cursor.body_start);
            if declared != actual {
                return Err(DecodeError::BodyLengthMismatch { declared, actual });
            }
        }
        Ok(())
    }

    fn message_layout(&self, msg_type: &str) -> Option<&'d Layout> {
        let app = self.app_dictionary.and_then(|dict| dict.layout(msg_type));
        let session = || self.session_dictionary.and_then(|dict| dict.layout(msg_type));
        if is_admin_msg_type(msg_type) {
            session().or(app)
        } else {
            app.or_else(session)
        }
    }

    fn is_header_tag(&self, tag: u32) -> bool {
        match self.session_dictionary {
            Some(dict) => dict.is_header_field(tag),
            None => tags::is_standard_header_tag(tag),
        }
    }

    fn is_trailer_tag(&self, tag: u32) -> bool {
        match self.session_dictionary {
            Some(dict) => dict.is_trailer_field(tag),
            None => tags::is_standard_trailer_tag(tag),
        }
    }

    fn is_data_field(&self, tag: u32) -> bool {
        match (self.session_dictionary, self.app_dictionary) {
            (Some(session), Some(app)) => session.is_data_field(tag) || app.is_data_field(tag),
            (Some(dict), None) | (None, Some(dict)) => dict.is_data_field(tag),
            (None, None) => matches!(
                tag,
                tags::RAW_DATA | tags::SECURE_DATA | tags::SIGNATURE | tags::XML_DATA
            ),
        }
    }

    fn is_length_tag(&self, tag: u32) -> bool {
        tag == tags::SIGNATURE_LENGTH
            || tag.checked_add(1).is_some_and(|next| self.is_data_field(next))
    }
}

/// Extracts one field's value from a raw message without parsing it.
///
/// Scanning stops at the first malformed field.
#[must_use]
pub fn peek_field(input: &[u8], tag: u32) -> Option<&[u8]> {
    Tokenizer::new(input)
        .map_while(Result::ok)
        .find(|token| token.tag == tag)
        .map(|token| token.value(input))
}

/// Extracts MsgType from a raw message without parsing it.
#[must_use]
pub fn peek_msg_type(input: &[u8]) -> Option<&str> {
    peek_field(input, tags::MSG_TYPE).and_then(|value| std::str::from_utf8(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{body_length, checksum, encode};
    use ferrofix_core::{Group, MsgType};
    use ferrofix_dictionary::{FieldDef, FieldType, MessageCategory, MessageDef, Version};
    use ferrofix_dictionary::session_dictionary;

    fn frame(body: &str) -> Vec<u8> {
        let body = body.replace('|', "\x01");
        let prefix = format!("8=FIX.4.4\x019={}\x01{}", body.len(), body);
        let checksum = calculate_checksum(prefix.as_bytes());
        format!("{prefix}10={checksum:03}\x01").into_bytes()
    }

    fn app_dictionary() -> Dictionary {
        let mut dict = Dictionary::new(Version::Fix44);
        for (tag, name, field_type) in [
            (11, "ClOrdID", FieldType::String),
            (55, "Symbol", FieldType::String),
            (54, "Side", FieldType::Char),
            (447, "PartyIDSource", FieldType::Char),
            (448, "PartyID", FieldType::String),
            (452, "PartyRole", FieldType::Int),
            (453, "NoPartyIDs", FieldType::NumInGroup),
            (802, "NoPartySubIDs", FieldType::NumInGroup),
            (523, "PartySubID", FieldType::String),
            (803, "PartySubIDType", FieldType::Int),
        ] {
            dict.add_field(FieldDef::new(tag, name, field_type));
        }
        let sub = GroupDef::new(802, Layout::new().field(523, false).field(803, false));
        let parties = GroupDef::new(
            453,
            Layout::new()
                .field(448, false)
                .field(447, false)
                .field(452, false)
                .group(sub, false),
        );
        dict.add_message(MessageDef::new(
            "D",
            "NewOrderSingle",
            MessageCategory::App,
            Layout::new()
                .field(11, true)
                .group(parties, false)
                .field(55, true)
                .field(54, true),
        ));
        dict
    }

    #[test]
    fn test_parse_heartbeat() {
        let raw = frame("35=0|34=2|49=A|52=20240115-10:30:00|56=B|");
        let msg = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(msg.msg_type().unwrap(), "0");
        assert_eq!(msg.msg_seq_num().unwrap(), 2);
        assert_eq!(msg.header().get_string(49).unwrap(), "A");
        assert!(msg.trailer().is_field_set(tags::CHECK_SUM));
        assert!(msg.parse_error().is_none());
    }

    #[test]
    fn test_reencode_matches_input() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame("35=D|34=9|49=A|52=20240115-10:30:00|56=B|11=X|453=1|448=P|452=3|55=IBM|54=1|");
        let parser = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app);
        let msg = parser.parse(&raw).unwrap();
        assert_eq!(&encode(&msg).unwrap()[..], &raw[..]);
    }

    #[test]
    fn test_header_out_of_order() {
        let swapped = b"9=5\x018=FIX.4.4\x0135=0\x0110=000\x01";
        assert_eq!(
            MessageParser::new().parse(swapped),
            Err(DecodeError::HeaderOutOfOrder {
                position: 0,
                expected: 8,
                found: 9
            })
        );

        let lenient = MessageParser::new().with_settings(
            ParserSettings::default()
                .with_validate(false)
                .with_validate_checksum(false),
        );
        let msg = lenient.parse(swapped).unwrap();
        assert_eq!(msg.msg_type().unwrap(), "0");
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut raw = frame("35=0|");
        let len = raw.len();
        raw[len - 2] = if raw[len - 2] == b'9' { b'0' } else { raw[len - 2] + 1 };
        assert!(matches!(
            MessageParser::new().parse(&raw),
            Err(DecodeError::ChecksumMismatch { .. })
        ));
        let lenient = MessageParser::new()
            .with_settings(ParserSettings::default().with_validate_checksum(false));
        assert!(lenient.parse(&raw).is_ok());
    }

    #[test]
    fn test_body_length_validation() {
        let raw = String::from_utf8(frame("35=0|")).unwrap();
        let bad = raw.replacen("9=5", "9=6", 1);
        let parser = MessageParser::new().with_settings(
            ParserSettings::default()
                .with_validate_checksum(false)
                .with_validate_body_length(true),
        );
        assert!(parser.parse(raw.as_bytes()).is_ok());
        assert_eq!(
            parser.parse(bad.as_bytes()),
            Err(DecodeError::BodyLengthMismatch {
                declared: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_header_tag_in_body_is_recorded() {
        let raw = frame("35=0|49=A|56=B|58=hi|34=5|");
        let msg = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(msg.msg_seq_num().unwrap(), 5);
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::TagSpecifiedOutOfRequiredOrder,
                34
            ))
        );
    }

    #[test]
    fn test_body_tag_in_trailer_is_recorded() {
        let raw = frame("35=0|93=3|89=abc|58=late|");
        let msg = MessageParser::new()
            .with_settings(ParserSettings::default().with_validate_checksum(false))
            .parse(&raw)
            .unwrap();
        assert_eq!(msg.trailer().get_bytes(tags::SIGNATURE).unwrap(), b"abc");
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::TagSpecifiedOutOfRequiredOrder,
                58
            ))
        );
    }

    #[test]
    fn test_duplicate_tag() {
        let raw = frame("35=0|58=a|58=b|");
        let msg = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(msg.body().get_string(58).unwrap(), "a");
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::TagAppearsMoreThanOnce,
                58
            ))
        );
    }

    #[test]
    fn test_empty_value_recorded() {
        let raw = frame("35=0|58=|");
        let msg = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::TagSpecifiedWithoutAValue,
                58
            ))
        );
    }

    #[test]
    fn test_raw_data_with_embedded_soh() {
        let raw = frame("35=0|95=5|96=a\x01b\x01c|58=t|");
        let msg = MessageParser::new().parse(&raw).unwrap();
        assert_eq!(msg.body().get_bytes(96).unwrap(), b"a\x01b\x01c");
        assert_eq!(msg.body().get_string(58).unwrap(), "t");
    }

    #[test]
    fn test_raw_data_without_length() {
        let raw = frame("35=0|96=abc|");
        assert_eq!(
            MessageParser::new().parse(&raw),
            Err(DecodeError::MissingDataLength {
                tag: 96,
                length_tag: 95
            })
        );
    }

    #[test]
    fn test_nested_groups() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame(
            "35=D|11=X|453=2|448=P1|452=3|802=2|523=S1|523=S2|448=P2|447=D|55=IBM|54=1|",
        );
        let msg = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app)
            .with_settings(ParserSettings::default().with_validate_checksum(false))
            .parse(&raw)
            .unwrap();
        assert!(msg.parse_error().is_none());
        let body = msg.body();
        assert_eq!(body.group_count(453), 2);
        let first = body.group(453, 1).unwrap();
        assert_eq!(first.get_string(448).unwrap(), "P1");
        assert_eq!(first.group_count(802), 2);
        assert_eq!(first.group(802, 2).unwrap().get_string(523).unwrap(), "S2");
        assert_eq!(body.group(453, 2).unwrap().get_string(447).unwrap(), "D");
        assert_eq!(body.get_string(55).unwrap(), "IBM");
    }

    #[test]
    fn test_nested_groups_round_trip() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();

        let mut msg = Message::of_type(&MsgType::NewOrderSingle);
        let header = msg.header_mut();
        header.set_string(tags::BEGIN_STRING, "FIX.4.4").unwrap();
        header.set_string(tags::SENDER_COMP_ID, "A").unwrap();
        header.set_string(tags::TARGET_COMP_ID, "B").unwrap();
        header.set_u64(tags::MSG_SEQ_NUM, 12);
        header.set_string(tags::SENDING_TIME, "20240115-10:30:00.250").unwrap();
        let body = msg.body_mut();
        body.set_string(11, "ORD-7").unwrap();
        body.set_char(54, '2');
        body.set_string(55, "MSFT").unwrap();

        let mut broker = Group::new(453, 448);
        broker.set_string(448, "P1").unwrap();
        broker.set_int(452, 1);
        for (id, kind) in [("S1", 4), ("S2", 9)] {
            let mut sub = Group::new(802, 523);
            sub.set_string(523, id).unwrap();
            sub.set_int(803, kind);
            broker.add_group(sub);
        }
        body.add_group(broker);
        let mut client = Group::new(453, 448);
        client.set_string(448, "P2").unwrap();
        client.set_char(447, 'D');
        client.set_int(452, 3);
        body.add_group(client);

        let encoded = encode(&msg).unwrap();
        let parsed = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app)
            .parse(&encoded)
            .unwrap();

        assert!(parsed.parse_error().is_none());
        assert_eq!(parsed.body(), msg.body());
        assert_eq!(parsed.body().group(453, 1).unwrap().group_count(802), 2);
        assert_eq!(
            parsed
                .body()
                .group(453, 1)
                .unwrap()
                .group(802, 2)
                .unwrap()
                .get_int(803)
                .unwrap(),
            9
        );
        for tag in [8, 35, 34, 49, 52, 56] {
            assert_eq!(parsed.header().field(tag), msg.header().field(tag));
        }
        assert_eq!(
            parsed.header().get_u64(tags::BODY_LENGTH).unwrap() as usize,
            body_length(&msg)
        );
        assert_eq!(
            parsed.trailer().get_string(tags::CHECK_SUM).unwrap(),
            format!("{:03}", checksum(&msg).unwrap())
        );
        assert_eq!(checksum(&parsed).unwrap(), checksum(&msg).unwrap());
    }

    #[test]
    fn test_group_count_kept_as_declared() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame("35=D|11=X|453=3|448=P1|55=IBM|54=1|");
        let msg = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app)
            .parse(&raw)
            .unwrap();
        assert_eq!(msg.body().get_int(453).unwrap(), 3);
        assert_eq!(msg.body().group_count(453), 1);
    }

    #[test]
    fn test_group_member_before_delimiter() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame("35=D|11=X|453=1|452=3|448=P1|55=IBM|54=1|");
        assert_eq!(
            MessageParser::new()
                .with_session_dictionary(&session)
                .with_app_dictionary(&app)
                .parse(&raw),
            Err(DecodeError::MalformedGroup {
                count_tag: 453,
                delimiter_tag: 448,
                tag: 452
            })
        );
    }

    #[test]
    fn test_group_fields_out_of_order() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame("35=D|11=X|453=1|448=P1|452=3|447=D|55=IBM|54=1|");
        let msg = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app)
            .parse(&raw)
            .unwrap();
        assert_eq!(
            msg.parse_error(),
            Some(&FieldError::rejected(
                SessionRejectReason::RepeatingGroupFieldsOutOfOrder,
                447
            ))
        );
    }

    #[test]
    fn test_bad_group_count() {
        let session = session_dictionary(Version::Fix44);
        let app = app_dictionary();
        let raw = frame("35=D|11=X|453=x|55=IBM|54=1|");
        let msg = MessageParser::new()
            .with_session_dictionary(&session)
            .with_app_dictionary(&app)
            .parse(&raw)
            .unwrap();
        assert!(matches!(
            msg.parse_error(),
            Some(FieldError::IncorrectDataFormat { tag: 453, .. })
        ));
    }

    #[test]
    fn test_malformed_framing() {
        assert_eq!(
            MessageParser::new().parse(b"8=FIX.4.4\x019=5\x0135=0"),
            Err(DecodeError::MissingSoh { tag: 35 })
        );
        assert_eq!(
            MessageParser::new().parse(b"8=FIX.4.4\x01"),
            Err(DecodeError::HeaderOutOfOrder {
                position: 1,
                expected: 9,
                found: 0
            })
        );
        assert_eq!(
            MessageParser::new()
                .with_settings(ParserSettings::default().with_validate_checksum(true))
                .parse(b"8=FIX.4.4\x019=5\x0135=0\x01"),
            Err(DecodeError::MissingChecksum)
        );
    }

    #[test]
    fn test_peek() {
        let raw = frame("35=A|34=1|49=A|");
        assert_eq!(peek_msg_type(&raw), Some("A"));
        assert_eq!(peek_field(&raw, 34), Some(&b"1"[..]));
        assert_eq!(peek_field(&raw, 112), None);
        assert_eq!(peek_msg_type(b"garbage"), None);
    }
}
