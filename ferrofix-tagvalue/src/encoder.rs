/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! FIX message encoder.
//!
//! [`Encoder`] appends `tag=value<SOH>` fields and frames them with
//! BeginString, BodyLength and CheckSum. [`encode`] writes a whole
//! [`Message`]: `8`, `9` and `35` first, `10` last, every group right after
//! its count field.

use crate::checksum::{calculate_checksum, format_checksum};
use bytes::{BufMut, Bytes, BytesMut};
use ferrofix_core::error::EncodeError;
use ferrofix_core::field::Field;
use ferrofix_core::graph::FieldGraph;
use ferrofix_core::message::Message;
use ferrofix_core::tags;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

const FRAMING_TAGS: [u32; 4] = [
    tags::BEGIN_STRING,
    tags::BODY_LENGTH,
    tags::MSG_TYPE,
    tags::CHECK_SUM,
];

/// FIX message encoder.
///
/// The encoder builds FIX messages by appending fields in tag=value format.
/// It handles BeginString, BodyLength, and Checksum fields automatically.
#[derive(Debug)]
pub struct Encoder {
    /// Buffer for the message body (between BodyLength and Checksum).
    body: BytesMut,
    /// The BeginString value (e.g., "FIX.4.4").
    begin_string: Bytes,
}

impl Encoder {
    /// Creates a new encoder with the specified BeginString.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string (e.g., "FIX.4.4")
    #[must_use]
    pub fn new(begin_string: impl Into<Bytes>) -> Self {
        Self::with_capacity(begin_string, 256)
    }

    /// Creates a new encoder with pre-allocated capacity.
    ///
    /// # Arguments
    /// * `begin_string` - The FIX version string
    /// * `capacity` - Initial buffer capacity in bytes
    #[must_use]
    pub fn with_capacity(begin_string: impl Into<Bytes>, capacity: usize) -> Self {
        Self {
            body: BytesMut::with_capacity(capacity),
            begin_string: begin_string.into(),
        }
    }

    /// Appends a field with raw bytes.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `value` - The field value bytes
    #[inline]
    pub fn put_raw(&mut self, tag: u32, value: &[u8]) {
        let mut tag_buf = itoa::Buffer::new();
        let tag_str = tag_buf.format(tag);

        self.body.put_slice(tag_str.as_bytes());
        self.body.put_u8(b'=');
        self.body.put_slice(value);
        self.body.put_u8(SOH);
    }

    /// Appends a field as it was stored.
    #[inline]
    pub fn put_field(&mut self, field: &Field) {
        self.put_raw(field.tag(), field.raw());
    }

    /// Appends every field of a graph except `skip`, each group right after
    /// its count field.
    pub fn put_graph(&mut self, graph: &FieldGraph, skip: &[u32]) {
        for field in graph.fields() {
            if skip.contains(&field.tag()) {
                continue;
            }
            self.put_field(field);
            for instance in graph.groups(field.tag()) {
                self.put_graph(instance, &[]);
            }
        }
    }

    /// Finalizes the message and returns the complete encoded bytes.
    ///
    /// Prepends BeginString (8) and BodyLength (9), then appends CheckSum (10).
    #[must_use]
    pub fn finish(self) -> BytesMut {
        let body_len = self.body.len();
        let mut len_buf = itoa::Buffer::new();
        let len_str = len_buf.format(body_len);

        let mut message =
            BytesMut::with_capacity(self.begin_string.len() + len_str.len() + body_len + 14);
        message.put_slice(b"8=");
        message.put_slice(&self.begin_string);
        message.put_u8(SOH);
        message.put_slice(b"9=");
        message.put_slice(len_str.as_bytes());
        message.put_u8(SOH);
        message.put_slice(&self.body);

        let checksum = calculate_checksum(&message);
        message.put_slice(b"10=");
        message.put_slice(&format_checksum(checksum));
        message.put_u8(SOH);

        message
    }
}

fn framing(message: &Message) -> Result<(&Field, &Field), EncodeError> {
    let header = message.header();
    let begin_string = header
        .field(tags::BEGIN_STRING)
        .ok_or(EncodeError::MissingRequiredField {
            tag: tags::BEGIN_STRING,
        })?;
    let msg_type = header
        .field(tags::MSG_TYPE)
        .ok_or(EncodeError::MissingRequiredField {
            tag: tags::MSG_TYPE,
        })?;
    Ok((begin_string, msg_type))
}

/// Encodes a message to its wire form.
///
/// BodyLength and CheckSum are computed; any stored values are ignored.
///
/// # Errors
/// Returns `EncodeError::MissingRequiredField` when BeginString or MsgType
/// is not set.
pub fn encode(message: &Message) -> Result<BytesMut, EncodeError> {
    let (begin_string, msg_type) = framing(message)?;
    let mut encoder = Encoder::new(begin_string.raw_bytes());
    encoder.put_field(msg_type);
    encoder.put_graph(message.header(), &FRAMING_TAGS);
    encoder.put_graph(message.body(), &[]);
    encoder.put_graph(message.trailer(), &FRAMING_TAGS);
    Ok(encoder.finish())
}

fn graph_metric(graph: &FieldGraph, skip: &[u32], metric: &impl Fn(&Field) -> u32) -> u32 {
    graph
        .fields()
        .filter(|field| !skip.contains(&field.tag()))
        .map(|field| {
            let nested: u32 = graph
                .groups(field.tag())
                .iter()
                .map(|instance| graph_metric(instance, &[], metric))
                .sum();
            metric(field) + nested
        })
        .sum()
}

fn body_metric(message: &Message, metric: impl Fn(&Field) -> u32) -> u32 {
    message.header().field(tags::MSG_TYPE).map_or(0, &metric)
        + graph_metric(message.header(), &FRAMING_TAGS, &metric)
        + graph_metric(message.body(), &[], &metric)
        + graph_metric(message.trailer(), &FRAMING_TAGS, &metric)
}

/// Returns the BodyLength the encoder would write for a message.
///
/// Counts every byte after BodyLength up to, not including, CheckSum.
#[must_use]
pub fn body_length(message: &Message) -> usize {
    body_metric(message, |field| field.encoded_len() as u32) as usize
}

/// Returns the CheckSum the encoder would write for a message.
///
/// # Errors
/// Returns `EncodeError::MissingRequiredField` when BeginString or MsgType
/// is not set.
pub fn checksum(message: &Message) -> Result<u8, EncodeError> {
    let (begin_string, _) = framing(message)?;
    let length = body_length(message);
    let mut len_buf = itoa::Buffer::new();
    let prefix: u32 = b"8=\x019=\x01"
        .iter()
        .chain(begin_string.raw())
        .chain(len_buf.format(length).as_bytes())
        .map(|&b| u32::from(b))
        .sum();
    let total = prefix + body_metric(message, Field::byte_sum);
    Ok((total % 256) as u8)
}
