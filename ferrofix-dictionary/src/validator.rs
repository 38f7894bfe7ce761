/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Message validation against a [`Dictionary`].
//!
//! [`Validator::violations`] reports every problem found in a message;
//! [`Validator::validate`] stops at the first one. A parse error recorded on
//! the message is always reported before anything else.

use crate::schema::{Dictionary, FieldType, Layout};
use ferrofix_core::convert;
use ferrofix_core::error::{ConversionError, FieldError};
use ferrofix_core::graph::FieldGraph;
use ferrofix_core::message::Message;
use ferrofix_core::reject::SessionRejectReason;
use ferrofix_core::tags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strictness switches for parsing and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Header, body and trailer fields must appear in their own section.
    pub check_fields_out_of_order: bool,
    /// Empty values are reported as `TagSpecifiedWithoutAValue`.
    pub check_fields_have_values: bool,
    /// User-defined tags are subject to the tag checks.
    pub check_user_defined_fields: bool,
    /// Group members must follow the declared order.
    pub check_unordered_group_fields: bool,
    /// Known tags not declared for the message type are accepted.
    pub allow_unknown_message_fields: bool,
    /// Lowest tag number treated as user-defined.
    pub user_defined_tag_min: u32,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            check_fields_out_of_order: true,
            check_fields_have_values: true,
            check_user_defined_fields: true,
            check_unordered_group_fields: true,
            allow_unknown_message_fields: false,
            user_defined_tag_min: tags::USER_DEFINED_TAG_MIN,
        }
    }
}

impl ValidationSettings {
    /// Sets whether fields must appear in their own section.
    #[must_use]
    pub const fn with_check_fields_out_of_order(mut self, value: bool) -> Self {
        self.check_fields_out_of_order = value;
        self
    }

    /// Sets whether empty values are reported.
    #[must_use]
    pub const fn with_check_fields_have_values(mut self, value: bool) -> Self {
        self.check_fields_have_values = value;
        self
    }

    /// Sets whether user-defined tags are checked.
    #[must_use]
    pub const fn with_check_user_defined_fields(mut self, value: bool) -> Self {
        self.check_user_defined_fields = value;
        self
    }

    /// Sets whether group member order is checked.
    #[must_use]
    pub const fn with_check_unordered_group_fields(mut self, value: bool) -> Self {
        self.check_unordered_group_fields = value;
        self
    }

    /// Sets whether undeclared known tags are accepted.
    #[must_use]
    pub const fn with_allow_unknown_message_fields(mut self, value: bool) -> Self {
        self.allow_unknown_message_fields = value;
        self
    }

    /// Sets the lowest user-defined tag number.
    #[must_use]
    pub const fn with_user_defined_tag_min(mut self, value: u32) -> Self {
        self.user_defined_tag_min = value;
        self
    }

    /// Returns true when tag-level checks apply to `tag`.
    #[inline]
    #[must_use]
    pub const fn should_check_tag(&self, tag: u32) -> bool {
        self.check_user_defined_fields || tag < self.user_defined_tag_min
    }
}

/// Outcome of a failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The message was written for another protocol version.
    #[error("unsupported version: expected {expected}, received {received}")]
    UnsupportedVersion {
        /// The dictionary's BeginString.
        expected: String,
        /// The message's BeginString.
        received: String,
    },

    /// A field-level violation.
    #[error(transparent)]
    Field(#[from] FieldError),
}

#[derive(Clone, Copy)]
enum Section<'d> {
    Header,
    Trailer,
    Body(&'d Layout),
}

/// Validates messages against a dictionary.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'d> {
    dictionary: &'d Dictionary,
    settings: ValidationSettings,
}

impl<'d> Validator<'d> {
    /// Creates a validator.
    ///
    /// # Arguments
    /// * `dictionary` - Dictionary describing the expected messages
    /// * `settings` - Strictness switches
    #[must_use]
    pub const fn new(dictionary: &'d Dictionary, settings: ValidationSettings) -> Self {
        Self {
            dictionary,
            settings,
        }
    }

    /// Returns the settings in use.
    #[must_use]
    pub const fn settings(&self) -> &ValidationSettings {
        &self.settings
    }

    /// Validates a message, stopping at the first problem.
    ///
    /// # Errors
    /// Returns the deferred parse error, a version mismatch, or the first
    /// field-level violation.
    pub fn validate(&self, message: &Message) -> Result<(), ValidationError> {
        if let Some(error) = message.parse_error() {
            return Err(error.clone().into());
        }
        if let Ok(received) = message.begin_string() {
            let expected = self.dictionary.begin_string();
            if received != expected {
                return Err(ValidationError::UnsupportedVersion {
                    expected: expected.to_string(),
                    received: received.to_string(),
                });
            }
        }
        match self.violations(message).into_iter().next() {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// Collects every field-level violation in a message.
    #[must_use]
    pub fn violations(&self, message: &Message) -> Vec<FieldError> {
        let mut found = Vec::new();
        if let Some(error) = message.parse_error() {
            found.push(error.clone());
        }

        let layout = match message.msg_type() {
            Ok(msg_type) => {
                let layout = self.dictionary.layout(msg_type);
                if layout.is_none() {
                    found.push(FieldError::rejected(
                        SessionRejectReason::InvalidMsgType,
                        tags::MSG_TYPE,
                    ));
                }
                layout
            }
            Err(error) => {
                found.push(error);
                None
            }
        };

        let header = self.dictionary.header();
        let trailer = self.dictionary.trailer();
        self.check_graph(message.header(), header, Section::Header, &mut found);
        self.check_graph(message.trailer(), trailer, Section::Trailer, &mut found);
        if let Some(body) = layout {
            self.check_graph(message.body(), body, Section::Body(body), &mut found);
        }

        self.check_required(message.header(), header, &mut found);
        if let Some(body) = layout {
            self.check_required(message.body(), body, &mut found);
        }
        self.check_required(message.trailer(), trailer, &mut found);
        found
    }

    fn check_required(&self, graph: &FieldGraph, layout: &Layout, found: &mut Vec<FieldError>) {
        for tag in layout.required_tags() {
            if self.settings.should_check_tag(tag) && !graph.is_field_set(tag) {
                found.push(FieldError::rejected(
                    SessionRejectReason::RequiredTagMissing,
                    tag,
                ));
            }
        }
        for count_tag in graph.group_tags() {
            if let Some(def) = layout.group_def(count_tag) {
                for instance in graph.groups(count_tag) {
                    self.check_required(instance, &def.layout, found);
                }
            }
        }
    }

    fn check_graph(
        &self,
        graph: &FieldGraph,
        layout: &Layout,
        section: Section<'_>,
        found: &mut Vec<FieldError>,
    ) {
        for field in graph.fields() {
            let tag = field.tag();
            if self.settings.check_fields_have_values && field.is_empty() {
                found.push(FieldError::rejected(
                    SessionRejectReason::TagSpecifiedWithoutAValue,
                    tag,
                ));
                continue;
            }
            if let Some(def) = self.dictionary.get_field(tag) {
                if let Err(source) = check_format(def.field_type, field.raw()) {
                    found.push(FieldError::IncorrectDataFormat { tag, source });
                    continue;
                }
                let value_ok = field
                    .as_str()
                    .map_or(true, |value| def.is_valid_value(value));
                if !value_ok {
                    found.push(FieldError::rejected(
                        SessionRejectReason::ValueIsIncorrect,
                        tag,
                    ));
                }
            }

            if !self.settings.should_check_tag(tag) {
                continue;
            }
            if !self.dictionary.is_valid_tag(tag) {
                found.push(FieldError::rejected(
                    SessionRejectReason::InvalidTagNumber,
                    tag,
                ));
                continue;
            }
            if let Section::Body(_) = section {
                if !layout.contains(tag) && !self.settings.allow_unknown_message_fields {
                    found.push(FieldError::rejected(
                        SessionRejectReason::TagNotDefinedForThisMessageType,
                        tag,
                    ));
                }
            }
            if layout.is_group(tag) {
                match field.to_int() {
                    Ok(declared) if declared == graph.group_count(tag) as i64 => {}
                    Ok(_) => found.push(FieldError::rejected(
                        SessionRejectReason::IncorrectNumInGroupCountForRepeatingGroup,
                        tag,
                    )),
                    Err(error) => found.push(error),
                }
            }
        }

        for count_tag in graph.group_tags() {
            let Some(def) = layout.group_def(count_tag) else {
                continue;
            };
            for instance in graph.groups(count_tag) {
                self.check_graph(instance, &def.layout, Section::Body(&def.layout), found);
            }
        }
    }
}

/// Checks that raw text is well formed for a field type.
///
/// # Errors
/// Returns the conversion failure for malformed text.
pub fn check_format(field_type: FieldType, raw: &[u8]) -> Result<(), ConversionError> {
    match field_type {
        t if t.is_integer() => convert::parse_int(raw).map(drop),
        t if t.is_decimal() => convert::parse_decimal(raw).map(drop),
        FieldType::Char => convert::parse_char(raw).map(drop),
        FieldType::Boolean => convert::parse_bool(raw).map(drop),
        FieldType::UtcTimestamp => convert::parse_utc_timestamp(raw).map(drop),
        FieldType::UtcTimeOnly => convert::parse_utc_time_only(raw).map(drop),
        FieldType::UtcDateOnly | FieldType::LocalMktDate => convert::parse_utc_date(raw).map(drop),
        _ => Ok(()),
    }
}
