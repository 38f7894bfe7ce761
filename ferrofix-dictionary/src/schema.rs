/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Schema definitions for FIX dictionaries.
//!
//! This module defines the structures that represent FIX protocol specifications:
//! - [`FieldDef`]: Field definitions with tag, name, type and enumerated values
//! - [`Layout`]: Ordered members of a message, component or group
//! - [`GroupDef`]: Repeating group definitions
//! - [`ComponentDef`]: Reusable component definitions
//! - [`MessageDef`]: Message definitions
//! - [`Dictionary`]: Complete FIX version dictionary
//!
//! Dictionaries are built programmatically. Components are flattened into the
//! layout that uses them, so lookups never have to resolve names.

use ferrofix_core::graph::{FieldOrder, Group};
use ferrofix_core::tags;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// FIX protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Version {
    /// FIX 4.0
    Fix40,
    /// FIX 4.1
    Fix41,
    /// FIX 4.2
    Fix42,
    /// FIX 4.3
    Fix43,
    /// FIX 4.4
    Fix44,
    /// FIXT 1.1 (transport layer for FIX 5.0+)
    Fixt11,
}

impl Version {
    /// Returns the BeginString value for this version.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix40 => "FIX.4.0",
            Self::Fix41 => "FIX.4.1",
            Self::Fix42 => "FIX.4.2",
            Self::Fix43 => "FIX.4.3",
            Self::Fix44 => "FIX.4.4",
            Self::Fixt11 => "FIXT.1.1",
        }
    }

    /// Looks up a version by its BeginString.
    #[must_use]
    pub fn from_begin_string(begin_string: &str) -> Option<Self> {
        match begin_string {
            "FIX.4.0" => Some(Self::Fix40),
            "FIX.4.1" => Some(Self::Fix41),
            "FIX.4.2" => Some(Self::Fix42),
            "FIX.4.3" => Some(Self::Fix43),
            "FIX.4.4" => Some(Self::Fix44),
            "FIXT.1.1" => Some(Self::Fixt11),
            _ => None,
        }
    }

    /// Returns true if this version uses FIXT transport.
    #[must_use]
    pub const fn uses_fixt(&self) -> bool {
        matches!(self, Self::Fixt11)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.begin_string())
    }
}

/// FIX field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer value.
    Int,
    /// Length field (for data fields).
    Length,
    /// Sequence number.
    SeqNum,
    /// Number of entries in a repeating group.
    NumInGroup,
    /// Tag number reference.
    TagNum,
    /// Day of month (1-31).
    DayOfMonth,
    /// Floating point number.
    Float,
    /// Quantity.
    Qty,
    /// Price.
    Price,
    /// Price offset.
    PriceOffset,
    /// Amount (price * quantity).
    Amt,
    /// Percentage.
    Percentage,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// String.
    String,
    /// Multiple character value (space-separated).
    MultipleCharValue,
    /// Multiple string value (space-separated).
    MultipleStringValue,
    /// Multiple value string, pre-4.4 name (space-separated).
    MultipleValueString,
    /// Country code (ISO 3166).
    Country,
    /// Currency code (ISO 4217).
    Currency,
    /// Exchange code (ISO 10383 MIC).
    Exchange,
    /// Month-year (YYYYMM or YYYYMMDD or YYYYMMWW).
    MonthYear,
    /// UTC timestamp.
    UtcTimestamp,
    /// UTC time only.
    UtcTimeOnly,
    /// UTC date only.
    UtcDateOnly,
    /// Local market date.
    LocalMktDate,
    /// Local market time.
    LocalMktTime,
    /// Timezone.
    TzTimeOnly,
    /// Timezone with timestamp.
    TzTimestamp,
    /// Raw data (binary).
    Data,
    /// XML data.
    XmlData,
    /// Language code (ISO 639-1).
    Language,
}

impl FieldType {
    /// Returns true if this type represents an integer value.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Length
                | Self::SeqNum
                | Self::NumInGroup
                | Self::TagNum
                | Self::DayOfMonth
        )
    }

    /// Returns true if this type represents a decimal value.
    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(
            self,
            Self::Float | Self::Qty | Self::Price | Self::PriceOffset | Self::Amt | Self::Percentage
        )
    }

    /// Returns true if values hold several space-separated tokens.
    #[must_use]
    pub const fn is_multi_value(&self) -> bool {
        matches!(
            self,
            Self::MultipleCharValue | Self::MultipleStringValue | Self::MultipleValueString
        )
    }

    /// Returns true if this type is carried as length-prefixed raw bytes.
    #[must_use]
    pub const fn is_data(&self) -> bool {
        matches!(self, Self::Data | Self::XmlData)
    }
}

impl std::str::FromStr for FieldType {
    type Err = std::convert::Infallible;

    /// Creates a FieldType from a string name.
    ///
    /// # Arguments
    /// * `s` - The type name from the FIX dictionary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INT" => Self::Int,
            "LENGTH" => Self::Length,
            "SEQNUM" => Self::SeqNum,
            "NUMINGROUP" => Self::NumInGroup,
            "TAGNUM" => Self::TagNum,
            "DAYOFMONTH" => Self::DayOfMonth,
            "FLOAT" => Self::Float,
            "QTY" | "QUANTITY" => Self::Qty,
            "PRICE" => Self::Price,
            "PRICEOFFSET" => Self::PriceOffset,
            "AMT" | "AMOUNT" => Self::Amt,
            "PERCENTAGE" => Self::Percentage,
            "CHAR" => Self::Char,
            "BOOLEAN" => Self::Boolean,
            "MULTIPLECHARVALUE" => Self::MultipleCharValue,
            "MULTIPLESTRINGVALUE" => Self::MultipleStringValue,
            "MULTIPLEVALUESTRING" => Self::MultipleValueString,
            "COUNTRY" => Self::Country,
            "CURRENCY" => Self::Currency,
            "EXCHANGE" => Self::Exchange,
            "MONTHYEAR" => Self::MonthYear,
            "UTCTIMESTAMP" => Self::UtcTimestamp,
            "UTCTIMEONLY" => Self::UtcTimeOnly,
            "UTCDATEONLY" | "UTCDATE" => Self::UtcDateOnly,
            "LOCALMKTDATE" => Self::LocalMktDate,
            "LOCALMKTTIME" => Self::LocalMktTime,
            "TZTIMEONLY" => Self::TzTimeOnly,
            "TZTIMESTAMP" => Self::TzTimestamp,
            "DATA" => Self::Data,
            "XMLDATA" => Self::XmlData,
            "LANGUAGE" => Self::Language,
            _ => Self::String,
        })
    }
}

/// Definition of a FIX field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Enumerated values mapped to their descriptions.
    pub values: BTreeMap<String, String>,
    /// Whether values outside the enumeration are accepted.
    pub allow_other_values: bool,
}

impl FieldDef {
    /// Creates a new field definition.
    ///
    /// # Arguments
    /// * `tag` - The field tag number
    /// * `name` - The field name
    /// * `field_type` - The field data type
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            tag,
            name: name.into(),
            field_type,
            values: BTreeMap::new(),
            allow_other_values: false,
        }
    }

    /// Adds an enumerated value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>, description: impl Into<String>) -> Self {
        self.values.insert(value.into(), description.into());
        self
    }

    /// Accepts values outside the enumeration.
    #[must_use]
    pub fn with_other_values(mut self) -> Self {
        self.allow_other_values = true;
        self
    }

    /// Returns true when the field has an enumeration.
    #[must_use]
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Returns true if `value` satisfies the enumeration.
    ///
    /// Multiple-value types check every space-separated token.
    #[must_use]
    pub fn is_valid_value(&self, value: &str) -> bool {
        if self.values.is_empty() || self.allow_other_values {
            return true;
        }
        if self.field_type.is_multi_value() {
            value
                .split(' ')
                .filter(|token| !token.is_empty())
                .all(|token| self.values.contains_key(token))
        } else {
            self.values.contains_key(value)
        }
    }
}

/// A member of a [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    /// A plain field.
    Field {
        /// Field tag number.
        tag: u32,
        /// Whether the field is required.
        required: bool,
    },
    /// A repeating group, keyed by its count tag.
    Group {
        /// The group definition.
        def: GroupDef,
        /// Whether the group is required.
        required: bool,
    },
}

impl Member {
    /// Returns the tag this member occupies (the count tag for groups).
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Self::Field { tag, .. } => *tag,
            Self::Group { def, .. } => def.count_tag,
        }
    }

    /// Returns whether the member is required.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self {
            Self::Field { required, .. } | Self::Group { required, .. } => *required,
        }
    }
}

/// Ordered members of a message, component, group, header or trailer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Member>", into = "Vec<Member>")]
pub struct Layout {
    members: Vec<Member>,
    positions: HashMap<u32, usize>,
    order: Arc<FieldOrder>,
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Layout {}

impl From<Vec<Member>> for Layout {
    fn from(members: Vec<Member>) -> Self {
        members.into_iter().fold(Self::new(), Self::push)
    }
}

impl From<Layout> for Vec<Member> {
    fn from(layout: Layout) -> Self {
        layout.members
    }
}

impl Layout {
    /// Creates an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, member: Member) -> Self {
        let tag = member.tag();
        if self.positions.contains_key(&tag) {
            return self;
        }
        self.positions.insert(tag, self.members.len());
        self.members.push(member);
        self.order = Arc::new(FieldOrder::new(self.members.iter().map(Member::tag)));
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(self, tag: u32, required: bool) -> Self {
        self.push(Member::Field { tag, required })
    }

    /// Appends a repeating group.
    #[must_use]
    pub fn group(self, def: GroupDef, required: bool) -> Self {
        self.push(Member::Group { def, required })
    }

    /// Appends every member of a component.
    ///
    /// Members stay required only when the component itself is required.
    #[must_use]
    pub fn component(self, component: &ComponentDef, required: bool) -> Self {
        component
            .layout
            .members
            .iter()
            .cloned()
            .fold(self, |layout, member| {
                layout.push(match member {
                    Member::Field { tag, required: r } => Member::Field {
                        tag,
                        required: r && required,
                    },
                    Member::Group { def, required: r } => Member::Group {
                        def,
                        required: r && required,
                    },
                })
            })
    }

    /// Returns the members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns the shared field ordering of this layout.
    #[must_use]
    pub fn order(&self) -> &Arc<FieldOrder> {
        &self.order
    }

    /// Returns the first declared tag.
    #[must_use]
    pub fn first_tag(&self) -> Option<u32> {
        self.members.first().map(Member::tag)
    }

    /// Returns the declaration position of a tag.
    #[must_use]
    pub fn position(&self, tag: u32) -> Option<usize> {
        self.positions.get(&tag).copied()
    }

    /// Returns true when the tag is declared at this level.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.positions.contains_key(&tag)
    }

    /// Returns true when the tag is declared and required at this level.
    #[must_use]
    pub fn is_required(&self, tag: u32) -> bool {
        self.member(tag).is_some_and(Member::is_required)
    }

    /// Returns the required tags in declaration order.
    pub fn required_tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.members
            .iter()
            .filter(|m| m.is_required())
            .map(Member::tag)
    }

    /// Returns the member declared for a tag.
    #[must_use]
    pub fn member(&self, tag: u32) -> Option<&Member> {
        self.position(tag).map(|i| &self.members[i])
    }

    /// Returns the group whose count tag is `tag`.
    #[must_use]
    pub fn group_def(&self, tag: u32) -> Option<&GroupDef> {
        match self.member(tag)? {
            Member::Group { def, .. } => Some(def),
            Member::Field { .. } => None,
        }
    }

    /// Returns true when `tag` is the count tag of a group at this level.
    #[must_use]
    pub fn is_group(&self, tag: u32) -> bool {
        self.group_def(tag).is_some()
    }

    /// Returns true when the layout declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Definition of a repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (NumInGroup).
    pub count_tag: u32,
    /// Tag of the first field in each group entry (delimiter).
    pub delimiter_tag: u32,
    /// Members of each group entry, delimiter first.
    pub layout: Layout,
}

impl GroupDef {
    /// Creates a group definition.
    ///
    /// The delimiter is the first member of `layout`.
    #[must_use]
    pub fn new(count_tag: u32, layout: Layout) -> Self {
        Self {
            count_tag,
            delimiter_tag: layout.first_tag().unwrap_or_default(),
            layout,
        }
    }

    /// Creates an empty group instance ordered by this definition.
    #[must_use]
    pub fn new_instance(&self) -> Group {
        Group::with_order(
            self.count_tag,
            self.delimiter_tag,
            Arc::clone(self.layout.order()),
        )
    }
}

/// Definition of a reusable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Component name.
    pub name: String,
    /// Members of the component.
    pub layout: Layout,
}

impl ComponentDef {
    /// Creates a component definition.
    #[must_use]
    pub fn new(name: impl Into<String>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            layout,
        }
    }
}

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Administrative message (session level).
    Admin,
    /// Application message.
    App,
}

/// Definition of a FIX message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDef {
    /// Message type value (tag 35).
    pub msg_type: String,
    /// Message name.
    pub name: String,
    /// Message category (admin or app).
    pub category: MessageCategory,
    /// Body members.
    pub layout: Layout,
}

impl MessageDef {
    /// Creates a message definition.
    #[must_use]
    pub fn new(
        msg_type: impl Into<String>,
        name: impl Into<String>,
        category: MessageCategory,
        layout: Layout,
    ) -> Self {
        Self {
            msg_type: msg_type.into(),
            name: name.into(),
            category,
            layout,
        }
    }
}

/// Complete FIX dictionary for a specific version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    version: Version,
    fields: HashMap<u32, FieldDef>,
    fields_by_name: HashMap<String, u32>,
    messages: HashMap<String, MessageDef>,
    components: HashMap<String, ComponentDef>,
    header: Layout,
    trailer: Layout,
}

impl Dictionary {
    /// Creates a new empty dictionary for the specified version.
    ///
    /// # Arguments
    /// * `version` - The FIX version
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            fields: HashMap::new(),
            fields_by_name: HashMap::new(),
            messages: HashMap::new(),
            components: HashMap::new(),
            header: Layout::new(),
            trailer: Layout::new(),
        }
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the BeginString this dictionary describes.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        self.version.begin_string()
    }

    /// Adds a field definition.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields_by_name.insert(field.name.clone(), field.tag);
        self.fields.insert(field.tag, field);
    }

    /// Adds a message definition.
    pub fn add_message(&mut self, message: MessageDef) {
        self.messages.insert(message.msg_type.clone(), message);
    }

    /// Adds a component definition.
    pub fn add_component(&mut self, component: ComponentDef) {
        self.components.insert(component.name.clone(), component);
    }

    /// Replaces the header layout.
    pub fn set_header(&mut self, header: Layout) {
        self.header = header;
    }

    /// Replaces the trailer layout.
    pub fn set_trailer(&mut self, trailer: Layout) {
        self.trailer = trailer;
    }

    /// Gets a field definition by tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.get(&tag)
    }

    /// Gets a field definition by name.
    #[must_use]
    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name
            .get(name)
            .and_then(|tag| self.fields.get(tag))
    }

    /// Gets a message definition by type.
    #[must_use]
    pub fn get_message(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Gets a component definition by name.
    #[must_use]
    pub fn get_component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    /// Returns the header layout.
    #[must_use]
    pub const fn header(&self) -> &Layout {
        &self.header
    }

    /// Returns the trailer layout.
    #[must_use]
    pub const fn trailer(&self) -> &Layout {
        &self.trailer
    }

    /// Returns true when the tag has a field definition.
    #[must_use]
    pub fn is_valid_tag(&self, tag: u32) -> bool {
        self.fields.contains_key(&tag)
    }

    /// Returns the type of a field.
    #[must_use]
    pub fn field_type(&self, tag: u32) -> Option<FieldType> {
        self.fields.get(&tag).map(|f| f.field_type)
    }

    /// Returns true when the tag belongs to the header.
    #[must_use]
    pub fn is_header_field(&self, tag: u32) -> bool {
        self.header.contains(tag)
    }

    /// Returns true when the tag belongs to the trailer.
    #[must_use]
    pub fn is_trailer_field(&self, tag: u32) -> bool {
        self.trailer.contains(tag)
    }

    /// Returns true when the message type is defined.
    #[must_use]
    pub fn is_msg_type(&self, msg_type: &str) -> bool {
        self.messages.contains_key(msg_type)
    }

    /// Returns true when the message type is defined as an application message.
    #[must_use]
    pub fn is_app_message(&self, msg_type: &str) -> bool {
        self.messages
            .get(msg_type)
            .is_some_and(|m| m.category == MessageCategory::App)
    }

    /// Returns true when the tag is declared in the message body.
    #[must_use]
    pub fn is_msg_field(&self, msg_type: &str, tag: u32) -> bool {
        self.messages
            .get(msg_type)
            .is_some_and(|m| m.layout.contains(tag))
    }

    /// Returns the body layout of a message type.
    #[must_use]
    pub fn layout(&self, msg_type: &str) -> Option<&Layout> {
        self.messages.get(msg_type).map(|m| &m.layout)
    }

    /// Returns true when `tag` is a group count tag in the message body.
    #[must_use]
    pub fn is_group(&self, msg_type: &str, tag: u32) -> bool {
        self.group(msg_type, tag).is_some()
    }

    /// Returns the group definition for a count tag in the message body.
    #[must_use]
    pub fn group(&self, msg_type: &str, tag: u32) -> Option<&GroupDef> {
        self.messages.get(msg_type)?.layout.group_def(tag)
    }

    /// Returns the required body tags of a message type.
    pub fn required_fields(&self, msg_type: &str) -> impl Iterator<Item = u32> + '_ {
        self.messages
            .get(msg_type)
            .into_iter()
            .flat_map(|m| m.layout.required_tags())
    }

    /// Returns true when the tag is a raw data field.
    ///
    /// Without a definition, the well-known data tags are recognised.
    #[must_use]
    pub fn is_data_field(&self, tag: u32) -> bool {
        match self.fields.get(&tag) {
            Some(def) => def.field_type.is_data(),
            None => matches!(
                tag,
                tags::RAW_DATA | tags::SECURE_DATA | tags::SIGNATURE | tags::XML_DATA
            ),
        }
    }

    /// Returns true when the value satisfies the field's enumeration.
    #[must_use]
    pub fn is_field_value(&self, tag: u32, value: &str) -> bool {
        self.fields
            .get(&tag)
            .is_none_or(|def| def.is_valid_value(value))
    }

    /// Returns the name of a field.
    #[must_use]
    pub fn field_name(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(|f| f.name.as_str())
    }

    /// Returns an iterator over all field definitions.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Returns an iterator over all message definitions.
    pub fn messages(&self) -> impl Iterator<Item = &MessageDef> {
        self.messages.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parties() -> GroupDef {
        GroupDef::new(
            453,
            Layout::new().field(448, true).field(447, false).field(452, false),
        )
    }

    #[test]
    fn test_version_begin_string() {
        assert_eq!(Version::Fix42.begin_string(), "FIX.4.2");
        assert_eq!(Version::Fix44.begin_string(), "FIX.4.4");
        assert_eq!(Version::from_begin_string("FIXT.1.1"), Some(Version::Fixt11));
        assert_eq!(Version::from_begin_string("FIX.9.9"), None);
        assert!(Version::Fix42 < Version::Fix44);
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("INT".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("STRING".parse::<FieldType>().unwrap(), FieldType::String);
        assert_eq!(
            "UTCTIMESTAMP".parse::<FieldType>().unwrap(),
            FieldType::UtcTimestamp
        );
        assert_eq!("unknown".parse::<FieldType>().unwrap(), FieldType::String);
    }

    #[test]
    fn test_field_type_classes() {
        assert!(FieldType::SeqNum.is_integer());
        assert!(FieldType::Price.is_decimal());
        assert!(FieldType::MultipleCharValue.is_multi_value());
        assert!(FieldType::XmlData.is_data());
        assert!(!FieldType::String.is_decimal());
    }

    #[test]
    fn test_field_def_values() {
        let side = FieldDef::new(54, "Side", FieldType::Char)
            .with_value("1", "BUY")
            .with_value("2", "SELL");
        assert!(side.is_valid_value("1"));
        assert!(!side.is_valid_value("9"));
        assert!(side.clone().with_other_values().is_valid_value("9"));

        let instructions = FieldDef::new(18, "ExecInst", FieldType::MultipleCharValue)
            .with_value("1", "NOT_HELD")
            .with_value("G", "ALL_OR_NONE");
        assert!(instructions.is_valid_value("1 G"));
        assert!(!instructions.is_valid_value("1 Z"));
    }

    #[test]
    fn test_layout_lookups() {
        let layout = Layout::new()
            .field(11, true)
            .group(parties(), false)
            .field(55, true);
        assert_eq!(layout.position(453), Some(1));
        assert!(layout.is_group(453));
        assert!(!layout.is_group(11));
        assert_eq!(layout.required_tags().collect::<Vec<_>>(), vec![11, 55]);
        assert_eq!(layout.order().tags(), &[11, 453, 55]);
    }

    #[test]
    fn test_component_flattening() {
        let instrument = ComponentDef::new("Instrument", Layout::new().field(55, true).field(48, false));
        let optional = Layout::new().component(&instrument, false);
        assert!(optional.contains(55));
        assert!(!optional.is_required(55));
        let required = Layout::new().component(&instrument, true);
        assert!(required.is_required(55));
    }

    #[test]
    fn test_group_def_delimiter_and_instance() {
        let def = parties();
        assert_eq!(def.delimiter_tag, 448);
        let mut instance = def.new_instance();
        instance.set_int(452, 3);
        instance.set_string(448, "BROKER").unwrap();
        let order: Vec<u32> = instance.fields().map(|f| f.tag()).collect();
        assert_eq!(order, vec![448, 452]);
        assert_eq!(instance.count_tag(), 453);
    }

    #[test]
    fn test_dictionary_lookups() {
        let mut dict = Dictionary::new(Version::Fix44);
        dict.add_field(FieldDef::new(35, "MsgType", FieldType::String));
        dict.add_field(FieldDef::new(96, "RawData", FieldType::Data));
        dict.set_header(Layout::new().field(8, true).field(35, true));
        dict.add_message(MessageDef::new(
            "D",
            "NewOrderSingle",
            MessageCategory::App,
            Layout::new().field(11, true).group(parties(), false),
        ));

        assert!(dict.get_field_by_name("MsgType").is_some());
        assert!(dict.is_header_field(35));
        assert!(dict.is_msg_type("D"));
        assert!(dict.is_app_message("D"));
        assert!(dict.is_group("D", 453));
        assert_eq!(dict.group("D", 453).unwrap().delimiter_tag, 448);
        assert_eq!(dict.required_fields("D").collect::<Vec<_>>(), vec![11]);
        assert!(dict.is_data_field(96));
        assert!(dict.is_data_field(89));
        assert!(!dict.is_data_field(35));
    }

    #[test]
    fn test_layout_serde_rebuilds_index() {
        let layout = Layout::new().field(11, true).group(parties(), false);
        let members: Vec<Member> = layout.clone().into();
        let rebuilt = Layout::from(members);
        assert_eq!(rebuilt, layout);
        assert_eq!(rebuilt.position(453), Some(1));
    }
}
