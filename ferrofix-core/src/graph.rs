/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Ordered field containers with repeating groups.
//!
//! - [`FieldOrder`]: Shared tag ordering for a container
//! - [`FieldGraph`]: Fields keyed by unique tag plus repeating groups
//! - [`Group`]: One instance of a repeating group
//!
//! Fields iterate by rank in the [`FieldOrder`]; tags not listed come after
//! every listed tag, sorted by tag number.

use crate::error::FieldError;
use crate::field::Field;
use crate::reject::SessionRejectReason;
use crate::types::TimestampPrecision;
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Tag ordering shared between containers of the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldOrder {
    tags: Vec<u32>,
    ranks: HashMap<u32, usize>,
}

impl FieldOrder {
    /// Creates an ordering from tags listed in their required order.
    ///
    /// Repeated tags keep their first position.
    #[must_use]
    pub fn new(tags: impl IntoIterator<Item = u32>) -> Self {
        let mut order = Self::default();
        for tag in tags {
            if !order.ranks.contains_key(&tag) {
                order.ranks.insert(tag, order.tags.len());
                order.tags.push(tag);
            }
        }
        order
    }

    /// Returns the position of `tag`, or `usize::MAX` when unlisted.
    #[inline]
    #[must_use]
    pub fn rank(&self, tag: u32) -> usize {
        self.ranks.get(&tag).copied().unwrap_or(usize::MAX)
    }

    /// Returns the first listed tag.
    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.tags.first().copied()
    }

    /// Returns the listed tags in order.
    #[must_use]
    pub fn tags(&self) -> &[u32] {
        &self.tags
    }

    /// Returns true when the tag is listed.
    #[must_use]
    pub fn contains(&self, tag: u32) -> bool {
        self.ranks.contains_key(&tag)
    }
}

/// An ordered collection of fields keyed by unique tag.
#[derive(Debug, Clone, Default)]
pub struct FieldGraph {
    order: Option<Arc<FieldOrder>>,
    fields: Vec<Field>,
    groups: BTreeMap<u32, Vec<Group>>,
}

impl PartialEq for FieldGraph {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields && self.groups == other.groups
    }
}

impl FieldGraph {
    /// Creates an empty graph ordered by tag number.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph using a shared ordering.
    #[must_use]
    pub fn with_order(order: Arc<FieldOrder>) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// Returns the ordering in use, if any.
    #[must_use]
    pub fn order(&self) -> Option<&Arc<FieldOrder>> {
        self.order.as_ref()
    }

    #[inline]
    fn sort_key(&self, tag: u32) -> (usize, u32) {
        let rank = self.order.as_ref().map_or(usize::MAX, |o| o.rank(tag));
        (rank, tag)
    }

    fn position(&self, tag: u32) -> Result<usize, usize> {
        let key = self.sort_key(tag);
        self.fields
            .binary_search_by(|f| self.sort_key(f.tag()).cmp(&key))
    }

    /// Sets a field, replacing any field with the same tag.
    ///
    /// # Errors
    /// Returns `FieldError::Rejected` with `TagSpecifiedWithoutAValue` when
    /// the value is empty.
    pub fn set_field(&mut self, field: Field) -> Result<(), FieldError> {
        if field.is_empty() {
            return Err(FieldError::rejected(
                SessionRejectReason::TagSpecifiedWithoutAValue,
                field.tag(),
            ));
        }
        self.insert(field);
        Ok(())
    }

    fn insert(&mut self, field: Field) {
        match self.position(field.tag()) {
            Ok(index) => self.fields[index] = field,
            Err(index) => self.fields.insert(index, field),
        }
    }

    /// Sets a string field.
    ///
    /// # Errors
    /// Returns `FieldError::Rejected` when the value is empty.
    pub fn set_string(&mut self, tag: u32, value: impl Into<String>) -> Result<(), FieldError> {
        self.set_field(Field::string(tag, value))
    }

    /// Sets an integer field.
    pub fn set_int(&mut self, tag: u32, value: i64) {
        self.insert(Field::int(tag, value));
    }

    /// Sets a sequence-number style integer field.
    pub fn set_u64(&mut self, tag: u32, value: u64) {
        self.insert(Field::from_raw(
            tag,
            Bytes::copy_from_slice(itoa::Buffer::new().format(value).as_bytes()),
        ));
    }

    /// Sets a `Y`/`N` field.
    pub fn set_bool(&mut self, tag: u32, value: bool) {
        self.insert(Field::bool(tag, value));
    }

    /// Sets a single-character field.
    pub fn set_char(&mut self, tag: u32, value: char) {
        self.insert(Field::char(tag, value));
    }

    /// Sets a decimal field with `padding` minimum fraction digits.
    pub fn set_decimal(&mut self, tag: u32, value: Decimal, padding: usize) {
        self.insert(Field::decimal(tag, value, padding));
    }

    /// Sets a UTC timestamp field.
    pub fn set_utc_timestamp(
        &mut self,
        tag: u32,
        value: DateTime<Utc>,
        precision: TimestampPrecision,
    ) {
        self.insert(Field::utc_timestamp(tag, value, precision));
    }

    /// Sets a UTC date field.
    pub fn set_utc_date(&mut self, tag: u32, value: NaiveDate) {
        self.insert(Field::utc_date(tag, value));
    }

    /// Sets a UTC time-of-day field.
    pub fn set_utc_time_only(&mut self, tag: u32, value: NaiveTime, precision: TimestampPrecision) {
        self.insert(Field::utc_time_only(tag, value, precision));
    }

    /// Returns the field with the given tag.
    #[must_use]
    pub fn field(&self, tag: u32) -> Option<&Field> {
        self.position(tag).ok().map(|index| &self.fields[index])
    }

    /// Returns the field with the given tag.
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` if the tag is not set.
    pub fn get_field(&self, tag: u32) -> Result<&Field, FieldError> {
        self.field(tag).ok_or(FieldError::NotFound(tag))
    }

    /// Returns true when a field with the given tag is present.
    #[must_use]
    pub fn is_field_set(&self, tag: u32) -> bool {
        self.position(tag).is_ok()
    }

    /// Removes a field, returning it if it was present.
    pub fn remove_field(&mut self, tag: u32) -> Option<Field> {
        self.position(tag).ok().map(|index| self.fields.remove(index))
    }

    /// Returns a string value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when not UTF-8.
    pub fn get_string(&self, tag: u32) -> Result<&str, FieldError> {
        self.get_field(tag)?.as_str()
    }

    /// Returns an integer value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn get_int(&self, tag: u32) -> Result<i64, FieldError> {
        self.get_field(tag)?.to_int()
    }

    /// Returns a non-negative integer value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed or negative.
    pub fn get_u64(&self, tag: u32) -> Result<u64, FieldError> {
        self.get_field(tag)?.to_u64()
    }

    /// Returns a decimal value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn get_decimal(&self, tag: u32) -> Result<Decimal, FieldError> {
        self.get_field(tag)?.to_decimal()
    }

    /// Returns a boolean value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when not `Y`/`N`.
    pub fn get_bool(&self, tag: u32) -> Result<bool, FieldError> {
        self.get_field(tag)?.to_bool()
    }

    /// Returns a single-character value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when not one character.
    pub fn get_char(&self, tag: u32) -> Result<char, FieldError> {
        self.get_field(tag)?.to_char()
    }

    /// Returns a UTC timestamp value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn get_utc_timestamp(&self, tag: u32) -> Result<DateTime<Utc>, FieldError> {
        self.get_field(tag)?.to_utc_timestamp()
    }

    /// Returns a UTC date value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn get_utc_date(&self, tag: u32) -> Result<NaiveDate, FieldError> {
        self.get_field(tag)?.to_utc_date()
    }

    /// Returns a UTC time-of-day value.
    ///
    /// # Errors
    /// `NotFound` when absent, `IncorrectDataFormat` when malformed.
    pub fn get_utc_time(&self, tag: u32) -> Result<NaiveTime, FieldError> {
        self.get_field(tag)?.to_utc_time_only()
    }

    /// Returns the raw bytes of a field.
    ///
    /// # Errors
    /// `NotFound` when absent.
    pub fn get_bytes(&self, tag: u32) -> Result<&[u8], FieldError> {
        Ok(self.get_field(tag)?.raw())
    }

    /// Iterates over fields in order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Returns the number of fields (group instances not included).
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the graph holds no fields and no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }

    /// Removes every field and group.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.groups.clear();
    }

    /// Appends a group instance and sets its count field to the new count.
    pub fn add_group(&mut self, group: Group) {
        let count_tag = group.count_tag();
        let instances = self.groups.entry(count_tag).or_default();
        instances.push(group);
        let count = instances.len();
        self.insert(Field::group_count(count_tag, count));
    }

    /// Appends a group instance without touching the count field.
    ///
    /// The parser uses this so a message keeps the count it declared on the wire.
    pub fn attach_group(&mut self, group: Group) {
        self.groups.entry(group.count_tag()).or_default().push(group);
    }

    /// Returns group instance `index` (1-based).
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when the index is out of range.
    pub fn group(&self, count_tag: u32, index: usize) -> Result<&Group, FieldError> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get(&count_tag)?.get(i))
            .ok_or(FieldError::NotFound(count_tag))
    }

    /// Returns group instance `index` (1-based) mutably.
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when the index is out of range.
    pub fn group_mut(&mut self, count_tag: u32, index: usize) -> Result<&mut Group, FieldError> {
        index
            .checked_sub(1)
            .and_then(|i| self.groups.get_mut(&count_tag)?.get_mut(i))
            .ok_or(FieldError::NotFound(count_tag))
    }

    /// Replaces group instance `index` (1-based), returning the old one.
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when the index is out of range.
    pub fn replace_group(&mut self, index: usize, group: Group) -> Result<Group, FieldError> {
        let slot = self.group_mut(group.count_tag(), index)?;
        Ok(std::mem::replace(slot, group))
    }

    /// Removes group instance `index` (1-based) and updates the count field.
    ///
    /// Removing the last instance removes the count field as well.
    ///
    /// # Errors
    /// Returns `FieldError::NotFound` when the index is out of range.
    pub fn remove_group(&mut self, count_tag: u32, index: usize) -> Result<Group, FieldError> {
        let instances = self
            .groups
            .get_mut(&count_tag)
            .filter(|g| index >= 1 && index <= g.len())
            .ok_or(FieldError::NotFound(count_tag))?;
        let removed = instances.remove(index - 1);
        let remaining = instances.len();
        if remaining == 0 {
            self.groups.remove(&count_tag);
            self.remove_field(count_tag);
        } else {
            self.insert(Field::group_count(count_tag, remaining));
        }
        Ok(removed)
    }

    /// Returns every instance of a group.
    #[must_use]
    pub fn groups(&self, count_tag: u32) -> &[Group] {
        self.groups.get(&count_tag).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of instances actually present for a group.
    #[must_use]
    pub fn group_count(&self, count_tag: u32) -> usize {
        self.groups.get(&count_tag).map_or(0, Vec::len)
    }

    /// Returns true when at least one instance of the group is present.
    #[must_use]
    pub fn has_group(&self, count_tag: u32) -> bool {
        self.group_count(count_tag) > 0
    }

    /// Iterates over the count tags of groups present in this graph.
    pub fn group_tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }
}

/// One instance of a repeating group.
///
/// Dereferences to its [`FieldGraph`]. The ordering always starts with the
/// delimiter tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    count_tag: u32,
    delimiter: u32,
    graph: FieldGraph,
}

impl Group {
    /// Creates an instance ordered by the delimiter, then by tag number.
    #[must_use]
    pub fn new(count_tag: u32, delimiter: u32) -> Self {
        Self::with_order(count_tag, delimiter, Arc::new(FieldOrder::new([delimiter])))
    }

    /// Creates an instance with a shared member ordering.
    ///
    /// The ordering is expected to list the delimiter first.
    #[must_use]
    pub fn with_order(count_tag: u32, delimiter: u32, order: Arc<FieldOrder>) -> Self {
        Self {
            count_tag,
            delimiter,
            graph: FieldGraph::with_order(order),
        }
    }

    /// Returns the NumInGroup tag.
    #[inline]
    #[must_use]
    pub const fn count_tag(&self) -> u32 {
        self.count_tag
    }

    /// Returns the delimiter tag.
    #[inline]
    #[must_use]
    pub const fn delimiter(&self) -> u32 {
        self.delimiter
    }

    /// Returns an empty instance of the same shape.
    #[must_use]
    pub fn empty_like(&self) -> Self {
        Self {
            count_tag: self.count_tag,
            delimiter: self.delimiter,
            graph: self
                .graph
                .order
                .clone()
                .map_or_else(FieldGraph::new, FieldGraph::with_order),
        }
    }
}

impl Deref for Group {
    type Target = FieldGraph;

    fn deref(&self) -> &FieldGraph {
        &self.graph
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut FieldGraph {
        &mut self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(graph: &FieldGraph) -> Vec<u32> {
        graph.fields().map(Field::tag).collect()
    }

    #[test]
    fn test_set_field_overwrites() {
        let mut graph = FieldGraph::new();
        graph.set_string(58, "first").unwrap();
        graph.set_string(58, "second").unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.get_string(58).unwrap(), "second");
    }

    #[test]
    fn test_empty_value_rejected() {
        let mut graph = FieldGraph::new();
        let err = graph.set_string(58, "").unwrap_err();
        assert_eq!(
            err,
            FieldError::rejected(SessionRejectReason::TagSpecifiedWithoutAValue, 58)
        );
        assert!(!graph.is_field_set(58));
    }

    #[test]
    fn test_missing_field_not_found() {
        let graph = FieldGraph::new();
        assert_eq!(graph.get_int(34), Err(FieldError::NotFound(34)));
        assert!(!graph.is_field_set(34));
    }

    #[test]
    fn test_order_ranks_then_tag() {
        let order = Arc::new(FieldOrder::new([55, 11, 54]));
        let mut graph = FieldGraph::with_order(order);
        graph.set_int(38, 100);
        graph.set_char(54, '1');
        graph.set_string(1, "ACC").unwrap();
        graph.set_string(11, "ORD1").unwrap();
        graph.set_string(55, "IBM").unwrap();
        assert_eq!(tags(&graph), vec![55, 11, 54, 1, 38]);
    }

    #[test]
    fn test_unordered_graph_sorts_by_tag() {
        let mut graph = FieldGraph::new();
        graph.set_int(38, 1);
        graph.set_int(11, 2);
        graph.set_int(1, 3);
        assert_eq!(tags(&graph), vec![1, 11, 38]);
        assert!(graph.remove_field(11).is_some());
        assert_eq!(tags(&graph), vec![1, 38]);
    }

    #[test]
    fn test_group_count_tracks_instances() {
        let mut graph = FieldGraph::new();
        for symbol in ["IBM", "MSFT", "AAPL"] {
            let mut group = Group::new(146, 55);
            group.set_string(55, symbol).unwrap();
            graph.add_group(group);
        }
        assert_eq!(graph.get_int(146).unwrap(), 3);
        assert_eq!(graph.group(146, 2).unwrap().get_string(55).unwrap(), "MSFT");

        let removed = graph.remove_group(146, 1).unwrap();
        assert_eq!(removed.get_string(55).unwrap(), "IBM");
        assert_eq!(graph.get_int(146).unwrap(), 2);

        graph.remove_group(146, 1).unwrap();
        graph.remove_group(146, 1).unwrap();
        assert!(!graph.is_field_set(146));
        assert!(!graph.has_group(146));
    }

    #[test]
    fn test_group_index_is_one_based() {
        let mut graph = FieldGraph::new();
        let mut group = Group::new(146, 55);
        group.set_string(55, "IBM").unwrap();
        graph.add_group(group);
        assert_eq!(graph.group(146, 0), Err(FieldError::NotFound(146)));
        assert_eq!(graph.group(146, 2), Err(FieldError::NotFound(146)));
        assert!(graph.remove_group(146, 2).is_err());
    }

    #[test]
    fn test_replace_group() {
        let mut graph = FieldGraph::new();
        let mut group = Group::new(146, 55);
        group.set_string(55, "IBM").unwrap();
        graph.add_group(group.clone());

        let mut replacement = group.empty_like();
        replacement.set_string(55, "MSFT").unwrap();
        let old = graph.replace_group(1, replacement).unwrap();
        assert_eq!(old.get_string(55).unwrap(), "IBM");
        assert_eq!(graph.group(146, 1).unwrap().get_string(55).unwrap(), "MSFT");
        assert_eq!(graph.get_int(146).unwrap(), 1);
    }

    #[test]
    fn test_attach_group_keeps_declared_count() {
        let mut graph = FieldGraph::new();
        graph.set_int(146, 2);
        let mut group = Group::new(146, 55);
        group.set_string(55, "IBM").unwrap();
        graph.attach_group(group);
        assert_eq!(graph.get_int(146).unwrap(), 2);
        assert_eq!(graph.group_count(146), 1);
    }

    #[test]
    fn test_group_delimiter_sorts_first() {
        let mut group = Group::new(146, 55);
        group.set_int(38, 100);
        group.set_string(55, "IBM").unwrap();
        assert_eq!(tags(&group), vec![55, 38]);
        assert_eq!(group.delimiter(), 55);
    }
}
