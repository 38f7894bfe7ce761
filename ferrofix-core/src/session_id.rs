/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! Session identity.
//!
//! Displayed and parsed as
//! `BeginString:Sender[/SenderSub][/SenderLocation]->Target[/TargetSub][/TargetLocation][:Qualifier]`.

use crate::error::SessionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier of a FIX session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    begin_string: String,
    sender_comp_id: String,
    sender_sub_id: Option<String>,
    sender_location_id: Option<String>,
    target_comp_id: String,
    target_sub_id: Option<String>,
    target_location_id: Option<String>,
    qualifier: Option<String>,
}

fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    (!value.is_empty()).then_some(value)
}

impl SessionId {
    /// Creates a new session ID.
    ///
    /// # Arguments
    /// * `begin_string` - FIX version string
    /// * `sender_comp_id` - Sender component ID
    /// * `target_comp_id` - Target component ID
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            sender_sub_id: None,
            sender_location_id: None,
            target_comp_id: target_comp_id.into(),
            target_sub_id: None,
            target_location_id: None,
            qualifier: None,
        }
    }

    /// Sets SenderSubID. Empty values are ignored.
    #[must_use]
    pub fn with_sender_sub_id(mut self, value: impl Into<String>) -> Self {
        self.sender_sub_id = non_empty(value);
        self
    }

    /// Sets SenderLocationID. Empty values are ignored.
    #[must_use]
    pub fn with_sender_location_id(mut self, value: impl Into<String>) -> Self {
        self.sender_location_id = non_empty(value);
        self
    }

    /// Sets TargetSubID. Empty values are ignored.
    #[must_use]
    pub fn with_target_sub_id(mut self, value: impl Into<String>) -> Self {
        self.target_sub_id = non_empty(value);
        self
    }

    /// Sets TargetLocationID. Empty values are ignored.
    #[must_use]
    pub fn with_target_location_id(mut self, value: impl Into<String>) -> Self {
        self.target_location_id = non_empty(value);
        self
    }

    /// Sets a qualifier distinguishing sessions with otherwise equal IDs.
    #[must_use]
    pub fn with_qualifier(mut self, value: impl Into<String>) -> Self {
        self.qualifier = non_empty(value);
        self
    }

    /// Returns BeginString.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Returns SenderCompID.
    #[must_use]
    pub fn sender_comp_id(&self) -> &str {
        &self.sender_comp_id
    }

    /// Returns SenderSubID.
    #[must_use]
    pub fn sender_sub_id(&self) -> Option<&str> {
        self.sender_sub_id.as_deref()
    }

    /// Returns SenderLocationID.
    #[must_use]
    pub fn sender_location_id(&self) -> Option<&str> {
        self.sender_location_id.as_deref()
    }

    /// Returns TargetCompID.
    #[must_use]
    pub fn target_comp_id(&self) -> &str {
        &self.target_comp_id
    }

    /// Returns TargetSubID.
    #[must_use]
    pub fn target_sub_id(&self) -> Option<&str> {
        self.target_sub_id.as_deref()
    }

    /// Returns TargetLocationID.
    #[must_use]
    pub fn target_location_id(&self) -> Option<&str> {
        self.target_location_id.as_deref()
    }

    /// Returns the qualifier.
    #[must_use]
    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// Returns true when the version is FIXT (transport independent).
    #[must_use]
    pub fn is_fixt(&self) -> bool {
        self.begin_string.starts_with("FIXT")
    }

    /// Returns the same session seen from the counterparty's side.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            begin_string: self.begin_string.clone(),
            sender_comp_id: self.target_comp_id.clone(),
            sender_sub_id: self.target_sub_id.clone(),
            sender_location_id: self.target_location_id.clone(),
            target_comp_id: self.sender_comp_id.clone(),
            target_sub_id: self.sender_sub_id.clone(),
            target_location_id: self.sender_location_id.clone(),
            qualifier: self.qualifier.clone(),
        }
    }
}

fn write_party(
    f: &mut fmt::Formatter<'_>,
    comp_id: &str,
    sub_id: Option<&str>,
    location_id: Option<&str>,
) -> fmt::Result {
    f.write_str(comp_id)?;
    if let Some(sub) = sub_id {
        write!(f, "/{}", sub)?;
    }
    if let Some(location) = location_id {
        // A location without a sub ID keeps its slot.
        if sub_id.is_none() {
            f.write_str("/")?;
        }
        write!(f, "/{}", location)?;
    }
    Ok(())
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.begin_string)?;
        write_party(
            f,
            &self.sender_comp_id,
            self.sender_sub_id(),
            self.sender_location_id(),
        )?;
        f.write_str("->")?;
        write_party(
            f,
            &self.target_comp_id,
            self.target_sub_id(),
            self.target_location_id(),
        )?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, ":{}", qualifier)?;
        }
        Ok(())
    }
}

fn parse_party(text: &str) -> Option<(String, Option<String>, Option<String>)> {
    let mut parts = text.split('/');
    let comp_id = parts.next().filter(|s| !s.is_empty())?.to_string();
    let sub_id = parts.next().and_then(non_empty);
    let location_id = parts.next().and_then(non_empty);
    if parts.next().is_some() {
        return None;
    }
    Some((comp_id, sub_id, location_id))
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SessionError::Configuration(format!("invalid session id: {s:?}"));
        let (begin_string, rest) = s.split_once(':').ok_or_else(invalid)?;
        let (sender, rest) = rest.split_once("->").ok_or_else(invalid)?;
        let (target, qualifier) = match rest.split_once(':') {
            Some((target, qualifier)) => (target, non_empty(qualifier)),
            None => (rest, None),
        };
        if begin_string.is_empty() {
            return Err(invalid());
        }
        let (sender_comp_id, sender_sub_id, sender_location_id) =
            parse_party(sender).ok_or_else(invalid)?;
        let (target_comp_id, target_sub_id, target_location_id) =
            parse_party(target).ok_or_else(invalid)?;
        Ok(Self {
            begin_string: begin_string.to_string(),
            sender_comp_id,
            sender_sub_id,
            sender_location_id,
            target_comp_id,
            target_sub_id,
            target_location_id,
            qualifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_display_minimal() {
        let id = SessionId::new("FIX.4.4", "SENDER", "TARGET");
        assert_eq!(id.to_string(), "FIX.4.4:SENDER->TARGET");
    }

    #[test]
    fn test_display_full() {
        let id = SessionId::new("FIX.4.2", "S", "T")
            .with_sender_sub_id("SS")
            .with_sender_location_id("SL")
            .with_target_location_id("TL")
            .with_qualifier("Q1");
        assert_eq!(id.to_string(), "FIX.4.2:S/SS/SL->T//TL:Q1");
    }

    #[test]
    fn test_parse_round_trip() {
        for text in [
            "FIX.4.4:SENDER->TARGET",
            "FIX.4.2:S/SS/SL->T//TL:Q1",
            "FIXT.1.1:A/B->C/D",
        ] {
            let id: SessionId = text.parse().unwrap();
            assert_eq!(id.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("FIX.4.4-SENDER->TARGET".parse::<SessionId>().is_err());
        assert!("FIX.4.4:SENDER".parse::<SessionId>().is_err());
        assert!("FIX.4.4:->TARGET".parse::<SessionId>().is_err());
        assert!(":A->B".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_reversed() {
        let id = SessionId::new("FIX.4.4", "A", "B").with_sender_sub_id("X");
        let rev = id.reversed();
        assert_eq!(rev.sender_comp_id(), "B");
        assert_eq!(rev.target_comp_id(), "A");
        assert_eq!(rev.target_sub_id(), Some("X"));
        assert_eq!(rev.reversed(), id);
    }

    #[test]
    fn test_hash_eq_key() {
        let mut set = HashSet::new();
        set.insert(SessionId::new("FIX.4.4", "A", "B"));
        assert!(set.contains(&SessionId::new("FIX.4.4", "A", "B")));
        assert!(!set.contains(&SessionId::new("FIX.4.4", "A", "B").with_qualifier("x")));
        assert!(SessionId::new("FIXT.1.1", "A", "B").is_fixt());
    }
}
