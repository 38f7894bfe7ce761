/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 17/10/26
******************************************************************************/

//! # FerroFix Dictionary
//!
//! Data dictionaries and message validation for the FerroFix engine.
//!
//! This crate provides:
//! - **Schema definitions**: Field, message, group and component definitions
//! - **Session dictionaries**: Built-in administrative message sets per version
//! - **Runtime validation**: Message validation against dictionary rules

pub mod schema;
pub mod standard;
pub mod validator;

pub use schema::{
    ComponentDef, Dictionary, FieldDef, FieldType, GroupDef, Layout, Member, MessageCategory,
    MessageDef, Version,
};
pub use standard::session_dictionary;
pub use validator::{ValidationError, ValidationSettings, Validator};
