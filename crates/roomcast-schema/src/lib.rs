//! Structural contract validation for JSON configuration documents.
//!
//! A structure document describes the expected shape of another JSON
//! document: typed leaves with bounds, dicts with declared fields,
//! arbitrary-keyed dicts and lists sharing a content template.
//!
//! Contracts are parsed eagerly into [`SchemaNode`] trees, so a broken
//! contract surfaces as [`SchemaError::Contract`] before any input is looked
//! at. Input that does not match surfaces as a [`Mismatch`].

pub mod config;
pub mod error;
pub mod loader;
pub mod node;
pub mod validator;

pub use config::ValidatorConfig;
pub use error::{Result, SchemaError};
pub use loader::{check_file, is_json, read_document, structure_path_for};
pub use node::{NodeKind, NumberRule, SchemaNode, StringRule};
pub use validator::{validate, Mismatch, Validator};
