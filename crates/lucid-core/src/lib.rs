//! Core data structures for Lucid.
//!
//! This crate contains the vocabulary shared by the compiler and the CLI:
//! - `Schema` - field name to declared type mapping supplied by the caller
//! - `Colors` - ANSI palette used by dumps and listings

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod colors;
pub mod schema;

#[cfg(test)]
mod schema_tests;

pub use colors::Colors;
pub use schema::{FieldSpec, FieldType, Schema, SchemaError};
