//! Utilities Module - shared infrastructure
//!
//! - `jsonpath`: Minimal JSONPath parser for dotted value lookups

pub mod jsonpath;
