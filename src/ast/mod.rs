//! AST Module - YAML flow documents
//!
//! Parsed Rust types of a builder flow: nodes with their bindings and
//! observed outputs, edges, flow variables, secrets, inline capabilities.
//! The "what" only; `dag` and `resolve` build on top of it.

mod flow;

pub use flow::{FlowDocument, FlowEdge, FlowEndpoint, FlowNode};
