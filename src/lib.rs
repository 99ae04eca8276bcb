//! Bindkit - binding expressions, formatters and upstream variables
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── expr/      # Binding expressions: codec, edits, rendering
//! ├── format/    # Formatter engine: locales, numbers, dates
//! ├── catalog.rs # Field catalogs (name + semantic type)
//! ├── dag/       # Dependency graph snapshot, ref validation
//! ├── resolve/   # Upstream variable resolver, capabilities, observed outputs
//! ├── ast/       # YAML flow documents
//! ├── config.rs  # CLI configuration (~/.config/bindkit/config.toml)
//! ├── util/      # Shared utilities (jsonpath)
//! └── error.rs   # BindError with fix suggestions
//! ```
//!
//! `expr` and `resolve` never call each other: they share the `{{field}}`
//! syntax and the field-name vocabulary. `expr::render` and
//! `dag::validate_refs` sit above both.

// Core modules
pub mod ast;
pub mod catalog;
pub mod config;
pub mod dag;
pub mod error;
pub mod expr;
pub mod format;
pub mod resolve;
pub mod util;

// Re-exports for convenience
pub use ast::FlowDocument;
pub use catalog::{CatalogProvider, Field, FieldCatalog, FieldType};
pub use config::BindkitConfig;
pub use dag::{validate_refs, DependencyGraph, Edge, GraphNode, UnresolvedRef};
pub use error::{BindError, FixSuggestion, Result};
pub use expr::{parse, serialize, Codec, Expression, Segment, SegmentId, Syntax};
pub use format::{format, FormatterEngine, FormatterId, Locale};
pub use resolve::{
    resolve_variables, CapabilityLookup, CapabilityRegistry, GlobalPool, ObservedStore, Resolver,
    VariableEntry,
};
