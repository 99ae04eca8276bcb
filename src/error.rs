//! Error types with fix suggestions
//!
//! The expression, formatter and resolver data paths never fail on data
//! shape. Errors only surface from editing APIs (unknown ids, bad indices)
//! and from the outer layers: config loading, flow documents, CLI input.
//!
//! Error code ranges:
//! - BIND-000-009: Expression editing errors
//! - BIND-010-019: Formatter / locale errors
//! - BIND-020-029: Flow document errors
//! - BIND-030-039: Configuration errors
//! - BIND-090-099: IO / serialization errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BindError {
    // ─────────────────────────────────────────────────────────────
    // Expression editing (BIND-000 to BIND-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-001] Segment #{id} not found in expression")]
    SegmentNotFound { id: u32 },

    #[error("[BIND-002] Segment index {index} out of range (expression has {len} segments)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("[BIND-003] Invalid field name '{name}': must be non-empty without '}}' or '|'")]
    InvalidFieldName { name: String },

    #[error("[BIND-004] Invalid formatter id '{id}': must be non-empty without '}}'")]
    InvalidFormatter { id: String },

    // ─────────────────────────────────────────────────────────────
    // Formatter / locale (BIND-010 to BIND-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-010] Unknown locale '{tag}'")]
    UnknownLocale { tag: String },

    #[error("[BIND-011] Unknown syntax '{name}'")]
    UnknownSyntax { name: String },

    // ─────────────────────────────────────────────────────────────
    // Flow documents (BIND-020 to BIND-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-020] Failed to parse flow document: {details}")]
    FlowParse { details: String },

    #[error("[BIND-021] Node '{node_id}' not found in flow")]
    NodeNotFound { node_id: String },

    #[error("[BIND-022] Failed to parse capability table: {details}")]
    CapabilityParse { details: String },

    #[error("[BIND-023] {count} unresolved binding reference(s)")]
    UnresolvedRefs { count: usize },

    // ─────────────────────────────────────────────────────────────
    // Configuration (BIND-030 to BIND-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-030] Configuration error: {reason}")]
    ConfigError { reason: String },

    // ─────────────────────────────────────────────────────────────
    // IO / serialization (BIND-090 to BIND-099)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-090] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[BIND-091] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("[BIND-092] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixSuggestion for BindError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindError::SegmentNotFound { .. } => {
                Some("The segment was removed or belongs to another expression")
            }
            BindError::IndexOutOfRange { .. } => Some("Use an index between 0 and len - 1"),
            BindError::InvalidFieldName { .. } => {
                Some("Field names are written inside {{...}}: drop any '}' or '|'")
            }
            BindError::InvalidFormatter { .. } => {
                Some("Run 'bindkit formatters' to list the formatter ids")
            }
            BindError::UnknownLocale { .. } => Some("Supported locales: en-US, en-GB, de-DE, fr-FR"),
            BindError::UnknownSyntax { .. } => Some("Supported syntaxes: escaped, legacy"),
            BindError::FlowParse { .. } => {
                Some("Check the flow document has 'nodes:' and 'edges:' lists")
            }
            BindError::NodeNotFound { .. } => Some("Verify the node id exists in 'nodes:'"),
            BindError::CapabilityParse { .. } => {
                Some("Each capability needs an 'outputs:' list of {name, type}")
            }
            BindError::UnresolvedRefs { .. } => {
                Some("Run 'bindkit vars <flow> <node>' to list the variables a node can bind")
            }
            BindError::ConfigError { .. } => Some("Check config.toml syntax and values"),
            BindError::Io(_) => Some("Check file path and permissions"),
            BindError::Yaml(_) => Some("Check YAML syntax: indentation and quoting"),
            BindError::Json(_) => Some("Check JSON syntax (try parsing with jq)"),
        }
    }
}
