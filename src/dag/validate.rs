//! Reference validation - bound fields vs. what a node can actually see
//!
//! Validates, for each `{{field}}` of an expression bound on a target node:
//! - the field is one of the visible variables (or a nested path into one)
//! - a `node.output` field does not point at the node itself
//! - a `node.output` field points at a node that is upstream
//!
//! Reports issues instead of failing: an expression with unresolved refs is
//! still renderable, the editor only flags it.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::expr::Expression;
use crate::resolve::VariableEntry;

use super::graph::DependencyGraph;

/// Why a bound field cannot be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefReason {
    /// Not a visible variable and no known node prefix
    Unknown,
    /// Names an existing node that does not feed the target
    NotUpstream,
    /// Names the target node itself
    SelfReference,
}

impl RefReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::NotUpstream => "not_upstream",
            Self::SelfReference => "self_reference",
        }
    }
}

/// One unresolved `{{field}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRef {
    pub field: String,
    pub reason: RefReason,
    /// Node named by the field prefix, when that node exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl UnresolvedRef {
    /// Human-readable diagnostic line
    pub fn message(&self, target: &str) -> String {
        match (self.reason, &self.node_id) {
            (RefReason::NotUpstream, Some(node)) => format!(
                "'{}' reads node '{}' which is not upstream of '{}'",
                self.field, node, target
            ),
            (RefReason::SelfReference, _) => {
                format!("'{}' reads the outputs of '{}' itself", self.field, target)
            }
            _ => format!("'{}' is not a variable visible at '{}'", self.field, target),
        }
    }
}

/// Check every field reference of `expr` against the variables visible at
/// `target`. Each distinct field is reported at most once, in first-use order.
pub fn validate_refs(
    expr: &Expression,
    graph: &DependencyGraph,
    visible: &[VariableEntry],
    target: &str,
) -> Vec<UnresolvedRef> {
    let paths: FxHashSet<&str> = visible.iter().map(|v| v.path.as_str()).collect();
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut issues = Vec::new();

    for (field, _) in expr.field_refs() {
        if !seen.insert(field) || is_visible(field, &paths) {
            continue;
        }

        let prefix = field.split('.').next().unwrap_or(field);
        let node_id = graph.contains(prefix).then(|| prefix.to_string());

        let reason = if node_id.is_none() {
            RefReason::Unknown
        } else if prefix == target {
            RefReason::SelfReference
        } else if !graph.has_path(prefix, target) {
            RefReason::NotUpstream
        } else {
            // Upstream node, but the output is neither observed nor declared
            RefReason::Unknown
        };

        issues.push(UnresolvedRef {
            field: field.to_string(),
            reason,
            node_id,
        });
    }

    issues
}

/// Exact match, or a nested path below a visible variable
/// (`n1.body.items[0]` under `n1.body`)
fn is_visible(field: &str, paths: &FxHashSet<&str>) -> bool {
    if paths.contains(field) {
        return true;
    }
    field
        .char_indices()
        .filter(|(_, c)| matches!(c, '.' | '['))
        .any(|(i, _)| paths.contains(&field[..i]))
}
