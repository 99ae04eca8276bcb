//! Resolver - variables visible at a node of an automation graph
//!
//! For a target node:
//! 1. Walk incoming edges to collect every strictly-upstream node
//! 2. Per upstream node, observed output keys, else declared outputs
//! 3. Union the global pool (flow variables, masked secrets)
//! 4. Derive friendly names, node aliases override
//!
//! Nothing here fails: unknown targets, unknown node types and malformed
//! observed payloads all degrade to fewer entries.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::catalog::FieldType;
use crate::dag::{DependencyGraph, GraphNode};
use crate::format::{infer_type_from_value, preview};

use super::capability::{CapabilityLookup, OutputDecl};
use super::friendly::friendly_name;
use super::globals::{is_secret, GlobalPool, SECRET_MASK};
use super::observed::ObservedOutputs;

/// Default maximum preview length, in characters
pub const DEFAULT_PREVIEW_LEN: usize = 48;

/// Grouping of a variable entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableScope {
    Global,
    Node,
}

impl VariableScope {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableScope::Global => "global",
            VariableScope::Node => "node",
        }
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One variable a node may bind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableEntry {
    /// `<nodeId>.<output>` or a global name
    pub path: String,
    pub friendly_name: String,
    /// Node label (or id) that produces it, or the global pool kind
    pub source_label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_preview: Option<String>,
    pub scope: VariableScope,
}

/// Variable resolver over one graph snapshot
pub struct Resolver<'a> {
    graph: &'a DependencyGraph,
    capabilities: &'a dyn CapabilityLookup,
    observed: Option<&'a dyn ObservedOutputs>,
    preview_len: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a DependencyGraph, capabilities: &'a dyn CapabilityLookup) -> Self {
        Self {
            graph,
            capabilities,
            observed: None,
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }

    /// Prefer recorded outputs over declared ones
    pub fn with_observed(mut self, observed: &'a dyn ObservedOutputs) -> Self {
        self.observed = Some(observed);
        self
    }

    pub fn with_preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len;
        self
    }

    /// Variables visible at `target`: globals first, then upstream outputs
    /// (nearest nodes first). Unknown target → empty.
    pub fn resolve(&self, target: &str, globals: &GlobalPool) -> Vec<VariableEntry> {
        if !self.graph.contains(target) {
            debug!(node_id = %target, "unknown target node, no variables");
            return Vec::new();
        }

        let upstream = self.graph.upstream(target);
        debug!(node_id = %target, upstream = upstream.len(), "resolving variables");

        let mut entries = globals.entries(self.preview_len);
        for node_id in &upstream {
            if let Some(node) = self.graph.node(node_id) {
                entries.extend(self.node_entries(node));
            }
        }

        // A node named `env` must not leak values through `env.` paths
        for entry in entries.iter_mut().filter(|e| is_secret(&e.path)) {
            entry.value_preview = Some(SECRET_MASK.to_string());
        }

        entries
    }

    fn node_entries(&self, node: &GraphNode) -> Vec<VariableEntry> {
        let observed = self.observed.and_then(|store| store.latest(&node.id));
        match observed.as_deref() {
            Some(Value::Object(payload)) if !payload.is_empty() => {
                trace!(node_id = %node.id, keys = payload.len(), "using observed outputs");
                self.observed_entries(node, payload)
            }
            Some(_) => {
                debug!(node_id = %node.id, "observed payload is not a non-empty object, using declared outputs");
                self.declared_entries(node)
            }
            None => self.declared_entries(node),
        }
    }

    fn observed_entries(&self, node: &GraphNode, payload: &Map<String, Value>) -> Vec<VariableEntry> {
        payload
            .iter()
            .map(|(key, value)| VariableEntry {
                path: format!("{}.{}", node.id, key),
                friendly_name: display_name(node, key),
                source_label: node.display_label().to_string(),
                field_type: infer_type_from_value(value),
                value_preview: Some(preview(value, self.preview_len)),
                scope: VariableScope::Node,
            })
            .collect()
    }

    fn declared_entries(&self, node: &GraphNode) -> Vec<VariableEntry> {
        let declared = self.capabilities.declared_outputs(&node.node_type);
        if declared.is_none() {
            trace!(node_id = %node.id, node_type = %node.node_type, "no capability info");
        }
        let dynamic = self.capabilities.dynamic_outputs(&node.node_type, &node.inputs);

        let mut seen: FxHashSet<String> = FxHashSet::default();
        declared
            .into_iter()
            .flatten()
            .chain(dynamic)
            .filter(|output| !output.name.is_empty() && seen.insert(output.name.clone()))
            .map(|output| self.declared_entry(node, output))
            .collect()
    }

    fn declared_entry(&self, node: &GraphNode, output: OutputDecl) -> VariableEntry {
        VariableEntry {
            path: format!("{}.{}", node.id, output.name),
            friendly_name: display_name(node, &output.name),
            source_label: node.display_label().to_string(),
            field_type: output.field_type.unwrap_or_default(),
            value_preview: None,
            scope: VariableScope::Node,
        }
    }
}

/// Node alias for the output, else derived from the output name
fn display_name(node: &GraphNode, output: &str) -> String {
    match node.aliases.get(output) {
        Some(alias) if !alias.trim().is_empty() => alias.clone(),
        _ => friendly_name(output),
    }
}

/// Variables visible at `target`, without observed outputs
pub fn resolve_variables(
    graph: &DependencyGraph,
    capabilities: &dyn CapabilityLookup,
    target: &str,
    globals: &GlobalPool,
) -> Vec<VariableEntry> {
    Resolver::new(graph, capabilities).resolve(target, globals)
}
