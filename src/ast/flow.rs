//! Flow document parsing structures
//!
//! ```yaml
//! nodes:
//!   - id: fetch
//!     type: http_request
//!     label: Fetch order
//!     aliases: {body: Order payload}
//!   - id: mail
//!     type: email
//!     bindings:
//!       subject: "Order {{fetch.body.id}} for {{customer|titlecase}}"
//! edges:
//!   - source: fetch
//!     target: [mail, audit]
//! variables: {customer: ada lovelace}
//! secrets: [SMTP_PASSWORD]
//! capabilities:
//!   http_request: {outputs: [status, {name: body, type: object}]}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::dag::{DependencyGraph, Edge, GraphNode};
use crate::error::{BindError, Result};
use crate::resolve::{CapabilityRegistry, GlobalPool, ObservedStore};

/// Automation flow as stored by the builder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    #[serde(default)]
    pub nodes: Vec<FlowNode>,
    #[serde(default)]
    pub edges: Vec<FlowEdge>,
    /// Flow-level variables (names without a dot)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Value>,
    /// Secret names, exposed as `env.NAME`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
    /// Inline capabilities, merged over any external table
    #[serde(default, skip_serializing_if = "CapabilityRegistry::is_empty")]
    pub capabilities: CapabilityRegistry,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub inputs: Value,
    /// Bound fields: field name → binding expression
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bindings: BTreeMap<String, String>,
    /// Last recorded output payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
}

impl FlowNode {
    pub fn to_graph_node(&self) -> GraphNode {
        GraphNode {
            id: self.id.clone(),
            node_type: self.node_type.clone(),
            label: self.label.clone(),
            aliases: self.aliases.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: FlowEndpoint,
    pub target: FlowEndpoint,
}

/// Handles string OR array for source/target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowEndpoint {
    Single(String),
    Multiple(Vec<String>),
}

impl FlowEndpoint {
    pub fn as_vec(&self) -> Vec<&str> {
        match self {
            FlowEndpoint::Single(s) => vec![s.as_str()],
            FlowEndpoint::Multiple(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }
}

impl FlowDocument {
    /// Parse a YAML flow document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BindError::FlowParse {
            details: e.to_string(),
        })
    }

    /// Load a YAML flow document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let doc = Self::from_yaml(&yaml)?;
        debug!(
            path = %path.display(),
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            "loaded flow document"
        );
        Ok(doc)
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn require_node(&self, id: &str) -> Result<&FlowNode> {
        self.node(id).ok_or_else(|| BindError::NodeNotFound {
            node_id: id.to_string(),
        })
    }

    /// Every `source -> target` pair, list endpoints expanded
    pub fn expanded_edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .flat_map(|edge| {
                let targets = edge.target.as_vec();
                edge.source
                    .as_vec()
                    .into_iter()
                    .flat_map(move |source| {
                        targets
                            .clone()
                            .into_iter()
                            .map(move |target| Edge::new(source, target))
                    })
            })
            .collect()
    }

    /// Dependency graph snapshot of the flow
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(
            self.nodes.iter().map(FlowNode::to_graph_node),
            self.expanded_edges(),
        )
    }

    pub fn globals(&self) -> GlobalPool {
        let mut pool = GlobalPool::new();
        for (name, value) in &self.variables {
            pool.insert_variable(name.as_str(), value.clone());
        }
        for name in &self.secrets {
            pool.insert_secret(name.as_str());
        }
        pool
    }

    /// Store pre-filled with each node's `observed` payload
    pub fn observed_store(&self) -> ObservedStore {
        let store = ObservedStore::new();
        for node in &self.nodes {
            if let Some(ref output) = node.observed {
                store.record(node.id.as_str(), output.clone());
            }
        }
        store
    }

    /// Inline capabilities over `base`
    pub fn capabilities_over(&self, mut base: CapabilityRegistry) -> CapabilityRegistry {
        base.merge(self.capabilities.clone());
        base
    }
}
