//! Node capabilities - which outputs a node type can produce
//!
//! Static outputs are declared per node type. Input-dependent outputs are
//! read from one key of the node's input configuration (`dynamic_from`),
//! which may hold any of three shapes:
//!
//! ```yaml
//! fields: [name, email]                  # list of names
//! fields: [{name: age, type: number}]    # list of {name, type}
//! fields: {name: "", age: 0}             # object, keys are names
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::FieldType;
use crate::error::{BindError, Result};

/// One output a node type declares
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOutput")]
pub struct OutputDecl {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OutputDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: None,
            description: None,
        }
    }

    pub fn typed(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::new(name)
        }
    }
}

/// Accepts both `amount` and `{name: amount, type: number}`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOutput {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "type", default)]
        field_type: Option<FieldType>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<RawOutput> for OutputDecl {
    fn from(raw: RawOutput) -> Self {
        match raw {
            RawOutput::Name(name) => OutputDecl::new(name),
            RawOutput::Full {
                name,
                field_type,
                description,
            } => OutputDecl {
                name,
                field_type,
                description,
            },
        }
    }
}

/// External node-capability lookup
pub trait CapabilityLookup {
    /// Static outputs of a node type, `None` when the type is unknown
    fn declared_outputs(&self, node_type: &str) -> Option<Vec<OutputDecl>>;

    /// Outputs that depend on the node's input configuration
    fn dynamic_outputs(&self, _node_type: &str, _inputs: &Value) -> Vec<OutputDecl> {
        Vec::new()
    }
}

impl<F> CapabilityLookup for F
where
    F: Fn(&str) -> Option<Vec<OutputDecl>>,
{
    fn declared_outputs(&self, node_type: &str) -> Option<Vec<OutputDecl>> {
        self(node_type)
    }
}

/// Capability of one node type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    #[serde(default)]
    pub outputs: Vec<OutputDecl>,
    /// Input key listing input-dependent outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_from: Option<String>,
}

impl Capability {
    pub fn new(outputs: impl IntoIterator<Item = OutputDecl>) -> Self {
        Self {
            outputs: outputs.into_iter().collect(),
            dynamic_from: None,
        }
    }

    pub fn with_dynamic_from(mut self, key: impl Into<String>) -> Self {
        self.dynamic_from = Some(key.into());
        self
    }

    /// Outputs listed under `dynamic_from` in the node inputs
    pub fn dynamic_outputs(&self, inputs: &Value) -> Vec<OutputDecl> {
        let Some(listed) = self.dynamic_from.as_deref().and_then(|key| inputs.get(key)) else {
            return Vec::new();
        };

        match listed {
            Value::Array(items) => items.iter().filter_map(output_from_item).collect(),
            Value::Object(map) => map.keys().map(OutputDecl::new).collect(),
            _ => {
                debug!(
                    key = self.dynamic_from.as_deref().unwrap_or_default(),
                    "dynamic output key is neither a list nor an object"
                );
                Vec::new()
            }
        }
    }
}

fn output_from_item(item: &Value) -> Option<OutputDecl> {
    match item {
        Value::String(name) if !name.is_empty() => Some(OutputDecl::new(name.as_str())),
        Value::Object(_) => {
            let name = item.get("name")?.as_str().filter(|n| !n.is_empty())?;
            let field_type = item
                .get("type")
                .and_then(|t| serde_json::from_value::<FieldType>(t.clone()).ok());
            let description = item
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(OutputDecl {
                name: name.to_string(),
                field_type,
                description,
            })
        }
        _ => None,
    }
}

/// Capability table keyed by node type
///
/// ```yaml
/// http_request:
///   outputs:
///     - status
///     - {name: body, type: object}
/// form:
///   outputs: [submittedAt]
///   dynamic_from: fields
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityRegistry {
    entries: BTreeMap<String, Capability>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML capability table
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| BindError::CapabilityParse {
            details: e.to_string(),
        })
    }

    /// Load a YAML capability table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn insert(&mut self, node_type: impl Into<String>, capability: Capability) {
        self.entries.insert(node_type.into(), capability);
    }

    pub fn with(mut self, node_type: impl Into<String>, capability: Capability) -> Self {
        self.insert(node_type, capability);
        self
    }

    /// Entries of `other` replace entries of the same node type
    pub fn merge(&mut self, other: CapabilityRegistry) {
        self.entries.extend(other.entries);
    }

    pub fn get(&self, node_type: &str) -> Option<&Capability> {
        self.entries.get(node_type)
    }

    pub fn node_types(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CapabilityLookup for CapabilityRegistry {
    fn declared_outputs(&self, node_type: &str) -> Option<Vec<OutputDecl>> {
        self.get(node_type).map(|cap| cap.outputs.clone())
    }

    fn dynamic_outputs(&self, node_type: &str, inputs: &Value) -> Vec<OutputDecl> {
        self.get(node_type)
            .map(|cap| cap.dynamic_outputs(inputs))
            .unwrap_or_default()
    }
}
