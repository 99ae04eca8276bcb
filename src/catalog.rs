//! Field catalogs - name + semantic type of the fields a data source exposes
//!
//! Catalogs are owned by the embedding application; the core only reads
//! them to populate pickers, filter formatters, and flag unresolved refs.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::expr::Expression;

/// Semantic type tag of a field or value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "string", alias = "str")]
    Text,
    #[serde(
        alias = "integer",
        alias = "int",
        alias = "float",
        alias = "decimal",
        alias = "currency"
    )]
    Number,
    #[serde(alias = "datetime", alias = "timestamp", alias = "time")]
    Date,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "array", alias = "json", alias = "list")]
    Object,
    #[default]
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Same leniency as deserialization: unrecognized tags are `Unknown`
impl FromStr for FieldType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" | "str" => FieldType::Text,
            "number" | "integer" | "int" | "float" | "decimal" | "currency" => FieldType::Number,
            "date" | "datetime" | "timestamp" | "time" => FieldType::Date,
            "boolean" | "bool" => FieldType::Boolean,
            "object" | "array" | "json" | "list" => FieldType::Object,
            _ => FieldType::Unknown,
        })
    }
}

/// External catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Supplies the catalog of a data source
pub trait CatalogProvider {
    fn fields(&self, source: &str) -> Vec<Field>;
}

/// Read-only snapshot of a catalog, unique by name (first entry wins)
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<Field>,
    index: FxHashMap<String, usize>,
}

impl FieldCatalog {
    pub fn new(fields: impl IntoIterator<Item = Field>) -> Self {
        let mut catalog = Self::default();
        for field in fields {
            if catalog.index.contains_key(&field.name) {
                continue;
            }
            catalog.index.insert(field.name.clone(), catalog.fields.len());
            catalog.fields.push(field);
        }
        catalog
    }

    pub fn from_provider(provider: &dyn CatalogProvider, source: &str) -> Self {
        Self::new(provider.fields(source))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Type of `name`, `Unknown` when absent
    pub fn type_of(&self, name: &str) -> FieldType {
        self.get(name).map_or(FieldType::Unknown, |f| f.field_type)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Bound fields of `expr` missing from this catalog, in order, deduplicated
    pub fn unresolved<'e>(&self, expr: &'e Expression) -> Vec<&'e str> {
        let mut missing: Vec<&str> = Vec::new();
        for (field, _) in expr.field_refs() {
            if !self.contains(field) && !missing.contains(&field) {
                missing.push(field);
            }
        }
        missing
    }
}

impl FromIterator<Field> for FieldCatalog {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self::new(iter)
    }
}
