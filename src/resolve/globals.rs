//! Global pool - flow variables and secrets, visible at every node
//!
//! Flow variables are plain names (`customer`). Secrets are exposed as
//! `env.NAME` and always preview as `SECRET_MASK`, whatever value the pool
//! was given for them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::catalog::FieldType;
use crate::format::{infer_type_from_value, preview};

use super::friendly::friendly_name;
use super::resolver::{VariableEntry, VariableScope};

/// Constant preview of every `env.` path
pub const SECRET_MASK: &str = "••••••••";

/// Path prefix of secret variables
pub const SECRET_PREFIX: &str = "env.";

/// Flow-level variables and secret names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalPool {
    #[serde(default)]
    variables: BTreeMap<String, Value>,
    #[serde(default)]
    secrets: BTreeSet<String>,
}

impl GlobalPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert_variable(name, value);
        self
    }

    /// Secret by name, with or without the `env.` prefix
    pub fn with_secret(mut self, name: impl Into<String>) -> Self {
        self.insert_secret(name);
        self
    }

    pub fn insert_variable(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn insert_secret(&mut self, name: impl Into<String>) {
        let name = name.into();
        let bare = name.strip_prefix(SECRET_PREFIX).unwrap_or(&name);
        if !bare.is_empty() {
            self.secrets.insert(bare.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.secrets.is_empty()
    }

    /// Pool entries: variables first, then secrets
    pub(crate) fn entries(&self, preview_len: usize) -> Vec<VariableEntry> {
        let mut entries = Vec::with_capacity(self.variables.len() + self.secrets.len());
        let mut secret_paths: BTreeSet<String> = BTreeSet::new();

        for (name, value) in &self.variables {
            if is_secret(name) {
                secret_paths.insert(name.clone());
                continue;
            }
            if name.is_empty() || name.contains('.') {
                warn!(name = %name, "skipping global variable: names cannot contain '.'");
                continue;
            }
            entries.push(VariableEntry {
                path: name.clone(),
                friendly_name: friendly_name(name),
                source_label: "Flow variable".to_string(),
                field_type: infer_type_from_value(value),
                value_preview: Some(preview(value, preview_len)),
                scope: VariableScope::Global,
            });
        }

        // Deserialized pools may carry prefixed or empty names
        secret_paths.extend(
            self.secrets
                .iter()
                .map(|name| name.strip_prefix(SECRET_PREFIX).unwrap_or(name))
                .filter(|name| !name.is_empty())
                .map(|name| format!("{SECRET_PREFIX}{name}")),
        );
        entries.extend(secret_paths.into_iter().map(|path| VariableEntry {
            friendly_name: friendly_name(&path),
            path,
            source_label: "Secret".to_string(),
            field_type: FieldType::Text,
            value_preview: Some(SECRET_MASK.to_string()),
            scope: VariableScope::Global,
        }));

        entries
    }
}

/// Any `env.` path is a secret
pub fn is_secret(path: &str) -> bool {
    path.starts_with(SECRET_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variables_and_secrets() {
        let pool = GlobalPool::new()
            .with_variable("customerName", json!("Ada"))
            .with_secret("API_KEY")
            .with_secret("env.API_KEY");

        let entries = pool.entries(48);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].path, "customerName");
        assert_eq!(entries[0].friendly_name, "Customer Name");
        assert_eq!(entries[0].field_type, FieldType::Text);
        assert_eq!(entries[0].value_preview.as_deref(), Some("Ada"));

        assert_eq!(entries[1].path, "env.API_KEY");
        assert_eq!(entries[1].value_preview.as_deref(), Some(SECRET_MASK));
        assert!(entries.iter().all(|e| e.scope == VariableScope::Global));
    }

    #[test]
    fn test_env_variables_never_expose_values() {
        let pool = GlobalPool::new().with_variable("env.TOKEN", json!("hunter2"));
        let entries = pool.entries(48);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "env.TOKEN");
        assert_eq!(entries[0].value_preview.as_deref(), Some(SECRET_MASK));
        assert!(!format!("{entries:?}").contains("hunter2"));
    }

    #[test]
    fn test_dotted_globals_are_skipped() {
        let pool = GlobalPool::new()
            .with_variable("order.total", json!(3))
            .with_variable("", json!(1))
            .with_variable("total", json!(3));
        let paths: Vec<String> = pool.entries(48).into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["total"]);
    }

    #[test]
    fn test_previews_are_truncated() {
        let pool = GlobalPool::new().with_variable("note", json!("abcdefghij"));
        assert_eq!(pool.entries(5)[0].value_preview.as_deref(), Some("abcd…"));
    }

    #[test]
    fn test_deserializes_from_yaml() {
        let pool: GlobalPool =
            serde_yaml::from_str("variables:\n  region: eu\nsecrets: [STRIPE_KEY]\n").unwrap();
        assert!(!pool.is_empty());
        assert_eq!(pool.entries(48).len(), 2);
    }
}
