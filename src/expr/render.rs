//! Rendering - expression + values → display string
//!
//! Sits above the codec and the formatter engine: literals are copied,
//! each field reference is looked up and passed through its formatter.
//! Missing values render as null (empty string).

use std::collections::HashMap;
use std::hash::BuildHasher;

use serde_json::{Map, Value};

use crate::catalog::FieldCatalog;
use crate::format::{sample_value, FormatterEngine};
use crate::util::jsonpath::{self, Segment as PathSegment};

use super::expression::{Expression, Segment};

/// Source of live field values
pub trait ValueLookup {
    fn lookup(&self, field: &str) -> Option<Value>;
}

/// Exact key first (flat maps keyed by dotted paths), then a dotted walk
fn lookup_with<'v>(field: &str, get: impl Fn(&str) -> Option<&'v Value>) -> Option<Value> {
    if let Some(value) = get(field) {
        return Some(value.clone());
    }
    let segments = jsonpath::parse(field)?;
    let (first, rest) = segments.split_first()?;
    let PathSegment::Field(root) = first else {
        return None;
    };
    jsonpath::apply(get(root)?, rest).cloned()
}

impl ValueLookup for Value {
    fn lookup(&self, field: &str) -> Option<Value> {
        lookup_with(field, |key| self.get(key))
    }
}

impl ValueLookup for Map<String, Value> {
    fn lookup(&self, field: &str) -> Option<Value> {
        lookup_with(field, |key| self.get(key))
    }
}

impl<S: BuildHasher> ValueLookup for HashMap<String, Value, S> {
    fn lookup(&self, field: &str) -> Option<Value> {
        lookup_with(field, |key| self.get(key))
    }
}

/// Render with live values
pub fn render(expr: &Expression, values: &dyn ValueLookup, engine: &FormatterEngine) -> String {
    render_segments(expr, engine, |field| values.lookup(field).unwrap_or(Value::Null))
}

/// Render a preview: live values when available, otherwise a mock value
/// matching the catalog type of the field
pub fn preview(
    expr: &Expression,
    catalog: &FieldCatalog,
    live: Option<&dyn ValueLookup>,
    engine: &FormatterEngine,
) -> String {
    render_segments(expr, engine, |field| {
        live.and_then(|values| values.lookup(field))
            .unwrap_or_else(|| sample_value(catalog.type_of(field)))
    })
}

fn render_segments(
    expr: &Expression,
    engine: &FormatterEngine,
    mut value_of: impl FnMut(&str) -> Value,
) -> String {
    let mut out = String::new();
    for segment in expr.segments() {
        match segment {
            Segment::Literal { text } | Segment::NumberLiteral { text } => out.push_str(text),
            Segment::FieldRef { field, formatter } => {
                let value = value_of(field);
                out.push_str(&engine.format_opt(&value, formatter.as_deref()));
            }
        }
    }
    out
}
