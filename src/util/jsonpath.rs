//! JSONPath Parser - minimal subset
//!
//! Supports:
//! - $.a.b.c (dot notation)
//! - $.a[0].b (array index)
//! - a.b.c (without $ prefix)
//! - a.0.b (numeric segment as index)
//!
//! Does NOT support:
//! - Filters: $.a[?(@.x==1)]
//! - Wildcards: $.a[*]
//! - Slices: $.a[0:5]
//!
//! Malformed paths resolve to nothing; callers render that as a missing value.

use serde_json::Value;

/// A parsed JSONPath segment
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object field access: .field
    Field(String),
    /// Array index access: [0]
    Index(usize),
}

/// Parse a JSONPath string into segments, `None` when malformed
///
/// Examples:
/// - "$.price.currency" → [Field("price"), Field("currency")]
/// - "items[0].name" → [Field("items"), Index(0), Field("name")]
pub fn parse(path: &str) -> Option<Vec<Segment>> {
    let path = match path.strip_prefix("$.") {
        Some(stripped) => stripped,
        None if path == "$" => return Some(Vec::new()),
        None => path,
    };

    if path.is_empty() {
        return Some(Vec::new());
    }

    let mut segments = Vec::new();

    for part in path.split('.') {
        if part.is_empty() {
            return None;
        }

        // field[0], field[0][1] or just [0]
        if let Some(bracket_pos) = part.find('[') {
            let field = &part[..bracket_pos];
            if !field.is_empty() {
                segments.push(Segment::Field(field.to_string()));
            }

            let mut rest = &part[bracket_pos..];
            while !rest.is_empty() {
                let inner = rest.strip_prefix('[')?;
                let close = inner.find(']')?;
                segments.push(Segment::Index(inner[..close].parse().ok()?));
                rest = &inner[close + 1..];
            }
        } else if let Ok(index) = part.parse::<usize>() {
            segments.push(Segment::Index(index));
        } else {
            segments.push(Segment::Field(part.to_string()));
        }
    }

    Some(segments)
}

/// Apply JSONPath segments to a JSON value (by reference)
pub fn apply<'v>(value: &'v Value, segments: &[Segment]) -> Option<&'v Value> {
    let mut current = value;

    for segment in segments {
        current = match segment {
            Segment::Field(name) => current.get(name)?,
            Segment::Index(idx) => current.get(*idx)?,
        };
    }

    Some(current)
}

/// Parse and apply in one step
pub fn resolve<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    apply(value, &parse(path)?)
}
