//! Raw value helpers - stringification, numeric coercion, type inference
//!
//! Every consumer that needs to "guess the type from the value" goes
//! through `infer_type_from_value`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::catalog::FieldType;

use super::date;

/// ISO-8601 date or date-time, as produced by JSON APIs
static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$")
        .expect("ISO date pattern is valid")
});

/// Identity stringification
///
/// null → "", strings verbatim, integral floats without ".0",
/// arrays joined with ", ", objects as compact JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => number_to_string(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Shortest display of a float, integral values without a fraction
pub fn number_to_string(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Numeric view of a value: JSON numbers, or strings that parse as numbers
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Semantic type of a raw value
pub fn infer_type_from_value(value: &Value) -> FieldType {
    match value {
        Value::Null => FieldType::Unknown,
        Value::Bool(_) => FieldType::Boolean,
        Value::Number(_) => FieldType::Number,
        Value::String(s) => {
            let s = s.trim();
            if ISO_DATE_RE.is_match(s) && date::parse_str(s).is_some() {
                FieldType::Date
            } else {
                FieldType::Text
            }
        }
        Value::Array(_) | Value::Object(_) => FieldType::Object,
    }
}

/// Mock value used to preview a formatter when no live data exists
pub fn sample_value(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Text => json!("Sample text"),
        FieldType::Number => json!(1234.5),
        FieldType::Date => json!("2024-01-15T14:30:00Z"),
        FieldType::Boolean => json!(true),
        FieldType::Object => json!({"key": "value"}),
        FieldType::Unknown => Value::Null,
    }
}

/// Short single-line rendering for variable previews
pub fn preview(value: &Value, max_chars: usize) -> String {
    let full = stringify(value).replace(['\n', '\r'], " ");
    if full.chars().count() <= max_chars {
        return full;
    }
    let mut short: String = full.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&Value::Null), "");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&json!(5)), "5");
        assert_eq!(stringify(&json!(5.0)), "5");
        assert_eq!(stringify(&json!(99.9)), "99.9");
        assert_eq!(stringify(&json!(-0.25)), "-0.25");
        assert_eq!(stringify(&json!("hi")), "hi");
    }

    #[test]
    fn test_stringify_collections() {
        assert_eq!(stringify(&json!([1, "a", null])), "1, a, ");
        assert_eq!(stringify(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(as_number(&json!("abc")), None);
        assert_eq!(as_number(&json!("NaN")), None);
        assert_eq!(as_number(&json!(true)), None);
        assert_eq!(as_number(&Value::Null), None);
    }

    #[test]
    fn test_infer_types() {
        assert_eq!(infer_type_from_value(&json!(null)), FieldType::Unknown);
        assert_eq!(infer_type_from_value(&json!(false)), FieldType::Boolean);
        assert_eq!(infer_type_from_value(&json!(1.5)), FieldType::Number);
        assert_eq!(infer_type_from_value(&json!("hello")), FieldType::Text);
        assert_eq!(infer_type_from_value(&json!("42")), FieldType::Text);
        assert_eq!(infer_type_from_value(&json!("2024-01-15")), FieldType::Date);
        assert_eq!(
            infer_type_from_value(&json!("2024-01-15T14:30:00Z")),
            FieldType::Date
        );
        assert_eq!(infer_type_from_value(&json!("2024-13-45")), FieldType::Text);
        assert_eq!(infer_type_from_value(&json!([1])), FieldType::Object);
        assert_eq!(infer_type_from_value(&json!({})), FieldType::Object);
    }

    #[test]
    fn test_samples_match_their_type() {
        for field_type in [
            FieldType::Text,
            FieldType::Number,
            FieldType::Date,
            FieldType::Boolean,
            FieldType::Object,
            FieldType::Unknown,
        ] {
            assert_eq!(infer_type_from_value(&sample_value(field_type)), field_type);
        }
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview(&json!("short"), 10), "short");
        assert_eq!(preview(&json!("abcdefghijkl"), 5), "abcd…");
        assert_eq!(preview(&json!("a\nb"), 10), "a b");
    }
}
