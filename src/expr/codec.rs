//! Binding expression codec - `{{field|formatter}}` parse / serialize
//!
//! Two-state scanner:
//! - literal state: copies text, handles `\{` / `\\` escapes (escaped syntax)
//! - reference state: entered on `{{`, reads `name`, optional `|formatter`,
//!   and must end with `}}`. A failed reference consumes a single `{` as
//!   literal text and scanning resumes right after it.
//!
//! Malformed input never fails: unbalanced braces stay literal text.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::BindError;

use super::expression::{Expression, Segment};

/// Wire syntax variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// Literal `{` and `\` are escaped where needed so any literal text
    /// survives a serialize/parse cycle
    #[default]
    Escaped,
    /// Byte-compatible legacy syntax: no escapes, literal `{{` is
    /// reinterpreted as a reference on the next parse
    Legacy,
}

impl FromStr for Syntax {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "escaped" => Ok(Syntax::Escaped),
            "legacy" => Ok(Syntax::Legacy),
            _ => Err(BindError::UnknownSyntax {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Syntax::Escaped => "escaped",
            Syntax::Legacy => "legacy",
        })
    }
}

/// Parse with the default (escaped) syntax
pub fn parse(raw: &str) -> Expression {
    parse_with(raw, Syntax::default())
}

/// Serialize with the default (escaped) syntax
pub fn serialize(expr: &Expression) -> String {
    serialize_with(expr, Syntax::default())
}

/// Parse `raw` into segments
///
/// Example: `"Hello {{name}}!"` → `[Literal("Hello "), FieldRef("name"), Literal("!")]`
pub fn parse_with(raw: &str, syntax: Syntax) -> Expression {
    let bytes = raw.as_bytes();
    let mut expr = Expression::new();
    let mut literal = String::new();
    // Start of the verbatim run not yet copied into `literal`.
    // Only ever set right after an ASCII byte, so slicing stays on char boundaries.
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if syntax == Syntax::Escaped
                && matches!(bytes.get(i + 1), Some(b'{') | Some(b'\\')) =>
            {
                literal.push_str(&raw[run_start..i]);
                literal.push(char::from(bytes[i + 1]));
                i += 2;
                run_start = i;
            }
            b'{' if bytes.get(i + 1) == Some(&b'{') => match scan_reference(raw, i) {
                Some((segment, end)) => {
                    literal.push_str(&raw[run_start..i]);
                    if !literal.is_empty() {
                        expr.push(Segment::literal(std::mem::take(&mut literal)));
                    }
                    expr.push(segment);
                    i = end;
                    run_start = end;
                }
                None => {
                    trace!(position = i, "unterminated reference kept as literal");
                    i += 1;
                }
            },
            _ => i += 1,
        }
    }

    literal.push_str(&raw[run_start..]);
    if !literal.is_empty() {
        expr.push(Segment::literal(literal));
    }

    expr
}

/// Reference state: `open` points at `{{`. Returns the segment and the
/// index right after the closing `}}`.
fn scan_reference(raw: &str, open: usize) -> Option<(Segment, usize)> {
    let bytes = raw.as_bytes();
    let name_start = open + 2;
    let mut pos = name_start;

    while pos < bytes.len() && bytes[pos] != b'}' && bytes[pos] != b'|' {
        pos += 1;
    }
    if pos == name_start || pos >= bytes.len() {
        return None;
    }
    let name_end = pos;

    let mut formatter = None;
    if bytes[pos] == b'|' {
        let fmt_start = pos + 1;
        pos = fmt_start;
        while pos < bytes.len() && bytes[pos] != b'}' {
            pos += 1;
        }
        if pos >= bytes.len() {
            return None;
        }
        formatter = Some(&raw[fmt_start..pos]).filter(|f| !f.is_empty());
    }

    // bytes[pos] == b'}'
    if bytes.get(pos + 1) != Some(&b'}') {
        return None;
    }

    let segment = Segment::FieldRef {
        field: raw[name_start..name_end].to_string(),
        formatter: formatter.map(str::to_string),
    };
    Some((segment, pos + 2))
}

/// Serialize segments back to the wire string
pub fn serialize_with(expr: &Expression, syntax: Syntax) -> String {
    let segments: Vec<&Segment> = expr.segments().collect();
    let mut out = String::with_capacity(segments.len() * 16);

    for (idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Literal { text } | Segment::NumberLiteral { text } => match syntax {
                Syntax::Legacy => out.push_str(text),
                Syntax::Escaped => {
                    let next = segments[idx + 1..].iter().find_map(|s| first_char(s));
                    escape_literal(text, next, &mut out);
                }
            },
            Segment::FieldRef { field, formatter } => {
                out.push_str("{{");
                out.push_str(field);
                if let Some(formatter) = formatter {
                    out.push('|');
                    out.push_str(formatter);
                }
                out.push_str("}}");
            }
        }
    }

    out
}

fn first_char(segment: &Segment) -> Option<char> {
    match segment {
        Segment::Literal { text } | Segment::NumberLiteral { text } => text.chars().next(),
        Segment::FieldRef { .. } => Some('{'),
    }
}

/// Escape `{` followed by `{`, and `\` followed by `\` or `{`.
/// `next` is the first character emitted after this literal.
fn escape_literal(text: &str, next: Option<char>, out: &mut String) {
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        let following = chars.peek().copied().or(next);
        match (ch, following) {
            ('{', Some('{')) => out.push_str("\\{"),
            ('\\', Some('{' | '\\')) => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
}

/// Codec with a parse cache
///
/// Renderers format the same template for many rows; parsing once and
/// sharing the result through `Arc` keeps that path allocation-free.
pub struct Codec {
    syntax: Syntax,
    cache: DashMap<String, Arc<Expression>>,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(Syntax::default())
    }
}

impl Codec {
    pub fn new(syntax: Syntax) -> Self {
        Self {
            syntax,
            cache: DashMap::new(),
        }
    }

    #[inline]
    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// Parse (with caching)
    pub fn parse(&self, raw: &str) -> Arc<Expression> {
        if let Some(cached) = self.cache.get(raw) {
            trace!(len = raw.len(), "parse cache hit");
            return Arc::clone(&cached);
        }

        let expr = Arc::new(parse_with(raw, self.syntax));
        debug!(segments = expr.len(), syntax = %self.syntax, "parsed binding expression");
        self.cache.insert(raw.to_string(), Arc::clone(&expr));
        expr
    }

    pub fn serialize(&self, expr: &Expression) -> String {
        serialize_with(expr, self.syntax)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(raw: &str) -> Vec<Segment> {
        parse(raw).segments().cloned().collect()
    }

    #[test]
    fn test_parse_literal_field_literal() {
        assert_eq!(
            segments("Hello {{name}}!"),
            vec![
                Segment::literal("Hello "),
                Segment::field("name"),
                Segment::literal("!"),
            ]
        );
        assert_eq!(serialize(&parse("Hello {{name}}!")), "Hello {{name}}!");
    }

    #[test]
    fn test_parse_formatter() {
        assert_eq!(
            segments("{{price|currency_usd}}"),
            vec![Segment::field_with("price", "currency_usd")]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").is_empty());
        assert_eq!(serialize(&Expression::new()), "");
    }

    #[test]
    fn test_whitespace_is_kept_verbatim() {
        assert_eq!(
            segments("  a  {{ x }}  "),
            vec![
                Segment::literal("  a  "),
                Segment::field(" x "),
                Segment::literal("  "),
            ]
        );
    }

    #[test]
    fn test_unbalanced_braces_are_literal() {
        assert_eq!(segments("{{name"), vec![Segment::literal("{{name")]);
        assert_eq!(segments("{{name}"), vec![Segment::literal("{{name}")]);
        assert_eq!(segments("{{}}"), vec![Segment::literal("{{}}")]);
        assert_eq!(segments("}} {{"), vec![Segment::literal("}} {{")]);
    }

    #[test]
    fn test_failed_match_resumes_at_next_char() {
        // "{{{a}}" - the scan at 0 reads name "{a"
        assert_eq!(segments("{{{a}}"), vec![Segment::field("{a")]);
        // Nested opener swallowed into the name, same as a left-to-right pattern scan
        assert_eq!(segments("{{a {{b}}"), vec![Segment::field("a {{b")]);
    }

    #[test]
    fn test_empty_formatter_means_none() {
        assert_eq!(segments("{{a|}}"), vec![Segment::field("a")]);
    }

    #[test]
    fn test_formatter_may_contain_pipe() {
        assert_eq!(segments("{{a|b|c}}"), vec![Segment::field_with("a", "b|c")]);
    }

    #[test]
    fn test_adjacent_references() {
        assert_eq!(
            segments("{{a}}{{b|uppercase}}"),
            vec![Segment::field("a"), Segment::field_with("b", "uppercase")]
        );
    }

    #[test]
    fn test_trailing_brace_after_reference() {
        assert_eq!(
            segments("{{a}}}"),
            vec![Segment::field("a"), Segment::literal("}")]
        );
    }

    #[test]
    fn test_multibyte_text_around_references() {
        assert_eq!(
            segments("héllo {{naïve}} wörld"),
            vec![
                Segment::literal("héllo "),
                Segment::field("naïve"),
                Segment::literal(" wörld"),
            ]
        );
    }

    #[test]
    fn test_legacy_reinterprets_literal_braces() {
        let expr = Expression::from_segments([Segment::literal("a {{b}} c")]).unwrap();
        let raw = serialize_with(&expr, Syntax::Legacy);
        assert_eq!(raw, "a {{b}} c");
        assert_ne!(parse_with(&raw, Syntax::Legacy), expr);
    }

    #[test]
    fn test_escaped_preserves_literal_braces() {
        let expr =
            Expression::from_segments([Segment::literal("a {{b}} c"), Segment::field("x")]).unwrap();
        let raw = serialize(&expr);
        assert_eq!(raw, "a \\{{b}} c{{x}}");
        assert_eq!(parse(&raw), expr);
    }

    #[test]
    fn test_escaped_brace_before_reference() {
        let expr = Expression::from_segments([Segment::literal("{"), Segment::field("x")]).unwrap();
        let raw = serialize(&expr);
        assert_eq!(raw, "\\{{{x}}");
        assert_eq!(parse(&raw), expr);
    }

    #[test]
    fn test_escaped_backslashes() {
        let expr = Expression::from_segments([
            Segment::literal("path\\"),
            Segment::field("x"),
            Segment::literal("\\\\n \\d"),
        ])
        .unwrap();
        let raw = serialize(&expr);
        assert_eq!(parse(&raw), expr);
    }

    #[test]
    fn test_plain_text_is_unchanged_by_escaping() {
        let raw = "Price: {{price|currency_usd}} (incl. {tax})";
        assert_eq!(serialize(&parse(raw)), raw);
        assert_eq!(serialize_with(&parse_with(raw, Syntax::Legacy), Syntax::Legacy), raw);
    }

    #[test]
    fn test_legacy_keeps_backslashes() {
        assert_eq!(
            parse_with("\\{{a}}", Syntax::Legacy)
                .segments()
                .cloned()
                .collect::<Vec<_>>(),
            vec![Segment::literal("\\"), Segment::field("a")]
        );
    }

    #[test]
    fn test_number_literal_serializes_as_text() {
        let expr = Expression::from_segments([
            Segment::field("qty"),
            Segment::literal(" x "),
            Segment::number("3"),
        ])
        .unwrap();
        assert_eq!(serialize(&expr), "{{qty}} x 3");
    }

    #[test]
    fn test_syntax_from_str() {
        assert_eq!("Legacy".parse::<Syntax>().unwrap(), Syntax::Legacy);
        assert_eq!("escaped".parse::<Syntax>().unwrap(), Syntax::Escaped);
        assert!("regex".parse::<Syntax>().is_err());
    }

    #[test]
    fn test_cache_reuse() {
        let codec = Codec::default();
        let first = codec.parse("{{a}} and {{b}}");
        let second = codec.parse("{{a}} and {{b}}");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(codec.cached(), 1);
        codec.clear();
        assert_eq!(codec.cached(), 0);
    }
}
