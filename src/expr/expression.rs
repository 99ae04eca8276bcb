//! Expression model - ordered segments with stable ids
//!
//! An `Expression` is owned by one editing session. Every segment gets a
//! `SegmentId` when it enters the expression; ids are monotonic and never
//! reused, even after removal.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{BindError, Result};

/// Identity of a segment inside one expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(u32);

impl SegmentId {
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Segment kind, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Literal,
    NumberLiteral,
    FieldRef,
}

impl SegmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Literal => "literal",
            SegmentKind::NumberLiteral => "number_literal",
            SegmentKind::FieldRef => "field_ref",
        }
    }
}

/// One atomic unit of a binding expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Verbatim text
    Literal { text: String },
    /// Numeric constant typed by the user, emitted as its text
    NumberLiteral { text: String },
    /// `{{field}}` or `{{field|formatter}}`
    FieldRef {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formatter: Option<String>,
    },
}

impl Segment {
    pub fn literal(text: impl Into<String>) -> Self {
        Segment::Literal { text: text.into() }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Segment::NumberLiteral { text: text.into() }
    }

    pub fn field(name: impl Into<String>) -> Self {
        Segment::FieldRef {
            field: name.into(),
            formatter: None,
        }
    }

    /// Field reference with a formatter; an empty formatter id means none
    pub fn field_with(name: impl Into<String>, formatter: impl Into<String>) -> Self {
        let formatter: String = formatter.into();
        Segment::FieldRef {
            field: name.into(),
            formatter: (!formatter.is_empty()).then_some(formatter),
        }
    }

    pub fn kind(&self) -> SegmentKind {
        match self {
            Segment::Literal { .. } => SegmentKind::Literal,
            Segment::NumberLiteral { .. } => SegmentKind::NumberLiteral,
            Segment::FieldRef { .. } => SegmentKind::FieldRef,
        }
    }

    /// Literal text (None for field references)
    pub fn text(&self) -> Option<&str> {
        match self {
            Segment::Literal { text } | Segment::NumberLiteral { text } => Some(text),
            Segment::FieldRef { .. } => None,
        }
    }

    /// Bound field name (None for literals)
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Segment::FieldRef { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Formatter id (None for literals and unformatted references)
    pub fn formatter(&self) -> Option<&str> {
        match self {
            Segment::FieldRef { formatter, .. } => formatter.as_deref(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_field_ref(&self) -> bool {
        matches!(self, Segment::FieldRef { .. })
    }

    /// A field reference must survive serialize + parse unchanged
    pub fn check(&self) -> Result<()> {
        match self {
            Segment::FieldRef { field, formatter } => {
                check_field_name(field)?;
                formatter.as_deref().map_or(Ok(()), check_formatter)
            }
            _ => Ok(()),
        }
    }
}

/// Non-empty, no `}` or `|`
fn check_field_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['}', '|']) {
        return Err(BindError::InvalidFieldName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Non-empty, no `}`
fn check_formatter(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('}') {
        return Err(BindError::InvalidFormatter { id: id.to_string() });
    }
    Ok(())
}

/// In-place edit applied to one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentUpdate {
    /// Replace literal text (ignored on field references)
    Text(String),
    /// Bind (promote to `FieldRef`) or clear (demote to empty `Literal`)
    Field(Option<String>),
    /// Set or clear the formatter (ignored on literals)
    Formatter(Option<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    id: SegmentId,
    segment: Segment,
}

#[derive(Serialize)]
struct EntryView<'a> {
    id: SegmentId,
    #[serde(flatten)]
    segment: &'a Segment,
}

/// Ordered sequence of segments
///
/// Equality compares segment content in order and ignores ids.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from segments, rejecting field references that would not
    /// survive a serialize/parse cycle
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Result<Self> {
        let mut expr = Self::new();
        for segment in segments {
            expr.append(segment)?;
        }
        Ok(expr)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Segments in concatenation order
    pub fn segments(&self) -> impl Iterator<Item = &Segment> + '_ {
        self.entries.iter().map(|e| &e.segment)
    }

    /// (id, segment) pairs in concatenation order
    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> + '_ {
        self.entries.iter().map(|e| (e.id, &e.segment))
    }

    pub fn ids(&self) -> Vec<SegmentId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.segment)
    }

    pub fn position(&self, id: SegmentId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Append a segment at the end and return its fresh id
    pub fn append(&mut self, segment: Segment) -> Result<SegmentId> {
        segment.check()?;
        Ok(self.push(segment))
    }

    /// Append without checks (the scanner only yields well-formed references)
    pub(super) fn push(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, segment });
        id
    }

    /// Apply an edit to the segment with `id`
    pub fn update(&mut self, id: SegmentId, update: SegmentUpdate) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(BindError::SegmentNotFound { id: id.0 })?;

        match &update {
            SegmentUpdate::Field(Some(field)) if !field.is_empty() => check_field_name(field)?,
            SegmentUpdate::Formatter(Some(formatter)) if !formatter.is_empty() => check_formatter(formatter)?,
            _ => {}
        }

        let current = std::mem::replace(&mut entry.segment, Segment::literal(""));
        entry.segment = apply_update(current, update, id);
        Ok(())
    }

    /// Remove the segment with `id`, returning it
    pub fn remove(&mut self, id: SegmentId) -> Result<Segment> {
        let index = self
            .position(id)
            .ok_or(BindError::SegmentNotFound { id: id.0 })?;
        Ok(self.entries.remove(index).segment)
    }

    /// Stable move: the segment at `from` ends up at index `to`, the others
    /// keep their relative order.
    pub fn move_segment(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        for index in [from, to] {
            if index >= len {
                return Err(BindError::IndexOutOfRange { index, len });
            }
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    /// Bound fields in order, with their formatter
    pub fn field_refs(&self) -> Vec<(&str, Option<&str>)> {
        self.segments()
            .filter_map(|s| match s {
                Segment::FieldRef { field, formatter } => Some((field.as_str(), formatter.as_deref())),
                _ => None,
            })
            .collect()
    }

    /// True when no field is bound (the expression renders to a constant)
    pub fn is_static(&self) -> bool {
        !self.segments().any(Segment::is_field_ref)
    }
}

fn apply_update(segment: Segment, update: SegmentUpdate, id: SegmentId) -> Segment {
    match (segment, update) {
        (Segment::Literal { .. }, SegmentUpdate::Text(text)) => Segment::Literal { text },
        (Segment::NumberLiteral { .. }, SegmentUpdate::Text(text)) => Segment::NumberLiteral { text },

        // Binding a field promotes a literal, clearing it demotes the reference
        (Segment::FieldRef { formatter, .. }, SegmentUpdate::Field(Some(field)))
            if !field.is_empty() =>
        {
            Segment::FieldRef { field, formatter }
        }
        (Segment::FieldRef { .. }, SegmentUpdate::Field(_)) => Segment::literal(""),
        (_, SegmentUpdate::Field(Some(field))) if !field.is_empty() => Segment::field(field),

        (Segment::FieldRef { field, .. }, SegmentUpdate::Formatter(formatter)) => Segment::FieldRef {
            field,
            formatter: formatter.filter(|f| !f.is_empty()),
        },

        (segment, update) => {
            trace!(segment = %id, kind = segment.kind().as_str(), ?update, "ignored update");
            segment
        }
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.segments().eq(other.segments())
    }
}

impl Eq for Expression {}

impl Serialize for Expression {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter().map(|e| EntryView {
            id: e.id,
            segment: &e.segment,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Expression, Vec<SegmentId>) {
        let mut expr = Expression::new();
        let a = expr.append(Segment::literal("Hello ")).unwrap();
        let b = expr.append(Segment::field("name")).unwrap();
        let c = expr.append(Segment::literal("!")).unwrap();
        (expr, vec![a, b, c])
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let (expr, ids) = sample();
        assert_eq!(expr.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_are_never_reused_after_remove() {
        let (mut expr, ids) = sample();
        expr.remove(ids[2]).unwrap();
        let fresh = expr.append(Segment::literal("?")).unwrap();
        assert!(!ids.contains(&fresh));
    }

    #[test]
    fn test_update_text_on_literal() {
        let (mut expr, ids) = sample();
        expr.update(ids[0], SegmentUpdate::Text("Hi ".into())).unwrap();
        assert_eq!(expr.get(ids[0]), Some(&Segment::literal("Hi ")));
    }

    #[test]
    fn test_binding_a_field_promotes_literal() {
        let (mut expr, ids) = sample();
        expr.update(ids[2], SegmentUpdate::Field(Some("suffix".into())))
            .unwrap();
        assert_eq!(expr.get(ids[2]), Some(&Segment::field("suffix")));
    }

    #[test]
    fn test_clearing_the_field_demotes_reference() {
        let (mut expr, ids) = sample();
        expr.update(ids[1], SegmentUpdate::Field(None)).unwrap();
        assert_eq!(expr.get(ids[1]), Some(&Segment::literal("")));

        let (mut expr, ids) = sample();
        expr.update(ids[1], SegmentUpdate::Field(Some(String::new())))
            .unwrap();
        assert_eq!(expr.get(ids[1]).map(Segment::kind), Some(SegmentKind::Literal));
    }

    #[test]
    fn test_rebinding_keeps_formatter() {
        let mut expr = Expression::new();
        let id = expr.append(Segment::field_with("price", "currency_usd")).unwrap();
        expr.update(id, SegmentUpdate::Field(Some("total".into())))
            .unwrap();
        assert_eq!(expr.get(id), Some(&Segment::field_with("total", "currency_usd")));
    }

    #[test]
    fn test_formatter_on_literal_is_ignored() {
        let (mut expr, ids) = sample();
        expr.update(ids[0], SegmentUpdate::Formatter(Some("uppercase".into())))
            .unwrap();
        assert_eq!(expr.get(ids[0]), Some(&Segment::literal("Hello ")));
    }

    #[test]
    fn test_text_on_field_ref_is_ignored() {
        let (mut expr, ids) = sample();
        expr.update(ids[1], SegmentUpdate::Text("nope".into())).unwrap();
        assert_eq!(expr.get(ids[1]), Some(&Segment::field("name")));
    }

    #[test]
    fn test_update_unknown_id_fails() {
        let (mut expr, _) = sample();
        let err = expr
            .update(SegmentId(99), SegmentUpdate::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, BindError::SegmentNotFound { id: 99 }));
    }

    #[test]
    fn test_move_is_stable_not_swap() {
        let mut expr = Expression::new();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|t| expr.append(Segment::literal(*t)).unwrap())
            .collect();

        expr.move_segment(0, 2).unwrap();
        assert_eq!(expr.ids(), vec![ids[1], ids[2], ids[0], ids[3]]);

        expr.move_segment(3, 0).unwrap();
        assert_eq!(expr.ids(), vec![ids[3], ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_move_out_of_range_leaves_expression_unchanged() {
        let (mut expr, ids) = sample();
        assert!(expr.move_segment(0, 3).is_err());
        assert_eq!(expr.ids(), ids);
    }

    #[test]
    fn test_equality_ignores_ids() {
        let (mut left, ids) = sample();
        left.remove(ids[0]).unwrap();
        let right = Expression::from_segments([Segment::field("name"), Segment::literal("!")]).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_field_refs_and_static() {
        let (expr, _) = sample();
        assert_eq!(expr.field_refs(), vec![("name", None)]);
        assert!(!expr.is_static());
        assert!(Expression::from_segments([Segment::number("42")]).unwrap().is_static());
    }

    #[test]
    fn test_serializes_with_ids_and_kind_tags() {
        let expr = Expression::from_segments([
            Segment::literal("Total: "),
            Segment::field_with("price", "currency_usd"),
        ])
        .unwrap();
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json[0]["kind"], "literal");
        assert_eq!(json[1]["id"], 1);
        assert_eq!(json[1]["formatter"], "currency_usd");
    }

    #[test]
    fn test_kind_names_match_serde_tags() {
        for segment in [Segment::literal("a"), Segment::number("1"), Segment::field("x")] {
            let json = serde_json::to_value(&segment).unwrap();
            assert_eq!(json["kind"], segment.kind().as_str());
        }
    }

    #[test]
    fn test_append_rejects_unparseable_field_refs() {
        let mut expr = Expression::new();
        for name in ["", "a}", "a|b"] {
            let err = expr.append(Segment::field(name)).unwrap_err();
            assert!(matches!(err, BindError::InvalidFieldName { .. }), "{name:?}");
        }
        for id in ["", "x}"] {
            let segment = Segment::FieldRef {
                field: "price".to_string(),
                formatter: Some(id.to_string()),
            };
            let err = expr.append(segment).unwrap_err();
            assert!(matches!(err, BindError::InvalidFormatter { .. }), "{id:?}");
        }
        assert!(expr.is_empty());
        assert!(Expression::from_segments([Segment::literal("ok"), Segment::field("")]).is_err());
    }

    #[test]
    fn test_update_rejects_unparseable_field_name() {
        let (mut expr, ids) = sample();
        let before = expr.clone();

        let err = expr
            .update(ids[1], SegmentUpdate::Field(Some("a|b".into())))
            .unwrap_err();
        assert!(matches!(err, BindError::InvalidFieldName { .. }));
        assert!(expr.update(ids[0], SegmentUpdate::Field(Some("}".into()))).is_err());
        assert!(expr
            .update(ids[1], SegmentUpdate::Formatter(Some("upper}case".into())))
            .is_err());
        assert_eq!(expr, before);
        assert_eq!(expr.ids(), before.ids());
    }
}
