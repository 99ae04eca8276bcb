//! Integration tests for binding expressions and formatting
//!
//! Exercises the public API the way an editor does: parse what the user
//! typed, edit segments, serialize back, and preview with formatters.

use bindkit::catalog::{Field, FieldCatalog, FieldType};
use bindkit::expr::{
    self, parse, parse_with, serialize, serialize_with, Codec, Expression, Segment, SegmentUpdate,
    Syntax,
};
use bindkit::format::{format, formatters_for, FormatterEngine, FormatterId, Locale};
use bindkit::BindError;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Parse / serialize
// ============================================================================

#[test]
fn test_hello_name_roundtrip() {
    let raw = "Hello {{name}}!";
    let expr = parse(raw);

    assert_eq!(
        expr.segments().cloned().collect::<Vec<_>>(),
        vec![
            Segment::literal("Hello "),
            Segment::field("name"),
            Segment::literal("!"),
        ]
    );
    assert_eq!(serialize(&expr), raw);
}

#[test]
fn test_single_reference_with_formatter() {
    let expr = parse("{{price|currency_usd}}");
    assert_eq!(expr.len(), 1);

    let segment = expr.segments().next().unwrap();
    assert_eq!(segment.field_name(), Some("price"));
    assert_eq!(segment.formatter(), Some("currency_usd"));

    assert_eq!(format(&json!(99.9), "currency_usd", Locale::EnUs), "$99.90");
}

#[test]
fn test_empty_input() {
    let expr = parse("");
    assert!(expr.is_empty());
    assert_eq!(serialize(&Expression::new()), "");
}

#[test]
fn test_malformed_braces_stay_literal() {
    for raw in ["{{", "{{}}", "{{name", "{{name}", "}} {{ x", "{single}"] {
        let expr = parse_with(raw, Syntax::Legacy);
        assert!(expr.is_static(), "{raw:?} should have no references");
        assert_eq!(serialize_with(&expr, Syntax::Legacy), raw);
    }
}

#[test]
fn test_legacy_reinterprets_literal_braces() {
    // A literal "{{x}}" typed as text comes back as a reference in legacy mode
    let expr = Expression::from_segments([Segment::literal("{{x}}")]).unwrap();
    let raw = serialize_with(&expr, Syntax::Legacy);
    assert_eq!(raw, "{{x}}");
    assert_ne!(parse_with(&raw, Syntax::Legacy), expr);
}

#[test]
fn test_escaped_keeps_literal_braces() {
    let expr = Expression::from_segments([
        Segment::literal("use {{x}} or \\"),
        Segment::field("y"),
    ])
    .unwrap();
    let raw = serialize(&expr);
    assert_eq!(raw, "use \\{{x}} or \\\\{{y}}");
    assert_eq!(parse(&raw), expr);
}

#[test]
fn test_escaped_and_legacy_agree_on_plain_input() {
    let raw = "Dear {{first|titlecase}}, your total is {{total|currency_eur}}.";
    assert_eq!(parse(raw), parse_with(raw, Syntax::Legacy));
    assert_eq!(serialize(&parse(raw)), raw);
}

// ============================================================================
// Editing
// ============================================================================

#[test]
fn test_editing_session() {
    let mut expr = parse("Hi {{name}}");
    let ids = expr.ids();

    // Add a formatter, append text, move it to the front
    expr.update(ids[1], SegmentUpdate::Formatter(Some("uppercase".into())))
        .unwrap();
    let bang = expr.append(Segment::literal("!")).unwrap();
    expr.move_segment(2, 0).unwrap();
    assert_eq!(serialize(&expr), "!Hi {{name|uppercase}}");

    // Remove, then the old id is gone for good
    expr.remove(bang).unwrap();
    assert!(matches!(
        expr.remove(bang),
        Err(BindError::SegmentNotFound { .. })
    ));
    assert!(matches!(
        expr.move_segment(0, 5),
        Err(BindError::IndexOutOfRange { index: 5, len: 2 })
    ));

    // Ids are never reused
    let fresh = expr.append(Segment::literal("?")).unwrap();
    assert!(!ids.contains(&fresh));
    assert_ne!(fresh, bang);
}

#[test]
fn test_rejected_edits_keep_the_round_trip() {
    let mut expr = parse("Total {{amount|decimal_2}}");
    let ids = expr.ids();

    assert!(matches!(
        expr.append(Segment::field("")),
        Err(BindError::InvalidFieldName { .. })
    ));
    assert!(matches!(
        expr.update(ids[1], SegmentUpdate::Field(Some("a|b".into()))),
        Err(BindError::InvalidFieldName { .. })
    ));
    assert!(matches!(
        expr.update(ids[1], SegmentUpdate::Formatter(Some("}".into()))),
        Err(BindError::InvalidFormatter { .. })
    ));

    expr.update(ids[1], SegmentUpdate::Field(Some("order.total".into())))
        .unwrap();
    expr.append(Segment::field_with("currency", "uppercase")).unwrap();
    let raw = serialize(&expr);
    assert_eq!(raw, "Total {{order.total|decimal_2}}{{currency|uppercase}}");
    assert_eq!(parse(&raw), expr);
}

#[test]
fn test_codec_cache_shares_parses() {
    let codec = Codec::new(Syntax::Escaped);
    let first = codec.parse("{{a}} and {{b}}");
    let second = codec.parse("{{a}} and {{b}}");
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(codec.cached(), 1);
    assert_eq!(codec.serialize(&first), "{{a}} and {{b}}");
}

// ============================================================================
// Formatting
// ============================================================================

#[test]
fn test_titlecase() {
    assert_eq!(format(&json!("hello world"), "titlecase", Locale::EnUs), "Hello World");
}

#[test]
fn test_currency_by_locale() {
    let value = json!(1234.5);
    assert_eq!(format(&value, "currency_usd", Locale::DeDe), "$1,234.50");
    assert_eq!(format(&value, "currency_eur", Locale::EnUs), "1.234,50 €");
    assert_eq!(format(&value, "currency_gbp", Locale::EnUs), "£1,234.50");
    assert_eq!(format(&value, "currency_auto", Locale::EnGb), "$1,234.50");
}

#[test]
fn test_null_and_unknown() {
    assert_eq!(format(&json!(null), "currency_usd", Locale::EnUs), "");
    assert_eq!(format(&json!("abc"), "no_such_formatter", Locale::EnUs), "abc");
    assert_eq!(format(&json!("abc"), "decimal_2", Locale::EnUs), "abc");
}

#[test]
fn test_formatter_filtering_by_type() {
    let number = formatters_for(FieldType::Number);
    assert!(number.contains(&FormatterId::CurrencyUsd));
    assert!(!number.contains(&FormatterId::Uppercase));

    let text = formatters_for(FieldType::Text);
    assert!(text.contains(&FormatterId::Titlecase));
    assert!(!text.contains(&FormatterId::DateShort));

    for field_type in [FieldType::Date, FieldType::Unknown] {
        assert!(formatters_for(field_type).contains(&FormatterId::None));
    }
}

#[test]
fn test_preview_with_samples_and_live_values() {
    let catalog = FieldCatalog::new([
        Field::new("customer", FieldType::Text),
        Field::new("total", FieldType::Number),
        Field::new("createdAt", FieldType::Date),
    ]);
    let expr = parse("{{customer|uppercase}} owes {{total|currency_usd}} since {{createdAt|date_relative}}");
    let engine = FormatterEngine::new(Locale::EnUs)
        .with_now(Utc.with_ymd_and_hms(2024, 1, 18, 14, 30, 0).unwrap());

    assert_eq!(
        expr::preview(&expr, &catalog, None, &engine),
        "SAMPLE TEXT owes $1,234.50 since 3 days ago"
    );

    let live = json!({"customer": "ada", "total": 5});
    assert_eq!(
        expr::preview(&expr, &catalog, Some(&live), &engine),
        "ADA owes $5.00 since 3 days ago"
    );
}
