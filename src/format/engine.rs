//! Formatter engine - value + formatter id → display string
//!
//! Total over all inputs: unknown ids and values that don't fit the
//! formatter fall back to identity stringification.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::trace;

use super::date;
use super::formatter::FormatterId;
use super::locale::{Currency, Locale};
use super::number;
use super::value::{as_number, stringify};

/// Formatter bound to a locale and, optionally, a fixed clock
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatterEngine {
    locale: Locale,
    now: Option<DateTime<Utc>>,
}

impl FormatterEngine {
    pub fn new(locale: Locale) -> Self {
        Self { locale, now: None }
    }

    /// Pin "now" for `date_relative` (previews, tests)
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    #[inline]
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Format by wire id
    pub fn format(&self, value: &Value, formatter: &str) -> String {
        match FormatterId::from_id(formatter) {
            Some(id) => self.apply(value, id),
            None => {
                trace!(formatter, "unknown formatter, using identity");
                stringify(value)
            }
        }
    }

    /// Format with an optional formatter id (as stored on a field reference)
    pub fn format_opt(&self, value: &Value, formatter: Option<&str>) -> String {
        formatter.map_or_else(|| stringify(value), |f| self.format(value, f))
    }

    pub fn apply(&self, value: &Value, id: FormatterId) -> String {
        let rules = self.locale.rules();
        match id {
            FormatterId::None => stringify(value),
            FormatterId::Uppercase => stringify(value).to_uppercase(),
            FormatterId::Lowercase => stringify(value).to_lowercase(),
            FormatterId::Capitalize => capitalize(&stringify(value)),
            FormatterId::Titlecase => titlecase(&stringify(value)),

            FormatterId::CurrencyUsd => self.numeric(value, |n| {
                number::currency(n, Currency::Usd, Locale::EnUs.rules())
            }),
            FormatterId::CurrencyEur => self.numeric(value, |n| {
                number::currency(n, Currency::Eur, Locale::DeDe.rules())
            }),
            FormatterId::CurrencyGbp => self.numeric(value, |n| {
                number::currency(n, Currency::Gbp, Locale::EnGb.rules())
            }),
            FormatterId::CurrencyAuto => self.numeric(value, |n| {
                number::currency(n, Currency::Usd, Locale::EnUs.rules())
            }),
            FormatterId::Decimal0 => self.numeric(value, |n| number::fixed(n, 0, rules)),
            FormatterId::Decimal1 => self.numeric(value, |n| number::fixed(n, 1, rules)),
            FormatterId::Decimal2 => self.numeric(value, |n| number::fixed(n, 2, rules)),
            FormatterId::Percentage => self.numeric(value, |n| number::percent(n, rules)),

            FormatterId::DateShort => self.dated(value, |dt| date::short_date(dt, rules)),
            FormatterId::DateLong => self.dated(value, |dt| date::long_date(dt, rules)),
            FormatterId::TimeShort => self.dated(value, |dt| date::short_time(dt, rules)),
            FormatterId::Datetime => self.dated(value, |dt| date::date_time(dt, rules)),
            FormatterId::DateRelative => {
                let now = self.now.unwrap_or_else(Utc::now);
                self.dated(value, |dt| date::relative(dt, &now))
            }
        }
    }

    fn numeric(&self, value: &Value, render: impl FnOnce(f64) -> String) -> String {
        as_number(value).map_or_else(|| stringify(value), render)
    }

    fn dated(&self, value: &Value, render: impl FnOnce(&DateTime<Utc>) -> String) -> String {
        date::parse_value(value).map_or_else(|| stringify(value), |dt| render(&dt))
    }
}

/// Format `value` with `formatter` under `locale`
pub fn format(value: &Value, formatter: &str, locale: Locale) -> String {
    FormatterEngine::new(locale).format(value, formatter)
}

/// First character upper, rest lower
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Capitalize each whitespace-separated word, keeping the whitespace
fn titlecase(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn en() -> FormatterEngine {
        FormatterEngine::new(Locale::EnUs)
            .with_now(date::parse_str("2024-01-17T14:30:00Z").unwrap())
    }

    #[test]
    fn test_case_formatters() {
        let engine = en();
        assert_eq!(engine.format(&json!("hello world"), "titlecase"), "Hello World");
        assert_eq!(engine.format(&json!("hELLO  wORLD"), "titlecase"), "Hello  World");
        assert_eq!(engine.format(&json!("hELLO"), "capitalize"), "Hello");
        assert_eq!(engine.format(&json!("MiXeD"), "lowercase"), "mixed");
        assert_eq!(engine.format(&json!("straße"), "uppercase"), "STRASSE");
        assert_eq!(engine.format(&json!(""), "capitalize"), "");
    }

    #[test]
    fn test_currency_formatters() {
        let engine = en();
        assert_eq!(engine.format(&json!(99.9), "currency_usd"), "$99.90");
        assert_eq!(engine.format(&json!("1234.5"), "currency_eur"), "1.234,50 €");
        assert_eq!(engine.format(&json!(10), "currency_gbp"), "£10.00");
        assert_eq!(engine.format(&json!(10), "currency_auto"), "$10.00");
    }

    #[test]
    fn test_currency_auto_ignores_caller_locale() {
        for locale in Locale::ALL {
            assert_eq!(
                FormatterEngine::new(locale).format(&json!(1234.5), "currency_auto"),
                "$1,234.50"
            );
        }
    }

    #[test]
    fn test_number_formatters() {
        let engine = en();
        assert_eq!(engine.format(&json!(1234.567), "decimal_0"), "1,235");
        assert_eq!(engine.format(&json!(1234.567), "decimal_1"), "1,234.6");
        assert_eq!(engine.format(&json!(3), "decimal_2"), "3.00");
        assert_eq!(engine.format(&json!(12.5), "percentage"), "12.5%");
    }

    #[test]
    fn test_date_formatters() {
        let engine = en();
        let v = json!("2024-01-15T14:30:00Z");
        assert_eq!(engine.format(&v, "date_short"), "1/15/2024");
        assert_eq!(engine.format(&v, "date_long"), "January 15, 2024");
        assert_eq!(engine.format(&v, "time_short"), "2:30 PM");
        assert_eq!(engine.format(&v, "datetime"), "1/15/2024, 2:30 PM");
        assert_eq!(engine.format(&v, "date_relative"), "2 days ago");
        assert_eq!(engine.format(&json!("1/15/2024"), "date_long"), "January 15, 2024");
        assert_eq!(engine.format(&json!("January 15, 2024"), "date_short"), "1/15/2024");
    }

    #[test]
    fn test_malformed_input_degrades_to_stringification() {
        let engine = en();
        assert_eq!(engine.format(&json!("abc"), "currency_usd"), "abc");
        assert_eq!(engine.format(&json!("soon"), "date_short"), "soon");
        assert_eq!(engine.format(&json!(true), "percentage"), "true");
        assert_eq!(engine.format(&json!({"a": 1}), "decimal_2"), r#"{"a":1}"#);
    }

    #[test]
    fn test_unknown_formatter_is_identity() {
        assert_eq!(en().format(&json!(42), "sparkle"), "42");
        assert_eq!(en().format(&json!("x"), "UPPERCASE"), "x");
    }

    #[test]
    fn test_null_formats_as_empty() {
        let engine = en();
        for id in FormatterId::ALL {
            assert_eq!(engine.apply(&Value::Null, id), "", "{id}");
        }
    }

    #[test]
    fn test_format_opt_without_formatter() {
        assert_eq!(en().format_opt(&json!(5.0), None), "5");
        assert_eq!(en().format_opt(&json!("a"), Some("uppercase")), "A");
    }

    #[test]
    fn test_free_function_uses_locale() {
        assert_eq!(format(&json!(0.5), "decimal_1", Locale::FrFr), "0,5");
    }
}
