//! Formatter catalog - ids, categories, and type-based filtering

use std::fmt;

use serde::{Serialize, Serializer};

use crate::catalog::FieldType;

/// Applicability group of a formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterCategory {
    Basic,
    String,
    Currency,
    Number,
    Date,
}

impl FormatterCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatterCategory::Basic => "basic",
            FormatterCategory::String => "string",
            FormatterCategory::Currency => "currency",
            FormatterCategory::Number => "number",
            FormatterCategory::Date => "date",
        }
    }
}

/// Known formatter ids (case-sensitive on the wire)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatterId {
    None,
    Uppercase,
    Lowercase,
    Capitalize,
    Titlecase,
    CurrencyUsd,
    CurrencyEur,
    CurrencyGbp,
    /// USD with en-US rules, whatever the caller locale
    CurrencyAuto,
    Decimal0,
    Decimal1,
    Decimal2,
    Percentage,
    DateShort,
    DateLong,
    DateRelative,
    TimeShort,
    Datetime,
}

impl FormatterId {
    pub const ALL: [FormatterId; 18] = [
        FormatterId::None,
        FormatterId::Uppercase,
        FormatterId::Lowercase,
        FormatterId::Capitalize,
        FormatterId::Titlecase,
        FormatterId::CurrencyUsd,
        FormatterId::CurrencyEur,
        FormatterId::CurrencyGbp,
        FormatterId::CurrencyAuto,
        FormatterId::Decimal0,
        FormatterId::Decimal1,
        FormatterId::Decimal2,
        FormatterId::Percentage,
        FormatterId::DateShort,
        FormatterId::DateLong,
        FormatterId::DateRelative,
        FormatterId::TimeShort,
        FormatterId::Datetime,
    ];

    /// Look up a wire id; unknown ids return `None`
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormatterId::None => "none",
            FormatterId::Uppercase => "uppercase",
            FormatterId::Lowercase => "lowercase",
            FormatterId::Capitalize => "capitalize",
            FormatterId::Titlecase => "titlecase",
            FormatterId::CurrencyUsd => "currency_usd",
            FormatterId::CurrencyEur => "currency_eur",
            FormatterId::CurrencyGbp => "currency_gbp",
            FormatterId::CurrencyAuto => "currency_auto",
            FormatterId::Decimal0 => "decimal_0",
            FormatterId::Decimal1 => "decimal_1",
            FormatterId::Decimal2 => "decimal_2",
            FormatterId::Percentage => "percentage",
            FormatterId::DateShort => "date_short",
            FormatterId::DateLong => "date_long",
            FormatterId::DateRelative => "date_relative",
            FormatterId::TimeShort => "time_short",
            FormatterId::Datetime => "datetime",
        }
    }

    /// Picker label
    pub fn label(self) -> &'static str {
        match self {
            FormatterId::None => "None",
            FormatterId::Uppercase => "UPPERCASE",
            FormatterId::Lowercase => "lowercase",
            FormatterId::Capitalize => "Capitalize",
            FormatterId::Titlecase => "Title Case",
            FormatterId::CurrencyUsd => "Currency (USD)",
            FormatterId::CurrencyEur => "Currency (EUR)",
            FormatterId::CurrencyGbp => "Currency (GBP)",
            FormatterId::CurrencyAuto => "Currency (auto)",
            FormatterId::Decimal0 => "Integer",
            FormatterId::Decimal1 => "1 decimal",
            FormatterId::Decimal2 => "2 decimals",
            FormatterId::Percentage => "Percentage",
            FormatterId::DateShort => "Short date",
            FormatterId::DateLong => "Long date",
            FormatterId::DateRelative => "Relative date",
            FormatterId::TimeShort => "Time",
            FormatterId::Datetime => "Date and time",
        }
    }

    pub fn category(self) -> FormatterCategory {
        match self {
            FormatterId::None => FormatterCategory::Basic,
            FormatterId::Uppercase
            | FormatterId::Lowercase
            | FormatterId::Capitalize
            | FormatterId::Titlecase => FormatterCategory::String,
            FormatterId::CurrencyUsd
            | FormatterId::CurrencyEur
            | FormatterId::CurrencyGbp
            | FormatterId::CurrencyAuto => FormatterCategory::Currency,
            FormatterId::Decimal0
            | FormatterId::Decimal1
            | FormatterId::Decimal2
            | FormatterId::Percentage => FormatterCategory::Number,
            FormatterId::DateShort
            | FormatterId::DateLong
            | FormatterId::DateRelative
            | FormatterId::TimeShort
            | FormatterId::Datetime => FormatterCategory::Date,
        }
    }
}

impl fmt::Display for FormatterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FormatterId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Formatters a picker offers for a field of `field_type`
///
/// UX filter only: the engine accepts any formatter on any value.
pub fn formatters_for(field_type: FieldType) -> Vec<FormatterId> {
    FormatterId::ALL
        .into_iter()
        .filter(|f| match f.category() {
            FormatterCategory::Basic => true,
            FormatterCategory::Currency | FormatterCategory::Number => field_type == FieldType::Number,
            FormatterCategory::Date => field_type == FieldType::Date,
            FormatterCategory::String => {
                !matches!(field_type, FieldType::Number | FieldType::Date)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_roundtrip() {
        for id in FormatterId::ALL {
            assert_eq!(FormatterId::from_id(id.as_str()), Some(id));
        }
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        assert_eq!(FormatterId::from_id("UPPERCASE"), None);
        assert_eq!(FormatterId::from_id("Currency_USD"), None);
        assert_eq!(FormatterId::from_id("bogus"), None);
    }

    #[test]
    fn test_number_fields_get_numeric_formatters() {
        let offered = formatters_for(FieldType::Number);
        assert!(offered.contains(&FormatterId::None));
        assert!(offered.contains(&FormatterId::CurrencyUsd));
        assert!(offered.contains(&FormatterId::Percentage));
        assert!(!offered.contains(&FormatterId::Uppercase));
        assert!(!offered.contains(&FormatterId::DateShort));
    }

    #[test]
    fn test_date_fields_get_date_formatters() {
        let offered = formatters_for(FieldType::Date);
        assert!(offered.contains(&FormatterId::DateRelative));
        assert!(!offered.contains(&FormatterId::Decimal2));
        assert!(!offered.contains(&FormatterId::Titlecase));
    }

    #[test]
    fn test_other_fields_get_string_formatters() {
        for field_type in [
            FieldType::Text,
            FieldType::Boolean,
            FieldType::Object,
            FieldType::Unknown,
        ] {
            let offered = formatters_for(field_type);
            assert_eq!(offered.len(), 5, "{field_type}");
            assert_eq!(offered[0], FormatterId::None);
        }
    }

    #[test]
    fn test_serializes_as_wire_id() {
        assert_eq!(
            serde_json::to_string(&FormatterId::Decimal2).unwrap(),
            "\"decimal_2\""
        );
    }
}
