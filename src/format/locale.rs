//! Fixed locale rules for number, currency and calendar formatting
//!
//! Rules are static tables: resolving a locale never allocates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BindError;

/// Supported display locales
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US", alias = "en_US", alias = "en")]
    EnUs,
    #[serde(rename = "en-GB", alias = "en_GB")]
    EnGb,
    #[serde(rename = "de-DE", alias = "de_DE", alias = "de")]
    DeDe,
    #[serde(rename = "fr-FR", alias = "fr_FR", alias = "fr")]
    FrFr,
}

/// Currency with its symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }
}

/// Day/month order for numeric dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
}

/// Long date layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongDate {
    /// January 15, 2024
    MonthDayYear,
    /// 15 January 2024
    DayMonthYear,
    /// 15. Januar 2024
    DayDotMonthYear,
}

#[derive(Debug)]
pub struct LocaleRules {
    pub tag: &'static str,
    pub group_separator: &'static str,
    pub decimal_separator: &'static str,
    /// Symbol before the amount ("$1.00") or after it ("1,00 €")
    pub currency_prefix: bool,
    /// "12,5 %" vs "12.5%"
    pub percent_space: bool,
    pub date_order: DateOrder,
    pub date_separator: &'static str,
    /// Zero-pad day and month in short dates
    pub pad_date: bool,
    pub long_date: LongDate,
    pub months: [&'static str; 12],
    pub hour12: bool,
    pub datetime_separator: &'static str,
}

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static EN_US: LocaleRules = LocaleRules {
    tag: "en-US",
    group_separator: ",",
    decimal_separator: ".",
    currency_prefix: true,
    percent_space: false,
    date_order: DateOrder::MonthDayYear,
    date_separator: "/",
    pad_date: false,
    long_date: LongDate::MonthDayYear,
    months: ENGLISH_MONTHS,
    hour12: true,
    datetime_separator: ", ",
};

static EN_GB: LocaleRules = LocaleRules {
    tag: "en-GB",
    group_separator: ",",
    decimal_separator: ".",
    currency_prefix: true,
    percent_space: false,
    date_order: DateOrder::DayMonthYear,
    date_separator: "/",
    pad_date: true,
    long_date: LongDate::DayMonthYear,
    months: ENGLISH_MONTHS,
    hour12: false,
    datetime_separator: ", ",
};

static DE_DE: LocaleRules = LocaleRules {
    tag: "de-DE",
    group_separator: ".",
    decimal_separator: ",",
    currency_prefix: false,
    percent_space: true,
    date_order: DateOrder::DayMonthYear,
    date_separator: ".",
    pad_date: false,
    long_date: LongDate::DayDotMonthYear,
    months: [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ],
    hour12: false,
    datetime_separator: ", ",
};

static FR_FR: LocaleRules = LocaleRules {
    tag: "fr-FR",
    group_separator: " ",
    decimal_separator: ",",
    currency_prefix: false,
    percent_space: true,
    date_order: DateOrder::DayMonthYear,
    date_separator: "/",
    pad_date: true,
    long_date: LongDate::DayMonthYear,
    months: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    hour12: false,
    datetime_separator: " ",
};

impl Locale {
    pub const ALL: [Locale; 4] = [Locale::EnUs, Locale::EnGb, Locale::DeDe, Locale::FrFr];

    #[inline]
    pub fn rules(self) -> &'static LocaleRules {
        match self {
            Locale::EnUs => &EN_US,
            Locale::EnGb => &EN_GB,
            Locale::DeDe => &DE_DE,
            Locale::FrFr => &FR_FR,
        }
    }

    pub fn tag(self) -> &'static str {
        self.rules().tag
    }
}

impl FromStr for Locale {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().replace('_', "-").to_ascii_lowercase().as_str() {
            "en" | "en-us" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            "de" | "de-de" => Ok(Locale::DeDe),
            "fr" | "fr-fr" => Ok(Locale::FrFr),
            _ => Err(BindError::UnknownLocale { tag: s.to_string() }),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_tags() {
        assert_eq!("en-US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("en_gb".parse::<Locale>().unwrap(), Locale::EnGb);
        assert_eq!("de".parse::<Locale>().unwrap(), Locale::DeDe);
        assert_eq!(" FR-fr ".parse::<Locale>().unwrap(), Locale::FrFr);
        assert!("xx-YY".parse::<Locale>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_from_str() {
        for locale in Locale::ALL {
            assert_eq!(locale.to_string().parse::<Locale>().unwrap(), locale);
        }
    }

    #[test]
    fn test_serde_uses_bcp47_tags() {
        let locale: Locale = serde_json::from_str("\"de-DE\"").unwrap();
        assert_eq!(locale, Locale::DeDe);
        assert_eq!(serde_json::to_string(&Locale::EnGb).unwrap(), "\"en-GB\"");
    }
}
