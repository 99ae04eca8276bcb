//! Calendar formatting on top of chrono
//!
//! Date-like inputs: RFC 3339 strings, `YYYY-MM-DD[ T]HH:MM[:SS]` (read as
//! UTC), date-only forms (`2024-01-15`, `2024/01/15`, US-style `1/15/2024`,
//! `January 15, 2024`, `15 January 2024`) read as UTC midnight, and numbers
//! as epoch milliseconds. Slash dates are month-first.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde_json::Value;

use super::locale::{DateOrder, LocaleRules, LongDate};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"];

/// Parse a date-like string
pub fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Date view of a raw value
pub fn parse_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => {
            let millis = n.as_f64().filter(|m| m.is_finite())?;
            Utc.timestamp_millis_opt(millis as i64).single()
        }
        _ => None,
    }
}

/// 1/15/2024, 15/01/2024, 15.1.2024
pub fn short_date(dt: &DateTime<Utc>, rules: &LocaleRules) -> String {
    let (day, month) = if rules.pad_date {
        (format!("{:02}", dt.day()), format!("{:02}", dt.month()))
    } else {
        (dt.day().to_string(), dt.month().to_string())
    };
    let sep = rules.date_separator;
    match rules.date_order {
        DateOrder::MonthDayYear => format!("{month}{sep}{day}{sep}{}", dt.year()),
        DateOrder::DayMonthYear => format!("{day}{sep}{month}{sep}{}", dt.year()),
    }
}

/// January 15, 2024 / 15 January 2024 / 15. Januar 2024
pub fn long_date(dt: &DateTime<Utc>, rules: &LocaleRules) -> String {
    let month = rules.months[dt.month0() as usize];
    match rules.long_date {
        LongDate::MonthDayYear => format!("{month} {}, {}", dt.day(), dt.year()),
        LongDate::DayMonthYear => format!("{} {month} {}", dt.day(), dt.year()),
        LongDate::DayDotMonthYear => format!("{}. {month} {}", dt.day(), dt.year()),
    }
}

/// 2:30 PM / 14:30
pub fn short_time(dt: &DateTime<Utc>, rules: &LocaleRules) -> String {
    if rules.hour12 {
        let (pm, hour) = dt.hour12();
        format!("{hour}:{:02} {}", dt.minute(), if pm { "PM" } else { "AM" })
    } else {
        format!("{:02}:{:02}", dt.hour(), dt.minute())
    }
}

pub fn date_time(dt: &DateTime<Utc>, rules: &LocaleRules) -> String {
    format!(
        "{}{}{}",
        short_date(dt, rules),
        rules.datetime_separator,
        short_time(dt, rules)
    )
}

/// Coarse human phrase relative to `now` ("2 days ago", "in 3 hours")
pub fn relative(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(*dt).num_seconds();
    let past = delta >= 0;
    let secs = delta.unsigned_abs();

    if secs < 60 {
        return "just now".to_string();
    }

    let (amount, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    let plural = if amount == 1 { "" } else { "s" };

    if past {
        format!("{amount} {unit}{plural} ago")
    } else {
        format!("in {amount} {unit}{plural}")
    }
}
