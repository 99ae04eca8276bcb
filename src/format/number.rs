//! Locale-aware fixed-point, currency and percent rendering

use super::locale::{Currency, LocaleRules};

/// Insert the locale group separator every three integer digits
fn group_digits(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// |n| rounded half away from zero at `fraction_digits`
fn rounded_abs(n: f64, fraction_digits: usize) -> f64 {
    let factor = 10f64.powi(fraction_digits as i32);
    let scaled = (n.abs() * factor).round() / factor;
    if scaled.is_finite() {
        scaled
    } else {
        n.abs()
    }
}

/// Unsigned magnitude with exactly `fraction_digits` decimals
fn magnitude(n: f64, fraction_digits: usize, rules: &LocaleRules) -> String {
    let fixed = format!("{:.*}", fraction_digits, rounded_abs(n, fraction_digits));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut out = group_digits(int_part, rules.group_separator);
    if !frac_part.is_empty() {
        out.push_str(rules.decimal_separator);
        out.push_str(frac_part);
    }
    out
}

/// "-" unless the value rounds to zero at this precision
fn sign(n: f64, fraction_digits: usize) -> &'static str {
    if n < 0.0 && rounded_abs(n, fraction_digits) != 0.0 {
        "-"
    } else {
        ""
    }
}

/// 1,234.50 / 1.234,50
pub fn fixed(n: f64, fraction_digits: usize, rules: &LocaleRules) -> String {
    format!("{}{}", sign(n, fraction_digits), magnitude(n, fraction_digits, rules))
}

/// $1,234.50 / 1.234,50 €
pub fn currency(n: f64, currency: Currency, rules: &LocaleRules) -> String {
    let amount = magnitude(n, 2, rules);
    let sign = sign(n, 2);
    if rules.currency_prefix {
        format!("{sign}{}{amount}", currency.symbol())
    } else {
        format!("{sign}{amount} {}", currency.symbol())
    }
}

/// Value on a 0-100 scale shown as percent, at most two decimals
pub fn percent(n: f64, rules: &LocaleRules) -> String {
    let fixed = fixed(n, 2, rules);
    let trimmed = if fixed.contains(rules.decimal_separator) {
        fixed
            .trim_end_matches('0')
            .trim_end_matches(rules.decimal_separator)
    } else {
        fixed.as_str()
    };
    if rules.percent_space {
        format!("{trimmed} %")
    } else {
        format!("{trimmed}%")
    }
}
