//! Friendly names - `n1.customerEmail` → `Customer Email`

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing array indices: `items[0][2]`
static INDEX_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\[\d+\])+$").expect("index suffix pattern is valid"));

/// `totalAmount`, `item2Count`
static LOWER_UPPER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel boundary pattern is valid"));

/// `HTTPStatus` → `HTTP Status`
static ACRONYM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("acronym boundary pattern is valid"));

/// Display name of a variable path
///
/// Takes the final path segment without index suffixes (an all-digit
/// segment defers to the one before it), splits camelCase, snake_case and
/// kebab-case, then upper-cases the first letter of each word.
pub fn friendly_name(path: &str) -> String {
    let segment = last_named_segment(path);
    let spaced = ACRONYM_RE.replace_all(segment, "$1 $2");
    let spaced = LOWER_UPPER_RE.replace_all(&spaced, "$1 $2");

    spaced
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn last_named_segment(path: &str) -> &str {
    path.rsplit('.')
        .map(|segment| {
            INDEX_SUFFIX_RE
                .find(segment)
                .map_or(segment, |m| &segment[..m.start()])
        })
        .find(|segment| !segment.is_empty() && !segment.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or("")
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
