use once_cell::sync::Lazy;
use regex::Regex;

static SIMPLE_TYPE_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_type\s+in\s+\[[^\]]*\]$").unwrap());

/// Returns `true` when the filter is nothing more than a `_type in [...]` clause,
/// which is what the type checklist can edit.
///
/// A missing or empty filter is simple. The check is syntactic, so a redundant
/// pair of parentheses or any additional clause makes the filter complex.
pub fn is_simple_type_query(query: Option<&str>) -> bool {
    match query {
        None | Some("") => true,
        Some(query) => SIMPLE_TYPE_QUERY.is_match(query.trim()),
    }
}
