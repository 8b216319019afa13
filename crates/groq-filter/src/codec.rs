//! Conversion between a list of document type names and the `_type in [...]`
//! filter that selects them.
//!
//! Names are written between double quotes without any escaping, a name that
//! contains a `"` produces a filter that does not parse. Reading a filter back
//! removes every quote character, so such a name cannot be recovered either.
//!
//! Reading accepts both `"double"` and `'single'` quoted names. A reader that
//! only removed double quotes would return `'author'` with its quotes for
//! `_type in ['author']`. That behavior is not kept.

use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"_type\s+in\s+\[([^\]]*)\]").unwrap());

/// Builds the canonical filter selecting the given type names, in order.
///
/// ```
/// use groq_filter::list_to_query;
///
/// assert_eq!(list_to_query(&["author", "book"]), r#"_type in ["author", "book"]"#);
/// assert_eq!(list_to_query::<&str>(&[]), "_type in []");
/// ```
pub fn list_to_query<S: AsRef<str>>(names: &[S]) -> String {
    let quoted: Vec<_> = names.iter().map(|name| format!("\"{}\"", name.as_ref())).collect();
    format!("_type in [{}]", quoted.join(", "))
}

/// Extracts the type names of the first `_type in [...]` clause found in `query`.
///
/// Whitespace around the names and both kinds of quotes are tolerated. A query
/// without such a clause gives an empty list.
pub fn query_to_list(query: &str) -> Vec<String> {
    let Some(captures) = TYPE_LIST.captures(query) else {
        return Vec::new();
    };

    captures[1]
        .split(',')
        .map(|token| token.trim().replace(['"', '\''], ""))
        .filter(|name| !name.is_empty())
        .collect()
}
