//! Helpers around the GROQ filters used to scope which documents are exposed.
//!
//! A filter is the expression written between the brackets of `*[...]`, such as
//! `_type in ["post", "author"] && published == true`. This crate converts the
//! common `_type in [...]` filter to and from a list of type names, tells whether
//! a filter is that simple, and validates filters with a GROQ parser.
//!
//! ```
//! use groq_filter::{is_simple_type_query, list_to_query, query_to_list, validate_groq_filter};
//!
//! let filter = list_to_query(&["post", "author"]);
//! assert!(is_simple_type_query(Some(&filter)));
//! assert_eq!(query_to_list(&filter), ["post", "author"]);
//! assert!(validate_groq_filter(Some(&filter)).valid);
//! assert!(!validate_groq_filter(Some(r#"*[_type == "post"]"#)).valid);
//! ```

pub mod classify;
pub mod codec;
pub mod editor;
pub mod validate;

pub use classify::is_simple_type_query;
pub use codec::{list_to_query, query_to_list};
pub use editor::{selectable_type_names, toggle_type, FilterState, Panel, SchemaType};
pub use groq_parser;
pub use validate::{
    validate_groq, validate_groq_filter, FilterValidationPolicy, FilterValidator, GroqParser,
    ParsePolicyError, ParserError, QueryParser, ValidationResult,
};
