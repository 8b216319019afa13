//! State behind a filter input that offers two ways of editing the same value:
//! a checklist of document types, and a free-form GROQ editor.
//!
//! The checklist can only represent a plain `_type in [...]` filter, so any
//! other value, or a value with a syntax error, must be edited as GROQ.

use serde::{Deserialize, Serialize};

use crate::classify::is_simple_type_query;
use crate::codec::{list_to_query, query_to_list};
use crate::validate::{FilterValidator, QueryParser, ValidationResult};

const SYNTAX_ERROR_REASON: &str =
    "The current filter has a syntax error that needs to be fixed in the GROQ tab.";
const TOO_COMPLEX_REASON: &str =
    "The current filter is too complex to edit here. Use the GROQ tab to edit it.";

/// Selects `type_name` if it is not selected yet and unselects it otherwise.
///
/// Returns the filter selecting the resulting types, or `None` when no type is
/// left selected and the value must be unset.
pub fn toggle_type(current: Option<&str>, type_name: &str) -> Option<String> {
    let mut selected = current.map(query_to_list).unwrap_or_default();

    if selected.iter().any(|name| name == type_name) {
        selected.retain(|name| name != type_name);
    } else {
        selected.push(type_name.to_string());
    }

    if selected.is_empty() {
        None
    } else {
        Some(list_to_query(&selected))
    }
}

/// A type declared in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaType {
    pub name: String,
    /// `document`, `object`, `string`...
    #[serde(rename = "type")]
    pub kind: String,
}

impl SchemaType {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into() }
    }
}

/// The names of the document types a user can pick, minus the internal `sanity.`
/// ones, optionally narrowed to the names containing `search` (case-insensitive).
pub fn selectable_type_names<'t>(types: &'t [SchemaType], search: Option<&str>) -> Vec<&'t str> {
    let search = search.filter(|s| !s.is_empty()).map(str::to_lowercase);

    types
        .iter()
        .filter(|ty| ty.kind == "document" && !ty.name.starts_with("sanity."))
        .map(|ty| ty.name.as_str())
        .filter(|name| search.as_ref().map_or(true, |search| name.to_lowercase().contains(search)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Types,
    Groq,
}

impl Panel {
    /// The panel to open first: the checklist when it can represent the value.
    pub fn initial(value: Option<&str>) -> Self {
        if is_simple_type_query(value) {
            Panel::Types
        } else {
            Panel::Groq
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub is_simple: bool,
    pub validation: ValidationResult,
    pub selected_types: Vec<String>,
}

impl FilterState {
    pub fn inspect<P: QueryParser>(value: Option<&str>, validator: &FilterValidator<P>) -> Self {
        let selected_types = match value {
            None | Some("") => Vec::new(),
            Some(value) => query_to_list(value),
        };

        FilterState {
            is_simple: is_simple_type_query(value),
            validation: validator.validate(value),
            selected_types,
        }
    }

    fn types_available(&self) -> bool {
        self.is_simple && self.validation.valid
    }

    /// Complex or invalid values can only be edited as GROQ, whatever the user asked for.
    pub fn effective_panel(&self, requested: Panel) -> Panel {
        if self.types_available() {
            requested
        } else {
            Panel::Groq
        }
    }

    /// Why the types checklist cannot be used, if it cannot.
    pub fn types_unavailable_reason(&self) -> Option<&'static str> {
        if !self.validation.valid {
            Some(SYNTAX_ERROR_REASON)
        } else if !self.is_simple {
            Some(TOO_COMPLEX_REASON)
        } else {
            None
        }
    }
}
