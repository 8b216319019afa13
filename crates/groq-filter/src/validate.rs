//! Validation of the GROQ filter typed by a user.
//!
//! A filter is the expression found between the brackets of `*[...]`. Two
//! policies are available:
//! - [`FilterValidationPolicy::Strict`] only accepts filter expressions. A full
//!   query such as `*[_type == "post"]` is rejected with a hint.
//! - [`FilterValidationPolicy::Permissive`] accepts any GROQ expression.
//!
//! The validator never fails. Syntax errors are reported in the returned
//! [`ValidationResult`].

use std::fmt;
use std::str::FromStr;

use groq_parser::{Node, NodeType};
use serde::{Deserialize, Serialize};

pub const FULL_QUERY_WITH_HINT: &str =
    r#"Enter a filter expression, not a full query. Remove the leading "*[" and trailing "]"."#;
pub const NOT_A_FILTER: &str = "Enter a filter expression, not a full query.";
const INVALID_FILTER_SYNTAX: &str = "Invalid GROQ filter syntax";
const INVALID_SYNTAX: &str = "Invalid GROQ syntax";

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterValidationPolicy {
    /// Only filter expressions, full queries are rejected.
    #[default]
    Strict,
    /// Any GROQ expression.
    Permissive,
}

impl fmt::Display for FilterValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValidationPolicy::Strict => write!(f, "strict"),
            FilterValidationPolicy::Permissive => write!(f, "permissive"),
        }
    }
}

impl FromStr for FilterValidationPolicy {
    type Err = ParsePolicyError;

    fn from_str(policy: &str) -> Result<Self, Self::Err> {
        if policy.eq_ignore_ascii_case("strict") {
            Ok(FilterValidationPolicy::Strict)
        } else if policy.eq_ignore_ascii_case("permissive") {
            Ok(FilterValidationPolicy::Permissive)
        } else {
            Err(ParsePolicyError(policy.to_owned()))
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("`{0}` is not a valid validation policy. Available policies are `strict` and `permissive`.")]
pub struct ParsePolicyError(pub String);

/// The outcome of a validation. `error` is only set when the filter is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { valid: true, error: None }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self { valid: false, error: Some(error.into()) }
    }
}

/// A diagnostic returned by a [`QueryParser`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ParserError(pub String);

impl From<groq_parser::Error<'_>> for ParserError {
    fn from(error: groq_parser::Error<'_>) -> Self {
        ParserError(error.to_string())
    }
}

/// Turns a GROQ query into its syntax tree.
pub trait QueryParser {
    fn parse<'t>(&self, query: &'t str) -> Result<Node<'t>, ParserError>;
}

/// The [`QueryParser`] backed by `groq_parser`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroqParser;

impl QueryParser for GroqParser {
    fn parse<'t>(&self, query: &'t str) -> Result<Node<'t>, ParserError> {
        Ok(Node::parse(query)?)
    }
}

#[derive(Debug, Clone)]
pub struct FilterValidator<P = GroqParser> {
    policy: FilterValidationPolicy,
    parser: P,
}

impl FilterValidator {
    pub fn new(policy: FilterValidationPolicy) -> Self {
        Self::with_parser(policy, GroqParser)
    }
}

impl Default for FilterValidator {
    fn default() -> Self {
        Self::new(FilterValidationPolicy::default())
    }
}

impl<P: QueryParser> FilterValidator<P> {
    pub fn with_parser(policy: FilterValidationPolicy, parser: P) -> Self {
        Self { policy, parser }
    }

    pub fn policy(&self) -> FilterValidationPolicy {
        self.policy
    }

    /// Validates a filter. A missing or empty filter is always valid.
    pub fn validate(&self, filter: Option<&str>) -> ValidationResult {
        let filter = match filter {
            None | Some("") => return ValidationResult::valid(),
            Some(filter) => filter,
        };

        let result = match self.policy {
            FilterValidationPolicy::Strict => self.validate_strict(filter),
            FilterValidationPolicy::Permissive => self.validate_permissive(filter),
        };

        if let Some(error) = &result.error {
            tracing::trace!(policy = %self.policy, filter, %error, "rejected filter");
        }

        result
    }

    fn validate_strict(&self, filter: &str) -> ValidationResult {
        let trimmed = filter.trim();
        if trimmed.starts_with('*') {
            return ValidationResult::invalid(FULL_QUERY_WITH_HINT);
        }

        // a filter expression wrapped in `*[...]` must give back a filter node
        let query = format!("*[{trimmed}]");
        match self.parser.parse(&query) {
            Ok(node) if node.node_type() == NodeType::Filter && node.filter_expr().is_some() => {
                ValidationResult::valid()
            }
            Ok(_) => ValidationResult::invalid(NOT_A_FILTER),
            Err(error) => ValidationResult::invalid(diagnostic(error, INVALID_FILTER_SYNTAX)),
        }
    }

    fn validate_permissive(&self, filter: &str) -> ValidationResult {
        match self.parser.parse(filter) {
            Ok(_) => ValidationResult::valid(),
            Err(error) => ValidationResult::invalid(diagnostic(error, INVALID_SYNTAX)),
        }
    }
}

fn diagnostic(error: ParserError, fallback: &str) -> String {
    if error.0.trim().is_empty() {
        fallback.to_string()
    } else {
        error.0
    }
}

/// Validates a filter expression with the strict policy.
pub fn validate_groq_filter(filter: Option<&str>) -> ValidationResult {
    FilterValidator::new(FilterValidationPolicy::Strict).validate(filter)
}

/// Validates any GROQ expression with the permissive policy.
pub fn validate_groq(filter: Option<&str>) -> ValidationResult {
    FilterValidator::new(FilterValidationPolicy::Permissive).validate(filter)
}
