use clap::{Parser, Subcommand};
use groq_filter::FilterValidationPolicy;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Opt {
    /// The logs to print on stderr, as a list of `target=level` directives.
    #[arg(long, env = "GROQ_FILTER_LOG", default_value = "warn", global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Every command reading a `FILTER` reads it from stdin when it is omitted.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validates a filter and prints the result as JSON.
    ///
    /// Exits with the status code 1 when the filter is invalid.
    Validate {
        /// `strict` only accepts filter expressions, `permissive` any GROQ expression.
        #[arg(long, value_enum, env = "GROQ_FILTER_POLICY", default_value_t)]
        policy: FilterValidationPolicy,

        filter: Option<String>,
    },

    /// Prints `simple` when the filter is a plain `_type in [...]` clause and `complex` otherwise.
    Classify { filter: Option<String> },

    /// Prints the type names selected by the filter as a JSON array.
    ToList { filter: Option<String> },

    /// Prints the filter selecting the given type names.
    FromList { names: Vec<String> },

    /// Selects or unselects a type and prints the new filter.
    ///
    /// Nothing is printed when no type is left selected.
    Toggle {
        /// The type name to select or unselect.
        #[arg(long = "type")]
        type_name: String,

        filter: Option<String>,
    },

    /// Prints what a filter editor knows about the filter as JSON.
    Inspect {
        #[arg(long, value_enum, env = "GROQ_FILTER_POLICY", default_value_t)]
        policy: FilterValidationPolicy,

        filter: Option<String>,
    },

    /// Parses any GROQ query and prints its syntax tree.
    Parse { query: String },
}
