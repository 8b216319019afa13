use std::io::Read;

use anyhow::{bail, Context};
use clap::Parser;
use groq_filter::groq_parser::Node;
use groq_filter::{
    is_simple_type_query, list_to_query, query_to_list, toggle_type, FilterState, FilterValidator,
};
use option::{Command, Opt};

mod logs;
mod option;

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    logs::setup_logs(&opt.log_filter)?;
    tracing::debug!(command = ?opt.command, "starting");

    match opt.command {
        Command::Validate { policy, filter } => {
            let filter = filter_or_stdin(filter)?;
            let result = FilterValidator::new(policy).validate(Some(&filter));
            println!("{}", serde_json::to_string(&result)?);
            if !result.valid {
                std::process::exit(1);
            }
        }
        Command::Classify { filter } => {
            let filter = filter_or_stdin(filter)?;
            let class = if is_simple_type_query(Some(&filter)) { "simple" } else { "complex" };
            println!("{class}");
        }
        Command::ToList { filter } => {
            let filter = filter_or_stdin(filter)?;
            println!("{}", serde_json::to_string(&query_to_list(&filter))?);
        }
        Command::FromList { names } => println!("{}", list_to_query(&names)),
        Command::Toggle { type_name, filter } => {
            let filter = filter_or_stdin(filter)?;
            match toggle_type(Some(&filter), &type_name) {
                Some(filter) => println!("{filter}"),
                None => tracing::debug!(%type_name, "no type left selected"),
            }
        }
        Command::Inspect { policy, filter } => {
            let filter = filter_or_stdin(filter)?;
            let state = FilterState::inspect(Some(&filter), &FilterValidator::new(policy));
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Parse { query } => match Node::parse(&query) {
            Ok(node) => println!("{node:#?}"),
            Err(error) => bail!("{error}"),
        },
    }

    Ok(())
}

fn filter_or_stdin(filter: Option<String>) -> anyhow::Result<String> {
    if let Some(filter) = filter {
        return Ok(filter);
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input).context("could not read the filter from stdin")?;
    let trimmed =
        input.strip_suffix('\n').map_or(input.as_str(), |s| s.strip_suffix('\r').unwrap_or(s));
    Ok(trimmed.to_string())
}
