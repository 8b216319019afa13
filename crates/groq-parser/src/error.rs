use std::fmt::Display;

use nom::error::{self, ParseError};
use nom::Parser;

use crate::function::Arity;
use crate::{IResult, Span};

pub trait NomErrorExt<E> {
    fn map_err<O: FnOnce(E) -> E>(self, op: O) -> nom::Err<E>;
}

impl<E> NomErrorExt<E> for nom::Err<E> {
    fn map_err<O: FnOnce(E) -> E>(self, op: O) -> nom::Err<E> {
        match self {
            e @ Self::Failure(_) => e,
            e => e.map(op),
        }
    }
}

/// cut a parser and map the error
pub fn cut_with_err<'a, O>(
    mut parser: impl FnMut(Span<'a>) -> IResult<'a, O>,
    mut with: impl FnMut(Error<'a>) -> Error<'a>,
) -> impl FnMut(Span<'a>) -> IResult<'a, O> {
    move |input| match parser.parse(input) {
        Err(nom::Err::Error(e)) => Err(nom::Err::Failure(with(e))),
        rest => rest,
    }
}

#[derive(Debug)]
pub struct Error<'a> {
    context: Span<'a>,
    kind: ErrorKind<'a>,
}

#[derive(Debug)]
pub enum ErrorKind<'a> {
    ExpectedEof,
    ExpectedValue,
    ExpectedIdentifier,
    ExpectedPipeTarget,
    MissingClosingDelimiter(char),
    UnexpectedToken(char),
    UnterminatedString(char),
    InvalidEscape(String),
    NonChainingComparison,
    UnknownNamespace(&'a str),
    UnknownFunction { namespace: &'a str, name: &'a str },
    PipeFunctionOnly(&'a str),
    NotAPipeFunction(&'a str),
    InvalidArity { name: &'a str, expected: Arity, got: usize },
    SliceBounds,
    AttributeName,
    Char(char),
    InternalError(error::ErrorKind),
    DepthLimitReached,
    QueryTooLong,
}

impl<'a> Error<'a> {
    pub fn kind(&self) -> &ErrorKind<'a> {
        &self.kind
    }

    pub fn context(&self) -> &Span<'a> {
        &self.context
    }

    pub fn new_from_kind(context: Span<'a>, kind: ErrorKind<'a>) -> Self {
        Self { context, kind }
    }
}

impl<'a> ParseError<Span<'a>> for Error<'a> {
    fn from_error_kind(input: Span<'a>, kind: error::ErrorKind) -> Self {
        let kind = match kind {
            error::ErrorKind::Eof => ErrorKind::ExpectedEof,
            kind => ErrorKind::InternalError(kind),
        };
        Self { context: input, kind }
    }

    fn append(_input: Span<'a>, _kind: error::ErrorKind, other: Self) -> Self {
        other
    }

    fn from_char(input: Span<'a>, c: char) -> Self {
        Self { context: input, kind: ErrorKind::Char(c) }
    }
}

impl std::error::Error for Error<'_> {}

impl<'a> Display for Error<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let input = self.context.fragment();
        // `\n` is escaped so the first line stays the diagnostic and the second line the
        // incriminated query.
        let escaped_input = input.escape_debug();

        match &self.kind {
            ErrorKind::ExpectedEof => {
                writeln!(f, "Found unexpected characters at the end of the query: `{escaped_input}`. You probably forgot an operator such as `&&` or `||`.")?
            }
            ErrorKind::ExpectedValue if input.trim().is_empty() => {
                writeln!(f, "Was expecting a value but instead got nothing.")?
            }
            ErrorKind::ExpectedValue => {
                writeln!(f, "Was expecting a value but instead got `{escaped_input}`.")?
            }
            ErrorKind::ExpectedIdentifier if input.trim().is_empty() => {
                writeln!(f, "Was expecting an identifier but instead got nothing.")?
            }
            ErrorKind::ExpectedIdentifier => {
                writeln!(f, "Was expecting an identifier but instead got `{escaped_input}`.")?
            }
            ErrorKind::ExpectedPipeTarget if input.trim().is_empty() => {
                writeln!(f, "Expected a function call or a projection after `|` but instead got nothing.")?
            }
            ErrorKind::ExpectedPipeTarget => {
                writeln!(f, "Expected a function call or a projection after `|` but instead got `{escaped_input}`.")?
            }
            ErrorKind::MissingClosingDelimiter(c) => {
                writeln!(f, "Expression `{escaped_input}` is missing the following closing delimiter: `{c}`.")?
            }
            ErrorKind::UnexpectedToken(c) => {
                writeln!(f, "Expected `,` or `{c}` but instead found `{escaped_input}`.")?
            }
            ErrorKind::UnterminatedString(quote) => {
                writeln!(f, "The string `{escaped_input}` is missing its closing quote: `{quote}`.")?
            }
            ErrorKind::InvalidEscape(error) => {
                writeln!(f, "Invalid escape sequence in the string `{escaped_input}`: {error}.")?
            }
            ErrorKind::NonChainingComparison => {
                writeln!(f, "Comparison operators cannot be chained: `{escaped_input}`. Combine the comparisons with `&&` or `||`.")?
            }
            ErrorKind::UnknownNamespace(namespace) => {
                writeln!(f, "Undefined function namespace `{}`.", namespace.escape_debug())?
            }
            ErrorKind::UnknownFunction { namespace, name } => {
                writeln!(f, "Undefined function `{}::{}`.", namespace.escape_debug(), name.escape_debug())?
            }
            ErrorKind::PipeFunctionOnly(name) => {
                writeln!(f, "`{name}` can only be used as a pipe function, as in `... | {name}(...)`.")?
            }
            ErrorKind::NotAPipeFunction(name) => {
                writeln!(f, "`{name}` cannot be used after `|`. Only `order` and `score` are pipe functions.")?
            }
            ErrorKind::InvalidArity { name, expected, got } => {
                writeln!(f, "Function `{name}` expects {expected} but got {got}.")?
            }
            ErrorKind::SliceBounds => {
                writeln!(f, "Slice bounds must be integer literals: `{escaped_input}`.")?
            }
            ErrorKind::AttributeName => {
                writeln!(f, "Cannot determine the attribute name of `{escaped_input}`. Use `\"name\": expression` instead.")?
            }
            ErrorKind::Char(c) => {
                writeln!(f, "Was expecting `{c}` but instead got `{escaped_input}`.")?
            }
            ErrorKind::QueryTooLong => {
                // the query itself is not repeated, it can be arbitrarily long
                return write!(
                    f,
                    "The query is {} bytes long but queries are limited to {} bytes.",
                    self.context.extra.len(),
                    crate::MAX_QUERY_LENGTH
                );
            }
            ErrorKind::DepthLimitReached => writeln!(
                f,
                "The query exceeded the maximum depth limit. Try rewriting the query so that it contains fewer nested expressions."
            )?,
            ErrorKind::InternalError(kind) => writeln!(
                f,
                "Encountered an internal `{:?}` error while parsing your query. Please fill an issue", kind
            )?,
        }
        let base_column = self.context.get_utf8_column();
        let size = self.context.fragment().chars().count();

        write!(f, "{}:{} {}", base_column, base_column + size, self.context.extra)
    }
}
