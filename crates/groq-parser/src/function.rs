//! Function signatures known to the parser.
//!
//! GROQ rejects calls to unknown functions and calls with the wrong number of
//! arguments at parse time, so the parser needs to know every namespace, name and
//! arity. Functions are never evaluated here.

use std::fmt;

use crate::{Error, ErrorKind, Span, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Between(min, max) => (min..=max).contains(&count),
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match *self {
            Arity::Exactly(n) => write!(f, "{n} {}", plural(n)),
            Arity::AtLeast(n) => write!(f, "at least {n} {}", plural(n)),
            Arity::Between(min, max) => write!(f, "between {min} and {max} arguments"),
            Arity::Any => write!(f, "any number of arguments"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub namespace: &'static str,
    pub name: &'static str,
    pub arity: Arity,
    /// Pipe functions can only appear on the right side of `|`.
    pub pipe: bool,
}

const fn function(namespace: &'static str, name: &'static str, arity: Arity) -> Signature {
    Signature { namespace, name, arity, pipe: false }
}

const fn pipe_function(name: &'static str, arity: Arity) -> Signature {
    Signature { namespace: "global", name, arity, pipe: true }
}

pub const GLOBAL_NAMESPACE: &str = "global";

use Arity::*;

pub static SIGNATURES: &[Signature] = &[
    function("global", "after", Exactly(0)),
    function("global", "before", Exactly(0)),
    function("global", "boost", Exactly(2)),
    function("global", "coalesce", Any),
    function("global", "count", Exactly(1)),
    function("global", "dateTime", Exactly(1)),
    function("global", "defined", Exactly(1)),
    function("global", "identity", Exactly(0)),
    function("global", "length", Exactly(1)),
    function("global", "lower", Exactly(1)),
    function("global", "now", Exactly(0)),
    function("global", "path", Exactly(1)),
    function("global", "references", AtLeast(1)),
    function("global", "round", Between(1, 2)),
    function("global", "select", Any),
    function("global", "string", Exactly(1)),
    function("global", "upper", Exactly(1)),
    pipe_function("order", AtLeast(1)),
    pipe_function("score", AtLeast(1)),
    function("array", "compact", Exactly(1)),
    function("array", "intersects", Exactly(2)),
    function("array", "join", Exactly(2)),
    function("array", "unique", Exactly(1)),
    function("dateTime", "now", Exactly(0)),
    function("delta", "changedAny", Exactly(1)),
    function("delta", "changedOnly", Exactly(1)),
    function("delta", "operation", Exactly(0)),
    function("diff", "changedAny", Exactly(3)),
    function("diff", "changedOnly", Exactly(3)),
    function("geo", "contains", Exactly(2)),
    function("geo", "distance", Exactly(2)),
    function("geo", "intersects", Exactly(2)),
    function("geo", "latLng", Exactly(2)),
    function("math", "avg", Exactly(1)),
    function("math", "max", Exactly(1)),
    function("math", "min", Exactly(1)),
    function("math", "sum", Exactly(1)),
    function("pt", "text", Exactly(1)),
    function("releases", "all", Exactly(0)),
    function("sanity", "dataset", Exactly(0)),
    function("sanity", "partOfRelease", Exactly(1)),
    function("sanity", "projectId", Exactly(0)),
    function("sanity", "versionOf", Exactly(1)),
    function("string", "split", Exactly(2)),
    function("string", "startsWith", Exactly(2)),
    function("text", "semanticSimilarity", Exactly(1)),
];

/// Finds the signature of a function called as `namespace::name(...)` or,
/// when `in_pipe` is set, as `... | name(...)`.
pub fn resolve<'a>(
    namespace: Option<&Token<'a>>,
    name: &Token<'a>,
    argc: usize,
    in_pipe: bool,
) -> Result<&'static Signature, Error<'a>> {
    let name_span: Span<'a> = *name.span();
    let namespace_name = namespace.map_or(GLOBAL_NAMESPACE, |ns| *ns.span().fragment());

    if let Some(namespace) = namespace {
        if !SIGNATURES.iter().any(|s| s.namespace == namespace_name) {
            let span = *namespace.span();
            return Err(Error::new_from_kind(span, ErrorKind::UnknownNamespace(*span.fragment())));
        }
    }

    let signature = SIGNATURES
        .iter()
        .find(|s| s.namespace == namespace_name && s.name == *name_span.fragment())
        .ok_or_else(|| {
            let namespace = namespace.map_or(GLOBAL_NAMESPACE, |ns| *ns.span().fragment());
            Error::new_from_kind(
                name_span,
                ErrorKind::UnknownFunction { namespace, name: *name_span.fragment() },
            )
        })?;

    match (signature.pipe, in_pipe) {
        (true, false) => {
            return Err(Error::new_from_kind(
                name_span,
                ErrorKind::PipeFunctionOnly(*name_span.fragment()),
            ))
        }
        (false, true) => {
            return Err(Error::new_from_kind(
                name_span,
                ErrorKind::NotAPipeFunction(*name_span.fragment()),
            ))
        }
        _ => (),
    }

    if !signature.arity.accepts(argc) {
        return Err(Error::new_from_kind(
            name_span,
            ErrorKind::InvalidArity {
                name: *name_span.fragment(),
                expected: signature.arity,
                got: argc,
            },
        ));
    }

    Ok(signature)
}
