//! BNF grammar:
//!
//! ```text
//! query          = pipe EOF
//! pipe           = pair ("|" (funcCall | object) traversal*)*
//! pair           = or ("=>" or)?
//! or             = and ("||" and)*
//! and            = comparison ("&&" comparison)*
//! comparison     = additive ((op | "in" | "match") additive)? ("asc" | "desc")?
//!                | additive "in" additive (".." | "...") additive
//! op             = "==" | "!=" | "<=" | ">=" | "<" | ">"
//! additive       = multiplicative (("+" | "-") multiplicative)*
//! multiplicative = neg (("*" | "/" | "%") neg)*
//! neg            = "-" neg | power
//! power          = prefix ("**" neg)?
//! prefix         = ("!" | "+") prefix | postfix
//! postfix        = primary traversal*
//! traversal      = "." identifier | "[" "]" | "[" pipe ((".." | "...") pipe)? "]"
//!                | object | "->" identifier?
//! primary        = "*" | "@" | "^" (".^")* | "$" identifier | string | number
//!                | "true" | "false" | "null" | array | object | "(" pipe ")"
//!                | funcCall | identifier
//! funcCall       = (identifier "::")? identifier "(" (pipe ("," pipe)* ","?)? ")"
//! array          = "[" ("..."? pipe ("," "..."? pipe)* ","?)? "]"
//! object         = "{" (attribute ("," attribute)* ","?)? "}"
//! attribute      = "..." pipe? | string ":" pipe | pipe
//! ```
//!
//! Whitespace and `//` comments are allowed between every token.
//!
//! A square bracket traversal is resolved the way GROQ resolves it:
//! ```text
//! *[3]            AccessElement
//! *[1..3]         Slice
//! *["title"]      AccessAttribute
//! *[_type == "a"] Filter
//! ```
//!
//! Specific errors:
//! ================
//! - Comparison operators do not chain, `a == b == c` is rejected instead of being
//!   parsed as `(a == b) == c`.
//! - Functions are looked up while parsing: unknown namespaces, unknown functions,
//!   pipe functions used outside of a pipe and wrong argument counts are errors.
//! - An object attribute without a name must be an expression a name can be derived
//!   from, `{"x": count(a)}` is valid but `{count(a)}` is not.
//!

mod error;
pub mod function;
mod node;
mod value;

use error::{cut_with_err, NomErrorExt};
pub use error::{Error, ErrorKind};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, eof, map, not, opt};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::{Finish, InputTake};
pub use node::{ArrayElement, Node, NodeType, ObjectAttribute, Op, Value};
use nom_locate::LocatedSpan;
pub use value::{blank, parse_identifier, parse_number, parse_string};
use value::{keyword, ws};

pub type Span<'a> = LocatedSpan<&'a str, &'a str>;

type IResult<'a, Ret> = nom::IResult<Span<'a>, Ret, Error<'a>>;

/// The maximum depth of nested expressions. Every parenthesis, bracket, argument
/// list or prefix operator adds to the depth.
pub const MAX_QUERY_DEPTH: usize = 64;

/// The maximum length of a query, in bytes.
///
/// Chains such as `a && b && c` or `a.b.c` are parsed iteratively but produce trees as
/// deep as the chain is long. Bounding the input bounds the height of every tree the
/// parser can return, and with it the stack used to drop or walk that tree.
pub const MAX_QUERY_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Eq)]
pub struct Token<'a> {
    /// The token in the original input, it should be used when possible.
    span: Span<'a>,
    /// If you need to modify the original input you can use the `value` field
    /// to store your modified input.
    value: Option<String>,
}

impl<'a> PartialEq for Token<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.span.fragment() == other.span.fragment()
    }
}

impl<'a> Token<'a> {
    pub fn new(span: Span<'a>, value: Option<String>) -> Self {
        Self { span, value }
    }

    pub fn span(&self) -> &Span<'a> {
        &self.span
    }

    pub fn lexeme(&self) -> &str {
        &self.span
    }

    pub fn value(&self) -> &str {
        self.value.as_ref().map_or(&self.span, |value| value)
    }
}

impl<'a> From<Span<'a>> for Token<'a> {
    fn from(span: Span<'a>) -> Self {
        Self { span, value: None }
    }
}

impl<'a> Node<'a> {
    /// Parses a complete GROQ query. Blanks and comments around the query are ignored.
    pub fn parse(input: &'a str) -> Result<Self, Error<'a>> {
        let span = Span::new_extra(input, input);
        if input.len() > MAX_QUERY_LENGTH {
            return Err(Error::new_from_kind(span, ErrorKind::QueryTooLong));
        }
        parse_query(span).finish().map(|(_rem, output)| output)
    }
}

fn check_depth(input: Span, depth: usize) -> Result<(), nom::Err<Error>> {
    if depth > MAX_QUERY_DEPTH {
        Err(nom::Err::Failure(Error::new_from_kind(input, ErrorKind::DepthLimitReached)))
    } else {
        Ok(())
    }
}

/// Returns the part of `from` that was consumed to reach `to`.
fn consumed<'a>(from: Span<'a>, to: Span<'a>) -> Span<'a> {
    let (_, consumed) = from.take_split(from.fragment().len() - to.fragment().len());
    consumed
}

/// Parses the closing delimiter of a list or group opened at `opening`.
/// Fails with a missing delimiter when the input ends, and with an unexpected
/// token otherwise.
fn closing<'a>(opening: Span<'a>, delimiter: char) -> impl FnMut(Span<'a>) -> IResult<'a, char> {
    move |input| {
        cut_with_err(preceded(blank, char(delimiter)), |_| {
            let rest = blank(input).map_or(input, |(rest, ())| rest);
            if rest.is_empty() {
                Error::new_from_kind(opening, ErrorKind::MissingClosingDelimiter(delimiter))
            } else {
                Error::new_from_kind(rest, ErrorKind::UnexpectedToken(delimiter))
            }
        })(input)
    }
}

/// list           = open (element ("," element)* ","?)? close
fn parse_list<'a, O>(
    input: Span<'a>,
    open: char,
    close: char,
    mut element: impl FnMut(Span<'a>) -> IResult<'a, O>,
) -> IResult<'a, Vec<O>> {
    let (mut rest, _) = terminated(char(open), blank)(input)?;
    let mut elements = Vec::new();

    loop {
        if let Ok((after, _)) = preceded(blank, char::<_, Error>(close))(rest) {
            return Ok((after, elements));
        }
        // everything after the opening delimiter can be a failure
        let (after, el) = cut(&mut element)(rest)?;
        elements.push(el);
        match ws(char(','))(after) {
            Ok((after, _)) => rest = after,
            Err(_) => {
                let (after, _) = closing(input, close)(after)?;
                return Ok((after, elements));
            }
        }
    }
}

/// query          = pipe EOF
pub fn parse_query(input: Span) -> IResult<Node> {
    delimited(blank, |input| parse_pipe(input, 0), preceded(blank, eof))(input)
}

/// pipe           = pair ("|" (funcCall | object) traversal*)*
/// If we parse a `|` we MUST parse a function call or a projection behind.
pub fn parse_pipe(input: Span, depth: usize) -> IResult<Node> {
    check_depth(input, depth)?;
    let depth = depth + 1;

    let mut operator = preceded(blank, terminated(char::<_, Error>('|'), not(char('|'))));
    let (mut input, mut node) = parse_pair(input, depth)?;

    while let Ok((rest, _)) = operator(input) {
        let (rest, ()) = blank(rest)?;

        let (rest, next) = if rest.starts_with('{') {
            let (rest, expr) = parse_object(rest, depth)?;
            (rest, Node::Projection { base: Box::new(node), expr: Box::new(expr) })
        } else {
            let (rest, (namespace, name, args)) =
                cut_with_err(|input| parse_function_call(input, depth), |_| {
                    Error::new_from_kind(rest, ErrorKind::ExpectedPipeTarget)
                })(rest)?;
            if let Some(namespace) = namespace {
                return Err(nom::Err::Failure(Error::new_from_kind(
                    *namespace.span(),
                    ErrorKind::NotAPipeFunction(*name.span().fragment()),
                )));
            }
            function::resolve(None, &name, args.len(), true).map_err(nom::Err::Failure)?;
            (rest, Node::PipeFuncCall { base: Box::new(node), name, args })
        };

        let (rest, next) = parse_traversals(rest, next, depth)?;
        input = rest;
        node = next;
    }

    Ok((input, node))
}

/// pair           = or ("=>" or)?
fn parse_pair(input: Span, depth: usize) -> IResult<Node> {
    let (input, condition) = parse_or(input, depth)?;
    match ws(tag("=>"))(input) {
        Ok((input, _)) => {
            let (input, value) = cut(|input| parse_or(input, depth))(input)?;
            Ok((input, Node::Pair { condition: Box::new(condition), value: Box::new(value) }))
        }
        Err(_) => Ok((input, condition)),
    }
}

/// or             = and ("||" and)*
fn parse_or(input: Span, depth: usize) -> IResult<Node> {
    let (mut input, mut node) = parse_and(input, depth)?;
    // if we found a `||` then we MUST find something next
    while let Ok((rest, _)) = ws(tag("||"))(input) {
        let (rest, right) = cut(|input| parse_and(input, depth))(rest)?;
        node = Node::Or(Box::new(node), Box::new(right));
        input = rest;
    }
    Ok((input, node))
}

/// and            = comparison ("&&" comparison)*
fn parse_and(input: Span, depth: usize) -> IResult<Node> {
    let (mut input, mut node) = parse_comparison(input, depth)?;
    // if we found a `&&` then we MUST find something next
    while let Ok((rest, _)) = ws(tag("&&"))(input) {
        let (rest, right) = cut(|input| parse_comparison(input, depth))(rest)?;
        node = Node::And(Box::new(node), Box::new(right));
        input = rest;
    }
    Ok((input, node))
}

/// op             = "==" | "!=" | "<=" | ">=" | "<" | ">" | "in" | "match"
fn comparison_operator(input: Span) -> IResult<Op> {
    alt((
        map(tag("=="), |_| Op::Equal),
        map(tag("!="), |_| Op::NotEqual),
        map(tag("<="), |_| Op::LowerThanOrEqual),
        map(tag(">="), |_| Op::GreaterThanOrEqual),
        map(tag("<"), |_| Op::LowerThan),
        map(tag(">"), |_| Op::GreaterThan),
        map(keyword("in"), |_| Op::In),
        map(keyword("match"), |_| Op::Match),
    ))(input)
}

/// Returns `true` for the inclusive `..` and `false` for the exclusive `...`.
fn range_operator(input: Span) -> IResult<bool> {
    alt((map(tag("..."), |_| false), map(tag(".."), |_| true)))(input)
}

/// comparison     = additive ((op | "in" | "match") additive)? ("asc" | "desc")?
///                | additive "in" additive (".." | "...") additive
fn parse_comparison(input: Span, depth: usize) -> IResult<Node> {
    let (input, left) = parse_additive(input, depth)?;

    let (input, node) = match ws(comparison_operator)(input) {
        Ok((rest, op)) => {
            let (rest, right) = cut(|input| parse_additive(input, depth))(rest)?;
            let (rest, node) = match (op, ws(range_operator)(rest)) {
                (Op::In, Ok((rest, inclusive))) => {
                    let (rest, upper) = cut(|input| parse_additive(input, depth))(rest)?;
                    let node = Node::InRange {
                        base: Box::new(left),
                        left: Box::new(right),
                        right: Box::new(upper),
                        inclusive,
                    };
                    (rest, node)
                }
                _ => (rest, Node::OpCall { op, left: Box::new(left), right: Box::new(right) }),
            };

            if ws(comparison_operator)(rest).is_ok() {
                let (rest, ()) = blank(rest)?;
                return Err(nom::Err::Failure(Error::new_from_kind(
                    rest,
                    ErrorKind::NonChainingComparison,
                )));
            }
            (rest, node)
        }
        Err(_) => (input, left),
    };

    match preceded(blank, alt((keyword("asc"), keyword("desc"))))(input) {
        Ok((rest, direction)) if *direction.fragment() == "asc" => {
            Ok((rest, Node::Asc(Box::new(node))))
        }
        Ok((rest, _)) => Ok((rest, Node::Desc(Box::new(node)))),
        Err(_) => Ok((input, node)),
    }
}

/// additive       = multiplicative (("+" | "-") multiplicative)*
fn parse_additive(input: Span, depth: usize) -> IResult<Node> {
    let mut operator = ws(alt((map(char('+'), |_| Op::Add), map(char('-'), |_| Op::Sub))));
    let (mut input, mut node) = parse_multiplicative(input, depth)?;
    while let Ok((rest, op)) = operator(input) {
        let (rest, right) = cut(|input| parse_multiplicative(input, depth))(rest)?;
        node = Node::OpCall { op, left: Box::new(node), right: Box::new(right) };
        input = rest;
    }
    Ok((input, node))
}

/// multiplicative = neg (("*" | "/" | "%") neg)*
fn parse_multiplicative(input: Span, depth: usize) -> IResult<Node> {
    let mut operator = ws(alt((
        map(terminated(char('*'), not(char('*'))), |_| Op::Mul),
        map(char('/'), |_| Op::Div),
        map(char('%'), |_| Op::Rem),
    )));
    let (mut input, mut node) = parse_neg(input, depth)?;
    while let Ok((rest, op)) = operator(input) {
        let (rest, right) = cut(|input| parse_neg(input, depth))(rest)?;
        node = Node::OpCall { op, left: Box::new(node), right: Box::new(right) };
        input = rest;
    }
    Ok((input, node))
}

/// neg            = "-" neg | power
fn parse_neg(input: Span, depth: usize) -> IResult<Node> {
    check_depth(input, depth)?;
    match terminated(char('-'), blank)(input) {
        Ok((rest, _)) => {
            let (rest, inner) = cut(|input| parse_neg(input, depth + 1))(rest)?;
            Ok((rest, Node::Neg(Box::new(inner))))
        }
        Err(_) => parse_power(input, depth + 1),
    }
}

/// power          = prefix ("**" neg)?
fn parse_power(input: Span, depth: usize) -> IResult<Node> {
    let (input, base) = parse_prefix(input, depth)?;
    match ws(tag("**"))(input) {
        Ok((rest, _)) => {
            let (rest, exponent) = cut(|input| parse_neg(input, depth))(rest)?;
            let node =
                Node::OpCall { op: Op::Pow, left: Box::new(base), right: Box::new(exponent) };
            Ok((rest, node))
        }
        Err(_) => Ok((input, base)),
    }
}

/// prefix         = ("!" | "+") prefix | postfix
/// We can have multiple consecutive prefixes, eg: `!!defined(title)`.
/// If we parse a `!` we MUST parse something behind.
fn parse_prefix(input: Span, depth: usize) -> IResult<Node> {
    check_depth(input, depth)?;
    alt((
        map(
            preceded(terminated(char('!'), blank), cut(|input| parse_prefix(input, depth + 1))),
            |node| Node::Not(Box::new(node)),
        ),
        map(
            preceded(terminated(char('+'), blank), cut(|input| parse_prefix(input, depth + 1))),
            |node| Node::Pos(Box::new(node)),
        ),
        |input| parse_postfix(input, depth + 1),
    ))(input)
}

/// postfix        = primary traversal*
fn parse_postfix(input: Span, depth: usize) -> IResult<Node> {
    let (input, node) = parse_primary(input, depth)?;
    parse_traversals(input, node, depth)
}

/// traversal      = "." identifier | "[" "]" | "[" pipe ((".." | "...") pipe)? "]"
///                | object | "->" identifier?
fn parse_traversals<'a>(
    mut input: Span<'a>,
    mut node: Node<'a>,
    depth: usize,
) -> IResult<'a, Node<'a>> {
    loop {
        let (rest, ()) = blank(input)?;

        if let Ok((rest, _)) = terminated(char::<_, Error>('.'), not(char('.')))(rest) {
            let (rest, name) = preceded(
                blank,
                cut_with_err(parse_identifier, |e| {
                    Error::new_from_kind(*e.context(), ErrorKind::ExpectedIdentifier)
                }),
            )(rest)?;
            node = Node::AccessAttribute { base: Some(Box::new(node)), name };
            input = rest;
        } else if let Ok((rest, _)) = tag::<_, _, Error>("->")(rest) {
            let (rest, attribute) = opt(parse_identifier)(rest)?;
            node = Node::Deref { base: Box::new(node), attribute };
            input = rest;
        } else if rest.starts_with('[') {
            let (rest, next) = parse_bracket_traversal(rest, node, depth)?;
            node = next;
            input = rest;
        } else if rest.starts_with('{') {
            let (rest, expr) = parse_object(rest, depth)?;
            node = Node::Projection { base: Box::new(node), expr: Box::new(expr) };
            input = rest;
        } else {
            return Ok((input, node));
        }
    }
}

/// "[" "]" | "[" pipe ((".." | "...") pipe)? "]"
fn parse_bracket_traversal<'a>(
    input: Span<'a>,
    base: Node<'a>,
    depth: usize,
) -> IResult<'a, Node<'a>> {
    let (rest, _) = terminated(char('['), blank)(input)?;
    if let Ok((rest, _)) = char::<_, Error>(']')(rest) {
        return Ok((rest, Node::ArrayCoerce { base: Box::new(base) }));
    }

    // everything after the opening bracket can be a failure
    let (rest, expr) = cut(|input| parse_pipe(input, depth))(rest)?;
    let (rest, range) =
        opt(pair(ws(range_operator), cut(|input| parse_pipe(input, depth))))(rest)?;
    let (rest, _) = closing(input, ']')(rest)?;

    let base = Box::new(base);
    let node = match range {
        Some((inclusive, upper)) => match (expr.as_integer(), upper.as_integer()) {
            (Some(left), Some(right)) => Node::Slice { base, left, right, inclusive },
            _ => {
                let bounds = consumed(input, rest);
                return Err(nom::Err::Failure(Error::new_from_kind(bounds, ErrorKind::SliceBounds)));
            }
        },
        None => match expr {
            Node::Value(Value::String(name)) => Node::AccessAttribute { base: Some(base), name },
            expr => match expr.as_integer() {
                Some(index) => Node::AccessElement { base, index },
                None => Node::Filter { base, expr: Box::new(expr) },
            },
        },
    };

    Ok((rest, node))
}

/// funcCall       = (identifier "::")? identifier "(" (pipe ("," pipe)* ","?)? ")"
///
/// The function is not resolved here because pipe calls and regular calls are
/// resolved differently.
#[allow(clippy::type_complexity)]
fn parse_function_call<'a>(
    input: Span<'a>,
    depth: usize,
) -> IResult<'a, (Option<Token<'a>>, Token<'a>, Vec<Node<'a>>)> {
    let (input, namespace) = opt(terminated(parse_identifier, tag("::")))(input)?;
    let (input, name) = match namespace {
        Some(_) => cut_with_err(parse_identifier, |e| {
            Error::new_from_kind(*e.context(), ErrorKind::ExpectedIdentifier)
        })(input)?,
        None => parse_identifier(input)?,
    };

    let (args, ()) = blank(input)?;
    if !args.starts_with('(') {
        let error = Error::new_from_kind(args, ErrorKind::Char('('));
        return match namespace {
            // `namespace::name` can only be a function call
            Some(_) => Err(nom::Err::Failure(error)),
            None => Err(nom::Err::Error(error)),
        };
    }
    let (input, args) = parse_list(args, '(', ')', |input| parse_pipe(input, depth))?;

    Ok((input, (namespace, name, args)))
}

/// A function call outside of a pipe.
fn parse_function(input: Span, depth: usize) -> IResult<Node> {
    let (input, (namespace, name, args)) = parse_function_call(input, depth)?;
    function::resolve(namespace.as_ref(), &name, args.len(), false).map_err(nom::Err::Failure)?;
    Ok((input, Node::FuncCall { namespace, name, args }))
}

/// array          = "[" ("..."? pipe ("," "..."? pipe)* ","?)? "]"
fn parse_array(input: Span, depth: usize) -> IResult<Node> {
    let (input, elements) = parse_list(input, '[', ']', |input| parse_array_element(input, depth))?;
    Ok((input, Node::Array(elements)))
}

fn parse_array_element(input: Span, depth: usize) -> IResult<ArrayElement> {
    let (input, splat) = opt(terminated(tag("..."), blank))(input)?;
    let (input, value) = parse_pipe(input, depth)?;
    Ok((input, ArrayElement { value, is_splat: splat.is_some() }))
}

/// object         = "{" (attribute ("," attribute)* ","?)? "}"
fn parse_object(input: Span, depth: usize) -> IResult<Node> {
    let (input, attributes) =
        parse_list(input, '{', '}', |input| parse_object_attribute(input, depth))?;
    Ok((input, Node::Object(attributes)))
}

/// attribute      = "..." pipe? | string ":" pipe | pipe
fn parse_object_attribute(input: Span, depth: usize) -> IResult<ObjectAttribute> {
    if let Ok((rest, _)) = tag::<_, _, Error>("...")(input) {
        let (rest, ()) = blank(rest)?;
        if rest.starts_with(',') || rest.starts_with('}') {
            return Ok((rest, ObjectAttribute::Splat(Node::This)));
        }
        let (rest, value) = cut(|input| parse_pipe(input, depth))(rest)?;
        return Ok((rest, ObjectAttribute::Splat(value)));
    }

    if let Ok((rest, name)) = terminated(parse_string, ws(char(':')))(input) {
        let (rest, value) = cut(|input| parse_pipe(input, depth))(rest)?;
        return Ok((rest, ObjectAttribute::Value { name, value }));
    }

    let (rest, value) = parse_pipe(input, depth)?;
    match value {
        Node::Pair { condition, value } => {
            let attribute =
                ObjectAttribute::ConditionalSplat { condition: *condition, value: *value };
            Ok((rest, attribute))
        }
        value => match value.attribute_name().cloned() {
            Some(name) => Ok((rest, ObjectAttribute::Value { name, value })),
            None => Err(nom::Err::Failure(Error::new_from_kind(
                consumed(input, rest),
                ErrorKind::AttributeName,
            ))),
        },
    }
}

/// "^" (".^")*
fn parse_parent(input: Span) -> IResult<Node> {
    let (mut input, _) = char('^')(input)?;
    let mut levels = 1;
    while let Ok((rest, _)) = tag::<_, _, Error>(".^")(input) {
        levels += 1;
        input = rest;
    }
    Ok((input, Node::Parent { levels }))
}

/// "(" pipe ")"
/// If we find a first parenthesis, then we must parse an expression and find the closing
/// parenthesis.
fn parse_group(input: Span, depth: usize) -> IResult<Node> {
    let (rest, _) = terminated(char('('), blank)(input)?;
    let (rest, inner) = cut(|input| parse_pipe(input, depth))(rest)?;
    let (rest, _) = cut_with_err(preceded(blank, char(')')), |_| {
        Error::new_from_kind(input, ErrorKind::MissingClosingDelimiter(')'))
    })(rest)?;
    Ok((rest, Node::Group(Box::new(inner))))
}

/// primary        = "*" | "@" | "^" (".^")* | "$" identifier | string | number
///                | "true" | "false" | "null" | array | object | "(" pipe ")"
///                | funcCall | identifier
fn parse_primary(input: Span, depth: usize) -> IResult<Node> {
    alt((
        map(char('*'), |_| Node::Everything),
        map(char('@'), |_| Node::This),
        parse_parent,
        map(
            preceded(
                char('$'),
                cut_with_err(parse_identifier, |e| {
                    Error::new_from_kind(*e.context(), ErrorKind::ExpectedIdentifier)
                }),
            ),
            Node::Parameter,
        ),
        map(parse_string, |token| Node::Value(Value::String(token))),
        map(parse_number, |token| Node::Value(Value::Number(token))),
        map(keyword("true"), |_| Node::Value(Value::Boolean(true))),
        map(keyword("false"), |_| Node::Value(Value::Boolean(false))),
        map(keyword("null"), |_| Node::Value(Value::Null)),
        |input| parse_array(input, depth),
        |input| parse_object(input, depth),
        |input| parse_group(input, depth),
        |input| parse_function(input, depth),
        map(parse_identifier, |name| Node::AccessAttribute { base: None, name }),
    ))(input)
    // if the inner parsers did not match enough information to return an accurate error
    .map_err(|e| e.map_err(|_| Error::new_from_kind(input, ErrorKind::ExpectedValue)))
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// Create a raw [Token] from the text that comes before the element and the element itself.
    pub fn rtok<'a>(before: &'a str, value: &'a str) -> Token<'a> {
        // if the string is empty we still need to return 1 for the line number
        let lines = before.is_empty().then_some(1).unwrap_or_else(|| before.lines().count());
        let offset = before.chars().count();
        // the extra field is not checked in the tests so we can set it to nothing
        unsafe { Span::new_from_raw_offset(offset, lines as u32, value, "") }.into()
    }

    fn p(s: &str) -> impl std::fmt::Display + '_ {
        Node::parse(s).unwrap()
    }

    fn e(s: &str) -> impl std::fmt::Display + '_ {
        Node::parse(s).unwrap_err().to_string()
    }

    #[test]
    fn parse() {
        // filters
        insta::assert_snapshot!(p(r#"*[_type == "post"]"#), @r###"*[(_type == "post")]"###);
        insta::assert_snapshot!(p(r#"*[_type in ["author", "book"]]"#), @r###"*[(_type in ["author", "book"])]"###);
        insta::assert_snapshot!(p("// comment\n*[ _type == 'a' ] // trailing"), @r###"*[(_type == "a")]"###);

        // square brackets
        insta::assert_snapshot!(p("*[0]"), @"*[0]");
        insta::assert_snapshot!(p("*[-1]"), @"*[-1]");
        insta::assert_snapshot!(p("*[0...10]"), @"*[0...10]");
        insta::assert_snapshot!(p("*[0..10]"), @"*[0..10]");
        insta::assert_snapshot!(p(r#"*["title"]"#), @"*.title");
        insta::assert_snapshot!(p("*[]"), @"*[]");

        // projections and pipes
        insta::assert_snapshot!(p(r#"*[_type == "movie"]{title, "slug": slug.current, ...}"#), @r###"*[(_type == "movie")]{"title": title, "slug": slug.current, ...@}"###);
        insta::assert_snapshot!(p(r#"*[_type == "post"] | order(publishedAt desc)[0...10]"#), @r###"*[(_type == "post")] | order(publishedAt desc)[0...10]"###);
        insta::assert_snapshot!(p(r#"*[_type == "x"] | {title}"#), @r###"*[(_type == "x")]{"title": title}"###);
        insta::assert_snapshot!(p(r#"*[_type == "b"]{author->{name}}"#), @r###"*[(_type == "b")]{"author": author->{"name": name}}"###);
        insta::assert_snapshot!(p("author->name"), @"author->name");
        insta::assert_snapshot!(p("author->"), @"author->");

        // functions
        insta::assert_snapshot!(p(r#"count(*[_type == "post"]) > 10"#), @r###"(count(*[(_type == "post")]) > 10)"###);
        insta::assert_snapshot!(p(r#"!(_id in path("drafts.**"))"#), @r###"!((_id in path("drafts.**")))"###);
        insta::assert_snapshot!(p(r#"pt::text(body) match "word""#), @r###"(pt::text(body) match "word")"###);
        insta::assert_snapshot!(p(r#"select(age > 18 => "adult", "minor")"#), @r###"select((age > 18) => "adult", "minor")"###);

        // operators
        insta::assert_snapshot!(p("1 + 2 * 3"), @"(1 + (2 * 3))");
        insta::assert_snapshot!(p("-2 ** 2"), @"-(2 ** 2)");
        insta::assert_snapshot!(p("2 ** 3 ** 2"), @"(2 ** (3 ** 2))");
        insta::assert_snapshot!(p("a || b && c"), @"(a || (b && c))");
        insta::assert_snapshot!(p("!a == b"), @"(!a == b)");
        insta::assert_snapshot!(p("price in 10..20"), @"(price in 10..20)");

        // literals
        insta::assert_snapshot!(p(r#"{"a": 1, defined(x) => {"b": 2}}"#), @r###"{"a": 1, defined(x) => {"b": 2}}"###);
        insta::assert_snapshot!(p("[1, ...rest, 3]"), @"[1, ...rest, 3]");
    }

    #[test]
    fn bracket_resolution() {
        let query = Node::parse("*[3]").unwrap();
        assert_eq!(query.node_type(), NodeType::AccessElement);
        let query = Node::parse("*[1..3]").unwrap();
        assert_eq!(query.node_type(), NodeType::Slice);
        let query = Node::parse(r#"*["title"]"#).unwrap();
        assert_eq!(query.node_type(), NodeType::AccessAttribute);
        let query = Node::parse(r#"*[_type == "a"]"#).unwrap();
        assert_eq!(query.node_type(), NodeType::Filter);
        assert_eq!(query.filter_expr().map(Node::node_type), Some(NodeType::OpCall));
    }

    #[test]
    fn error() {
        insta::assert_snapshot!(e("_type =="), @r###"
        Was expecting a value but instead got nothing.
        9:9 _type ==
        "###);

        insta::assert_snapshot!(e("a == b == c"), @r###"
        Comparison operators cannot be chained: `== c`. Combine the comparisons with `&&` or `||`.
        8:12 a == b == c
        "###);

        insta::assert_snapshot!(e("(a == b"), @r###"
        Expression `(a == b` is missing the following closing delimiter: `)`.
        1:8 (a == b
        "###);

        insta::assert_snapshot!(e("a == b)"), @r###"
        Found unexpected characters at the end of the query: `)`. You probably forgot an operator such as `&&` or `||`.
        7:8 a == b)
        "###);

        insta::assert_snapshot!(e("foo(1)"), @r###"
        Undefined function `global::foo`.
        1:4 foo(1)
        "###);

        insta::assert_snapshot!(e("count(a, b)"), @r###"
        Function `count` expects 1 argument but got 2.
        1:6 count(a, b)
        "###);

        insta::assert_snapshot!(e("order(x)"), @r###"
        `order` can only be used as a pipe function, as in `... | order(...)`.
        1:6 order(x)
        "###);

        insta::assert_snapshot!(e("*[a] | count(a)"), @r###"
        `count` cannot be used after `|`. Only `order` and `score` are pipe functions.
        8:13 *[a] | count(a)
        "###);

        insta::assert_snapshot!(e("nope::thing()"), @r###"
        Undefined function namespace `nope`.
        1:5 nope::thing()
        "###);

        insta::assert_snapshot!(e("[1, 2"), @r###"
        Expression `[1, 2` is missing the following closing delimiter: `]`.
        1:6 [1, 2
        "###);

        insta::assert_snapshot!(e("[1 2]"), @r###"
        Expected `,` or `]` but instead found `2]`.
        4:6 [1 2]
        "###);

        insta::assert_snapshot!(e("*[a..b]"), @r###"
        Slice bounds must be integer literals: `[a..b]`.
        2:8 *[a..b]
        "###);

        insta::assert_snapshot!(e("{count(a)}"), @r###"
        Cannot determine the attribute name of `count(a)`. Use `"name": expression` instead.
        2:10 {count(a)}
        "###);

        insta::assert_snapshot!(e(r#""abc"#), @r###"
        The string `\"abc` is missing its closing quote: `"`.
        1:5 "abc
        "###);

        insta::assert_snapshot!(e(r#"*[_type in ["author"]"#), @r###"
        Expression `[_type in [\"author\"]` is missing the following closing delimiter: `]`.
        2:22 *[_type in ["author"]
        "###);
    }

    #[test]
    fn empty_query() {
        let error = Node::parse("   ").unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::ExpectedValue));
    }

    #[test]
    fn depth() {
        // every group adds three levels: the pipe, the negation and the prefix
        let nested = format!("{}a{}", "(".repeat(20), ")".repeat(20));
        assert!(Node::parse(&nested).is_ok());
        let nested = format!("{}a{}", "(".repeat(21), ")".repeat(21));
        let error = Node::parse(&nested).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::DepthLimitReached));

        let negated = format!("{}a", "!".repeat(10));
        assert!(Node::parse(&negated).is_ok());
        let negated = format!("{}a", "!".repeat(100));
        let error = Node::parse(&negated).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::DepthLimitReached));
    }

    #[test]
    fn long_chains() {
        // chains are not nested expressions, they are bounded by the query length
        let conditions = vec!["a == 1"; 1_000].join(" && ");
        let query = Node::parse(&conditions).unwrap();
        assert_eq!(query.node_type(), NodeType::And);

        let attributes = format!("a{}", ".a".repeat(4_900));
        assert!(Node::parse(&attributes).is_ok());
        let elements = format!("a{}", "[0]".repeat(3_000));
        assert!(Node::parse(&elements).is_ok());
        let derefs = format!("a{}", "->".repeat(4_900));
        assert!(Node::parse(&derefs).is_ok());
        let sum = vec!["1"; 2_400].join(" + ");
        assert!(Node::parse(&sum).is_ok());
    }

    #[test]
    fn too_long() {
        let query = format!("a{}", ".a".repeat(MAX_QUERY_LENGTH / 2));
        let error = Node::parse(&query).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::QueryTooLong));
        insta::assert_snapshot!(error, @"The query is 10001 bytes long but queries are limited to 10000 bytes.");

        let query = vec!["a == 1"; 100_000].join(" && ");
        let error = Node::parse(&query).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::QueryTooLong));

        let query = "a".repeat(MAX_QUERY_LENGTH);
        assert!(Node::parse(&query).is_ok());
    }

    #[test]
    fn token_value() {
        let query = Node::parse(r#"*[title == "a\"b"]"#).unwrap();
        let Some(Node::OpCall { right, .. }) = query.filter_expr() else {
            panic!("expected a comparison, got {query}");
        };
        let Node::Value(Value::String(token)) = right.as_ref() else {
            panic!("expected a string, got {right}");
        };
        assert_eq!(token.lexeme(), r#"a\"b"#);
        assert_eq!(token.value(), r#"a"b"#);
        assert_eq!(token, &rtok(r#"*[title == ""#, r#"a\"b"#));
    }
}

impl<'a> std::fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}
