//! BNF grammar:
//!
//! ```text
//! blank          = (WS | "//" .* EOL)*
//! identifier     = (alpha | "_") (alphanumeric | "_")*
//! number         = digit+ ("." digit+)? (("e" | "E") ("+" | "-")? digit+)?
//! string         = doubleQuoted | singleQuoted
//! doubleQuoted   = "\"" (escape | all but double quotes)* "\""
//! singleQuoted   = "'" (escape | all but single quotes)* "'"
//! escape         = "\\" char
//! ```

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while};
use nom::character::complete::{char, digit1, multispace1, not_line_ending, one_of, satisfy};
use nom::combinator::{not, opt, recognize, value};
use nom::multi::many0_count;
use nom::sequence::{delimited, pair, terminated, tuple};
use nom::InputTake;

use crate::error::{Error, ErrorKind};
use crate::{IResult, Span, Token};

/// Skips whitespace and `//` line comments.
pub fn blank(input: Span) -> IResult<()> {
    value((), many0_count(alt((multispace1, recognize(pair(tag("//"), not_line_ending))))))(input)
}

/// remove OPTIONAL whitespaces and comments before AND after the provided parser.
pub fn ws<'a, O>(
    inner: impl FnMut(Span<'a>) -> IResult<'a, O>,
) -> impl FnMut(Span<'a>) -> IResult<'a, O> {
    delimited(blank, inner, blank)
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Matches `word` only when it is not directly followed by an identifier character,
/// so that `in` does not match the start of `index`.
pub fn keyword<'a>(word: &'static str) -> impl FnMut(Span<'a>) -> IResult<'a, Span<'a>> {
    move |input| terminated(tag(word), not(satisfy(is_identifier_char)))(input)
}

/// identifier     = (alpha | "_") (alphanumeric | "_")*
pub fn parse_identifier(input: Span) -> IResult<Token> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(is_identifier_char),
    ))(input)
    .map(|(rest, span)| (rest, span.into()))
}

/// number         = digit+ ("." digit+)? (("e" | "E") ("+" | "-")? digit+)?
///
/// A `.` is only part of the number when digits follow it, so `1..5` is a range.
pub fn parse_number(input: Span) -> IResult<Token> {
    recognize(tuple((
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
    .map(|(rest, span)| (rest, span.into()))
}

/// string         = doubleQuoted | singleQuoted
///
/// The token spans the content between the quotes. When the content contains escape
/// sequences the unescaped string is stored as the token value.
pub fn parse_string(input: Span) -> IResult<Token> {
    let (content, quote) = alt((char('"'), char('\'')))(input)?;

    let mut escaped = false;
    let mut has_escape = false;
    for (idx, c) in content.fragment().char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
            has_escape = true;
        } else if c == quote {
            let (rest, content) = content.take_split(idx);
            let (rest, _) = char(quote)(rest)?;
            let value = if has_escape {
                let unescaped = unescaper::unescape(content.fragment()).map_err(|e| {
                    nom::Err::Failure(Error::new_from_kind(
                        content,
                        ErrorKind::InvalidEscape(e.to_string()),
                    ))
                })?;
                Some(unescaped)
            } else {
                None
            };
            return Ok((rest, Token::new(content, value)));
        }
    }

    Err(nom::Err::Failure(Error::new_from_kind(input, ErrorKind::UnterminatedString(quote))))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::tests::rtok;

    fn span(input: &str) -> Span {
        Span::new_extra(input, input)
    }

    #[test]
    fn identifier() {
        let test_case = [
            ("_type", rtok("", "_type")),
            ("title", rtok("", "title")),
            ("slug.current", rtok("", "slug")),
            ("count(", rtok("", "count")),
            ("a1_b2 == 3", rtok("", "a1_b2")),
        ];

        for (input, expected) in test_case {
            let result = parse_identifier(span(input));
            assert!(result.is_ok(), "Identifier `{input}` was supposed to be parsed");
            assert_eq!(result.unwrap().1, expected, "Identifier `{input}` failed.");
        }

        assert!(parse_identifier(span("1abc")).is_err());
        assert!(parse_identifier(span("-abc")).is_err());
        assert!(parse_identifier(span("")).is_err());
    }

    #[test]
    fn number() {
        let test_case = [
            ("12", "12"),
            ("1.5", "1.5"),
            ("1e10", "1e10"),
            ("2.5E-3", "2.5E-3"),
            ("1..5", "1"),
            ("1...5", "1"),
            ("3.foo", "3"),
        ];

        for (input, expected) in test_case {
            let (_, token) = parse_number(span(input)).unwrap();
            assert_eq!(token.lexeme(), expected, "Number `{input}` failed.");
        }
    }

    #[test]
    fn string() {
        let test_case = [
            (r#""author""#, "author"),
            ("'author'", "author"),
            (r#""it's""#, "it's"),
            (r#"'say "hi"'"#, r#"say "hi""#),
            (r#""""#, ""),
            (r#""drafts.**""#, "drafts.**"),
            (r#""a\"b""#, r#"a"b"#),
            (r"'a\'b'", "a'b"),
            (r#""line\nbreak""#, "line\nbreak"),
        ];

        for (input, expected) in test_case {
            let result = parse_string(span(input));
            assert!(result.is_ok(), "String `{input}` was supposed to be parsed");
            let (rest, token) = result.unwrap();
            assert!(rest.is_empty(), "String `{input}` left `{rest}` behind");
            assert_eq!(token.value(), expected, "String `{input}` failed.");
        }
    }

    #[test]
    fn unterminated_string() {
        let Err(nom::Err::Failure(err)) = parse_string(span(r#""author"#)) else {
            panic!("an unterminated string must be a failure");
        };
        insta::assert_snapshot!(err, @r###"
        The string `\"author` is missing its closing quote: `"`.
        1:8 "author
        "###);
    }

    #[test]
    fn blanks_and_keywords() {
        let (rest, ()) = blank(span("  // a comment\n  title")).unwrap();
        assert_eq!(*rest.fragment(), "title");

        assert!(keyword("in")(span("in [1]")).is_ok());
        assert!(keyword("in")(span("in[1]")).is_ok());
        assert!(keyword("in")(span("index")).is_err());
        assert!(keyword("asc")(span("ascending")).is_err());
    }
}
