use nom::{
    bytes::complete::{tag_no_case, take_while},
    character::complete::{multispace0, satisfy},
    combinator::{not, recognize, verify},
    error::ParseError,
    sequence::{delimited, pair, terminated},
    IResult, Parser,
};

use super::errors::JpqlParsingError;

pub type PResult<'a, O> = IResult<&'a str, O, JpqlParsingError<'a>>;

/// Words that end an expression or a clause and so can never be an alias.
const RESERVED_WORDS: &[&str] = &[
    "SELECT", "DISTINCT", "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "BY", "ASC", "DESC",
    "JOIN", "LEFT", "RIGHT", "FULL", "INNER", "OUTER", "CROSS", "FETCH", "ON", "WITH", "AS",
    "AND", "OR", "NOT", "IN", "IS", "NULL", "LIKE", "ESCAPE", "BETWEEN", "EXISTS", "CASE",
    "WHEN", "THEN", "ELSE", "END", "TRUE", "FALSE", "LIMIT", "OFFSET", "UNION",
];

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.iter().any(|r| r.eq_ignore_ascii_case(word))
}

/// Case-insensitive keyword that does not run into a following identifier
/// (`OR` must not match the start of `ORDER`).
pub fn keyword<'a>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = JpqlParsingError<'a>> {
    ws(terminated(tag_no_case(kw), not(satisfy(is_ident_char))))
}

/// Any identifier-shaped word, reserved or not.
pub fn word(input: &str) -> PResult<'_, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))).parse(input)
}

/// A word usable as a name or alias.
pub fn identifier(input: &str) -> PResult<'_, &str> {
    verify(word, |w: &str| !is_reserved(w)).parse(input)
}
