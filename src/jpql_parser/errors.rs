use nom::error::{ContextError, ParseError};
use std::fmt;
use thiserror::Error;

#[derive(Debug, PartialEq)]
pub struct JpqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> JpqlParsingError<'a> {
    pub fn new(input: &'a str, ctx: &'static str) -> Self {
        JpqlParsingError {
            errors: vec![(input, ctx)],
        }
    }
}

impl<'a> ParseError<&'a str> for JpqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        JpqlParsingError {
            errors: vec![(input, "unknown error")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unknown error (appended)"));
        other
    }
}

impl<'a> ContextError<&'a str> for JpqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for JpqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {:}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for JpqlParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        JpqlParsingError {
            errors: vec![(err.input, "Unable to parse")],
        }
    }
}

/// Owned parse failure, detached from the query text's lifetime.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum QueryParseError {
    #[error("{context} near `{fragment}`")]
    Syntax { context: String, fragment: String },
    #[error("Unexpected trailing input `{fragment}`")]
    TrailingInput { fragment: String },
}

const FRAGMENT_LEN: usize = 40;

pub(crate) fn fragment(input: &str) -> String {
    let trimmed = input.trim_start();
    match trimmed.char_indices().nth(FRAGMENT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

impl<'a> From<nom::Err<JpqlParsingError<'a>>> for QueryParseError {
    fn from(err: nom::Err<JpqlParsingError<'a>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => QueryParseError::Syntax {
                context: "Incomplete query".to_string(),
                fragment: String::new(),
            },
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                let at = e.errors.first().map(|(input, _)| *input).unwrap_or("");
                let context = e
                    .errors
                    .iter()
                    .rev()
                    .map(|(_, ctx)| *ctx)
                    .find(|ctx| !ctx.starts_with("unknown error"))
                    .unwrap_or("Invalid syntax");
                QueryParseError::Syntax {
                    context: context.to_string(),
                    fragment: fragment(at),
                }
            }
        }
    }
}
