use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JavaSourceError {
    #[error("No source file found for `{type_name}` (expected at {path})")]
    NotFound { type_name: String, path: String },
    #[error("Failed to read `{path}`: {error}")]
    ReadError { path: String, error: String },
    #[error("Unterminated {what} starting at byte {offset}")]
    Unterminated { what: &'static str, offset: usize },
    #[error("Unexpected {found} at byte {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
}

impl JavaSourceError {
    /// Attach the file being parsed to a syntax error.
    pub fn in_file(self, path: impl Into<String>) -> Self {
        match self {
            JavaSourceError::UnexpectedToken {
                found,
                offset,
                expected,
            } => JavaSourceError::UnexpectedToken {
                found: format!("{} in {}", found, path.into()),
                offset,
                expected,
            },
            other => other,
        }
    }
}
