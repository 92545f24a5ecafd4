//! Tokenizer for the subset of Java needed to skim declarations.
//!
//! Comments are dropped, string/char/text-block literals are kept whole and
//! every punctuation character is its own token (so `>>` closing two generic
//! argument lists is two `>` tokens).

use super::errors::JavaSourceError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// A string literal or text block, already unescaped.
    Str(String),
    Char,
    Number,
    Symbol(char),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_symbol(&self, c: char) -> bool {
        self.kind == TokenKind::Symbol(c)
    }

    pub fn is_ident(&self, text: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s == text)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            _ => None,
        }
    }
}

pub fn tokenize(src: &str) -> Result<Vec<Token>, JavaSourceError> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0c => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                i += 2;
                loop {
                    if i + 1 >= bytes.len() {
                        return Err(JavaSourceError::Unterminated {
                            what: "block comment",
                            offset: start,
                        });
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b'"' if src[i..].starts_with("\"\"\"") => {
                let start = i;
                let (value, end) = read_text_block(src, i)?;
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    start,
                    end,
                });
                i = end;
            }
            b'"' => {
                let start = i;
                let (value, end) = read_string(src, i)?;
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    start,
                    end,
                });
                i = end;
            }
            b'\'' => {
                let start = i;
                i += 1;
                while i < bytes.len() && bytes[i] != b'\'' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(JavaSourceError::Unterminated {
                        what: "character literal",
                        offset: start,
                    });
                }
                i += 1;
                tokens.push(Token {
                    kind: TokenKind::Char,
                    start,
                    end: i,
                });
            }
            b'0'..=b'9' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Number,
                    start,
                    end: i,
                });
            }
            _ if is_ident_start(src, i) => {
                let start = i;
                while i < bytes.len() && is_ident_continue(src, i) {
                    i += next_char_len(src, i);
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(src[start..i].to_string()),
                    start,
                    end: i,
                });
            }
            _ => {
                let len = next_char_len(src, i);
                let c = src[i..].chars().next().unwrap_or('\u{fffd}');
                tokens.push(Token {
                    kind: TokenKind::Symbol(c),
                    start: i,
                    end: i + len,
                });
                i += len;
            }
        }
    }

    Ok(tokens)
}

fn next_char_len(src: &str, i: usize) -> usize {
    src[i..].chars().next().map(char::len_utf8).unwrap_or(1)
}

fn is_ident_start(src: &str, i: usize) -> bool {
    src[i..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
}

fn is_ident_continue(src: &str, i: usize) -> bool {
    src[i..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Reads a `"..."` literal starting at `start`; returns the unescaped value and
/// the offset just past the closing quote.
fn read_string(src: &str, start: usize) -> Result<(String, usize), JavaSourceError> {
    let mut value = String::new();
    let mut chars = src[start + 1..].char_indices();

    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok((value, start + 1 + offset + 1)),
            '\n' => break,
            '\\' => match chars.next() {
                Some((_, escaped)) => push_escape(&mut value, escaped, &mut chars),
                None => break,
            },
            _ => value.push(c),
        }
    }

    Err(JavaSourceError::Unterminated {
        what: "string literal",
        offset: start,
    })
}

/// Reads a `"""` text block. Each line is trimmed; the query text embedded in
/// annotations is insensitive to indentation.
fn read_text_block(src: &str, start: usize) -> Result<(String, usize), JavaSourceError> {
    let body_start = start + 3;
    let Some(close) = src[body_start..].find("\"\"\"") else {
        return Err(JavaSourceError::Unterminated {
            what: "text block",
            offset: start,
        });
    };
    let body = &src[body_start..body_start + close];

    let mut value = String::new();
    let mut chars = body.char_indices();
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                // line continuation
                Some((_, '\n')) => {}
                Some((_, escaped)) => push_escape(&mut value, escaped, &mut chars),
                None => {}
            },
            _ => value.push(c),
        }
    }

    let joined = value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Ok((joined, body_start + close + 3))
}

fn push_escape(value: &mut String, escaped: char, rest: &mut std::str::CharIndices<'_>) {
    match escaped {
        'n' => value.push('\n'),
        't' => value.push('\t'),
        'r' => value.push('\r'),
        'b' => value.push('\u{8}'),
        'f' => value.push('\u{c}'),
        's' => value.push(' '),
        'u' => {
            let hex: String = rest.by_ref().take(4).map(|(_, c)| c).collect();
            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                Some(c) => value.push(c),
                None => {
                    value.push_str("\\u");
                    value.push_str(&hex);
                }
            }
        }
        other => value.push(other),
    }
}
