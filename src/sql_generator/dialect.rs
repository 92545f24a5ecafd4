use serde::{Deserialize, Serialize};
use std::fmt;

/// Target database text conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Oracle,
    /// Postgres-like.
    Generic,
}

/// Executable SQL with every parameter marker reduced to a bare `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSql {
    pub sql: String,
    pub placeholder_count: usize,
}

impl Dialect {
    pub fn from_url(url: &str) -> Self {
        if url.to_ascii_lowercase().contains("oracle") {
            Dialect::Oracle
        } else {
            Dialect::Generic
        }
    }

    /// Under Oracle, quote characters are removed from resolved names.
    pub fn physical_name(self, name: &str) -> String {
        match self {
            Dialect::Oracle => name.replace('"', ""),
            Dialect::Generic => name.to_string(),
        }
    }

    pub fn schema_switch_statement(self, schema: &str) -> String {
        match self {
            Dialect::Oracle => format!("ALTER SESSION SET CURRENT_SCHEMA = {}", schema),
            Dialect::Generic => format!("SET search_path TO {}", schema),
        }
    }

    /// Rewrites `?1` and `:name` markers to `?` and counts them. Under Oracle
    /// the boolean keywords become `1`/`0`. String literals and quoted
    /// identifiers are copied verbatim.
    pub fn normalize(self, sql: &str) -> NormalizedSql {
        let chars: Vec<char> = sql.chars().collect();
        let mut out = String::with_capacity(sql.len());
        let mut placeholder_count = 0;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\'' | '"' => {
                    let end = chars[i + 1..]
                        .iter()
                        .position(|&q| q == c)
                        .map(|p| i + 1 + p + 1)
                        .unwrap_or(chars.len());
                    out.extend(&chars[i..end]);
                    i = end;
                }
                '?' => {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                    out.push('?');
                    placeholder_count += 1;
                }
                ':' if chars.get(i + 1) == Some(&':') => {
                    // `::` cast
                    out.push_str("::");
                    i += 2;
                }
                ':' if chars
                    .get(i + 1)
                    .is_some_and(|n| n.is_alphabetic() || *n == '_') =>
                {
                    i += 1;
                    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                        i += 1;
                    }
                    out.push('?');
                    placeholder_count += 1;
                }
                _ if c.is_alphanumeric() || c == '_' || c == '$' => {
                    let start = i;
                    while i < chars.len()
                        && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                    {
                        i += 1;
                    }
                    let word: String = chars[start..i].iter().collect();
                    match self {
                        Dialect::Oracle if word.eq_ignore_ascii_case("true") => out.push('1'),
                        Dialect::Oracle if word.eq_ignore_ascii_case("false") => out.push('0'),
                        _ => out.push_str(&word),
                    }
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }

        NormalizedSql {
            sql: out,
            placeholder_count,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Oracle => write!(f, "oracle"),
            Dialect::Generic => write!(f, "generic"),
        }
    }
}
