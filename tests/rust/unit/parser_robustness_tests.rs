//! Unit tests for query parsing edge cases and error handling
//!
//! Tests malformed queries and Java sources to ensure errors come back as
//! values instead of panics.

use jpa_sampler::java_source::parse_compilation_unit;
use jpa_sampler::jpql_parser::errors::QueryParseError;
use jpa_sampler::jpql_parser::{clean_up, parse_query};
use jpa_sampler::sql_generator::ToSql;

/// Test that malformed queries don't cause panics
#[test]
fn test_malformed_queries_no_panic() {
    let malformed_queries = vec![
        "",                                     // Empty query
        "select",                               // Incomplete SELECT
        "select d from",                        // Missing FROM item
        "select d from t d where",              // Dangling WHERE
        "select d from t d where d.a = (",      // Unclosed parenthesis
        "select d from t d join",               // Dangling JOIN
        "select d from t d order by",           // Dangling ORDER BY
        "select d from t d where d.a in (1, ",  // Unclosed IN list
        "select d from t d where d.a = 'open",  // Unterminated string
        "update t set a = 1",                   // Not a SELECT
        "select d from t d group by",           // Dangling GROUP BY
    ];

    for query in malformed_queries {
        assert!(parse_query(query).is_err(), "Expected an error for: {}", query);
    }
}

#[test]
fn test_trailing_input_is_reported() {
    let err = parse_query("select d from t d where d.a = 1 garbage here").unwrap_err();
    assert!(matches!(err, QueryParseError::TrailingInput { .. }));
}

#[test]
fn test_keywords_are_case_insensitive() {
    let lower = parse_query("select d from t d where d.a = 1 order by d.a").unwrap();
    let upper = parse_query("SELECT d FROM t d WHERE d.a = 1 ORDER BY d.a").unwrap();
    assert_eq!(lower, upper);
}

#[test]
fn test_clean_up_then_parse() {
    let cleaned = clean_up(
        r#""select new com.acme.dto.Row(d.id, d.name) " + "from detail d " + "where d.id = ?1""#,
    );
    let statement = parse_query(&cleaned).unwrap();
    assert_eq!(statement.to_sql(), "SELECT * FROM detail d WHERE d.id = ?1");
}

#[test]
fn test_malformed_java_sources_no_panic() {
    let sources = vec![
        "",
        "package",
        "package com.acme; public class",
        "package com.acme; public class A {",
        "package com.acme; @Table(name = public class A {}",
        "package com.acme; public class A { private String s = \"open; }",
        "package com.acme; public interface R extends JpaRepository<A, { }",
    ];

    for source in sources {
        let _ = parse_compilation_unit(source);
    }
}
