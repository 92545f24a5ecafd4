//! nom grammar for the JPQL accepted in `@Query` annotations, which also
//! covers the plain `SELECT` subset of native queries.

use nom::{
    character::complete::char,
    combinator::{cut, opt},
    error::context,
    multi::separated_list1,
    sequence::preceded,
    Parser,
};

use ast::SelectStatement;
use common::{keyword, ws, PResult};
use errors::{fragment, QueryParseError};

pub mod ast;
pub mod cleanup;
mod common;
pub mod errors;
mod expression;
mod from_clause;
mod order_by_clause;
mod select_clause;

pub use cleanup::clean_up;

/// One `SELECT` statement, without trailing input checks. Used for
/// top-level queries as well as sub-selects.
pub fn parse_select_statement(input: &'_ str) -> PResult<'_, SelectStatement> {
    let (input, (distinct, projection)) = select_clause::parse_select_clause(input)?;
    let (input, (from, joins)) = from_clause::parse_from_clause(input)?;

    let (input, where_clause) = opt(preceded(
        keyword("WHERE"),
        context("Error in where clause", cut(expression::parse_expression)),
    ))
    .parse(input)?;

    let (input, group_by) = opt(preceded(
        (keyword("GROUP"), keyword("BY")),
        context(
            "Error in group by clause",
            cut(separated_list1(ws(char(',')), expression::parse_expression)),
        ),
    ))
    .parse(input)?;

    let (input, having) = opt(preceded(
        keyword("HAVING"),
        context("Error in having clause", cut(expression::parse_expression)),
    ))
    .parse(input)?;

    let (input, order_by) = opt(order_by_clause::parse_order_by_clause).parse(input)?;

    let (input, limit) = opt(preceded(
        keyword("LIMIT"),
        cut(expression::parse_expression),
    ))
    .parse(input)?;
    let (input, offset) = opt(preceded(
        keyword("OFFSET"),
        cut(expression::parse_expression),
    ))
    .parse(input)?;

    Ok((
        input,
        SelectStatement {
            distinct,
            projection,
            from,
            joins,
            where_clause,
            group_by: group_by.unwrap_or_default(),
            having,
            order_by: order_by.unwrap_or_default(),
            limit,
            offset,
        },
    ))
}

/// Parses a complete query; an optional trailing `;` is allowed.
pub fn parse_query(query: &str) -> Result<SelectStatement, QueryParseError> {
    let (input, statement) = parse_select_statement(query.trim_start())?;

    let input = input.trim();
    let input = input.strip_suffix(';').unwrap_or(input);
    if !input.trim().is_empty() {
        return Err(QueryParseError::TrailingInput {
            fragment: fragment(input),
        });
    }
    Ok(statement)
}

#[cfg(test)]
mod tests {
    use super::ast::*;
    use super::*;

    #[test]
    fn test_parse_full_query() {
        let statement = parse_query(
            "select d from discharge_detail d \
             join d.dischargeNurseRequest n on n.active = true \
             where d.hospitalId = ?1 and d.patientId = ?2 \
             group by d.wardId having count(d) > 1 \
             order by d.createdAt desc;",
        )
        .unwrap();

        assert_eq!(
            statement.projection,
            vec![SelectItem::Expression {
                expr: Expression::column(None, "d"),
                alias: None,
            }]
        );
        assert_eq!(
            statement.from,
            vec![FromItem::Table {
                path: vec!["discharge_detail".into()],
                alias: Some("d".into()),
            }]
        );
        assert_eq!(statement.joins.len(), 1);
        assert!(statement.where_clause.is_some());
        assert_eq!(statement.group_by.len(), 1);
        assert!(statement.having.is_some());
        assert_eq!(statement.order_by[0].direction, Some(OrderDirection::Desc));
    }

    #[test]
    fn test_native_limit_offset() {
        let statement =
            parse_query("SELECT * FROM ward w WHERE w.code = :code LIMIT 5 OFFSET 10").unwrap();
        assert_eq!(statement.projection, vec![SelectItem::Wildcard]);
        assert_eq!(statement.limit, Some(Expression::number(5)));
        assert_eq!(statement.offset, Some(Expression::number(10)));
    }

    #[test]
    fn test_syntax_error_reports_context() {
        let err = parse_query("select d from Detail d where").unwrap_err();
        assert!(
            matches!(err, QueryParseError::Syntax { ref context, .. } if context == "Error in where clause"),
            "{err:?}"
        );
    }

    #[test]
    fn test_trailing_input() {
        assert!(matches!(
            parse_query("select d from Detail d ) extra"),
            Err(QueryParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_update_is_rejected() {
        assert!(parse_query("update Detail d set d.status = 1").is_err());
    }
}
