use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    Parser,
};

use super::{
    ast::{OrderByItem, OrderDirection},
    common::{keyword, ws, PResult},
    expression::parse_expression,
};

pub fn parse_order_by_item(input: &'_ str) -> PResult<'_, OrderByItem> {
    let (input, expr) = parse_expression(input)?;

    let (input, direction) = opt(alt((
        map(keyword("ASC"), |_| OrderDirection::Asc),
        map(keyword("DESC"), |_| OrderDirection::Desc),
    )))
    .parse(input)?;

    Ok((input, OrderByItem { expr, direction }))
}

pub fn parse_order_by_clause(input: &'_ str) -> PResult<'_, Vec<OrderByItem>> {
    let (input, _) = (keyword("ORDER"), keyword("BY")).parse(input)?;

    context(
        "Error in order by clause",
        cut(separated_list1(ws(char(',')), parse_order_by_item)),
    )
    .parse(input)
}
