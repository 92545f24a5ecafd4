use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::separated_list1,
    Parser,
};

use super::{
    ast::SelectItem,
    common::{keyword, ws, PResult},
    expression::parse_expression,
    from_clause::parse_alias,
};

fn parse_select_item(input: &'_ str) -> PResult<'_, SelectItem> {
    alt((
        map(ws(char('*')), |_| SelectItem::Wildcard),
        map((parse_expression, parse_alias), |(expr, alias)| {
            SelectItem::Expression { expr, alias }
        }),
    ))
    .parse(input)
}

/// `SELECT [DISTINCT] item, ...`
pub fn parse_select_clause(input: &'_ str) -> PResult<'_, (bool, Vec<SelectItem>)> {
    let (input, _) = keyword("SELECT").parse(input)?;
    let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;
    let (input, items) = context(
        "Error in select clause",
        cut(separated_list1(ws(char(',')), parse_select_item)),
    )
    .parse(input)?;
    Ok((input, (distinct.is_some(), items)))
}
