use nom::{
    branch::alt,
    character::complete::char,
    combinator::{cut, map, opt},
    error::context,
    multi::{many0, separated_list1},
    sequence::preceded,
    Parser,
};

use super::{
    ast::{FromItem, Join, JoinKind},
    common::{identifier, keyword, word, ws, PResult},
    expression::parse_expression,
    parse_select_statement,
};

/// `[AS] alias`
pub fn parse_alias(input: &str) -> PResult<'_, Option<String>> {
    map(
        opt(preceded(opt(keyword("AS")), ws(identifier))),
        |alias: Option<&str>| alias.map(str::to_string),
    )
    .parse(input)
}

/// A table, an entity path used as a join target, or a parenthesized sub-select.
pub fn parse_from_item(input: &'_ str) -> PResult<'_, FromItem> {
    alt((parse_sub_select_item, parse_table_item)).parse(input)
}

fn parse_table_item(input: &'_ str) -> PResult<'_, FromItem> {
    let (input, first) = ws(identifier).parse(input)?;
    let (input, rest) = many0(preceded(char('.'), word)).parse(input)?;
    let (input, alias) = parse_alias(input)?;

    let mut path = vec![first.to_string()];
    path.extend(rest.into_iter().map(str::to_string));
    Ok((input, FromItem::Table { path, alias }))
}

fn parse_sub_select_item(input: &'_ str) -> PResult<'_, FromItem> {
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, query) = parse_select_statement(input)?;
    let (input, _) = cut(ws(char(')'))).parse(input)?;
    let (input, alias) = parse_alias(input)?;
    Ok((
        input,
        FromItem::SubSelect {
            query: Box::new(query),
            alias,
        },
    ))
}

fn parse_join_kind(input: &str) -> PResult<'_, JoinKind> {
    let (input, kind) = opt(alt((
        map(keyword("INNER"), |_| JoinKind::Inner),
        map(keyword("CROSS"), |_| JoinKind::Cross),
        map((keyword("LEFT"), opt(keyword("OUTER"))), |_| JoinKind::Left),
        map((keyword("RIGHT"), opt(keyword("OUTER"))), |_| JoinKind::Right),
        map((keyword("FULL"), opt(keyword("OUTER"))), |_| JoinKind::Full),
    )))
    .parse(input)?;
    let (input, _) = keyword("JOIN").parse(input)?;
    Ok((input, kind.unwrap_or(JoinKind::Plain)))
}

/// `[LEFT [OUTER] | INNER | ...] JOIN [FETCH] item [(ON | WITH) condition]`
pub fn parse_join(input: &'_ str) -> PResult<'_, Join> {
    let (input, kind) = parse_join_kind(input)?;
    let (input, fetch) = opt(keyword("FETCH")).parse(input)?;
    let (input, item) = context("Error in join target", cut(parse_from_item)).parse(input)?;
    let (input, on) = opt(preceded(
        alt((keyword("ON"), keyword("WITH"))),
        context("Error in join condition", cut(parse_expression)),
    ))
    .parse(input)?;

    Ok((
        input,
        Join {
            kind,
            fetch: fetch.is_some(),
            item,
            on: on.into_iter().collect(),
        },
    ))
}

/// `FROM item, item ... join*`
pub fn parse_from_clause(input: &'_ str) -> PResult<'_, (Vec<FromItem>, Vec<Join>)> {
    let (input, _) = context("Expected FROM", cut(keyword("FROM"))).parse(input)?;
    let (input, items) = context(
        "Error in from clause",
        cut(separated_list1(ws(char(',')), parse_from_item)),
    )
    .parse(input)?;
    let (input, joins) = many0(parse_join).parse(input)?;
    Ok((input, (items, joins)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_items_and_joins() {
        let (rest, (items, joins)) = parse_from_clause(
            "from discharge_detail d, ward w left outer join fetch d.dischargeNurseRequest n on n.active = true join d.notes where",
        )
        .unwrap();
        assert_eq!(rest.trim(), "where");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].alias(), Some("d"));

        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].kind, JoinKind::Left);
        assert!(joins[0].fetch);
        assert_eq!(
            joins[0].item,
            FromItem::Table {
                path: vec!["d".into(), "dischargeNurseRequest".into()],
                alias: Some("n".into()),
            }
        );
        assert_eq!(joins[0].on.len(), 1);

        assert_eq!(joins[1].kind, JoinKind::Plain);
        assert_eq!(joins[1].item.alias(), None);
        assert!(joins[1].on.is_empty());
    }

    #[test]
    fn test_sub_select_item() {
        let (_, item) = parse_from_item("(select w.id from ward w) x").unwrap();
        assert!(matches!(item, FromItem::SubSelect { alias: Some(ref a), .. } if a == "x"));
    }

    #[test]
    fn test_missing_join_target_fails() {
        assert!(matches!(
            parse_from_clause("from ward w join where"),
            Err(nom::Err::Failure(_))
        ));
    }
}
