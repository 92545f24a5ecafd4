use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{map, not, opt, recognize},
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{pair, preceded, terminated},
    Parser,
};

use super::{
    ast::{
        BinaryOperator, ColumnRef, ComparisonOperator, Expression, FunctionArgs, Literal,
        Parameter, WhenClause,
    },
    common::{identifier, is_ident_char, keyword, word, ws, PResult},
    errors::JpqlParsingError,
    parse_select_statement,
};

pub fn parse_expression(input: &'_ str) -> PResult<'_, Expression> {
    parse_logical_or(input)
}

fn parse_logical_or(input: &'_ str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_logical_and(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        match preceded(keyword("OR"), parse_logical_and).parse(remaining_input) {
            Ok((new_input, rhs)) => {
                final_expression = Expression::binary(BinaryOperator::Or, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, final_expression))
}

fn parse_logical_and(input: &'_ str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_not_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        match preceded(keyword("AND"), parse_not_expression).parse(remaining_input) {
            Ok((new_input, rhs)) => {
                final_expression = Expression::and(final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, final_expression))
}

// NOT binds looser than comparison: `NOT a = b` is `NOT (a = b)`
fn parse_not_expression(input: &'_ str) -> PResult<'_, Expression> {
    alt((
        map(preceded(keyword("NOT"), parse_not_expression), |expr| {
            Expression::Not(Box::new(expr))
        }),
        parse_predicate,
    ))
    .parse(input)
}

fn parse_comparison_operator(input: &str) -> PResult<'_, ComparisonOperator> {
    alt((
        map(tag(">="), |_| ComparisonOperator::GreaterThanEqual),
        map(tag("<="), |_| ComparisonOperator::LessThanEqual),
        map(tag("<>"), |_| ComparisonOperator::NotEqual),
        map(tag("!="), |_| ComparisonOperator::BangEqual),
        map(tag(">"), |_| ComparisonOperator::GreaterThan),
        map(tag("<"), |_| ComparisonOperator::LessThan),
        map(tag("="), |_| ComparisonOperator::Equal),
    ))
    .parse(input)
}

/// An additive expression optionally followed by one predicate suffix:
/// a comparison, `IS [NOT] NULL`, `[NOT] IN`, `[NOT] BETWEEN` or `[NOT] LIKE`.
fn parse_predicate(input: &'_ str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_additive_expression(input)?;

    if let Ok((input, op)) = ws(parse_comparison_operator).parse(input) {
        let (input, rhs) = parse_additive_expression(input)?;
        return Ok((input, Expression::comparison(op, lhs, rhs)));
    }

    if let Ok((input, (_, not_kw, _))) =
        (keyword("IS"), opt(keyword("NOT")), keyword("NULL")).parse(input)
    {
        return Ok((
            input,
            Expression::IsNull {
                expr: Box::new(lhs),
                negated: not_kw.is_some(),
            },
        ));
    }

    let (after_not, negated) = match keyword("NOT").parse(input) {
        Ok((rest, _)) => (rest, true),
        Err(_) => (input, false),
    };

    if let Ok((rest, _)) = keyword("IN").parse(after_not) {
        return parse_in_tail(rest, lhs, negated);
    }

    if let Ok((rest, _)) = keyword("BETWEEN").parse(after_not) {
        let (rest, low) = parse_additive_expression(rest)?;
        let (rest, _) = keyword("AND").parse(rest)?;
        let (rest, high) = parse_additive_expression(rest)?;
        return Ok((
            rest,
            Expression::Between {
                expr: Box::new(lhs),
                low: Box::new(low),
                high: Box::new(high),
                negated,
            },
        ));
    }

    if let Ok((rest, _)) = keyword("LIKE").parse(after_not) {
        let (rest, pattern) = parse_additive_expression(rest)?;
        let (rest, escape) = opt(preceded(keyword("ESCAPE"), parse_primary)).parse(rest)?;
        return Ok((
            rest,
            Expression::Like {
                expr: Box::new(lhs),
                pattern: Box::new(pattern),
                escape: escape.map(Box::new),
                negated,
            },
        ));
    }

    if negated {
        return Err(nom::Err::Error(JpqlParsingError::new(
            after_not,
            "Expected IN, BETWEEN or LIKE after NOT",
        )));
    }

    Ok((input, lhs))
}

fn parse_in_tail(input: &'_ str, expr: Expression, negated: bool) -> PResult<'_, Expression> {
    // `IN :ids` / `IN ?1`: a collection-valued parameter
    if let Ok((rest, param)) = ws(parse_parameter).parse(input) {
        return Ok((
            rest,
            Expression::InList {
                expr: Box::new(expr),
                list: vec![Expression::Parameter(param)],
                negated,
            },
        ));
    }

    let (input, _) = ws(char('(')).parse(input)?;

    if let Ok((rest, query)) = parse_select_statement(input) {
        let (rest, _) = ws(char(')')).parse(rest)?;
        return Ok((
            rest,
            Expression::InSubquery {
                expr: Box::new(expr),
                query: Box::new(query),
                negated,
            },
        ));
    }

    let (input, list) = separated_list1(ws(char(',')), parse_expression).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((
        input,
        Expression::InList {
            expr: Box::new(expr),
            list,
            negated,
        },
    ))
}

fn parse_additive_expression(input: &'_ str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_multiplicative_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let op_result = ws(alt((
            map(tag("||"), |_| BinaryOperator::Concat),
            map(char('+'), |_| BinaryOperator::Add),
            map(char('-'), |_| BinaryOperator::Subtract),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_multiplicative_expression(new_input)?;
                final_expression = Expression::binary(op, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, final_expression))
}

fn parse_multiplicative_expression(input: &'_ str) -> PResult<'_, Expression> {
    let (input, lhs) = parse_unary_expression(input)?;

    let mut remaining_input = input;
    let mut final_expression = lhs;

    loop {
        let op_result = ws(alt((
            map(char('*'), |_| BinaryOperator::Multiply),
            map(char('/'), |_| BinaryOperator::Divide),
        )))
        .parse(remaining_input);

        match op_result {
            Ok((new_input, op)) => {
                let (new_input, rhs) = parse_unary_expression(new_input)?;
                final_expression = Expression::binary(op, final_expression, rhs);
                remaining_input = new_input;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }

    Ok((remaining_input, final_expression))
}

fn parse_unary_expression(input: &'_ str) -> PResult<'_, Expression> {
    alt((
        map(preceded(ws(char('-')), parse_unary_expression), |expr| {
            Expression::Negative(Box::new(expr))
        }),
        preceded(ws(char('+')), parse_unary_expression),
        parse_primary,
    ))
    .parse(input)
}

fn parse_primary(input: &'_ str) -> PResult<'_, Expression> {
    ws(alt((
        parse_parenthesized,
        parse_case_expression,
        parse_exists_expression,
        map(parse_parameter, Expression::Parameter),
        map(parse_literal, Expression::Literal),
        parse_function_call,
        parse_column,
    )))
    .parse(input)
}

/// `(select ...)`, `(expr)` or `(a, b)`.
fn parse_parenthesized(input: &'_ str) -> PResult<'_, Expression> {
    let (input, _) = ws(char('(')).parse(input)?;

    if let Ok((rest, query)) = parse_select_statement(input) {
        let (rest, _) = ws(char(')')).parse(rest)?;
        return Ok((rest, Expression::Subquery(Box::new(query))));
    }

    let (input, list) = separated_list1(ws(char(',')), parse_expression).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((input, Expression::Parenthesized(list)))
}

fn parse_case_expression(input: &'_ str) -> PResult<'_, Expression> {
    let (input, _) = keyword("CASE").parse(input)?;
    let (input, operand) = opt(parse_expression).parse(input)?;

    let (input, when_clauses) = many1(map(
        (
            keyword("WHEN"),
            parse_expression,
            keyword("THEN"),
            parse_expression,
        ),
        |(_, condition, _, result)| WhenClause { condition, result },
    ))
    .parse(input)?;

    let (input, else_result) = opt(preceded(keyword("ELSE"), parse_expression)).parse(input)?;
    let (input, _) = keyword("END").parse(input)?;

    Ok((
        input,
        Expression::Case {
            operand: operand.map(Box::new),
            when_clauses,
            else_result: else_result.map(Box::new),
        },
    ))
}

fn parse_exists_expression(input: &'_ str) -> PResult<'_, Expression> {
    let (input, _) = keyword("EXISTS").parse(input)?;
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, query) = parse_select_statement(input)?;
    let (input, _) = ws(char(')')).parse(input)?;
    Ok((input, Expression::Exists(Box::new(query))))
}

/// `?`, `?1` or `:name`.
pub fn parse_parameter(input: &str) -> PResult<'_, Parameter> {
    alt((
        map(preceded(char('?'), digit0), |digits: &str| {
            Parameter::Positional(digits.parse().ok())
        }),
        map(preceded(char(':'), word), |name: &str| {
            Parameter::Named(name.to_string())
        }),
    ))
    .parse(input)
}

fn parse_literal(input: &str) -> PResult<'_, Literal> {
    alt((
        map(parse_string_literal, Literal::String),
        map(parse_number, |n: &str| Literal::Number(n.to_string())),
        map(keyword("TRUE"), |_| Literal::Boolean(true)),
        map(keyword("FALSE"), |_| Literal::Boolean(false)),
        map(keyword("NULL"), |_| Literal::Null),
    ))
    .parse(input)
}

/// `'it''s'` -> `it's`
pub fn parse_string_literal(input: &str) -> PResult<'_, String> {
    let (mut rest, _) = char('\'').parse(input)?;
    let mut value = String::new();

    loop {
        let Some(idx) = rest.find('\'') else {
            return Err(nom::Err::Failure(JpqlParsingError::new(
                input,
                "Unterminated string literal",
            )));
        };
        value.push_str(&rest[..idx]);
        rest = &rest[idx + 1..];
        match rest.strip_prefix('\'') {
            Some(after) => {
                value.push('\'');
                rest = after;
            }
            None => return Ok((rest, value)),
        }
    }
}

/// Integer or decimal; a trailing Java type suffix is accepted and dropped.
fn parse_number(input: &str) -> PResult<'_, &str> {
    terminated(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        pair(opt(one_of("lLdDfF")), not(satisfy(is_ident_char))),
    )
    .parse(input)
}

fn parse_function_call(input: &'_ str) -> PResult<'_, Expression> {
    let (input, name) = identifier(input)?;
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, distinct) = opt(keyword("DISTINCT")).parse(input)?;

    if let Ok((rest, _)) = (ws(char::<_, JpqlParsingError>('*')), ws(char(')'))).parse(input) {
        return Ok((
            rest,
            Expression::Function {
                name: name.to_string(),
                distinct: distinct.is_some(),
                args: FunctionArgs::Star,
            },
        ));
    }

    let (input, args) = separated_list0(ws(char(',')), parse_function_argument).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::Function {
            name: name.to_string(),
            distinct: distinct.is_some(),
            args: FunctionArgs::List(args),
        },
    ))
}

// `ANY (select ...)` and friends take a bare sub-select
fn parse_function_argument(input: &'_ str) -> PResult<'_, Expression> {
    alt((
        map(parse_select_statement, |query| {
            Expression::Subquery(Box::new(query))
        }),
        parse_expression,
    ))
    .parse(input)
}

/// `name`, `d.name` or a path `d.ward.name` (qualifier `d.ward`).
fn parse_column(input: &'_ str) -> PResult<'_, Expression> {
    let (input, first) = identifier(input)?;
    let (input, mut rest) = many0(preceded(char('.'), word)).parse(input)?;

    let column = match rest.pop() {
        None => ColumnRef {
            qualifier: None,
            name: first.to_string(),
        },
        Some(name) => {
            let mut qualifier = first.to_string();
            for segment in rest {
                qualifier.push('.');
                qualifier.push_str(segment);
            }
            ColumnRef {
                qualifier: Some(qualifier),
                name: name.to_string(),
            }
        }
    };

    Ok((input, Expression::Column(column)))
}
