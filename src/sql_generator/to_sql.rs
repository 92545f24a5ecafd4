//! Renders the query tree back to single-line SQL text.

use crate::jpql_parser::ast::{
    BinaryOperator, ColumnRef, ComparisonOperator, Expression, FromItem, FunctionArgs, Join,
    JoinKind, Literal, OrderByItem, OrderDirection, Parameter, SelectItem, SelectStatement,
};

pub trait ToSql {
    /// Convert this node to a SQL string
    fn to_sql(&self) -> String;
}

fn join_sql<T: ToSql>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToSql::to_sql)
        .collect::<Vec<_>>()
        .join(separator)
}

impl ToSql for SelectStatement {
    fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&join_sql(&self.projection, ", "));

        sql.push_str(" FROM ");
        sql.push_str(&join_sql(&self.from, ", "));

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        if let Some(where_clause) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&where_clause.to_sql());
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&join_sql(&self.group_by, ", "));
        }
        if let Some(having) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(&having.to_sql());
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&join_sql(&self.order_by, ", "));
        }
        if let Some(limit) = &self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit.to_sql());
        }
        if let Some(offset) = &self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&offset.to_sql());
        }
        sql
    }
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        match self {
            SelectItem::Wildcard => "*".to_string(),
            SelectItem::Expression { expr, alias: None } => expr.to_sql(),
            SelectItem::Expression {
                expr,
                alias: Some(alias),
            } => format!("{} AS {}", expr.to_sql(), alias),
        }
    }
}

impl ToSql for FromItem {
    fn to_sql(&self) -> String {
        let (mut sql, alias) = match self {
            FromItem::Table { path, alias } => (path.join("."), alias),
            FromItem::SubSelect { query, alias } => (format!("({})", query.to_sql()), alias),
        };
        if let Some(alias) = alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        sql
    }
}

impl ToSql for JoinKind {
    fn to_sql(&self) -> String {
        match self {
            JoinKind::Plain => "JOIN",
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
        .to_string()
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.kind.to_sql(), self.item.to_sql());
        if !self.on.is_empty() {
            let conditions: Vec<String> = self
                .on
                .iter()
                .map(|condition| match condition {
                    // keep an OR together once more conditions are ANDed to it
                    Expression::Binary {
                        op: BinaryOperator::Or,
                        ..
                    } if self.on.len() > 1 => format!("({})", condition.to_sql()),
                    _ => condition.to_sql(),
                })
                .collect();
            sql.push_str(" ON ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql
    }
}

impl ToSql for OrderByItem {
    fn to_sql(&self) -> String {
        match self.direction {
            None => self.expr.to_sql(),
            Some(OrderDirection::Asc) => format!("{} ASC", self.expr.to_sql()),
            Some(OrderDirection::Desc) => format!("{} DESC", self.expr.to_sql()),
        }
    }
}

impl ToSql for Literal {
    fn to_sql(&self) -> String {
        match self {
            Literal::Number(n) => n.clone(),
            Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::Boolean(true) => "TRUE".to_string(),
            Literal::Boolean(false) => "FALSE".to_string(),
            Literal::Null => "NULL".to_string(),
        }
    }
}

impl ToSql for Parameter {
    fn to_sql(&self) -> String {
        match self {
            Parameter::Positional(Some(n)) => format!("?{}", n),
            Parameter::Positional(None) => "?".to_string(),
            Parameter::Named(name) => format!(":{}", name),
        }
    }
}

impl ToSql for ColumnRef {
    fn to_sql(&self) -> String {
        match &self.qualifier {
            Some(qualifier) => format!("{}.{}", qualifier, self.name),
            None => self.name.clone(),
        }
    }
}

impl ToSql for BinaryOperator {
    fn to_sql(&self) -> String {
        match self {
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Concat => "||",
        }
        .to_string()
    }
}

impl ToSql for ComparisonOperator {
    fn to_sql(&self) -> String {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::BangEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanEqual => ">=",
        }
        .to_string()
    }
}

fn not_prefix(negated: bool) -> &'static str {
    if negated {
        "NOT "
    } else {
        ""
    }
}

impl ToSql for Expression {
    fn to_sql(&self) -> String {
        match self {
            Expression::Literal(literal) => literal.to_sql(),
            Expression::Column(column) => column.to_sql(),
            Expression::Parameter(param) => param.to_sql(),
            Expression::Binary { op, left, right } => {
                format!("{} {} {}", left.to_sql(), op.to_sql(), right.to_sql())
            }
            Expression::Comparison { op, left, right } => {
                format!("{} {} {}", left.to_sql(), op.to_sql(), right.to_sql())
            }
            Expression::InList {
                expr,
                list,
                negated,
            } => format!(
                "{} {}IN ({})",
                expr.to_sql(),
                not_prefix(*negated),
                join_sql(list, ", ")
            ),
            Expression::InSubquery {
                expr,
                query,
                negated,
            } => format!(
                "{} {}IN ({})",
                expr.to_sql(),
                not_prefix(*negated),
                query.to_sql()
            ),
            Expression::IsNull { expr, negated } => {
                format!("{} IS {}NULL", expr.to_sql(), not_prefix(*negated))
            }
            Expression::Between {
                expr,
                low,
                high,
                negated,
            } => format!(
                "{} {}BETWEEN {} AND {}",
                expr.to_sql(),
                not_prefix(*negated),
                low.to_sql(),
                high.to_sql()
            ),
            Expression::Like {
                expr,
                pattern,
                escape,
                negated,
            } => {
                let mut sql = format!(
                    "{} {}LIKE {}",
                    expr.to_sql(),
                    not_prefix(*negated),
                    pattern.to_sql()
                );
                if let Some(escape) = escape {
                    sql.push_str(" ESCAPE ");
                    sql.push_str(&escape.to_sql());
                }
                sql
            }
            Expression::Not(inner) => format!("NOT {}", inner.to_sql()),
            Expression::Negative(inner) => format!("-{}", inner.to_sql()),
            Expression::Parenthesized(list) => format!("({})", join_sql(list, ", ")),
            Expression::Case {
                operand,
                when_clauses,
                else_result,
            } => {
                let mut sql = String::from("CASE ");
                if let Some(operand) = operand {
                    sql.push_str(&operand.to_sql());
                    sql.push(' ');
                }
                for clause in when_clauses {
                    sql.push_str(&format!(
                        "WHEN {} THEN {} ",
                        clause.condition.to_sql(),
                        clause.result.to_sql()
                    ));
                }
                if let Some(else_result) = else_result {
                    sql.push_str(&format!("ELSE {} ", else_result.to_sql()));
                }
                sql.push_str("END");
                sql
            }
            Expression::Function {
                name,
                distinct,
                args,
            } => {
                let args = match args {
                    FunctionArgs::Star => "*".to_string(),
                    FunctionArgs::List(list) => join_sql(list, ", "),
                };
                if *distinct {
                    format!("{}(DISTINCT {})", name, args)
                } else {
                    format!("{}({})", name, args)
                }
            }
            Expression::Exists(query) => format!("EXISTS ({})", query.to_sql()),
            Expression::Subquery(query) => format!("({})", query.to_sql()),
        }
    }
}
