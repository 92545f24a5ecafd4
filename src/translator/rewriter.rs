//! Clause rewriting: field names become column names, and WHERE predicates
//! that would need a caller-supplied value are neutralized so the query can
//! run with sample data.

use crate::entity_catalog::camel_to_snake;
use crate::jpql_parser::ast::{
    ColumnRef, ComparisonOperator, Expression, FunctionArgs, OrderByItem, SelectItem,
    SelectStatement, WhenClause,
};
use crate::sql_generator::ToSql;

use super::tenant::TenantScope;

pub struct ExpressionRewriter<'t> {
    tenants: &'t TenantScope,
    discarded: Vec<Expression>,
}

/// `'1' = '1'`
fn trivial_equality() -> Expression {
    Expression::comparison(
        ComparisonOperator::Equal,
        Expression::string("1"),
        Expression::string("1"),
    )
}

/// `'1' IN ('1')`
fn trivial_membership() -> Expression {
    Expression::InList {
        expr: Box::new(Expression::string("1")),
        list: vec![Expression::string("1")],
        negated: false,
    }
}

impl<'t> ExpressionRewriter<'t> {
    pub fn new(tenants: &'t TenantScope) -> Self {
        ExpressionRewriter {
            tenants,
            discarded: Vec::new(),
        }
    }

    /// Left-hand sides of the predicates replaced so far.
    pub fn into_discarded(self) -> Vec<Expression> {
        self.discarded
    }

    fn tenant_value(&self, expr: &Expression) -> Option<i64> {
        match expr {
            Expression::Column(column) => self.tenants.sample_value(&column.name),
            _ => None,
        }
    }

    /// Rewrites every clause of `statement` except its joins.
    pub fn rewrite_clauses(&mut self, mut statement: SelectStatement) -> SelectStatement {
        statement.projection = self.rewrite_projection(statement.projection);
        statement.where_clause = statement.where_clause.map(|expr| self.rewrite(expr, true));
        statement.group_by = statement
            .group_by
            .into_iter()
            .map(|expr| self.rewrite(expr, false))
            .collect();
        statement.order_by = statement
            .order_by
            .into_iter()
            .map(|item| OrderByItem {
                expr: self.rewrite(item.expr, false),
                direction: item.direction,
            })
            .collect();
        statement.having = statement.having.map(|expr| self.rewrite(expr, false));
        statement
    }

    /// A lone single-character item (the root alias) selects every column;
    /// anything else keeps its shape with field names converted.
    pub fn rewrite_projection(&mut self, items: Vec<SelectItem>) -> Vec<SelectItem> {
        if let [SelectItem::Expression { expr, alias: None }] = items.as_slice() {
            if expr.to_sql().chars().count() == 1 {
                return vec![SelectItem::Wildcard];
            }
        }

        items
            .into_iter()
            .map(|item| match item {
                SelectItem::Wildcard => SelectItem::Wildcard,
                SelectItem::Expression { expr, alias } => SelectItem::Expression {
                    expr: self.rewrite(expr, false),
                    alias,
                },
            })
            .collect()
    }

    /// Rewrites one expression. `in_where` enables predicate neutralization
    /// and tenant substitution.
    pub fn rewrite(&mut self, expr: Expression, in_where: bool) -> Expression {
        match expr {
            Expression::Column(ColumnRef { qualifier, name }) => Expression::Column(ColumnRef {
                qualifier,
                name: camel_to_snake(&name),
            }),
            Expression::Binary { op, left, right } => Expression::binary(
                op,
                self.rewrite(*left, in_where),
                self.rewrite(*right, in_where),
            ),
            Expression::Comparison { op, left, right } => {
                self.rewrite_comparison(op, *left, *right, in_where)
            }
            Expression::InList {
                expr,
                list,
                negated,
            } => {
                if in_where && self.tenant_value(&expr).is_none() {
                    self.discarded.push(*expr);
                    return trivial_membership();
                }
                Expression::InList {
                    expr: Box::new(self.rewrite(*expr, in_where)),
                    list,
                    negated,
                }
            }
            Expression::InSubquery {
                expr,
                query,
                negated,
            } => {
                if in_where && self.tenant_value(&expr).is_none() {
                    self.discarded.push(*expr);
                    return trivial_membership();
                }
                Expression::InSubquery {
                    expr: Box::new(self.rewrite(*expr, in_where)),
                    query,
                    negated,
                }
            }
            Expression::IsNull { expr, negated } => Expression::IsNull {
                expr: Box::new(self.rewrite(*expr, in_where)),
                negated,
            },
            Expression::Between {
                expr,
                low,
                high,
                negated,
            } => Expression::Between {
                expr: Box::new(self.rewrite(*expr, in_where)),
                low: Box::new(self.rewrite(*low, in_where)),
                high: Box::new(self.rewrite(*high, in_where)),
                negated,
            },
            Expression::Like {
                expr,
                pattern,
                escape,
                negated,
            } => Expression::Like {
                expr: Box::new(self.rewrite(*expr, in_where)),
                pattern: Box::new(self.rewrite(*pattern, in_where)),
                escape: escape.map(|e| Box::new(self.rewrite(*e, in_where))),
                negated,
            },
            // a neutralized predicate under NOT would filter out every row
            Expression::Not(inner) => Expression::Not(Box::new(self.rewrite(*inner, false))),
            Expression::Negative(inner) => {
                Expression::Negative(Box::new(self.rewrite(*inner, in_where)))
            }
            Expression::Parenthesized(list) => Expression::Parenthesized(
                list.into_iter().map(|e| self.rewrite(e, in_where)).collect(),
            ),
            Expression::Case {
                operand,
                when_clauses,
                else_result,
            } => Expression::Case {
                operand: operand.map(|e| Box::new(self.rewrite(*e, in_where))),
                when_clauses: when_clauses
                    .into_iter()
                    .map(|clause| WhenClause {
                        condition: self.rewrite(clause.condition, in_where),
                        result: self.rewrite(clause.result, in_where),
                    })
                    .collect(),
                else_result: else_result.map(|e| Box::new(self.rewrite(*e, in_where))),
            },
            Expression::Function {
                name,
                distinct,
                args,
            } => Expression::Function {
                name,
                distinct,
                args: match args {
                    FunctionArgs::Star => FunctionArgs::Star,
                    FunctionArgs::List(list) => FunctionArgs::List(
                        list.into_iter().map(|e| self.rewrite(e, in_where)).collect(),
                    ),
                },
            },
            other @ (Expression::Literal(_)
            | Expression::Parameter(_)
            | Expression::Exists(_)
            | Expression::Subquery(_)) => other,
        }
    }

    fn rewrite_comparison(
        &mut self,
        op: ComparisonOperator,
        left: Expression,
        right: Expression,
        in_where: bool,
    ) -> Expression {
        if in_where && matches!(left, Expression::Column(_)) {
            match (self.tenant_value(&left), &right) {
                (Some(value), Expression::Parameter(_) | Expression::Literal(_)) => {
                    let left = self.rewrite(left, in_where);
                    return Expression::comparison(op, left, Expression::number(value));
                }
                (None, Expression::Parameter(_)) => {
                    log::debug!("Neutralizing predicate on {}", left.to_sql());
                    self.discarded.push(left);
                    return trivial_equality();
                }
                _ => {}
            }
        }

        let left = self.rewrite(left, in_where);
        let right = self.rewrite(right, in_where);
        Expression::comparison(op, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jpql_parser::parse_query;

    fn rewrite_query(query: &str) -> (String, Vec<String>) {
        let tenants = TenantScope::default();
        let mut rewriter = ExpressionRewriter::new(&tenants);
        let statement = rewriter.rewrite_clauses(parse_query(query).unwrap());
        let discarded = rewriter
            .into_discarded()
            .iter()
            .map(ToSql::to_sql)
            .collect();
        (statement.to_sql(), discarded)
    }

    #[test]
    fn test_tenant_substitution_and_neutralization() {
        let (sql, discarded) = rewrite_query(
            "select d from discharge_detail d where d.hospitalId = ?1 and d.patientId = ?2",
        );
        assert_eq!(
            sql,
            "SELECT * FROM discharge_detail d WHERE d.hospital_id = 59 AND '1' = '1'"
        );
        assert_eq!(discarded, vec!["d.patientId"]);
    }

    #[test]
    fn test_tenant_literal_and_named_parameter() {
        let (sql, _) = rewrite_query(
            "select * from t x where x.hospitalGroupId = 7 and x.hospitalId = :hid and x.wardCode < :code",
        );
        assert_eq!(
            sql,
            "SELECT * FROM t x WHERE x.hospital_group_id = 58 AND x.hospital_id = 59 AND '1' = '1'"
        );
    }

    #[test]
    fn test_membership_neutralized_except_tenant() {
        let (sql, discarded) = rewrite_query(
            "select * from t x where x.statusCode not in ?1 and x.hospitalId in (1, 2)",
        );
        assert_eq!(
            sql,
            "SELECT * FROM t x WHERE '1' IN ('1') AND x.hospital_id IN (1, 2)"
        );
        assert_eq!(discarded, vec!["x.statusCode"]);
    }

    #[test]
    fn test_general_path_keeps_literals_and_column_comparisons() {
        let (sql, discarded) = rewrite_query(
            "select * from t x where x.isDeleted = false and x.createdAt > x.updatedAt \
             and x.dischargeTime is null and (x.aA = ?1 or lower(x.bedNo) like :p)",
        );
        assert_eq!(
            sql,
            "SELECT * FROM t x WHERE x.is_deleted = FALSE AND x.created_at > x.updated_at \
             AND x.discharge_time IS NULL AND ('1' = '1' OR lower(x.bed_no) LIKE :p)"
        );
        assert_eq!(discarded, vec!["x.aA"]);
    }

    #[test]
    fn test_not_keeps_parameters() {
        let (sql, discarded) = rewrite_query("select * from t x where not x.wardId = ?1");
        assert_eq!(sql, "SELECT * FROM t x WHERE NOT x.ward_id = ?1");
        assert!(discarded.is_empty());
    }

    #[test]
    fn test_other_clauses_only_convert_names() {
        let (sql, _) = rewrite_query(
            "select x.wardId, count(x.bedNo) as beds from t x \
             group by x.wardId having count(x.bedNo) > ?1 order by x.wardId desc",
        );
        assert_eq!(
            sql,
            "SELECT x.ward_id, count(x.bed_no) AS beds FROM t x \
             GROUP BY x.ward_id HAVING count(x.bed_no) > ?1 ORDER BY x.ward_id DESC"
        );
    }

    #[test]
    fn test_case_branches_and_reserved_identifier() {
        let (sql, _) = rewrite_query(
            "select case when x.patientPOMR is null then x.admitType else x.dischargeType end from t x",
        );
        assert_eq!(
            sql,
            "SELECT CASE WHEN x.patientpomr IS NULL THEN x.admit_type ELSE x.discharge_type END FROM t x"
        );
    }

    #[test]
    fn test_subquery_predicates_are_left_alone() {
        let (sql, _) = rewrite_query(
            "select * from t x where exists (select 1 from u y where y.tId = x.id)",
        );
        assert_eq!(
            sql,
            "SELECT * FROM t x WHERE EXISTS (SELECT 1 FROM u y WHERE y.tId = x.id)"
        );
    }
}
