//! Syntax tree for JPQL and the plain-SQL subset used by native queries.
//!
//! Nodes own their children; rewriting builds a new tree.

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    /// Comma separated FROM items; the first one is the query root.
    pub from: Vec<FromItem>,
    pub joins: Vec<Join>,
    pub where_clause: Option<Expression>,
    pub group_by: Vec<Expression>,
    pub having: Option<Expression>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    Expression {
        expr: Expression,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromItem {
    /// `discharge_detail d`, or a path such as `d.dischargeNurseRequest n`
    /// when used as a join target.
    Table {
        path: Vec<String>,
        alias: Option<String>,
    },
    SubSelect {
        query: Box<SelectStatement>,
        alias: Option<String>,
    },
}

impl FromItem {
    pub fn alias(&self) -> Option<&str> {
        match self {
            FromItem::Table { alias, .. } | FromItem::SubSelect { alias, .. } => alias.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// bare `JOIN`
    Plain,
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    /// `JOIN FETCH`; has no SQL counterpart and is not rendered.
    pub fetch: bool,
    pub item: FromItem,
    pub on: Vec<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub direction: Option<OrderDirection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Kept as written, minus any Java type suffix (`1L` -> `1`).
    Number(String),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// `?` or `?1`
    Positional(Option<u32>),
    /// `:name`
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Alias or path prefix, e.g. `d` in `d.hospitalId`.
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    /// `!=`, kept apart from `<>` so it renders as written
    BangEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionArgs {
    /// `count(*)`
    Star,
    List(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: Expression,
    pub result: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Column(ColumnRef),
    Parameter(Parameter),
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Comparison {
        op: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    InSubquery {
        expr: Box<Expression>,
        query: Box<SelectStatement>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    Between {
        expr: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
        negated: bool,
    },
    Like {
        expr: Box<Expression>,
        pattern: Box<Expression>,
        escape: Option<Box<Expression>>,
        negated: bool,
    },
    Not(Box<Expression>),
    Negative(Box<Expression>),
    /// `(a)` or a row `(a, b)`
    Parenthesized(Vec<Expression>),
    Case {
        operand: Option<Box<Expression>>,
        when_clauses: Vec<WhenClause>,
        else_result: Option<Box<Expression>>,
    },
    Function {
        name: String,
        distinct: bool,
        args: FunctionArgs,
    },
    Exists(Box<SelectStatement>),
    Subquery(Box<SelectStatement>),
}

impl Expression {
    pub fn column(qualifier: Option<&str>, name: &str) -> Self {
        Expression::Column(ColumnRef {
            qualifier: qualifier.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub fn string(value: &str) -> Self {
        Expression::Literal(Literal::String(value.to_string()))
    }

    pub fn number(value: i64) -> Self {
        Expression::Literal(Literal::Number(value.to_string()))
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn comparison(op: ComparisonOperator, left: Expression, right: Expression) -> Self {
        Expression::Comparison {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::binary(BinaryOperator::And, left, right)
    }
}
