//! Runtime query DSL used by generated `count` and `select` accessors
//!
//! Callers describe filtering, ordering and pagination with
//! [`SelectOptions`]; the builders below turn it into a parameterised SQL
//! suffix ([`Clause`]) that is appended to the generated base statement.

use crate::error::QueryError;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted in a [`Filter`]
const ALLOWED_OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "LIKE", "NOT LIKE", "ILIKE", "NOT ILIKE",
];

/// A single `"column" OPERATOR $n` condition
///
/// The value must not be [`SqlValue::Null`]: `= NULL` never matches, and an
/// untyped NULL parameter cannot be compared with non-text columns.
/// [`where_clause`] rejects such filters with [`QueryError::NullValue`].
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    column: String,
    operator: String,
    value: SqlValue,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<SqlValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, "=", value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, "!=", value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, ">", value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, ">=", value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, "<", value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new(column, "<=", value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, "LIKE", pattern.into())
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn value(&self) -> &SqlValue {
        &self.value
    }

    fn normalized_operator(&self) -> Result<String, QueryError> {
        let operator = self
            .operator
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();

        if ALLOWED_OPERATORS.contains(&operator.as_str()) {
            Ok(operator)
        } else {
            Err(QueryError::UnsupportedOperator {
                column: self.column.clone(),
                operator: self.operator.clone(),
            })
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for OrderDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(QueryError::InvalidDirection(s.to_string())),
        }
    }
}

/// One `ORDER BY` term
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Direction {
    column: String,
    direction: OrderDirection,
}

impl Direction {
    pub fn new(column: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Asc)
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, OrderDirection::Desc)
    }

    /// Build a direction from a textual `asc`/`desc` (any case)
    pub fn parse(column: impl Into<String>, direction: &str) -> Result<Self, QueryError> {
        Ok(Self::new(column, direction.parse()?))
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

/// Filtering, ordering and pagination for `count`/`select`
///
/// An empty value behaves exactly like passing no options at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectOptions {
    pub filters: Vec<Filter>,
    pub order_by: Vec<Direction>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, direction: Direction) -> Self {
        self.order_by.push(direction);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.order_by.is_empty()
            && self.limit.unwrap_or(0) == 0
            && self.offset.unwrap_or(0) == 0
    }
}

/// SQL suffix plus the values for its `$n` placeholders, in order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Clause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl Clause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty() && self.values.is_empty()
    }
}

/// Result of a generated `select`: the filtered total and the returned page
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectResult<T> {
    total: u64,
    selected: u64,
    rows: Vec<T>,
}

impl<T> SelectResult<T> {
    pub fn new(total: u64, rows: Vec<T>) -> Self {
        Self {
            total,
            selected: rows.len() as u64,
            rows,
        }
    }

    /// Rows matching the filters, ignoring limit and offset
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn selected(&self) -> u64 {
        self.selected
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

/// Quote a column for use inside the WHERE clause, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Lowercase identifiers fold to themselves and are written bare
fn is_lowercase_identifier(name: &str) -> bool {
    is_plain_identifier(name) && !name.chars().any(|c| c.is_ascii_uppercase())
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// ` WHERE "a" = $1 AND "b" > $2`, or an empty clause without filters
pub fn where_clause(filters: &[Filter]) -> Result<Clause, QueryError> {
    let mut clause = Clause::default();
    if filters.is_empty() {
        return Ok(clause);
    }

    let mut conditions = Vec::with_capacity(filters.len());
    for (i, filter) in filters.iter().enumerate() {
        if filter.column.is_empty() {
            return Err(QueryError::InvalidIdentifier(filter.column.clone()));
        }
        let operator = filter.normalized_operator()?;
        if filter.value.is_null() {
            return Err(QueryError::NullValue {
                column: filter.column.clone(),
            });
        }
        conditions.push(format!(
            "{} {} ${}",
            quote_identifier(&filter.column),
            operator,
            i + 1
        ));
        clause.values.push(filter.value.clone());
    }

    clause.sql = format!(" WHERE {}", conditions.join(" AND "));
    Ok(clause)
}

/// ` ORDER BY a ASC, "createdAt" DESC`, or an empty string without directions
///
/// Columns must be plain identifiers. Lowercase names are written bare;
/// names with uppercase letters are quoted so they keep their case.
pub fn order_by_clause(directions: &[Direction]) -> Result<String, QueryError> {
    if directions.is_empty() {
        return Ok(String::new());
    }

    let mut terms = Vec::with_capacity(directions.len());
    for direction in directions {
        if !is_plain_identifier(&direction.column) {
            return Err(QueryError::InvalidIdentifier(direction.column.clone()));
        }
        let column = if is_lowercase_identifier(&direction.column) {
            direction.column.clone()
        } else {
            quote_identifier(&direction.column)
        };
        terms.push(format!("{} {}", column, direction.direction.as_sql()));
    }

    Ok(format!(" ORDER BY {}", terms.join(", ")))
}

/// ` LIMIT n OFFSET m`; zero or unset values are left out
pub fn limit_offset_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    let mut sql = String::new();
    if let Some(limit) = limit.filter(|&n| n > 0) {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if let Some(offset) = offset.filter(|&n| n > 0) {
        sql.push_str(&format!(" OFFSET {}", offset));
    }
    sql
}

/// Suffix for `SELECT count(*) FROM ...`: filters only
pub fn count_clause(options: Option<&SelectOptions>) -> Result<Clause, QueryError> {
    match options {
        Some(options) => where_clause(&options.filters),
        None => Ok(Clause::default()),
    }
}

/// Suffix for `SELECT <columns> FROM ...`: filters, ordering, then pagination
pub fn select_clause(options: Option<&SelectOptions>) -> Result<Clause, QueryError> {
    let Some(options) = options else {
        return Ok(Clause::default());
    };

    let mut clause = where_clause(&options.filters)?;
    clause.sql.push_str(&order_by_clause(&options.order_by)?);
    clause
        .sql
        .push_str(&limit_offset_clause(options.limit, options.offset));

    log::trace!("select clause: {:?} ({} values)", clause.sql, clause.values.len());
    Ok(clause)
}
