//! Common types and traits shared across all query objects

use crate::{Error, IntoOperator, Operator, Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Produces the column definition for an auto-increment column from its SQL
/// type and whether it is the primary key.
pub type AutoIncrementFn = Arc<dyn Fn(&str, bool) -> String + Send + Sync>;

/// A query object that can be rendered into SQL text by a [`QueryBuilder`]
pub trait Query: fmt::Debug + Send + Sync {
    /// Render the query for the given dialect
    fn build(&self, builder: &QueryBuilder) -> Result<String>;

    /// Bound values, in placeholder order
    fn parameters(&self) -> Vec<Value>;

    /// Clone into a boxed trait object (for recording and replay)
    fn clone_query(&self) -> Box<dyn Query>;

    /// Render with the default dialect
    fn to_sql(&self) -> Result<String> {
        self.build(&QueryBuilder::default())
    }
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_query()
    }
}

/// Serializable part of a dialect configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectFlags {
    /// DELETE with extra tables uses `USING` instead of the multi-table form
    pub delete_requires_using: bool,
    /// UPDATE with extra tables uses `FROM` instead of the multi-table form
    pub update_requires_from: bool,
}

/// Dialect configuration that turns query objects into SQL text
///
/// # Examples
/// ```
/// use quarry_core::{delete, Query, QueryBuilder};
///
/// let postgres = QueryBuilder::new().with_delete_requires_using(true);
/// let query = delete("orders").using("customers").where_(("customers.id", 7));
/// assert_eq!(
///     query.build(&postgres).unwrap(),
///     "DELETE FROM orders USING customers WHERE customers.id = ?"
/// );
/// ```
#[derive(Clone, Default)]
pub struct QueryBuilder {
    flags: DialectFlags,
    create_auto_increment: Option<AutoIncrementFn>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_requires_using(mut self, required: bool) -> Self {
        self.flags.delete_requires_using = required;
        self
    }

    pub fn with_update_requires_from(mut self, required: bool) -> Self {
        self.flags.update_requires_from = required;
        self
    }

    /// Install the auto-increment column generator
    pub fn with_create_auto_increment<F>(mut self, generator: F) -> Self
    where
        F: Fn(&str, bool) -> String + Send + Sync + 'static,
    {
        self.create_auto_increment = Some(Arc::new(generator));
        self
    }

    /// Replace the auto-increment generator, `None` removes it
    pub fn with_auto_increment_fn(mut self, generator: Option<AutoIncrementFn>) -> Self {
        self.create_auto_increment = generator;
        self
    }

    pub fn delete_requires_using(&self) -> bool {
        self.flags.delete_requires_using
    }

    pub fn update_requires_from(&self) -> bool {
        self.flags.update_requires_from
    }

    pub fn flags(&self) -> DialectFlags {
        self.flags
    }

    pub fn supports_auto_increment(&self) -> bool {
        self.create_auto_increment.is_some()
    }

    /// Column definition for an auto-increment column
    pub fn auto_increment_column(&self, sql_type: &str, primary_key: bool) -> Result<String> {
        match &self.create_auto_increment {
            Some(generator) => Ok(generator(sql_type, primary_key)),
            None => Err(Error::unsupported(format!(
                "auto increment columns of type {}",
                sql_type
            ))),
        }
    }

    /// Render a query object with this dialect
    pub fn build(&self, query: &dyn Query) -> Result<String> {
        query.build(self)
    }
}

impl From<DialectFlags> for QueryBuilder {
    fn from(flags: DialectFlags) -> Self {
        Self {
            flags,
            create_auto_increment: None,
        }
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("delete_requires_using", &self.flags.delete_requires_using)
            .field("update_requires_from", &self.flags.update_requires_from)
            .field("create_auto_increment", &self.create_auto_increment.is_some())
            .finish()
    }
}

/// Trait for conditions that can be used in WHERE clauses
pub trait IntoCondition {
    fn into_condition(self) -> Result<(String, Operator, Value)>;
}

// Shorthand equality: where_(("age", 18))
impl<T> IntoCondition for (&str, T)
where
    T: Into<Value>,
{
    fn into_condition(self) -> Result<(String, Operator, Value)> {
        Ok((self.0.to_string(), Operator::Eq, self.1.into()))
    }
}

// Explicit operators: where_(("age", op::GT, 18)) or where_(("age", ">", 18))
impl<T, O> IntoCondition for (&str, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_condition(self) -> Result<(String, Operator, Value)> {
        Ok((self.0.to_string(), self.1.into_operator()?, self.2.into()))
    }
}

/// A WHERE condition
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
    pub connector: WhereConnector,
}

/// How WHERE conditions are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhereConnector {
    And,
    Or,
}

/// Ordered WHERE conditions plus the first error raised while adding them.
///
/// Builders stay infallible while chaining; a bad condition surfaces when the
/// query is built.
#[derive(Debug, Clone, Default)]
pub(crate) struct WhereClause {
    conditions: Vec<WhereCondition>,
    error: Option<String>,
}

impl WhereClause {
    pub(crate) fn add<C>(&mut self, condition: C, connector: WhereConnector)
    where
        C: IntoCondition,
    {
        let result = condition.into_condition().and_then(|(column, operator, value)| {
            let list_len = value.as_array().map(<[Value]>::len);
            match list_len {
                Some(0) if operator.takes_list() => Err(Error::invalid_query(format!(
                    "{} on '{}' requires at least one value",
                    operator, column
                ))),
                Some(_) if operator.takes_value() && !operator.takes_list() => {
                    Err(Error::invalid_query(format!(
                        "{} on '{}' does not take a list",
                        operator, column
                    )))
                }
                _ => Ok(WhereCondition {
                    column,
                    operator,
                    value,
                    connector,
                }),
            }
        });

        match result {
            Ok(condition) => self.conditions.push(condition),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(match err {
                        Error::InvalidQuery { message } => message,
                        other => other.to_string(),
                    });
                }
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(crate) fn conditions(&self) -> &[WhereCondition] {
        &self.conditions
    }

    pub(crate) fn check(&self) -> Result<()> {
        match &self.error {
            Some(message) => Err(Error::invalid_query(message.clone())),
            None => Ok(()),
        }
    }

    pub(crate) fn render(&self, sql: &mut String) -> Result<()> {
        self.check()?;
        if self.conditions.is_empty() {
            return Ok(());
        }

        sql.push_str(" WHERE ");
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                match condition.connector {
                    WhereConnector::And => sql.push_str(" AND "),
                    WhereConnector::Or => sql.push_str(" OR "),
                }
            }

            sql.push_str(&condition.column);
            sql.push(' ');
            sql.push_str(condition.operator.as_sql());

            if !condition.operator.takes_value() {
                continue;
            }
            match condition.value.as_array() {
                Some(items) => {
                    let placeholders = vec!["?"; items.len()].join(", ");
                    sql.push_str(&format!(" ({})", placeholders));
                }
                None if condition.operator.takes_list() => sql.push_str(" (?)"),
                None => sql.push_str(" ?"),
            }
        }
        Ok(())
    }

    pub(crate) fn extend_parameters(&self, out: &mut Vec<Value>) {
        for condition in &self.conditions {
            if !condition.operator.takes_value() {
                continue;
            }
            match condition.value.as_array() {
                Some(items) => out.extend(items.iter().cloned()),
                None => out.push(condition.value.clone()),
            }
        }
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Trait to convert various types into columns
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

/// Column/value pairs for INSERT rows and UPDATE assignments
pub trait IntoRecord {
    fn into_record(self) -> Vec<(String, Value)>;
}

// Sorted by column so the rendered SQL is deterministic
impl IntoRecord for HashMap<String, Value> {
    fn into_record(self) -> Vec<(String, Value)> {
        let mut record: Vec<(String, Value)> = self.into_iter().collect();
        record.sort_by(|a, b| a.0.cmp(&b.0));
        record
    }
}

impl IntoRecord for BTreeMap<String, Value> {
    fn into_record(self) -> Vec<(String, Value)> {
        self.into_iter().collect()
    }
}

impl IntoRecord for Vec<(String, Value)> {
    fn into_record(self) -> Vec<(String, Value)> {
        self
    }
}

impl<V> IntoRecord for Vec<(&str, V)>
where
    V: Into<Value>,
{
    fn into_record(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.to_string(), value.into()))
            .collect()
    }
}
