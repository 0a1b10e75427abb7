//! SELECT query object

use super::common::{
    IntoColumns, IntoCondition, Query, QueryBuilder, SortDirection, WhereClause, WhereCondition,
    WhereConnector,
};
use crate::{Result, Value};

/// Join flavours supported by [`Select`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

impl JoinType {
    fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct JoinClause {
    join_type: JoinType,
    table: String,
    left_column: String,
    right_column: String,
}

/// SELECT query object
#[derive(Debug, Clone)]
pub struct Select {
    table_name: String,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<JoinClause>,
    where_clause: WhereClause,
    order_by: Vec<(String, SortDirection)>,
    limit_value: Option<u64>,
    offset_value: Option<u64>,
}

impl Select {
    /// Create a new `SELECT * FROM table`
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            columns: vec!["*".to_string()],
            distinct: false,
            joins: Vec::new(),
            where_clause: WhereClause::default(),
            order_by: Vec::new(),
            limit_value: None,
            offset_value: None,
        }
    }

    /// Select specific columns
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{select, Query};
    ///
    /// let query = select("people").columns(("id", "name", "age"));
    /// assert_eq!(query.to_sql().unwrap(), "SELECT id, name, age FROM people");
    /// ```
    pub fn columns<T>(mut self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        self.columns = columns.into_columns();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a WHERE condition
    pub fn where_<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause.add(condition, WhereConnector::And);
        self
    }

    /// Add an OR WHERE condition
    pub fn or_where<C>(mut self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_clause.add(condition, WhereConnector::Or);
        self
    }

    /// Add an AND WHERE condition (same as where_)
    pub fn and_where<C>(self, condition: C) -> Self
    where
        C: IntoCondition,
    {
        self.where_(condition)
    }

    pub fn inner_join(self, table: &str, left_column: &str, right_column: &str) -> Self {
        self.join(JoinType::Inner, table, left_column, right_column)
    }

    pub fn left_join(self, table: &str, left_column: &str, right_column: &str) -> Self {
        self.join(JoinType::Left, table, left_column, right_column)
    }

    fn join(mut self, join_type: JoinType, table: &str, left_column: &str, right_column: &str) -> Self {
        self.joins.push(JoinClause {
            join_type,
            table: table.to_string(),
            left_column: left_column.to_string(),
            right_column: right_column.to_string(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    /// Set the LIMIT clause
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_value = Some(limit);
        self
    }

    /// Set the OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = Some(offset);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn conditions(&self) -> &[WhereCondition] {
        self.where_clause.conditions()
    }
}

impl Query for Select {
    fn build(&self, _builder: &QueryBuilder) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.columns.join(", "));

        sql.push_str(" FROM ");
        sql.push_str(&self.table_name);

        for join in &self.joins {
            sql.push_str(&format!(
                " {} {} ON {} = {}",
                join.join_type.as_sql(),
                join.table,
                join.left_column,
                join.right_column
            ));
        }

        self.where_clause.render(&mut sql)?;

        if !self.order_by.is_empty() {
            let parts: Vec<String> = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&parts.join(", "));
        }

        if let Some(limit) = self.limit_value {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = self.offset_value {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        let mut params = Vec::new();
        self.where_clause.extend_parameters(&mut params);
        params
    }

    fn clone_query(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
