//! UPDATE query object

use super::common::{IntoCondition, IntoRecord, Query, QueryBuilder, WhereClause, WhereConnector};
use crate::{Error, Result, Value};

/// UPDATE query object
///
/// Extra tables named with [`Update::from_table`] render as `UPDATE t SET .. FROM a`
/// when the dialect requires FROM, and as `UPDATE t, a SET ..` otherwise.
#[derive(Debug, Clone)]
pub struct Update {
    table_name: String,
    set_clauses: Vec<(String, Value)>,
    from_tables: Vec<String>,
    where_clause: WhereClause,
}

impl Update {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            set_clauses: Vec::new(),
            from_tables: Vec::new(),
            where_clause: WhereClause::default(),
        }
    }

    /// Set column values
    pub fn set<T>(mut self, data: T) -> Self
    where
        T: IntoRecord,
    {
        self.set_clauses.extend(data.into_record());
        self
    }

    /// Set a single column
    pub fn set_column(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set_clauses.push((column.to_string(), value.into()));
        self
    }

    /// Reference another table in the WHERE clause
    pub fn from_table(mut self, table: &str) -> Self {
        self.from_tables.push(table.to_string());
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
}

impl Query for Update {
    fn build(&self, builder: &QueryBuilder) -> Result<String> {
        if self.set_clauses.is_empty() {
            return Err(Error::invalid_query("UPDATE requires SET clauses"));
        }

        let mut sql = format!("UPDATE {}", self.table_name);
        let joined_tables = self.from_tables.join(", ");
        let inline_from = !self.from_tables.is_empty() && !builder.update_requires_from();

        if inline_from {
            sql.push_str(", ");
            sql.push_str(&joined_tables);
        }

        let assignments: Vec<String> = self
            .set_clauses
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect();
        sql.push_str(" SET ");
        sql.push_str(&assignments.join(", "));

        if !self.from_tables.is_empty() && !inline_from {
            sql.push_str(" FROM ");
            sql.push_str(&joined_tables);
        }

        self.where_clause.render(&mut sql)?;
        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        let mut params: Vec<Value> = self.set_clauses.iter().map(|(_, v)| v.clone()).collect();
        self.where_clause.extend_parameters(&mut params);
        params
    }

    fn clone_query(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
