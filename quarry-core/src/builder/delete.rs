//! DELETE query object

use super::common::{IntoCondition, Query, QueryBuilder, WhereClause, WhereConnector};
use crate::{Result, Value};

/// DELETE query object
///
/// Extra tables named with [`Delete::using`] render as
/// `DELETE FROM t USING a` when the dialect requires USING, and as the
/// multi-table form `DELETE t FROM t, a` otherwise.
#[derive(Debug, Clone)]
pub struct Delete {
    table_name: String,
    using_tables: Vec<String>,
    where_clause: WhereClause,
}

impl Delete {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            using_tables: Vec::new(),
            where_clause: WhereClause::default(),
        }
    }

    pub fn using(mut self, table: &str) -> Self {
        self.using_tables.push(table.to_string());
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

    /// Whether the statement would remove every row of the table
    pub fn is_unconditional(&self) -> bool {
        self.where_clause.is_empty()
    }
}

impl Query for Delete {
    fn build(&self, builder: &QueryBuilder) -> Result<String> {
        let mut sql = if self.using_tables.is_empty() {
            format!("DELETE FROM {}", self.table_name)
        } else if builder.delete_requires_using() {
            format!(
                "DELETE FROM {} USING {}",
                self.table_name,
                self.using_tables.join(", ")
            )
        } else {
            format!(
                "DELETE {} FROM {}, {}",
                self.table_name,
                self.table_name,
                self.using_tables.join(", ")
            )
        };

        self.where_clause.render(&mut sql)?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op;

    #[test]
    fn test_delete_builder() {
        let query = Delete::new("people")
            .where_(("age", op::LT, 30))
            .or_where(("name", "Chris"));
        assert_eq!(
            query.to_sql().unwrap(),
            "DELETE FROM people WHERE age < ? OR name = ?"
        );
        assert!(!query.is_unconditional());
    }

    #[test]
    fn test_delete_without_where() {
        let query = Delete::new("people");
        assert_eq!(query.to_sql().unwrap(), "DELETE FROM people");
        assert!(query.is_unconditional());
    }

    #[test]
    fn test_delete_using_with_requires_using() {
        let builder = QueryBuilder::new().with_delete_requires_using(true);
        let query = Delete::new("people")
            .using("addresses")
            .where_(("addresses.city", "Cork"));
        assert_eq!(
            query.build(&builder).unwrap(),
            "DELETE FROM people USING addresses WHERE addresses.city = ?"
        );
    }

    #[test]
    fn test_delete_using_without_requires_using() {
        let query = Delete::new("people")
            .using("addresses")
            .where_(("addresses.city", "Cork"));
        assert_eq!(
            query.to_sql().unwrap(),
            "DELETE people FROM people, addresses WHERE addresses.city = ?"
        );
    }
}
