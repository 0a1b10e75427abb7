//! INSERT query object

use super::common::{IntoRecord, Query, QueryBuilder};
use crate::{Error, Result, Value};

/// INSERT query object
#[derive(Debug, Clone)]
pub struct Insert {
    table_name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    returning: Vec<String>,
    error: Option<String>,
}

impl Insert {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            returning: Vec::new(),
            error: None,
        }
    }

    /// Insert a single record
    ///
    /// The first record fixes the column list. Later records are reordered to
    /// it by column name; a record with a different set of columns makes
    /// `build` fail.
    ///
    /// # Examples
    /// ```
    /// use quarry_core::{insert, Query};
    ///
    /// let query = insert("people").values(vec![("name", "Joe"), ("city", "Dublin")]);
    /// assert_eq!(query.to_sql().unwrap(), "INSERT INTO people (name, city) VALUES (?, ?)");
    /// ```
    pub fn values<T>(mut self, data: T) -> Self
    where
        T: IntoRecord,
    {
        let record = data.into_record();
        if self.rows.is_empty() {
            let (columns, values): (Vec<String>, Vec<Value>) = record.into_iter().unzip();
            self.columns = columns;
            self.rows.push(values);
            return self;
        }

        match self.align(record) {
            Ok(values) => self.rows.push(values),
            Err(message) => {
                if self.error.is_none() {
                    self.error = Some(message);
                }
            }
        }
        self
    }

    fn align(&self, mut record: Vec<(String, Value)>) -> std::result::Result<Vec<Value>, String> {
        let names: Vec<String> = record.iter().map(|(name, _)| name.clone()).collect();
        let mismatch = format!(
            "INSERT record columns ({}) do not match ({})",
            names.join(", "),
            self.columns.join(", ")
        );
        if record.len() != self.columns.len() {
            return Err(mismatch);
        }

        let mut values = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            match record.iter().position(|(name, _)| name == column) {
                Some(index) => values.push(record.swap_remove(index).1),
                None => return Err(mismatch),
            }
        }
        Ok(values)
    }

    /// Insert multiple records
    pub fn values_many<T, I>(self, data: I) -> Self
    where
        T: IntoRecord,
        I: IntoIterator<Item = T>,
    {
        data.into_iter().fold(self, |query, record| query.values(record))
    }

    /// Append a RETURNING clause
    pub fn returning(mut self, column: &str) -> Self {
        self.returning.push(column.to_string());
        self
    }
}

impl Query for Insert {
    fn build(&self, _builder: &QueryBuilder) -> Result<String> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(Error::invalid_query("INSERT requires columns and values"));
        }
        if let Some(message) = &self.error {
            return Err(Error::invalid_query(message.clone()));
        }

        let placeholders = vec!["?"; self.columns.len()].join(", ");
        let groups = vec![format!("({})", placeholders); self.rows.len()];

        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table_name,
            self.columns.join(", "),
            groups.join(", ")
        );

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            sql.push_str(&self.returning.join(", "));
        }

        Ok(sql)
    }

    fn parameters(&self) -> Vec<Value> {
        self.rows.iter().flatten().cloned().collect()
    }

    fn clone_query(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_insert_hashmap() {
        let mut data = HashMap::new();
        data.insert("name".to_string(), Value::from("Joe"));
        data.insert("age".to_string(), Value::from(38));

        let query = Insert::new("people").values(data);
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO people (age, name) VALUES (?, ?)"
        );
        assert_eq!(query.parameters(), vec![Value::I32(38), Value::from("Joe")]);
    }

    #[test]
    fn test_insert_many() {
        let query = Insert::new("people")
            .values_many(vec![
                vec![("name", Value::from("Joe")), ("age", Value::from(38))],
                vec![("name", Value::from("Adam")), ("age", Value::from(28))],
            ])
            .returning("id");
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO people (name, age) VALUES (?, ?), (?, ?) RETURNING id"
        );
        assert_eq!(query.parameters().len(), 4);
    }

    #[test]
    fn test_insert_empty_data_fails() {
        let err = Insert::new("people").to_sql().unwrap_err();
        assert!(err.to_string().contains("INSERT requires columns and values"));
    }

    #[test]
    fn test_insert_ragged_rows_fail() {
        let query = Insert::new("people")
            .values(vec![("name", "Joe"), ("city", "Dublin")])
            .values(vec![("name", "Adam")]);
        assert!(matches!(query.to_sql(), Err(Error::InvalidQuery { .. })));
    }

    #[test]
    fn test_insert_reorders_later_records_by_column() {
        let query = Insert::new("people")
            .values(vec![("name", Value::from("Joe")), ("age", Value::from(38))])
            .values(vec![("age", Value::from(28)), ("name", Value::from("Adam"))]);
        assert_eq!(
            query.to_sql().unwrap(),
            "INSERT INTO people (name, age) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(
            query.parameters(),
            vec![
                Value::from("Joe"),
                Value::I32(38),
                Value::from("Adam"),
                Value::I32(28)
            ]
        );
    }

    #[test]
    fn test_insert_mismatched_columns_fail() {
        let query = Insert::new("people")
            .values(vec![("name", "Joe"), ("city", "Dublin")])
            .values(vec![("name", "Adam"), ("town", "Cork")]);
        let err = query.to_sql().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery { .. }));
        assert!(err
            .to_string()
            .contains("INSERT record columns (name, town) do not match (name, city)"));
    }
}
