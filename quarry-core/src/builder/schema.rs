//! CREATE TABLE / DROP TABLE query objects

use super::common::{Query, QueryBuilder};
use crate::{Error, Result, Value};

/// A column in a CREATE TABLE statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    name: String,
    sql_type: String,
    primary_key: bool,
    auto_increment: bool,
    not_null: bool,
}

impl ColumnDef {
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            primary_key: false,
            auto_increment: false,
            not_null: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as auto-increment; the dialect's generator renders the definition
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn render(&self, builder: &QueryBuilder) -> Result<String> {
        if self.auto_increment {
            let definition = builder.auto_increment_column(&self.sql_type, self.primary_key)?;
            return Ok(format!("{} {}", self.name, definition));
        }

        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        Ok(sql)
    }
}

/// CREATE TABLE query object
///
/// # Examples
/// ```
/// use quarry_core::{create_table, ColumnDef, Query, QueryBuilder};
///
/// let sqlite = QueryBuilder::new()
///     .with_create_auto_increment(|ty, pk| if pk { format!("{} PRIMARY KEY AUTOINCREMENT", ty) } else { ty.to_string() });
/// let query = create_table("people")
///     .column(ColumnDef::new("id", "integer").primary_key().auto_increment())
///     .column(ColumnDef::new("name", "text").not_null());
/// assert_eq!(
///     query.build(&sqlite).unwrap(),
///     "CREATE TABLE people (id integer PRIMARY KEY AUTOINCREMENT, name text NOT NULL)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CreateTable {
    table_name: String,
    if_not_exists: bool,
    columns: Vec<ColumnDef>,
}

impl CreateTable {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            if_not_exists: false,
            columns: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }
}

impl Query for CreateTable {
    fn build(&self, builder: &QueryBuilder) -> Result<String> {
        if self.columns.is_empty() {
            return Err(Error::invalid_query("CREATE TABLE requires at least one column"));
        }

        let columns = self
            .columns
            .iter()
            .map(|column| column.render(builder))
            .collect::<Result<Vec<_>>>()?;

        let guard = if self.if_not_exists { "IF NOT EXISTS " } else { "" };
        Ok(format!(
            "CREATE TABLE {}{} ({})",
            guard,
            self.table_name,
            columns.join(", ")
        ))
    }

    fn parameters(&self) -> Vec<Value> {
        Vec::new()
    }

    fn clone_query(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}

/// DROP TABLE query object
#[derive(Debug, Clone)]
pub struct DropTable {
    table_name: String,
    if_exists: bool,
}

impl DropTable {
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            if_exists: false,
        }
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl Query for DropTable {
    fn build(&self, _builder: &QueryBuilder) -> Result<String> {
        let guard = if self.if_exists { "IF EXISTS " } else { "" };
        Ok(format!("DROP TABLE {}{}", guard, self.table_name))
    }

    fn parameters(&self) -> Vec<Value> {
        Vec::new()
    }

    fn clone_query(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }
}
