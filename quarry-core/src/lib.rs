//! Quarry Core - query objects, the connection capability and a mock
//! connection for testing ORM code without a database.
//!
//! Queries are built in a fluent, immutable style and rendered to SQL by a
//! [`QueryBuilder`] that carries the dialect's quirks. Anything implementing
//! [`Connection`] can execute them; [`mock::MockConnection`] answers every
//! statement with a canned outcome.

pub mod builder;
pub mod connection;
pub mod error;
pub mod logging;
pub mod mock;
pub mod operator;
pub mod result;
pub mod value;

// Re-export main types
pub use builder::{
    AutoIncrementFn, ColumnDef, CreateTable, Delete, DialectFlags, DropTable, Insert, IntoColumns,
    IntoCondition, IntoRecord, JoinType, Query, QueryBuilder, Select, SortDirection, Update,
    WhereCondition, WhereConnector,
};
pub use connection::{
    transaction, Connection, ExecutableQuery, NamedParameters, PreparedStatement, QueryResult,
};
pub use error::{Error, Result};
pub use operator::{op, IntoOperator, Operator};
pub use result::{ResultFetcher, ResultSet, Row};
pub use value::Value;

/// Create a new SELECT query for the given table
pub fn select(table: &str) -> Select {
    Select::new(table)
}

/// Create a new INSERT query for the given table
pub fn insert(table: &str) -> Insert {
    Insert::new(table)
}

/// Create a new UPDATE query for the given table
pub fn update(table: &str) -> Update {
    Update::new(table)
}

/// Create a new DELETE query for the given table
pub fn delete(table: &str) -> Delete {
    Delete::new(table)
}

/// Create a new CREATE TABLE query
pub fn create_table(table: &str) -> CreateTable {
    CreateTable::new(table)
}

/// Create a new DROP TABLE query
pub fn drop_table(table: &str) -> DropTable {
    DropTable::new(table)
}
