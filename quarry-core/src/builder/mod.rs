//! Query objects and the dialect renderer

pub mod common;
pub mod delete;
pub mod insert;
pub mod schema;
pub mod select;
pub mod update;

// Re-export types from submodules
pub use common::{
    AutoIncrementFn, DialectFlags, IntoColumns, IntoCondition, IntoRecord, Query, QueryBuilder,
    SortDirection, WhereCondition, WhereConnector,
};
pub use delete::Delete;
pub use insert::Insert;
pub use schema::{ColumnDef, CreateTable, DropTable};
pub use select::{JoinType, Select};
pub use update::Update;
