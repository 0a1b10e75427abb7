//! Connection capability and execution helpers

use crate::{Error, Query, Result, ResultSet, Value};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

/// Parameters bound by name
pub type NamedParameters = BTreeMap<String, Value>;

/// Outcome of a successfully executed statement
#[derive(Debug)]
pub enum QueryResult {
    /// Statement ran and produced nothing
    SuccessNoData,
    /// Statement produced a single scalar (row count, inserted id, ...)
    Success(Value),
    /// Statement produced rows
    ResultSet(ResultSet),
}

impl QueryResult {
    pub fn is_success_no_data(&self) -> bool {
        matches!(self, QueryResult::SuccessNoData)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            QueryResult::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_result_set(self) -> Option<ResultSet> {
        match self {
            QueryResult::ResultSet(set) => Some(set),
            _ => None,
        }
    }
}

/// Handle to a statement prepared on a connection
pub trait PreparedStatement: fmt::Debug + Send + Sync {
    /// SQL text the statement was prepared from
    fn sql(&self) -> &str;
}

/// A single database connection
///
/// Every method completes through its returned future; implementations that
/// have nothing to wait on resolve immediately.
pub trait Connection: Send {
    type Statement: PreparedStatement;

    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn is_connected(&self) -> bool;

    fn close(&mut self);

    /// Execute a query object
    fn execute(&mut self, query: &dyn Query) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Execute raw SQL text
    fn execute_raw(&mut self, raw: &str) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Execute a query object with positional parameters
    fn execute_with(
        &mut self,
        query: &dyn Query,
        parameters: &[Value],
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Execute raw SQL text with positional parameters
    fn execute_raw_with(
        &mut self,
        raw: &str,
        parameters: &[Value],
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Execute a query object with named parameters
    fn execute_named(
        &mut self,
        query: &dyn Query,
        parameters: &NamedParameters,
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    /// Execute raw SQL text with named parameters
    fn execute_raw_named(
        &mut self,
        raw: &str,
        parameters: &NamedParameters,
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    fn prepare(&mut self, query: &dyn Query) -> Result<Self::Statement>;

    fn prepare_raw(&mut self, raw: &str) -> Result<Self::Statement>;

    fn execute_prepared(
        &mut self,
        statement: &Self::Statement,
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    fn execute_prepared_with(
        &mut self,
        statement: &Self::Statement,
        parameters: &[Value],
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    fn execute_prepared_named(
        &mut self,
        statement: &Self::Statement,
        parameters: &NamedParameters,
    ) -> impl Future<Output = Result<QueryResult>> + Send;

    fn release_prepared(
        &mut self,
        statement: Self::Statement,
    ) -> impl Future<Output = Result<()>> + Send;

    fn start_transaction(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send;

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Create a savepoint with the given name
    fn create_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Rollback to a savepoint
    fn rollback_to_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Release a savepoint
    fn release_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send;

    /// Render a query the way this connection's dialect would
    fn description_of(&self, query: &dyn Query) -> Result<String>;
}

/// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`
///
/// # Examples
/// ```
/// use quarry_core::mock::{create_connection, MockOutcome};
/// use quarry_core::{transaction, Connection, Error};
///
/// let mut conn = create_connection(MockOutcome::Empty);
/// let answer = tokio_test::block_on(transaction(&mut conn, |conn| {
///     Box::pin(async move {
///         conn.execute_raw("DELETE FROM people").await?;
///         Ok::<_, Error>(42)
///     })
/// }))
/// .unwrap();
/// assert_eq!(answer, 42);
/// ```
pub async fn transaction<C, F, T, E>(conn: &mut C, f: F) -> Result<T>
where
    C: Connection,
    F: for<'c> FnOnce(&'c mut C) -> BoxFuture<'c, std::result::Result<T, E>>,
    E: Into<Error>,
{
    conn.start_transaction().await?;

    match f(conn).await {
        Ok(result) => {
            conn.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = conn.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback after failed transaction also failed");
            }
            Err(e.into())
        }
    }
}

/// Execution helpers available on every query object
pub trait ExecutableQuery: Query + Sized {
    /// Execute and return the raw outcome
    fn run<C>(&self, conn: &mut C) -> impl Future<Output = Result<QueryResult>> + Send
    where
        C: Connection;

    /// Execute and decode every returned row
    fn fetch_all<T, C>(&self, conn: &mut C) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        C: Connection,
        T: DeserializeOwned + Send;

    /// Execute and decode the first row, failing when there is none
    fn fetch_one<T, C>(&self, conn: &mut C) -> impl Future<Output = Result<T>> + Send
    where
        C: Connection,
        T: DeserializeOwned + Send;

    /// Execute and decode the first row if there is one
    fn fetch_optional<T, C>(&self, conn: &mut C) -> impl Future<Output = Result<Option<T>>> + Send
    where
        C: Connection,
        T: DeserializeOwned + Send;
}

impl<Q> ExecutableQuery for Q
where
    Q: Query,
{
    async fn run<C>(&self, conn: &mut C) -> Result<QueryResult>
    where
        C: Connection,
    {
        conn.execute(self).await
    }

    async fn fetch_all<T, C>(&self, conn: &mut C) -> Result<Vec<T>>
    where
        C: Connection,
        T: DeserializeOwned + Send,
    {
        match conn.execute(self).await? {
            QueryResult::ResultSet(set) => set.decode_all(),
            _ => Ok(Vec::new()),
        }
    }

    async fn fetch_one<T, C>(&self, conn: &mut C) -> Result<T>
    where
        C: Connection,
        T: DeserializeOwned + Send,
    {
        self.fetch_optional(conn)
            .await?
            .ok_or_else(|| Error::no_result("Query returned no rows"))
    }

    async fn fetch_optional<T, C>(&self, conn: &mut C) -> Result<Option<T>>
    where
        C: Connection,
        T: DeserializeOwned + Send,
    {
        match conn.execute(self).await? {
            QueryResult::ResultSet(mut set) => set.decode_next(),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{create_connection, MockOutcome};
    use crate::{op, select};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Person {
        id: i64,
        name: String,
        age: i32,
    }

    #[tokio::test]
    async fn test_fetch_all_decodes_rows() {
        let mut conn = create_connection(MockOutcome::ThreeRows);
        let people: Vec<Person> = select("people").fetch_all(&mut conn).await.unwrap();
        assert_eq!(people.len(), 3);
        assert_eq!(people[0], Person { id: 1, name: "Joe".into(), age: 38 });
        assert_eq!(people[2].name, "Chris");
    }

    #[tokio::test]
    async fn test_fetch_one_without_rows_fails() {
        let mut conn = create_connection(MockOutcome::Empty);
        let result: Result<Person> = select("people").where_(("id", 9)).fetch_one(&mut conn).await;
        assert!(matches!(result, Err(Error::NoResult { .. })));
    }

    #[tokio::test]
    async fn test_fetch_optional_takes_first_row() {
        let mut conn = create_connection(MockOutcome::ThreeRowsSortedAscending);
        let youngest: Option<Person> = select("people")
            .where_(("age", op::GT, 0))
            .fetch_optional(&mut conn)
            .await
            .unwrap();
        assert_eq!(youngest.map(|p| p.name), Some("Adam".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_propagates_connection_error() {
        let mut conn = create_connection(MockOutcome::Error);
        let result: Result<Vec<Person>> = select("people").fetch_all(&mut conn).await;
        assert!(matches!(result, Err(Error::NoResult { .. })));
    }

    #[tokio::test]
    async fn test_run_returns_scalar() {
        let mut conn = create_connection(MockOutcome::Value);
        let outcome = select("people").run(&mut conn).await.unwrap();
        assert_eq!(outcome.as_value(), Some(&Value::I64(5)));
    }

    #[tokio::test]
    async fn test_transaction_commits_on_success() {
        let mut conn = create_connection(MockOutcome::OneRow);
        let rows = transaction(&mut conn, |conn| {
            Box::pin(async move {
                let outcome = conn.execute_raw("SELECT * FROM people").await?;
                Ok::<_, Error>(outcome.into_result_set().map(|set| set.count()))
            })
        })
        .await
        .unwrap();
        assert_eq!(rows, Some(1));
        assert_eq!(conn.last_raw(), Some("SELECT * FROM people"));
    }

    #[tokio::test]
    async fn test_transaction_returns_closure_error() {
        let mut conn = create_connection(MockOutcome::Error);
        let result: Result<()> = transaction(&mut conn, |conn| {
            Box::pin(async move {
                conn.execute_raw("DELETE FROM people").await?;
                Ok::<_, Error>(())
            })
        })
        .await;
        assert!(matches!(result, Err(Error::NoResult { .. })));
    }

    #[test]
    fn test_query_result_accessors() {
        assert!(QueryResult::SuccessNoData.is_success_no_data());
        assert!(QueryResult::Success(Value::I64(1)).into_result_set().is_none());
    }
}
