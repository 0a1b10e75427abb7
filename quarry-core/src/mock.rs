//! Canned-response connection for exercising query construction and row
//! decoding without a database.
//!
//! A [`MockConnection`] answers every statement with the same
//! [`MockOutcome`], whatever the SQL says. It records what it was asked to run
//! so tests can assert on the rendered text.

use crate::connection::{Connection, NamedParameters, PreparedStatement, QueryResult};
use crate::result::{ResultFetcher, ResultSet, Row};
use crate::{AutoIncrementFn, Error, Query, QueryBuilder, Result, Value};
use std::cmp::Reverse;

/// Message carried by the canned error outcome
pub const MOCK_ERROR_MESSAGE: &str = "Error in query execution.";

/// Scalar returned by the [`MockOutcome::Value`] outcome
pub const MOCK_SCALAR: i64 = 5;

/// What every execute call on a [`MockConnection`] answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOutcome {
    /// `QueryResult::SuccessNoData`
    Empty,
    /// One row of the fixture table
    OneRow,
    /// All three rows, fixture order
    ThreeRows,
    /// All three rows, youngest first
    ThreeRowsSortedAscending,
    /// All three rows, oldest first
    ThreeRowsSortedDescending,
    /// `Error::NoResult`
    Error,
    /// `QueryResult::Success` holding [`MOCK_SCALAR`]
    Value,
}

/// Order in which the fixture rows are served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeOrder {
    Ascending,
    Descending,
}

/// Prepared statement handed out by [`MockConnection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStatement {
    sql: String,
}

impl PreparedStatement for MockStatement {
    fn sql(&self) -> &str {
        &self.sql
    }
}

/// Parameters seen by the most recent execute call
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedParameters {
    None,
    Positional(Vec<Value>),
    Named(NamedParameters),
}

/// Connection double that returns a fixed outcome for every statement
#[derive(Debug)]
pub struct MockConnection {
    query_builder: QueryBuilder,
    outcome: MockOutcome,
    query: Option<Box<dyn Query>>,
    raw: Option<String>,
    parameters: RecordedParameters,
    executions: usize,
}

impl MockConnection {
    pub fn new(outcome: MockOutcome) -> Self {
        Self::with_query_builder(outcome, QueryBuilder::default())
    }

    pub fn with_query_builder(outcome: MockOutcome, query_builder: QueryBuilder) -> Self {
        Self {
            query_builder,
            outcome,
            query: None,
            raw: None,
            parameters: RecordedParameters::None,
            executions: 0,
        }
    }

    pub fn query_builder(&self) -> &QueryBuilder {
        &self.query_builder
    }

    pub fn outcome(&self) -> MockOutcome {
        self.outcome
    }

    /// Last query object passed to an execute call
    pub fn last_query(&self) -> Option<&dyn Query> {
        self.query.as_deref()
    }

    /// Last raw SQL text passed to an execute call (prepared statements included)
    pub fn last_raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn last_parameters(&self) -> &RecordedParameters {
        &self.parameters
    }

    /// Number of execute calls answered so far
    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Render `query` with this connection's dialect, panicking on failure.
    ///
    /// Meant for test assertions, where a query that cannot be built should
    /// fail the test on the spot.
    pub fn description_of(&self, query: &dyn Query) -> String {
        match self.try_description_of(query) {
            Ok(sql) => sql,
            Err(err) => panic!("Failed to build query: {}", err),
        }
    }

    pub fn try_description_of(&self, query: &dyn Query) -> Result<String> {
        self.query_builder.build(query)
    }

    fn record_query(&mut self, query: &dyn Query, parameters: RecordedParameters) {
        tracing::debug!(?query, "mock connection executing query object");
        self.query = Some(query.clone_query());
        self.parameters = parameters;
    }

    fn record_raw(&mut self, raw: &str, parameters: RecordedParameters) {
        tracing::debug!(raw, "mock connection executing raw statement");
        self.raw = Some(raw.to_string());
        self.parameters = parameters;
    }

    fn canned_result(&mut self) -> Result<QueryResult> {
        self.executions += 1;
        match self.outcome {
            MockOutcome::Empty => Ok(QueryResult::SuccessNoData),
            MockOutcome::OneRow => Ok(result_set(MockResultFetcher::new(1))),
            MockOutcome::ThreeRows => Ok(result_set(MockResultFetcher::new(3))),
            MockOutcome::ThreeRowsSortedAscending => Ok(result_set(
                MockResultFetcher::sorted_by_age(3, AgeOrder::Ascending),
            )),
            MockOutcome::ThreeRowsSortedDescending => Ok(result_set(
                MockResultFetcher::sorted_by_age(3, AgeOrder::Descending),
            )),
            MockOutcome::Error => Err(Error::no_result(MOCK_ERROR_MESSAGE)),
            MockOutcome::Value => Ok(QueryResult::Success(Value::I64(MOCK_SCALAR))),
        }
    }
}

fn result_set(fetcher: MockResultFetcher) -> QueryResult {
    QueryResult::ResultSet(ResultSet::new(fetcher))
}

impl Connection for MockConnection {
    type Statement = MockStatement;

    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    fn close(&mut self) {}

    async fn execute(&mut self, query: &dyn Query) -> Result<QueryResult> {
        self.record_query(query, RecordedParameters::None);
        self.canned_result()
    }

    async fn execute_raw(&mut self, raw: &str) -> Result<QueryResult> {
        self.record_raw(raw, RecordedParameters::None);
        self.canned_result()
    }

    async fn execute_with(&mut self, query: &dyn Query, parameters: &[Value]) -> Result<QueryResult> {
        self.record_query(query, RecordedParameters::Positional(parameters.to_vec()));
        self.canned_result()
    }

    async fn execute_raw_with(&mut self, raw: &str, parameters: &[Value]) -> Result<QueryResult> {
        self.record_raw(raw, RecordedParameters::Positional(parameters.to_vec()));
        self.canned_result()
    }

    async fn execute_named(
        &mut self,
        query: &dyn Query,
        parameters: &NamedParameters,
    ) -> Result<QueryResult> {
        self.record_query(query, RecordedParameters::Named(parameters.clone()));
        self.canned_result()
    }

    async fn execute_raw_named(
        &mut self,
        raw: &str,
        parameters: &NamedParameters,
    ) -> Result<QueryResult> {
        self.record_raw(raw, RecordedParameters::Named(parameters.clone()));
        self.canned_result()
    }

    fn prepare(&mut self, query: &dyn Query) -> Result<MockStatement> {
        let sql = self.query_builder.build(query)?;
        Ok(MockStatement { sql })
    }

    fn prepare_raw(&mut self, raw: &str) -> Result<MockStatement> {
        Ok(MockStatement {
            sql: raw.to_string(),
        })
    }

    async fn execute_prepared(&mut self, statement: &MockStatement) -> Result<QueryResult> {
        self.record_raw(&statement.sql, RecordedParameters::None);
        self.canned_result()
    }

    async fn execute_prepared_with(
        &mut self,
        statement: &MockStatement,
        parameters: &[Value],
    ) -> Result<QueryResult> {
        self.record_raw(&statement.sql, RecordedParameters::Positional(parameters.to_vec()));
        self.canned_result()
    }

    async fn execute_prepared_named(
        &mut self,
        statement: &MockStatement,
        parameters: &NamedParameters,
    ) -> Result<QueryResult> {
        self.record_raw(&statement.sql, RecordedParameters::Named(parameters.clone()));
        self.canned_result()
    }

    async fn release_prepared(&mut self, statement: MockStatement) -> Result<()> {
        tracing::trace!(sql = %statement.sql, "mock connection released statement");
        Ok(())
    }

    async fn start_transaction(&mut self) -> Result<()> {
        tracing::trace!("mock connection: start transaction");
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        tracing::trace!("mock connection: commit");
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        tracing::trace!("mock connection: rollback");
        Ok(())
    }

    async fn create_savepoint(&mut self, name: &str) -> Result<()> {
        tracing::trace!(name, "mock connection: create savepoint");
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        tracing::trace!(name, "mock connection: rollback to savepoint");
        Ok(())
    }

    async fn release_savepoint(&mut self, name: &str) -> Result<()> {
        tracing::trace!(name, "mock connection: release savepoint");
        Ok(())
    }

    fn description_of(&self, query: &dyn Query) -> Result<String> {
        self.try_description_of(query)
    }
}

/// Connection answering every statement with `outcome`, default dialect
pub fn create_connection(outcome: MockOutcome) -> MockConnection {
    MockConnection::new(outcome)
}

/// Connection with a configured dialect, answering every statement with
/// [`MockOutcome::Empty`]
pub fn create_connection_with(
    delete_requires_using: bool,
    update_requires_from: bool,
    create_auto_increment: Option<AutoIncrementFn>,
) -> MockConnection {
    let query_builder = QueryBuilder::new()
        .with_delete_requires_using(delete_requires_using)
        .with_update_requires_from(update_requires_from)
        .with_auto_increment_fn(create_auto_increment);
    MockConnection::with_query_builder(MockOutcome::Empty, query_builder)
}

/// Column titles of the fixture table
pub const FIXTURE_TITLES: [&str; 3] = ["id", "name", "age"];

/// `(id, name, age)` rows of the fixture table
pub const FIXTURE_ROWS: [(i64, &str, i32); 3] = [(1, "Joe", 38), (2, "Adam", 28), (3, "Chris", 36)];

/// Serves up to three rows of a fixed `(id, name, age)` table
#[derive(Debug, Clone)]
pub struct MockResultFetcher {
    rows: Vec<(i64, &'static str, i32)>,
    number_of_rows: usize,
    fetched: usize,
}

impl MockResultFetcher {
    /// Serve the first `number_of_rows` fixture rows (at most three)
    pub fn new(number_of_rows: usize) -> Self {
        Self {
            rows: FIXTURE_ROWS.to_vec(),
            number_of_rows: number_of_rows.min(FIXTURE_ROWS.len()),
            fetched: 0,
        }
    }

    /// Sort all fixture rows by age, then serve the first `number_of_rows`
    pub fn sorted_by_age(number_of_rows: usize, order: AgeOrder) -> Self {
        let mut fetcher = Self::new(number_of_rows);
        match order {
            AgeOrder::Ascending => fetcher.rows.sort_by_key(|&(_, _, age)| age),
            AgeOrder::Descending => fetcher.rows.sort_by_key(|&(_, _, age)| Reverse(age)),
        }
        fetcher
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.number_of_rows - self.fetched
    }
}

impl ResultFetcher for MockResultFetcher {
    fn fetch_next(&mut self) -> Option<Row> {
        if self.fetched >= self.number_of_rows {
            return None;
        }
        let (id, name, age) = self.rows[self.fetched];
        self.fetched += 1;
        Some(vec![Value::I64(id), Value::from(name), Value::I32(age)])
    }

    fn fetch_titles(&self) -> Vec<String> {
        FIXTURE_TITLES.iter().map(|t| t.to_string()).collect()
    }
}
