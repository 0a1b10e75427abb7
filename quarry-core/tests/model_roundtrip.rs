//! Drives a small ORM-style model through the mock connection, the way model
//! code would be tested against canned results.

use quarry_core::mock::{create_connection, create_connection_with, MockOutcome, RecordedParameters};
use quarry_core::{
    create_table, delete, insert, op, select, update, AutoIncrementFn, ColumnDef, Connection,
    Error, ExecutableQuery, NamedParameters, Query, QueryResult, Result, SortDirection, Value,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Person {
    id: i64,
    name: String,
    age: i32,
}

impl Person {
    const TABLE: &'static str = "People";

    async fn find_all<C: Connection>(conn: &mut C) -> Result<Vec<Person>> {
        select(Self::TABLE).fetch_all(conn).await
    }

    async fn find<C: Connection>(conn: &mut C, id: i64) -> Result<Option<Person>> {
        select(Self::TABLE).where_(("id", id)).fetch_optional(conn).await
    }

    async fn find_sorted<C: Connection>(conn: &mut C, direction: SortDirection) -> Result<Vec<Person>> {
        select(Self::TABLE)
            .order_by("age", direction)
            .fetch_all(conn)
            .await
    }

    async fn save<C: Connection>(&self, conn: &mut C) -> Result<QueryResult> {
        let query = insert(Self::TABLE).values(vec![
            ("name", Value::from(self.name.as_str())),
            ("age", Value::from(self.age)),
        ]);
        let parameters = query.parameters();
        conn.execute_with(&query, &parameters).await
    }

    async fn delete_all<C: Connection>(conn: &mut C) -> Result<QueryResult> {
        delete(Self::TABLE).run(conn).await
    }
}

#[tokio::test]
async fn find_all_decodes_three_people() {
    quarry_core::logging::init_for_tests();
    let mut conn = create_connection(MockOutcome::ThreeRows);

    let people = Person::find_all(&mut conn).await.unwrap();
    let names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Joe", "Adam", "Chris"]);

    let recorded = conn.last_query().expect("query recorded");
    assert_eq!(conn.description_of(recorded), "SELECT * FROM People");
}

#[tokio::test]
async fn find_returns_first_row() {
    let mut conn = create_connection(MockOutcome::OneRow);
    let person = Person::find(&mut conn, 1).await.unwrap();
    assert_eq!(
        person,
        Some(Person {
            id: 1,
            name: "Joe".to_string(),
            age: 38
        })
    );

    let mut conn = create_connection(MockOutcome::Empty);
    assert_eq!(Person::find(&mut conn, 1).await.unwrap(), None);
}

#[tokio::test]
async fn sorted_outcomes_match_order_by() {
    let mut conn = create_connection(MockOutcome::ThreeRowsSortedAscending);
    let ages: Vec<i32> = Person::find_sorted(&mut conn, SortDirection::Asc)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.age)
        .collect();
    assert_eq!(ages, [28, 36, 38]);
    assert_eq!(
        conn.description_of(conn.last_query().unwrap()),
        "SELECT * FROM People ORDER BY age ASC"
    );

    let mut conn = create_connection(MockOutcome::ThreeRowsSortedDescending);
    let ages: Vec<i32> = Person::find_sorted(&mut conn, SortDirection::Desc)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.age)
        .collect();
    assert_eq!(ages, [38, 36, 28]);
}

#[tokio::test]
async fn save_records_positional_parameters() {
    let mut conn = create_connection(MockOutcome::Value);
    let chris = Person {
        id: 3,
        name: "Chris".to_string(),
        age: 36,
    };

    let outcome = chris.save(&mut conn).await.unwrap();
    assert_eq!(outcome.as_value().and_then(Value::as_i64), Some(5));
    assert_eq!(
        conn.last_parameters(),
        &RecordedParameters::Positional(vec![Value::from("Chris"), Value::I32(36)])
    );
    assert_eq!(
        conn.description_of(conn.last_query().unwrap()),
        "INSERT INTO People (name, age) VALUES (?, ?)"
    );
}

#[tokio::test]
async fn error_outcome_surfaces_from_every_path() {
    let mut conn = create_connection(MockOutcome::Error);

    assert!(matches!(Person::find_all(&mut conn).await, Err(Error::NoResult { .. })));
    assert!(matches!(Person::delete_all(&mut conn).await, Err(Error::NoResult { .. })));

    let mut named = NamedParameters::new();
    named.insert("age".to_string(), Value::I32(30));
    let raw = conn.execute_raw_named("SELECT * FROM People WHERE age > :age", &named).await;
    match raw {
        Err(Error::NoResult { message }) => assert_eq!(message, "Error in query execution."),
        other => panic!("expected canned error, got {:?}", other),
    }
}

#[test]
fn dialect_flags_shape_multi_table_statements() {
    let mysql = create_connection_with(false, false, None);
    let postgres = create_connection_with(true, true, None);

    let purge = delete("People")
        .using("Addresses")
        .where_(("Addresses.city", "Cork"))
        .and_where(("People.age", op::LT, 30));
    assert_eq!(
        mysql.description_of(&purge),
        "DELETE People FROM People, Addresses WHERE Addresses.city = ? AND People.age < ?"
    );
    assert_eq!(
        postgres.description_of(&purge),
        "DELETE FROM People USING Addresses WHERE Addresses.city = ? AND People.age < ?"
    );

    let relocate = update("People")
        .set_column("People.age", 29)
        .from_table("Addresses")
        .where_(("Addresses.person_id", 2));
    assert_eq!(
        mysql.description_of(&relocate),
        "UPDATE People, Addresses SET People.age = ? WHERE Addresses.person_id = ?"
    );
    assert_eq!(
        postgres.description_of(&relocate),
        "UPDATE People SET People.age = ? FROM Addresses WHERE Addresses.person_id = ?"
    );
}

#[test]
fn create_table_uses_auto_increment_generator() {
    let generator: AutoIncrementFn = Arc::new(|sql_type: &str, primary_key: bool| {
        if primary_key && sql_type == "integer" {
            "serial PRIMARY KEY".to_string()
        } else {
            sql_type.to_string()
        }
    });
    let conn = create_connection_with(false, false, Some(generator));

    let table = create_table("People")
        .column(ColumnDef::new("id", "integer").primary_key().auto_increment())
        .column(ColumnDef::new("name", "text"))
        .column(ColumnDef::new("age", "integer"));
    assert_eq!(
        conn.description_of(&table),
        "CREATE TABLE People (id serial PRIMARY KEY, name text, age integer)"
    );

    let plain = create_connection(MockOutcome::Empty);
    assert!(matches!(
        plain.try_description_of(&table),
        Err(Error::Unsupported { .. })
    ));
}

#[test]
fn futures_complete_without_suspending() {
    let mut conn = create_connection(MockOutcome::ThreeRows);
    let set = tokio_test::block_on(conn.execute_raw("SELECT * FROM People"))
        .unwrap()
        .into_result_set()
        .expect("rows");
    assert_eq!(set.titles(), ["id", "name", "age"]);
    assert_eq!(set.count(), 3);
}
