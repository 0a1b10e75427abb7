use quarry_core::mock::{create_connection, create_connection_with, MockOutcome};
use quarry_core::{delete, op, select, update, Connection, ExecutableQuery, Query};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Person {
    id: i64,
    name: String,
    age: i32,
}

#[tokio::main]
async fn main() -> quarry_core::Result<()> {
    quarry_core::logging::init(&quarry_core::logging::LogConfig::debug())?;

    // Every statement gets the same three rows back, oldest first
    let mut conn = create_connection(MockOutcome::ThreeRowsSortedDescending);
    let people: Vec<Person> = select("people")
        .columns(("id", "name", "age"))
        .where_(("age", op::GT, 18))
        .fetch_all(&mut conn)
        .await?;

    for person in &people {
        println!("{:>2} {:<6} {}", person.id, person.name, person.age);
    }
    if let Some(query) = conn.last_query() {
        println!("ran: {}", conn.description_of(query));
    }

    // Same queries rendered for two dialects
    let mysql = create_connection_with(false, false, None);
    let postgres = create_connection_with(true, true, None);

    let purge = delete("people").using("addresses").where_(("addresses.city", "Cork"));
    let bump = update("people")
        .set_column("age", 40)
        .from_table("addresses")
        .where_(("addresses.person_id", 1));

    for (name, conn) in [("mysql", &mysql), ("postgres", &postgres)] {
        println!("{name}: {}", conn.description_of(&purge));
        println!("{name}: {}", conn.description_of(&bump));
    }
    println!("params: {:?}", bump.parameters());

    let mut failing = create_connection(MockOutcome::Error);
    if let Err(err) = failing.execute_raw("SELECT 1").await {
        println!("canned error: {}", err);
    }

    Ok(())
}
