use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::sync::Once;

use crate::database::bracket_repo;

static INIT: Once = Once::new();

pub struct TestContext {
    pub pool: Pool<Sqlite>,
}

pub async fn init_test_db() -> TestContext {
    INIT.call_once(|| {
        // Initialize logger only once
        let _ = env_logger::builder().is_test(true).try_init();
    });

    // Create an in-memory database for each test
    let pool = SqlitePoolOptions::new()
        .max_connections(1) // Single connection: each connection gets its own in-memory DB
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    TestContext { pool }
}

/// Create a bracket and seed round 1 with `players`. Returns the bracket id.
pub async fn seed_bracket(pool: &Pool<Sqlite>, players: &[&str]) -> String {
    let bracket = bracket_repo::create_bracket(pool, "Test Finals")
        .await
        .expect("create bracket");
    let slots: Vec<Option<String>> = players
        .iter()
        .map(|p| (!p.is_empty()).then(|| p.to_string()))
        .collect();
    bracket_repo::replace_round_entries(pool, &bracket.id, 1, &slots)
        .await
        .expect("seed round 1");
    bracket.id
}
