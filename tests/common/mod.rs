use ladder_lib::services::config::DatabaseConfig;
use sqlx::{Pool, Sqlite};
use std::sync::Once;

static INIT: Once = Once::new();

pub struct TestContext {
    pub pool: Pool<Sqlite>,
}

pub async fn init_test_db() -> TestContext {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });

    let config = DatabaseConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
    };
    let pool = ladder_lib::init_pool(&config)
        .await
        .expect("Failed to create in-memory database");

    TestContext { pool }
}
