use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub mod database;
pub mod services;
pub mod types;
#[cfg(test)]
pub mod test_utils;

use services::config::DatabaseConfig;
use types::errors::LadderResult;

/// Open the SQLite pool described by `config` and apply the embedded
/// migrations.
pub async fn init_pool(config: &DatabaseConfig) -> LadderResult<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(opts)
        .await?;

    // Standard sqlx migrations (compiled into the binary)
    sqlx::migrate!("./migrations").run(&pool).await?;

    log::info!("Database ready at {}", config.url);
    Ok(pool)
}
