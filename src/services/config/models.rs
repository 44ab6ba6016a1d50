use serde::{Deserialize, Serialize};

use crate::database::models::ReasonColumns;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ladder.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings, read from the environment (and `.env`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Reads `LADDER_DATABASE_URL` and `LADDER_DB_MAX_CONNECTIONS`, loading a
    /// `.env` file first if one exists. Unset or unparsable values keep the
    /// defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // Try to load .env, ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let url = lookup("LADDER_DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.url);
        let max_connections = match lookup("LADDER_DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    log::warn!("Ignoring invalid LADDER_DB_MAX_CONNECTIONS={raw:?}");
                    defaults.max_connections
                }
            },
            None => defaults.max_connections,
        };
        Self {
            url,
            max_connections,
        }
    }
}

/// Settings persisted in `app_settings`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct LadderSettings {
    /// Finish-reason column names, tried in order on every read and write.
    pub reason_columns: ReasonColumns,
}
