pub mod models;

pub use models::*;

use crate::database::models::ReasonColumns;
use crate::database::settings_repo;
use crate::types::errors::{LadderError, LadderResult};
use sqlx::SqlitePool;
use std::sync::Mutex;

const KEY_REASON_COLUMNS: &str = "reason_columns";

pub struct ConfigService {
    pool: SqlitePool,
    settings: Mutex<LadderSettings>,
}

impl ConfigService {
    /// Load settings from the database; missing or corrupt values fall back
    /// to defaults.
    pub async fn init(pool: SqlitePool) -> Self {
        let settings = Self::load_from_db(&pool).await;
        Self {
            pool,
            settings: Mutex::new(settings),
        }
    }

    async fn load_from_db(pool: &SqlitePool) -> LadderSettings {
        let kv = match settings_repo::get_all_settings(pool).await {
            Ok(m) => m,
            Err(e) => {
                log::error!("Failed to load settings from DB: {e}");
                return LadderSettings::default();
            }
        };

        let reason_columns: ReasonColumns = kv
            .get(KEY_REASON_COLUMNS)
            .and_then(|v| match serde_json::from_str(v) {
                Ok(cols) => Some(cols),
                Err(e) => {
                    log::error!("Invalid {KEY_REASON_COLUMNS} setting {v:?}: {e}");
                    None
                }
            })
            .unwrap_or_default();

        LadderSettings { reason_columns }
    }

    pub(crate) async fn write_settings_to_db(
        pool: &SqlitePool,
        settings: &LadderSettings,
    ) -> LadderResult<()> {
        let columns_json = serde_json::to_string(&settings.reason_columns)
            .map_err(|e| LadderError::Config(e.to_string()))?;
        settings_repo::set_setting(pool, KEY_REASON_COLUMNS, &columns_json).await?;
        Ok(())
    }

    pub fn get_settings(&self) -> LadderSettings {
        self.settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn reason_columns(&self) -> ReasonColumns {
        self.get_settings().reason_columns
    }

    pub async fn save_settings(&self, new_settings: LadderSettings) -> LadderResult<()> {
        Self::write_settings_to_db(&self.pool, &new_settings).await?;

        *self
            .settings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_settings;
        Ok(())
    }

    /// Replace the reason column variants, validating the names first.
    pub async fn set_reason_columns(&self, names: Vec<String>) -> LadderResult<()> {
        let reason_columns = ReasonColumns::new(names).map_err(LadderError::Config)?;
        let mut settings = self.get_settings();
        settings.reason_columns = reason_columns;
        self.save_settings(settings).await
    }

    /// Get a reference to the pool (for callers that need direct DB access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
