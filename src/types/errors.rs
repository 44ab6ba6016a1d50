use serde::Serialize;
use thiserror::Error;

use crate::services::bracket::series::SeriesError;

#[derive(Debug, Error)]
pub enum LadderError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for LadderError {
    fn from(error: sqlx::Error) -> Self {
        LadderError::Database(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for LadderError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        LadderError::Database(error.to_string())
    }
}

impl From<SeriesError> for LadderError {
    fn from(error: SeriesError) -> Self {
        LadderError::Validation(error.to_string())
    }
}

impl Serialize for LadderError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

pub type LadderResult<T> = Result<T, LadderError>;

#[cfg(test)]
#[path = "tests/errors_tests.rs"]
mod tests;
