//! Finals bracket results: addressing, reason encoding, series reconciliation
//! and the record/load flows built on them.

pub mod addressing;
pub mod load;
pub mod reason_codec;
pub mod record;
pub mod seeding;
pub mod series;

use sqlx::SqlitePool;

use crate::database::bracket_repo;
use crate::database::models::BracketRow;
use crate::types::errors::{LadderError, LadderResult};

pub(crate) async fn require_bracket(pool: &SqlitePool, bracket_id: &str) -> LadderResult<BracketRow> {
    bracket_repo::get_bracket(pool, bracket_id)
        .await?
        .ok_or_else(|| LadderError::NotFound(format!("bracket {bracket_id}")))
}

pub(crate) fn require_positive(what: &str, value: u32) -> LadderResult<()> {
    if value == 0 {
        return Err(LadderError::Validation(format!("{what} must be at least 1")));
    }
    Ok(())
}
