//! Persistence of match results in `bracket_matches`.
//!
//! Deployments disagree on the name of the finish-reason column (`finish_reason`
//! on current schemas, `reason` on older ones). Every statement that touches it
//! is attempted once per candidate name from [`ReasonColumns`]; only a
//! "column does not exist" failure moves on to the next name.

use serde::Serialize;
use sqlx::SqlitePool;
use std::future::Future;

use super::models::{MatchKey, MatchResultWrite, MatchRow, ReasonColumns};

/// Result of one attempt against a single column-name variant.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    Done(T),
    ColumnMissing(sqlx::Error),
    Fatal(sqlx::Error),
}

impl<T> AttemptOutcome<T> {
    pub fn classify(result: Result<T, sqlx::Error>, column: &str) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Done(value),
            Err(e) if is_missing_column(&e, column) => AttemptOutcome::ColumnMissing(e),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

/// True when SQLite rejected the statement because `column` does not exist.
///
/// SQLite reports every schema mismatch under the generic SQLITE_ERROR code,
/// so the column name is matched against the two message shapes it uses
/// (`no such column: x` and `table t has no column named x`).
pub fn is_missing_column(error: &sqlx::Error, column: &str) -> bool {
    let sqlx::Error::Database(db_err) = error else {
        return false;
    };
    let message = db_err.message().to_ascii_lowercase();
    let column = column.to_ascii_lowercase();

    ["no such column: ", "has no column named "]
        .iter()
        .filter_map(|marker| message.find(marker).map(|at| &message[at + marker.len()..]))
        .any(|rest| {
            let name: String = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .collect();
            name == column
        })
}

/// Runs `attempt` with each reason column in order until one is not missing.
/// Returns the value together with the column that worked.
pub async fn with_reason_column<T, F, Fut>(
    columns: &ReasonColumns,
    mut attempt: F,
) -> Result<(T, String), sqlx::Error>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut last_missing: Option<sqlx::Error> = None;

    for column in columns.iter() {
        match AttemptOutcome::classify(attempt(column.to_string()).await, column) {
            AttemptOutcome::Done(value) => return Ok((value, column.to_string())),
            AttemptOutcome::ColumnMissing(e) => {
                log::warn!("Reason column `{column}` not present, trying next variant: {e}");
                last_missing = Some(e);
            }
            AttemptOutcome::Fatal(e) => return Err(e),
        }
    }

    // ReasonColumns is never empty, so at least one attempt has run.
    Err(last_missing.unwrap_or(sqlx::Error::RowNotFound))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReport {
    pub id: i64,
    pub inserted: bool,
    /// Reason column name the write went through.
    pub column: String,
}

/// Oldest row id stored for `key`, if any.
pub async fn find_match_id(pool: &SqlitePool, key: &MatchKey) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM bracket_matches WHERE bracket_id = ? AND round = ? AND match_index = ? ORDER BY id LIMIT 1",
    )
    .bind(&key.bracket_id)
    .bind(i64::from(key.round))
    .bind(i64::from(key.match_index))
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| r.0))
}

async fn update_with_column(
    pool: &SqlitePool,
    id: i64,
    result: &MatchResultWrite,
    column: &str,
) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "UPDATE bracket_matches
         SET winner_id = ?, loser_id = ?, winner_score = ?, loser_score = ?, {column} = ?
         WHERE id = ?"
    );
    sqlx::query(&sql)
        .bind(&result.winner_id)
        .bind(&result.loser_id)
        .bind(result.winner_score)
        .bind(result.loser_score)
        .bind(&result.reason)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(id)
}

async fn insert_with_column(
    pool: &SqlitePool,
    key: &MatchKey,
    result: &MatchResultWrite,
    column: &str,
) -> Result<i64, sqlx::Error> {
    let sql = format!(
        "INSERT INTO bracket_matches
         (bracket_id, round, match_index, winner_id, loser_id, winner_score, loser_score, {column})
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    );
    let done = sqlx::query(&sql)
        .bind(&key.bracket_id)
        .bind(i64::from(key.round))
        .bind(i64::from(key.match_index))
        .bind(&result.winner_id)
        .bind(&result.loser_id)
        .bind(result.winner_score)
        .bind(result.loser_score)
        .bind(&result.reason)
        .execute(pool)
        .await?;
    Ok(done.last_insert_rowid())
}

/// Insert or update the result stored for `key`.
///
/// The lookup and the write are separate statements; two writers racing on
/// the same key can produce a duplicate row or lose one update.
pub async fn upsert_match_result(
    pool: &SqlitePool,
    key: &MatchKey,
    result: &MatchResultWrite,
    columns: &ReasonColumns,
) -> Result<UpsertReport, sqlx::Error> {
    let existing = find_match_id(pool, key).await?;

    let (id, column) = match existing {
        Some(id) => {
            with_reason_column(columns, |column| async move {
                update_with_column(pool, id, result, &column).await
            })
            .await?
        }
        None => {
            with_reason_column(columns, |column| async move {
                insert_with_column(pool, key, result, &column).await
            })
            .await?
        }
    };

    Ok(UpsertReport {
        id,
        inserted: existing.is_none(),
        column,
    })
}

/// All rows of a bracket ordered by (round, match index, id).
pub async fn list_matches(
    pool: &SqlitePool,
    bracket_id: &str,
    columns: &ReasonColumns,
) -> Result<Vec<MatchRow>, sqlx::Error> {
    let (rows, _) = with_reason_column(columns, |column| async move {
        let sql = format!(
            "SELECT id, bracket_id, round, match_index, winner_id, loser_id, winner_score, loser_score, {column} AS reason
             FROM bracket_matches
             WHERE bracket_id = ?
             ORDER BY round, match_index, id"
        );
        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(bracket_id)
            .fetch_all(pool)
            .await
    })
    .await?;
    Ok(rows)
}

/// The row stored for `key` (oldest one if a race left duplicates).
pub async fn get_match(
    pool: &SqlitePool,
    key: &MatchKey,
    columns: &ReasonColumns,
) -> Result<Option<MatchRow>, sqlx::Error> {
    let (row, _) = with_reason_column(columns, |column| async move {
        let sql = format!(
            "SELECT id, bracket_id, round, match_index, winner_id, loser_id, winner_score, loser_score, {column} AS reason
             FROM bracket_matches
             WHERE bracket_id = ? AND round = ? AND match_index = ?
             ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, MatchRow>(&sql)
            .bind(&key.bracket_id)
            .bind(i64::from(key.round))
            .bind(i64::from(key.match_index))
            .fetch_optional(pool)
            .await
    })
    .await?;
    Ok(row)
}

#[cfg(test)]
#[path = "tests/match_repo_test.rs"]
mod tests;
