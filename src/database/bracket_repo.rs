use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{BracketRow, RoundEntryRow};

// ── Brackets ────────────────────────────────────────────────

/// Create a bracket with a fresh UUID.
pub async fn create_bracket(pool: &SqlitePool, title: &str) -> Result<BracketRow, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO brackets (id, title) VALUES (?, ?)")
        .bind(&id)
        .bind(title)
        .execute(pool)
        .await?;

    get_bracket(pool, &id).await?.ok_or(sqlx::Error::RowNotFound)
}

pub async fn get_bracket(pool: &SqlitePool, id: &str) -> Result<Option<BracketRow>, sqlx::Error> {
    sqlx::query_as::<_, BracketRow>(
        "SELECT id, title, CAST(created_at AS TEXT) AS created_at FROM brackets WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// All brackets, newest first.
pub async fn list_brackets(pool: &SqlitePool) -> Result<Vec<BracketRow>, sqlx::Error> {
    sqlx::query_as::<_, BracketRow>(
        "SELECT id, title, CAST(created_at AS TEXT) AS created_at FROM brackets ORDER BY created_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await
}

/// The title is the only mutable attribute. Returns false if no such bracket.
pub async fn rename_bracket(pool: &SqlitePool, id: &str, title: &str) -> Result<bool, sqlx::Error> {
    let done = sqlx::query("UPDATE brackets SET title = ? WHERE id = ?")
        .bind(title)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(done.rows_affected() > 0)
}

// ── Round entries ───────────────────────────────────────────

pub async fn get_round_entries(
    pool: &SqlitePool,
    bracket_id: &str,
) -> Result<Vec<RoundEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, RoundEntryRow>(
        "SELECT bracket_id, round, slot, player_id FROM bracket_round_entries WHERE bracket_id = ? ORDER BY round, slot",
    )
    .bind(bracket_id)
    .fetch_all(pool)
    .await
}

pub async fn get_entries_for_round(
    pool: &SqlitePool,
    bracket_id: &str,
    round: u32,
) -> Result<Vec<RoundEntryRow>, sqlx::Error> {
    sqlx::query_as::<_, RoundEntryRow>(
        "SELECT bracket_id, round, slot, player_id FROM bracket_round_entries WHERE bracket_id = ? AND round = ? ORDER BY slot",
    )
    .bind(bracket_id)
    .bind(i64::from(round))
    .fetch_all(pool)
    .await
}

/// Replace every slot of `round` with `players` (slot = position + 1) and drop
/// the recorded results of that round and all later rounds, in one transaction.
/// Returns the number of match rows removed.
pub async fn replace_round_entries(
    pool: &SqlitePool,
    bracket_id: &str,
    round: u32,
    players: &[Option<String>],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM bracket_round_entries WHERE bracket_id = ? AND round = ?")
        .bind(bracket_id)
        .bind(i64::from(round))
        .execute(&mut *tx)
        .await?;

    for (pos, player) in players.iter().enumerate() {
        let slot = pos as i64 + 1;
        sqlx::query(
            "INSERT INTO bracket_round_entries (bracket_id, round, slot, player_id) VALUES (?, ?, ?, ?)",
        )
        .bind(bracket_id)
        .bind(i64::from(round))
        .bind(slot)
        .bind(player.as_deref().filter(|p| !p.is_empty()))
        .execute(&mut *tx)
        .await?;
    }

    let cleared = sqlx::query("DELETE FROM bracket_matches WHERE bracket_id = ? AND round >= ?")
        .bind(bracket_id)
        .bind(i64::from(round))
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;
    Ok(cleared)
}

/// `(match_index, winner_id)` for every complete match of `round`, using the
/// oldest row per match index.
pub async fn get_completed_winners(
    pool: &SqlitePool,
    bracket_id: &str,
    round: u32,
) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT m.match_index, m.winner_id
         FROM bracket_matches m
         WHERE m.bracket_id = ? AND m.round = ?
           AND m.id = (SELECT MIN(d.id) FROM bracket_matches d
                       WHERE d.bracket_id = m.bracket_id AND d.round = m.round AND d.match_index = m.match_index)
           AND m.winner_id IS NOT NULL AND m.loser_id IS NOT NULL
         ORDER BY m.match_index",
    )
    .bind(bracket_id)
    .bind(i64::from(round))
    .fetch_all(pool)
    .await
}

#[cfg(test)]
#[path = "tests/bracket_repo_test.rs"]
mod tests;
