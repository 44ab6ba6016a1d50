//! Round seeding and winner advancement.

use sqlx::SqlitePool;
use std::collections::HashSet;

use super::addressing::{match_count, next_slot};
use super::{require_bracket, require_positive};
use crate::database::bracket_repo;
use crate::types::errors::{LadderError, LadderResult};

/// Seed `round` with `players` (slot = position + 1). Results recorded for
/// this round and every later round are dropped. Returns how many were.
pub async fn seed_round(
    pool: &SqlitePool,
    bracket_id: &str,
    round: u32,
    players: &[Option<String>],
) -> LadderResult<u64> {
    require_positive("Round", round)?;
    require_bracket(pool, bracket_id).await?;

    let mut seen = HashSet::new();
    for player in players.iter().flatten().filter(|p| !p.is_empty()) {
        if !seen.insert(player.as_str()) {
            return Err(LadderError::Validation(format!(
                "Player {player} is seeded twice in round {round}"
            )));
        }
    }

    let cleared = bracket_repo::replace_round_entries(pool, bracket_id, round, players).await?;
    if cleared > 0 {
        log::info!("Reseeded {bracket_id} round {round}: cleared {cleared} recorded results");
    }
    Ok(cleared)
}

/// Seed `round + 1` from the winners of `round`. Matches without a complete
/// result leave their slot empty. Returns the seeded slots.
pub async fn advance_winners(
    pool: &SqlitePool,
    bracket_id: &str,
    round: u32,
) -> LadderResult<Vec<Option<String>>> {
    require_positive("Round", round)?;
    require_bracket(pool, bracket_id).await?;

    let entries = bracket_repo::get_entries_for_round(pool, bracket_id, round).await?;
    let count = match_count(&entries, round);
    if count == 0 {
        return Err(LadderError::Validation(format!(
            "Round {round} has not been seeded"
        )));
    }
    if count == 1 {
        return Err(LadderError::Validation(format!(
            "Round {round} is the final; there is no next round"
        )));
    }

    let next_size = count.div_ceil(2) * 2;
    let mut next: Vec<Option<String>> = vec![None; next_size as usize];
    for (match_index, winner) in bracket_repo::get_completed_winners(pool, bracket_id, round).await? {
        let Ok(match_index) = u32::try_from(match_index) else {
            continue;
        };
        if match_index == 0 || match_index > count {
            continue;
        }
        next[(next_slot(match_index) - 1) as usize] = Some(winner);
    }

    seed_round(pool, bracket_id, round + 1, &next).await?;
    Ok(next)
}

#[cfg(test)]
#[path = "tests/seeding_tests.rs"]
mod tests;
