//! Read side: persisted rows back into editable bracket state.
//!
//! For each match the stored reason is decoded, the advantage holder is
//! checked against the round's *current* contestants, and the series mode is
//! inferred from the stored score. Complete matches whose winner and loser are
//! still the two contestants get their game breakdown recomputed.

use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeSet, HashMap};

use super::addressing::{match_count, pair_for, rounds};
use super::reason_codec::{EncodedReason, FinishReason};
use super::require_bracket;
use super::series::{reconcile, resolve_advantage, SeriesInput, SeriesMode, SeriesOutcome};
use crate::database::bracket_repo;
use crate::database::match_repo;
use crate::database::models::{BracketRow, MatchRow, ReasonColumns};
use crate::types::errors::LadderResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    pub match_index: u32,
    pub contestant_a: Option<String>,
    pub contestant_b: Option<String>,
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub winner_score: Option<i64>,
    pub loser_score: Option<i64>,
    pub finish_reason: FinishReason,
    /// Sanitized against the current contestants.
    pub advantage_holder: Option<String>,
    /// Mode of the reconstructed series when there is one, otherwise the
    /// inferred mode or the default.
    pub mode: SeriesMode,
    /// True when the stored score maps to a mode.
    pub mode_inferred: bool,
    /// True when the stored score disagrees with the reconciled series.
    pub mode_corrected: bool,
    pub complete: bool,
    pub series: Option<SeriesOutcome>,
}

impl MatchView {
    pub fn is_playable(&self) -> bool {
        self.contestant_a.is_some() && self.contestant_b.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round: u32,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketView {
    pub bracket: BracketRow,
    pub rounds: Vec<RoundView>,
}

/// Rebuild one match from its current contestants and its stored row.
pub fn reconstruct_match(
    match_index: u32,
    contestant_a: Option<&str>,
    contestant_b: Option<&str>,
    row: Option<&MatchRow>,
) -> MatchView {
    let decoded = row
        .and_then(|r| r.reason.as_deref())
        .map(EncodedReason::decode)
        .unwrap_or_default();

    let advantage_holder =
        resolve_advantage(contestant_a, contestant_b, decoded.advantage_holder.as_deref())
            .map(str::to_string);
    if advantage_holder.is_none() && decoded.advantage_holder.is_some() {
        log::debug!(
            "Match {match_index}: stored advantage {:?} no longer matches a contestant",
            decoded.advantage_holder
        );
    }

    let inferred = row.and_then(|r| SeriesMode::infer(r.winner_score, r.loser_score));
    let stored_mode = inferred.unwrap_or_default();
    let complete = row.is_some_and(MatchRow::is_complete);

    let series = match (row, contestant_a, contestant_b) {
        (Some(r), Some(a), Some(b)) if complete => {
            let pair_matches = matches!(
                (r.winner_id.as_deref(), r.loser_id.as_deref()),
                (Some(w), Some(l)) if (w == a && l == b) || (w == b && l == a)
            );
            if pair_matches {
                r.winner_id.as_ref().and_then(|winner| {
                    reconcile(&SeriesInput {
                        contestant_a: a.to_string(),
                        contestant_b: b.to_string(),
                        winner: winner.clone(),
                        advantage_holder: advantage_holder.clone(),
                        mode: stored_mode,
                    })
                    .ok()
                })
            } else {
                None
            }
        }
        _ => None,
    };

    // A non-holder win is always 2-1 even when the row says otherwise.
    let mode = series.as_ref().map_or(stored_mode, |s| s.mode);
    let mode_corrected = mode != stored_mode;
    if mode_corrected {
        log::debug!("Match {match_index}: stored {stored_mode} score reconciled to {mode}");
    }

    MatchView {
        match_index,
        contestant_a: contestant_a.map(str::to_string),
        contestant_b: contestant_b.map(str::to_string),
        winner_id: row.and_then(|r| r.winner_id.clone()),
        loser_id: row.and_then(|r| r.loser_id.clone()),
        winner_score: row.and_then(|r| r.winner_score),
        loser_score: row.and_then(|r| r.loser_score),
        finish_reason: decoded.base,
        advantage_holder,
        mode,
        mode_inferred: inferred.is_some(),
        mode_corrected,
        complete,
        series,
    }
}

/// Load a bracket with every seeded round and every stored result.
pub async fn load_bracket(
    pool: &SqlitePool,
    bracket_id: &str,
    columns: &ReasonColumns,
) -> LadderResult<BracketView> {
    let bracket = require_bracket(pool, bracket_id).await?;
    let entries = bracket_repo::get_round_entries(pool, bracket_id).await?;
    let rows = match_repo::list_matches(pool, bracket_id, columns).await?;

    // Rows arrive ordered by id within a key; keep the oldest.
    let mut by_key: HashMap<(i64, i64), &MatchRow> = HashMap::new();
    for row in &rows {
        by_key.entry((row.round, row.match_index)).or_insert(row);
    }

    let mut round_numbers: BTreeSet<u32> = rounds(&entries).into_iter().collect();
    round_numbers.extend(rows.iter().filter_map(|r| u32::try_from(r.round).ok()));

    let mut round_views = Vec::with_capacity(round_numbers.len());
    for round in round_numbers {
        // Seeded matches plus any stored index, without filling the gaps.
        let mut indices: BTreeSet<u32> = (1..=match_count(&entries, round)).collect();
        indices.extend(
            by_key
                .keys()
                .filter(|(r, _)| *r == i64::from(round))
                .filter_map(|(_, m)| u32::try_from(*m).ok())
                .filter(|m| *m >= 1),
        );

        let matches = indices
            .into_iter()
            .map(|m| {
                let (a, b) = pair_for(&entries, round, m);
                let row = by_key.get(&(i64::from(round), i64::from(m))).copied();
                reconstruct_match(m, a, b, row)
            })
            .collect();
        round_views.push(RoundView { round, matches });
    }

    log::debug!(
        "Loaded bracket {bracket_id}: {} rounds, {} stored results",
        round_views.len(),
        by_key.len()
    );

    Ok(BracketView {
        bracket,
        rounds: round_views,
    })
}

#[cfg(test)]
#[path = "tests/load_tests.rs"]
mod tests;
