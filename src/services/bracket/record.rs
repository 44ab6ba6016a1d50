//! Write side: administrator input → reconciled, encoded, persisted result.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::addressing::pair_for;
use super::reason_codec::{EncodedReason, FinishReason};
use super::series::{reconcile, SeriesInput, SeriesMode, SeriesOutcome};
use super::{require_bracket, require_positive};
use crate::database::bracket_repo;
use crate::database::match_repo::{self, UpsertReport};
use crate::database::models::{MatchKey, MatchResultWrite, ReasonColumns};
use crate::types::errors::{LadderError, LadderResult};

/// What the administrator submits for one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSubmission {
    pub bracket_id: String,
    pub round: u32,
    pub match_index: u32,
    pub winner_id: String,
    #[serde(default)]
    pub mode: SeriesMode,
    #[serde(default)]
    pub finish_reason: FinishReason,
    /// Player carrying a qualifying-stage win into this series.
    #[serde(default)]
    pub advantage_holder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResult {
    pub key: MatchKey,
    pub outcome: SeriesOutcome,
    pub reason: EncodedReason,
    pub write: MatchResultWrite,
    pub report: UpsertReport,
}

/// Row values for a reconciled outcome. The reason carries the sanitized
/// advantage holder from the outcome, never the raw submitted one.
pub fn build_result_write(
    outcome: &SeriesOutcome,
    finish_reason: FinishReason,
) -> (EncodedReason, MatchResultWrite) {
    let reason = EncodedReason::new(finish_reason, outcome.advantage_holder.clone());
    let write = MatchResultWrite {
        winner_id: Some(outcome.winner_id.clone()),
        loser_id: Some(outcome.loser_id.clone()),
        winner_score: Some(i64::from(outcome.winner_score)),
        loser_score: Some(i64::from(outcome.loser_score)),
        reason: reason.encode(),
    };
    (reason, write)
}

/// Validate the submission against the round's current contestants,
/// reconcile the series and upsert the row.
pub async fn record_result(
    pool: &SqlitePool,
    submission: &ResultSubmission,
    columns: &ReasonColumns,
) -> LadderResult<RecordedResult> {
    require_positive("Round", submission.round)?;
    require_positive("Match index", submission.match_index)?;
    require_bracket(pool, &submission.bracket_id).await?;

    let key = MatchKey::new(
        submission.bracket_id.clone(),
        submission.round,
        submission.match_index,
    );

    let entries =
        bracket_repo::get_entries_for_round(pool, &submission.bracket_id, submission.round).await?;
    let (Some(a), Some(b)) = pair_for(&entries, submission.round, submission.match_index) else {
        return Err(LadderError::Validation(format!(
            "Match {key} is not playable: both slots must be assigned"
        )));
    };

    let input = SeriesInput {
        contestant_a: a.to_string(),
        contestant_b: b.to_string(),
        winner: submission.winner_id.clone(),
        advantage_holder: submission.advantage_holder.clone(),
        mode: submission.mode,
    };
    let outcome = reconcile(&input)?;
    let (reason, write) = build_result_write(&outcome, submission.finish_reason);

    let report = match_repo::upsert_match_result(pool, &key, &write, columns).await?;
    log::info!(
        "Recorded {key}: {} beat {} {}-{} ({})",
        outcome.winner_id,
        outcome.loser_id,
        outcome.winner_score,
        outcome.loser_score,
        write.reason
    );

    Ok(RecordedResult {
        key,
        outcome,
        reason,
        write,
        report,
    })
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
