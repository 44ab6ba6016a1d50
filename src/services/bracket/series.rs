//! Best-of-three series reconciliation.
//!
//! Given the two contestants, the chosen winner, an optional advantage holder
//! (a player carrying one game win from the qualifying stage) and a requested
//! series mode, derives the canonical game-by-game breakdown and aggregate
//! score. Everything here is pure and synchronous.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How many games the series winner needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeriesMode {
    #[default]
    #[serde(rename = "2-0")]
    TwoZero,
    #[serde(rename = "2-1")]
    TwoOne,
}

impl SeriesMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesMode::TwoZero => "2-0",
            SeriesMode::TwoOne => "2-1",
        }
    }

    /// `(winner score, loser score)` for this mode.
    pub fn scores(&self) -> (u8, u8) {
        match self {
            SeriesMode::TwoZero => (2, 0),
            SeriesMode::TwoOne => (2, 1),
        }
    }

    /// Infers the mode from a stored score pair. Pairs that are neither 2-0
    /// nor 2-1 (in either order for 2-1) predate mode tracking and yield `None`.
    pub fn infer(winner_score: Option<i64>, loser_score: Option<i64>) -> Option<Self> {
        match (winner_score?, loser_score?) {
            (2, 0) => Some(SeriesMode::TwoZero),
            (2, 1) | (1, 2) => Some(SeriesMode::TwoOne),
            _ => None,
        }
    }
}

impl fmt::Display for SeriesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2-0" => Ok(SeriesMode::TwoZero),
            "2-1" => Ok(SeriesMode::TwoOne),
            _ => Err(format!("Unknown series mode: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("Match is not playable: both contestants must be assigned")]
    MissingContestant,
    #[error("Contestants must be two different players (got {0} twice)")]
    IdenticalContestants(String),
    #[error("Winner {0} is not one of the two contestants")]
    WinnerNotContestant(String),
}

/// Immutable input of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesInput {
    pub contestant_a: String,
    pub contestant_b: String,
    pub winner: String,
    #[serde(default)]
    pub advantage_holder: Option<String>,
    #[serde(default)]
    pub mode: SeriesMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameNote {
    /// Game 1 credited from the qualifying stage; not replayed.
    CarriedAdvantage,
    Played,
    Unplayed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub label: String,
    pub winner: Option<String>,
    pub note: GameNote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOutcome {
    pub winner_id: String,
    pub loser_id: String,
    pub winner_score: u8,
    pub loser_score: u8,
    /// Mode actually applied, after any rule correction.
    pub mode: SeriesMode,
    /// Sanitized advantage holder the breakdown was built with.
    pub advantage_holder: Option<String>,
    pub games: [GameResult; 3],
}

/// Returns the advantage holder iff it is exactly one of the two contestants.
/// Anything else (absent, stale, or both contestants being the same id)
/// resolves to `None`.
pub fn resolve_advantage<'a>(
    contestant_a: Option<&'a str>,
    contestant_b: Option<&'a str>,
    advantage_holder: Option<&str>,
) -> Option<&'a str> {
    let holder = advantage_holder.filter(|h| !h.is_empty())?;
    let mut matches = [contestant_a, contestant_b]
        .into_iter()
        .flatten()
        .filter(|c| *c == holder);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}

/// Derives the full series outcome.
pub fn reconcile(input: &SeriesInput) -> Result<SeriesOutcome, SeriesError> {
    let a = input.contestant_a.as_str();
    let b = input.contestant_b.as_str();
    if a.is_empty() || b.is_empty() {
        return Err(SeriesError::MissingContestant);
    }
    if a == b {
        return Err(SeriesError::IdenticalContestants(a.to_string()));
    }

    let winner = input.winner.as_str();
    let loser = if winner == a {
        b
    } else if winner == b {
        a
    } else {
        return Err(SeriesError::WinnerNotContestant(input.winner.clone()));
    };

    let holder = resolve_advantage(Some(a), Some(b), input.advantage_holder.as_deref());
    if holder.is_none() && input.advantage_holder.as_deref().is_some_and(|h| !h.is_empty()) {
        log::debug!(
            "Dropping advantage holder {:?}: not a contestant of {a} vs {b}",
            input.advantage_holder
        );
    }

    let (mode, games) = match holder {
        None => {
            let games = match input.mode {
                SeriesMode::TwoZero => [played(winner), played(winner), unplayed()],
                SeriesMode::TwoOne => [played(winner), played(loser), played(winner)],
            };
            (input.mode, games)
        }
        Some(h) if h == winner => {
            let games = match input.mode {
                SeriesMode::TwoZero => [carried(h), played(h), unplayed()],
                SeriesMode::TwoOne => [carried(h), played(loser), played(h)],
            };
            (input.mode, games)
        }
        Some(h) => {
            // The opponent of the holder can only take the series by winning
            // both remaining games.
            if input.mode == SeriesMode::TwoZero {
                log::debug!("Correcting requested 2-0 to 2-1: {winner} beat advantage holder {h}");
            }
            (
                SeriesMode::TwoOne,
                [carried(h), played(winner), played(winner)],
            )
        }
    };

    let (winner_score, loser_score) = mode.scores();
    Ok(SeriesOutcome {
        winner_id: winner.to_string(),
        loser_id: loser.to_string(),
        winner_score,
        loser_score,
        mode,
        advantage_holder: holder.map(str::to_string),
        games: label(games),
    })
}

fn carried(player: &str) -> (Option<String>, GameNote) {
    (Some(player.to_string()), GameNote::CarriedAdvantage)
}

fn played(player: &str) -> (Option<String>, GameNote) {
    (Some(player.to_string()), GameNote::Played)
}

fn unplayed() -> (Option<String>, GameNote) {
    (None, GameNote::Unplayed)
}

fn label(games: [(Option<String>, GameNote); 3]) -> [GameResult; 3] {
    let mut n = 0;
    games.map(|(winner, note)| {
        n += 1;
        GameResult {
            label: format!("Game {n}"),
            winner,
            note,
        }
    })
}

/// Points entered for one game, from contestant A's and B's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
    pub a: u32,
    pub b: u32,
}

/// Games won so far by each side, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTally {
    pub a_wins: u8,
    pub b_wins: u8,
}

/// Counts games won from up to three optionally entered per-game scores.
///
/// With a valid advantage holder, game 1 always counts for the holder and any
/// score entered for it is ignored. Tied or missing scores count for nobody.
pub fn tally_observed_sets(
    contestant_a: Option<&str>,
    contestant_b: Option<&str>,
    advantage_holder: Option<&str>,
    game_scores: &[Option<GameScore>],
) -> SetTally {
    let mut tally = SetTally::default();
    let holder = resolve_advantage(contestant_a, contestant_b, advantage_holder);

    let skip = match holder {
        Some(h) => {
            if Some(h) == contestant_a {
                tally.a_wins += 1;
            } else {
                tally.b_wins += 1;
            }
            1
        }
        None => 0,
    };

    for score in game_scores.iter().take(3).skip(skip).flatten() {
        if score.a > score.b {
            tally.a_wins += 1;
        } else if score.b > score.a {
            tally.b_wins += 1;
        }
    }
    tally
}

#[cfg(test)]
#[path = "tests/series_tests.rs"]
mod tests;
