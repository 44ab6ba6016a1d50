//! Bracket addressing: which roster slots feed which match.
//!
//! Match `m` (1-based) of every round is fed by slots `2m-1` and `2m`. The
//! mapping holds for every round regardless of its size.

use crate::database::models::RoundEntryRow;

/// Roster slots `(a, b)` feeding `match_index`. Index 0 maps to `(0, 0)`,
/// which never holds a player.
pub fn slots_for(match_index: u32) -> (u32, u32) {
    let b = match_index.saturating_mul(2);
    (b.saturating_sub(1), b)
}

/// Slot of the next round that the winner of `match_index` is seeded into.
pub fn next_slot(match_index: u32) -> u32 {
    match_index
}

/// Player assigned to `slot` of `round`, if any.
pub fn player_at(entries: &[RoundEntryRow], round: u32, slot: u32) -> Option<&str> {
    entries
        .iter()
        .find(|e| e.round == i64::from(round) && e.slot == i64::from(slot))
        .and_then(|e| e.player_id.as_deref())
        .filter(|id| !id.is_empty())
}

/// Resolve both contestants of a match. Unassigned slots come back as `None`,
/// which callers treat as "not yet playable".
pub fn pair_for(
    entries: &[RoundEntryRow],
    round: u32,
    match_index: u32,
) -> (Option<&str>, Option<&str>) {
    let (slot_a, slot_b) = slots_for(match_index);
    (
        player_at(entries, round, slot_a),
        player_at(entries, round, slot_b),
    )
}

/// Number of matches a seeded round contains (`ceil(max slot / 2)`).
pub fn match_count(entries: &[RoundEntryRow], round: u32) -> u32 {
    let max_slot = entries
        .iter()
        .filter(|e| e.round == i64::from(round))
        .map(|e| e.slot)
        .max()
        .unwrap_or(0);
    u32::try_from((max_slot + 1) / 2).unwrap_or(0)
}

/// Distinct seeded round numbers in ascending order.
pub fn rounds(entries: &[RoundEntryRow]) -> Vec<u32> {
    let mut rounds: Vec<u32> = entries
        .iter()
        .filter_map(|e| u32::try_from(e.round).ok())
        .collect();
    rounds.sort_unstable();
    rounds.dedup();
    rounds
}

#[cfg(test)]
#[path = "tests/addressing_tests.rs"]
mod tests;
