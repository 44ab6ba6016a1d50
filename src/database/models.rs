use serde::{Deserialize, Serialize};
use std::fmt;

/// A knockout bracket stored in the `brackets` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BracketRow {
    pub id: String,
    pub title: String,
    pub created_at: Option<String>,
}

/// One roster slot of one round (`bracket_round_entries`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoundEntryRow {
    pub bracket_id: String,
    pub round: i64,
    pub slot: i64,
    pub player_id: Option<String>,
}

/// Addresses a single pairing: (bracket, round, 1-based match index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchKey {
    pub bracket_id: String,
    pub round: u32,
    pub match_index: u32,
}

impl MatchKey {
    pub fn new(bracket_id: impl Into<String>, round: u32, match_index: u32) -> Self {
        Self {
            bracket_id: bracket_id.into(),
            round,
            match_index,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} R{} M{}",
            self.bracket_id, self.round, self.match_index
        )
    }
}

/// Values written for a match result. `reason` is already encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultWrite {
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub winner_score: Option<i64>,
    pub loser_score: Option<i64>,
    pub reason: String,
}

/// A persisted `bracket_matches` row. The reason column is selected under
/// whichever name the schema carries and aliased to `reason`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MatchRow {
    pub id: i64,
    pub bracket_id: String,
    pub round: i64,
    pub match_index: i64,
    pub winner_id: Option<String>,
    pub loser_id: Option<String>,
    pub winner_score: Option<i64>,
    pub loser_score: Option<i64>,
    pub reason: Option<String>,
}

impl MatchRow {
    pub fn is_complete(&self) -> bool {
        self.winner_id.is_some() && self.loser_id.is_some()
    }
}

/// Candidate names of the finish-reason column, tried in order.
///
/// Names are interpolated into SQL, so only `[A-Za-z0-9_]` identifiers that
/// do not start with a digit are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonColumns(Vec<String>);

pub const DEFAULT_REASON_COLUMNS: [&str; 2] = ["finish_reason", "reason"];

impl ReasonColumns {
    pub fn new<I, S>(names: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !is_valid_identifier(&name) {
                return Err(format!("Invalid reason column name: {name:?}"));
            }
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
        if columns.is_empty() {
            return Err("At least one reason column name is required".to_string());
        }
        Ok(Self(columns))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for ReasonColumns {
    fn default() -> Self {
        Self(DEFAULT_REASON_COLUMNS.iter().map(|s| s.to_string()).collect())
    }
}

impl<'de> Deserialize<'de> for ReasonColumns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        ReasonColumns::new(names).map_err(serde::de::Error::custom)
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_columns_default_order() {
        let cols = ReasonColumns::default();
        assert_eq!(cols.iter().collect::<Vec<_>>(), vec!["finish_reason", "reason"]);
    }

    #[test]
    fn test_reason_columns_reject_injection() {
        assert!(ReasonColumns::new(["reason; DROP TABLE brackets"]).is_err());
        assert!(ReasonColumns::new(["1reason"]).is_err());
        assert!(ReasonColumns::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_reason_columns_dedup() {
        let cols = ReasonColumns::new(["reason", "reason", "result_type"]).unwrap();
        assert_eq!(cols.as_slice(), &["reason".to_string(), "result_type".to_string()]);
    }

    #[test]
    fn test_reason_columns_deserialize_validates() {
        let ok: ReasonColumns = serde_json::from_str(r#"["reason"]"#).unwrap();
        assert_eq!(ok.iter().next(), Some("reason"));
        assert!(serde_json::from_str::<ReasonColumns>(r#"["bad name"]"#).is_err());
    }

    #[test]
    fn test_match_row_completeness() {
        let mut row = MatchRow {
            id: 1,
            bracket_id: "b".into(),
            round: 1,
            match_index: 1,
            winner_id: Some("a".into()),
            loser_id: None,
            winner_score: None,
            loser_score: None,
            reason: None,
        };
        assert!(!row.is_complete());
        row.loser_id = Some("b".into());
        assert!(row.is_complete());
    }

    #[test]
    fn test_match_key_display() {
        assert_eq!(MatchKey::new("br", 2, 3).to_string(), "br R2 M3");
    }
}
