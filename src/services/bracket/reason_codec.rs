//! Packs the finish reason and the optional advantage holder into the single
//! text column a match row offers.
//!
//! Wire format:
//! - `<base>` when nobody carries an advantage (the legacy plain tokens)
//! - `def:<playerId>|<base>` otherwise
//!
//! `<base>` is always the last component. Decoding never fails: anything
//! unrecognised degrades to `normal` with no advantage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ADVANTAGE_PREFIX: &str = "def:";
pub const ADVANTAGE_SEPARATOR: char = '|';

/// How a match ended. Cosmetic, never safety-critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Normal,
    TimeLimit,
    Forfeit,
}

impl FinishReason {
    pub const ALL: [FinishReason; 3] = [
        FinishReason::Normal,
        FinishReason::TimeLimit,
        FinishReason::Forfeit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FinishReason::Normal => "normal",
            FinishReason::TimeLimit => "time_limit",
            FinishReason::Forfeit => "forfeit",
        }
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(FinishReason::Normal),
            "time_limit" => Ok(FinishReason::TimeLimit),
            "forfeit" => Ok(FinishReason::Forfeit),
            _ => Err(format!("Unknown finish reason: {s}")),
        }
    }
}

/// Decoded content of a match's reason column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedReason {
    pub base: FinishReason,
    pub advantage_holder: Option<String>,
}

impl EncodedReason {
    /// Builds a reason value; an empty holder is the same as no holder.
    pub fn new(base: FinishReason, advantage_holder: Option<String>) -> Self {
        Self {
            base,
            advantage_holder: advantage_holder.filter(|id| !id.is_empty()),
        }
    }

    pub fn plain(base: FinishReason) -> Self {
        Self::new(base, None)
    }

    /// Canonical storage string.
    pub fn encode(&self) -> String {
        match self.advantage_holder.as_deref() {
            Some(holder) if !holder.is_empty() => format!(
                "{ADVANTAGE_PREFIX}{holder}{ADVANTAGE_SEPARATOR}{}",
                self.base
            ),
            _ => self.base.as_str().to_string(),
        }
    }

    /// Parses any stored text, including empty and legacy values.
    pub fn decode(raw: &str) -> Self {
        let text = raw.trim();

        let Some(rest) = text.strip_prefix(ADVANTAGE_PREFIX) else {
            return Self::plain(parse_base(text));
        };

        // Holder ids may contain the separator; the base never does.
        match rest.rsplit_once(ADVANTAGE_SEPARATOR) {
            Some((holder, base)) => Self::new(parse_base(base), Some(holder.to_string())),
            None => Self::new(FinishReason::Normal, Some(rest.to_string())),
        }
    }
}

impl fmt::Display for EncodedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn parse_base(token: &str) -> FinishReason {
    token.parse().unwrap_or_default()
}

/// Shorthand for `EncodedReason::new(..).encode()`.
pub fn encode(base: FinishReason, advantage_holder: Option<&str>) -> String {
    EncodedReason::new(base, advantage_holder.map(str::to_string)).encode()
}

/// Shorthand for `EncodedReason::decode`.
pub fn decode(raw: &str) -> EncodedReason {
    EncodedReason::decode(raw)
}

#[cfg(test)]
#[path = "tests/reason_codec_tests.rs"]
mod tests;
