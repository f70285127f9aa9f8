//! Persisted player profile models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// Format tag written to every profile file.
pub const SCHEMA_VERSION: u32 = 1;

/// Rocks granted to a brand-new profile.
pub const STARTING_ROCKS: u64 = 100;

/// Everything the engine persists between processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Format tag; only [`SCHEMA_VERSION`] is accepted.
    pub schema_version: u32,
    /// Current rocks balance. Never negative.
    pub balance: u64,
    /// Whether colored output is enabled.
    pub color_enabled: bool,
    /// Consecutive wins across all games right now.
    pub win_streak: u32,
    /// Best global win streak ever recorded.
    pub best_streak: u32,
    /// Lifetime statistics keyed by game id. Entries appear on first outcome.
    pub stats: BTreeMap<String, GameStats>,
    /// At most one suspended round, created by a mid-game save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_slot: Option<SaveSlot>,
}

impl Profile {
    /// Brand-new profile with the given starting balance.
    pub fn fresh(starting_balance: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            balance: starting_balance,
            color_enabled: true,
            win_streak: 0,
            best_streak: 0,
            stats: BTreeMap::new(),
            save_slot: None,
        }
    }

    /// Check the invariants a well-formed profile must satisfy.
    pub fn validate(&self) -> EngineResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(EngineError::CorruptState(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }
        if self.best_streak < self.win_streak {
            return Err(EngineError::CorruptState(format!(
                "best streak {} below current streak {}",
                self.best_streak, self.win_streak
            )));
        }
        for (game_id, stats) in &self.stats {
            stats.validate().map_err(|reason| {
                EngineError::CorruptState(format!("stats for {game_id}: {reason}"))
            })?;
        }
        Ok(())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::fresh(STARTING_ROCKS)
    }
}

/// Lifetime record for a single game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    /// Rounds finished, regardless of outcome.
    pub played: u32,
    /// Rounds won.
    pub wins: u32,
    /// Rounds lost.
    pub losses: u32,
    /// Rounds that ended in a stand-off.
    pub pushes: u32,
    /// Consecutive wins in this game right now.
    pub current_streak: u32,
    /// Best streak this game has ever seen.
    pub best_streak: u32,
}

impl GameStats {
    fn validate(&self) -> Result<(), String> {
        let outcomes =
            u64::from(self.wins) + u64::from(self.losses) + u64::from(self.pushes);
        if u64::from(self.played) != outcomes {
            return Err(format!(
                "played {} does not match {} recorded outcomes",
                self.played, outcomes
            ));
        }
        if self.best_streak < self.current_streak {
            return Err(format!(
                "best streak {} below current streak {}",
                self.best_streak, self.current_streak
            ));
        }
        Ok(())
    }
}

/// A suspended round waiting to be resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSlot {
    /// Game that owns the suspended round.
    pub game_id: String,
    /// Opaque round snapshot; only the owning game interprets it.
    pub round_state: Value,
    /// When the round was saved.
    pub saved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn fresh_profile_passes_validation() -> Result<()> {
        let profile = Profile::fresh(250);
        profile.validate()?;
        assert_eq!(profile.balance, 250);
        assert!(profile.stats.is_empty());
        assert!(profile.save_slot.is_none());
        Ok(())
    }

    #[test]
    fn mismatched_outcome_counts_are_rejected() {
        let mut profile = Profile::default();
        profile.stats.insert(
            "blackjack".to_string(),
            GameStats {
                played: 5,
                wins: 2,
                losses: 1,
                pushes: 1,
                ..GameStats::default()
            },
        );
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, EngineError::CorruptState(_)));
    }

    #[test]
    fn unsupported_schema_version_is_rejected() {
        let mut profile = Profile::default();
        profile.schema_version = 7;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn persisted_keys_use_camel_case() -> Result<()> {
        let mut profile = Profile::default();
        profile.stats.insert("hangman".to_string(), GameStats::default());
        let value = serde_json::to_value(&profile)?;
        assert_eq!(value["schemaVersion"], json!(1));
        assert_eq!(value["colorEnabled"], json!(true));
        assert!(value["stats"]["hangman"].get("currentStreak").is_some());
        assert!(value.get("saveSlot").is_none());
        Ok(())
    }

    #[test]
    fn missing_required_field_fails_parse() {
        let raw = json!({
            "schemaVersion": 1,
            "colorEnabled": true,
            "winStreak": 0,
            "bestStreak": 0,
            "stats": {}
        });
        assert!(serde_json::from_value::<Profile>(raw).is_err());
    }
}
