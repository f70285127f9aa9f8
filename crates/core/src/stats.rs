//! Outcome recording and win-streak tracking.

use std::collections::BTreeMap;

use crate::profile::GameStats;

/// How a finished round ended, as far as the engine cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Player won the round.
    Win,
    /// Player lost the round.
    Loss,
    /// Stand-off; nobody won.
    Push,
}

/// What recording an outcome did to the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeRecord {
    /// Global streak after the outcome.
    pub win_streak: u32,
    /// Streak in the game that reported the outcome.
    pub game_streak: u32,
    /// Streak bonus earned, if the game's new streak hit a reward tier.
    pub bonus: Option<u64>,
}

/// Rocks awarded when a win streak reaches a bonus tier.
pub fn streak_reward(streak: u32) -> Option<u64> {
    match streak {
        3 => Some(10),
        5 => Some(25),
        n if n > 0 && n % 10 == 0 => Some(u64::from(n) * 10),
        _ => None,
    }
}

/// Per-game statistics plus the global streak counters.
#[derive(Debug, Default)]
pub struct StatsTracker {
    stats: BTreeMap<String, GameStats>,
    win_streak: u32,
    best_streak: u32,
}

impl StatsTracker {
    /// Rebuild a tracker from persisted counters.
    pub fn from_parts(
        stats: BTreeMap<String, GameStats>,
        win_streak: u32,
        best_streak: u32,
    ) -> Self {
        Self {
            stats,
            win_streak,
            best_streak,
        }
    }

    /// Record one finished round.
    ///
    /// A win bumps the per-game and global streaks and their bests. A loss
    /// zeroes both current streaks while the bests stand. A push counts the
    /// round but leaves every streak alone.
    pub fn record_outcome(&mut self, game_id: &str, outcome: Outcome) -> OutcomeRecord {
        let entry = self.stats.entry(game_id.to_string()).or_default();
        entry.played += 1;

        match outcome {
            Outcome::Win => {
                entry.wins += 1;
                entry.current_streak += 1;
                entry.best_streak = entry.best_streak.max(entry.current_streak);
                self.win_streak += 1;
                self.best_streak = self.best_streak.max(self.win_streak);
            }
            Outcome::Loss => {
                entry.losses += 1;
                entry.current_streak = 0;
                self.win_streak = 0;
            }
            Outcome::Push => {
                entry.pushes += 1;
            }
        }

        let bonus = match outcome {
            Outcome::Win => streak_reward(entry.current_streak),
            _ => None,
        };
        OutcomeRecord {
            win_streak: self.win_streak,
            game_streak: entry.current_streak,
            bonus,
        }
    }

    /// Lifetime record for one game, if any rounds were ever recorded.
    pub fn stats_for(&self, game_id: &str) -> Option<GameStats> {
        self.stats.get(game_id).copied()
    }

    /// All per-game records, keyed by game id.
    pub fn all(&self) -> &BTreeMap<String, GameStats> {
        &self.stats
    }

    /// Current global streak.
    pub fn win_streak(&self) -> u32 {
        self.win_streak
    }

    /// Best global streak ever.
    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    /// Wipe every counter back to zero.
    pub fn reset(&mut self) {
        self.stats.clear();
        self.win_streak = 0;
        self.best_streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wins_raise_both_streaks() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("hangman", Outcome::Win);
        let record = tracker.record_outcome("hangman", Outcome::Win);

        assert_eq!(record.win_streak, 2);
        assert_eq!(record.game_streak, 2);
        assert_eq!(tracker.best_streak(), 2);

        let stats = tracker.stats_for("hangman").unwrap();
        assert_eq!(stats.played, 2);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.best_streak, 2);
    }

    #[test]
    fn loss_zeroes_current_streaks_but_not_bests() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("roulette", Outcome::Win);
        tracker.record_outcome("roulette", Outcome::Win);
        let record = tracker.record_outcome("roulette", Outcome::Loss);

        assert_eq!(record.win_streak, 0);
        assert_eq!(record.game_streak, 0);
        assert_eq!(tracker.best_streak(), 2);

        let stats = tracker.stats_for("roulette").unwrap();
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.best_streak, 2);
        assert_eq!(stats.losses, 1);
    }

    #[test]
    fn push_counts_the_round_without_touching_streaks() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("blackjack", Outcome::Win);
        let record = tracker.record_outcome("blackjack", Outcome::Push);

        assert_eq!(record.win_streak, 1);
        assert_eq!(record.game_streak, 1);

        let stats = tracker.stats_for("blackjack").unwrap();
        assert_eq!(stats.played, 2);
        assert_eq!(stats.pushes, 1);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn global_streak_spans_games() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("hangman", Outcome::Win);
        let record = tracker.record_outcome("mastermind", Outcome::Win);

        assert_eq!(record.win_streak, 2);
        assert_eq!(record.game_streak, 1);
    }

    #[test]
    fn reward_tiers_match_the_bonus_table() {
        assert_eq!(streak_reward(0), None);
        assert_eq!(streak_reward(1), None);
        assert_eq!(streak_reward(3), Some(10));
        assert_eq!(streak_reward(4), None);
        assert_eq!(streak_reward(5), Some(25));
        assert_eq!(streak_reward(10), Some(100));
        assert_eq!(streak_reward(20), Some(200));
        assert_eq!(streak_reward(25), None);
    }

    #[test]
    fn third_straight_win_earns_the_bonus() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("hangman", Outcome::Win);
        tracker.record_outcome("hangman", Outcome::Win);
        let record = tracker.record_outcome("hangman", Outcome::Win);
        assert_eq!(record.bonus, Some(10));
    }

    #[test]
    fn reset_wipes_everything() {
        let mut tracker = StatsTracker::default();
        tracker.record_outcome("roulette", Outcome::Win);
        tracker.reset();

        assert!(tracker.all().is_empty());
        assert_eq!(tracker.win_streak(), 0);
        assert_eq!(tracker.best_streak(), 0);
    }
}
