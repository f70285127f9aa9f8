//! The session facade, the one surface games program against.

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::info;

use crate::{
    cheats::CheatEffect,
    command::{self, Command},
    error::EngineResult,
    ledger::{BetHandle, Ledger, Payout, Transaction},
    profile::{GameStats, Profile, SaveSlot, SCHEMA_VERSION},
    stats::{Outcome, OutcomeRecord, StatsTracker},
    store::ProfileStore,
};

/// Rocks handed out when a broke player wants to keep playing.
pub const EMERGENCY_ROCKS: u64 = 50;

/// Live session state: ledger, statistics, display flags, and the save slot.
///
/// Every operation takes `&self` and runs inside one lock, so a whole
/// read-mutate-persist step is a single critical section.
pub struct Session {
    store: ProfileStore,
    inner: Mutex<Inner>,
}

struct Inner {
    ledger: Ledger,
    stats: StatsTracker,
    color_enabled: bool,
    save_slot: Option<SaveSlot>,
    rainbow: bool,
    debug: bool,
}

impl Inner {
    fn snapshot(&self) -> Profile {
        Profile {
            schema_version: SCHEMA_VERSION,
            balance: self.ledger.balance(),
            color_enabled: self.color_enabled,
            win_streak: self.stats.win_streak(),
            best_streak: self.stats.best_streak(),
            stats: self.stats.all().clone(),
            save_slot: self.save_slot.clone(),
        }
    }
}

impl Session {
    /// Load the profile behind `store` and build the live session.
    pub fn open(store: ProfileStore) -> EngineResult<Self> {
        let profile = store.load()?;
        Ok(Self::from_profile(store, profile))
    }

    /// Build a session from an already validated profile.
    ///
    /// The frontend uses this to start over a corrupt file once the player
    /// has agreed to lose it.
    pub fn from_profile(store: ProfileStore, profile: Profile) -> Self {
        info!(
            "session opened with {} rocks, {} games on record",
            profile.balance,
            profile.stats.len()
        );
        Self {
            store,
            inner: Mutex::new(Inner {
                ledger: Ledger::new(profile.balance),
                stats: StatsTracker::from_parts(
                    profile.stats,
                    profile.win_streak,
                    profile.best_streak,
                ),
                color_enabled: profile.color_enabled,
                save_slot: profile.save_slot,
                rainbow: false,
                debug: false,
            }),
        }
    }

    /// Classify one raw input line. See [`command::classify`].
    pub fn classify(&self, line: &str) -> Command {
        command::classify(line)
    }

    /// Current rocks balance.
    pub fn balance(&self) -> u64 {
        self.inner.lock().ledger.balance()
    }

    /// Stake rocks on a round. Nothing changes when the bet is rejected.
    pub fn place_bet(&self, game_id: &str, amount: i64) -> EngineResult<BetHandle> {
        self.inner.lock().ledger.place_bet(game_id, amount)
    }

    /// Settle a bet and return the rocks credited.
    pub fn settle(&self, handle: BetHandle, payout: Payout) -> u64 {
        self.inner.lock().ledger.settle(handle, payout)
    }

    /// Hand a stake back for a round abandoned before resolution.
    pub fn refund(&self, handle: BetHandle) -> u64 {
        self.inner.lock().ledger.refund(handle)
    }

    /// Record a finished round and credit any streak bonus it earned.
    pub fn record_outcome(&self, game_id: &str, outcome: Outcome) -> OutcomeRecord {
        let mut inner = self.inner.lock();
        let record = inner.stats.record_outcome(game_id, outcome);
        if let Some(bonus) = record.bonus {
            inner.ledger.grant(game_id, bonus);
        }
        info!(
            "{game_id}: {outcome:?}, game streak {}, global streak {}",
            record.game_streak, record.win_streak
        );
        record
    }

    /// Lifetime record for one game, if any rounds were ever recorded.
    pub fn stats_for(&self, game_id: &str) -> Option<GameStats> {
        self.inner.lock().stats.stats_for(game_id)
    }

    /// Per-game records for the whole profile plus the global streak pair.
    pub fn stats_overview(&self) -> (Vec<(String, GameStats)>, u32, u32) {
        let inner = self.inner.lock();
        let rows = inner
            .stats
            .all()
            .iter()
            .map(|(game_id, stats)| (game_id.clone(), *stats))
            .collect();
        (rows, inner.stats.win_streak(), inner.stats.best_streak())
    }

    /// Every balance mutation applied this process, oldest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().ledger.transactions().to_vec()
    }

    /// Whether colored output is on.
    pub fn color_enabled(&self) -> bool {
        self.inner.lock().color_enabled
    }

    /// Flip colored output and persist the flip right away.
    ///
    /// The flip applies to this process even when the write fails; the error
    /// comes back so the frontend can warn.
    pub fn toggle_color(&self) -> EngineResult<bool> {
        let mut inner = self.inner.lock();
        inner.color_enabled = !inner.color_enabled;
        let enabled = inner.color_enabled;
        self.store.save(&inner.snapshot())?;
        Ok(enabled)
    }

    /// Whether the rainbow cheat is active this process.
    pub fn rainbow_enabled(&self) -> bool {
        self.inner.lock().rainbow
    }

    /// Whether the debug cheat is active this process.
    pub fn debug_enabled(&self) -> bool {
        self.inner.lock().debug
    }

    /// Apply a cheat effect. Grants run through the ledger like any credit.
    pub fn apply_cheat(&self, game_id: &str, effect: CheatEffect) {
        let mut inner = self.inner.lock();
        match effect {
            CheatEffect::GrantRocks(amount) => {
                inner.ledger.grant(game_id, amount);
            }
            CheatEffect::RainbowText => inner.rainbow = true,
            CheatEffect::DebugOverlay => inner.debug = true,
        }
        info!("{game_id}: cheat effect {effect:?} applied");
    }

    /// Top up a broke player and return the new balance.
    ///
    /// Only fires at exactly zero rocks; returns `None` otherwise.
    pub fn emergency_rocks(&self, game_id: &str) -> Option<u64> {
        let mut inner = self.inner.lock();
        if inner.ledger.balance() > 0 {
            return None;
        }
        Some(inner.ledger.grant(game_id, EMERGENCY_ROCKS))
    }

    /// Whether a suspended round is waiting.
    pub fn has_saved_round(&self) -> bool {
        self.inner.lock().save_slot.is_some()
    }

    /// Suspend the current round, replacing any previous slot, and persist.
    pub fn save_round(&self, game_id: &str, round_state: Value) -> EngineResult<()> {
        let mut inner = self.inner.lock();
        inner.save_slot = Some(SaveSlot {
            game_id: game_id.to_string(),
            round_state,
            saved_at: Utc::now(),
        });
        info!("{game_id}: round suspended");
        self.store.save(&inner.snapshot())
    }

    /// Hand out the suspended round for resuming.
    ///
    /// The slot stays in place until [`Session::discard_round`] destroys it,
    /// so a crash mid-resume does not lose the save.
    pub fn resume_round(&self) -> Option<SaveSlot> {
        self.inner.lock().save_slot.clone()
    }

    /// Destroy the save slot once its round finished or was abandoned.
    pub fn discard_round(&self) -> EngineResult<()> {
        let mut inner = self.inner.lock();
        if inner.save_slot.take().is_some() {
            info!("save slot cleared");
        }
        self.store.save(&inner.snapshot())
    }

    /// Wipe balance, statistics, streaks, and the save slot back to stock.
    ///
    /// The color preference is display taste, not progress, and survives.
    pub fn reset_all(&self) -> EngineResult<()> {
        let mut inner = self.inner.lock();
        inner.ledger = Ledger::new(self.store.starting_balance());
        inner.stats.reset();
        inner.save_slot = None;
        info!("profile reset to stock");
        self.store.save(&inner.snapshot())
    }

    /// Write the current state to disk.
    pub fn persist(&self) -> EngineResult<()> {
        let inner = self.inner.lock();
        self.store.save(&inner.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;
    use tempfile::{tempdir, TempDir};

    fn open_session(dir: &TempDir) -> Result<Session> {
        let store = ProfileStore::new(dir.path().join("profile.json"));
        Ok(Session::open(store)?)
    }

    #[test]
    fn bet_and_settle_update_the_balance() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        assert_eq!(session.balance(), 100);

        let handle = session.place_bet("blackjack", 20)?;
        assert_eq!(session.balance(), 80);

        let credited = session.settle(handle, Payout::ratio(3, 2));
        assert_eq!(credited, 30);
        assert_eq!(session.balance(), 110);
        Ok(())
    }

    #[test]
    fn persisted_state_survives_reopening() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        let handle = session.place_bet("roulette", 30)?;
        session.settle(handle, Payout::LOSS);
        session.record_outcome("roulette", Outcome::Loss);
        session.persist()?;
        drop(session);

        let session = open_session(&dir)?;
        assert_eq!(session.balance(), 70);
        let stats = session.stats_for("roulette").unwrap();
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.current_streak, 0);
        Ok(())
    }

    #[test]
    fn third_win_pays_the_streak_bonus_without_a_bet() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        session.record_outcome("hangman", Outcome::Win);
        session.record_outcome("hangman", Outcome::Win);
        assert_eq!(session.balance(), 100);

        let record = session.record_outcome("hangman", Outcome::Win);
        assert_eq!(record.bonus, Some(10));
        assert_eq!(session.balance(), 110);
        Ok(())
    }

    #[test]
    fn save_slot_lifecycle() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        assert!(!session.has_saved_round());
        assert!(session.resume_round().is_none());

        session.save_round("hangman", json!({"word": "granite", "guessed": ["g", "a"]}))?;
        assert!(session.has_saved_round());

        // Resuming peeks; the slot survives a reopen until discarded.
        let slot = session.resume_round().unwrap();
        assert_eq!(slot.game_id, "hangman");
        assert_eq!(slot.round_state["word"], json!("granite"));
        drop(session);

        let session = open_session(&dir)?;
        assert!(session.has_saved_round());

        session.discard_round()?;
        assert!(!session.has_saved_round());
        drop(session);

        let session = open_session(&dir)?;
        assert!(!session.has_saved_round());
        Ok(())
    }

    #[test]
    fn color_toggle_persists_immediately() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("profile.json");
        let session = Session::open(ProfileStore::new(&path))?;
        assert!(session.color_enabled());

        assert!(!session.toggle_color()?);

        // No explicit persist; the toggle already wrote the file.
        let reloaded = ProfileStore::new(&path).load()?;
        assert!(!reloaded.color_enabled);
        Ok(())
    }

    #[test]
    fn cheats_grant_rocks_and_set_session_flags() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;

        session.apply_cheat("menu", CheatEffect::GrantRocks(1000));
        assert_eq!(session.balance(), 1100);

        assert!(!session.rainbow_enabled());
        session.apply_cheat("menu", CheatEffect::RainbowText);
        assert!(session.rainbow_enabled());

        session.apply_cheat("menu", CheatEffect::DebugOverlay);
        assert!(session.debug_enabled());

        // Session flags are not part of the profile.
        session.persist()?;
        drop(session);
        let session = open_session(&dir)?;
        assert!(!session.rainbow_enabled());
        assert!(!session.debug_enabled());
        assert_eq!(session.balance(), 1100);
        Ok(())
    }

    #[test]
    fn reset_returns_to_stock_but_keeps_the_color_choice() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        session.apply_cheat("menu", CheatEffect::GrantRocks(500));
        session.record_outcome("mastermind", Outcome::Win);
        session.save_round("mastermind", json!({"code": [1, 2, 3]}))?;
        session.toggle_color()?;

        session.reset_all()?;
        assert_eq!(session.balance(), 100);
        assert!(session.stats_for("mastermind").is_none());
        assert!(!session.has_saved_round());
        assert!(!session.color_enabled());
        Ok(())
    }

    #[test]
    fn emergency_rocks_only_when_broke() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        assert_eq!(session.emergency_rocks("roulette"), None);

        let handle = session.place_bet("roulette", 100)?;
        session.settle(handle, Payout::LOSS);
        assert_eq!(session.balance(), 0);

        assert_eq!(session.emergency_rocks("roulette"), Some(EMERGENCY_ROCKS));
        assert_eq!(session.balance(), EMERGENCY_ROCKS);
        Ok(())
    }

    #[test]
    fn transaction_log_replays_to_the_balance() -> Result<()> {
        let dir = tempdir()?;
        let session = open_session(&dir)?;
        let handle = session.place_bet("blackjack", 40)?;
        session.settle(handle, Payout::EVEN);
        session.apply_cheat("menu", CheatEffect::GrantRocks(777));
        let handle = session.place_bet("blackjack", 10)?;
        session.refund(handle);

        let replayed = session
            .transactions()
            .iter()
            .fold(100i64, |acc, tx| acc + tx.delta);
        assert_eq!(replayed, session.balance() as i64);
        Ok(())
    }
}
