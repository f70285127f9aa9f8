//! Rocks accounting: bets, settlements, and the in-process audit log.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Rational payout multiplier applied to a stake on settlement.
///
/// `0` is a loss, `1` a push, anything above `1` a win. Fractions express
/// casino odds without floating point; credits are always rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    numerator: u32,
    denominator: u32,
}

impl Payout {
    /// Stake lost, nothing credited.
    pub const LOSS: Payout = Payout::ratio(0, 1);
    /// Stake returned unchanged.
    pub const PUSH: Payout = Payout::ratio(1, 1);
    /// Stake returned doubled.
    pub const EVEN: Payout = Payout::ratio(2, 1);

    /// Multiplier `numerator / denominator`.
    pub const fn ratio(numerator: u32, denominator: u32) -> Self {
        assert!(denominator != 0);
        Self {
            numerator,
            denominator,
        }
    }

    /// Multiplier for classic casino odds, profit to stake, with the stake back.
    ///
    /// `from_odds(35, 1)` is a 35:1 straight-up hit crediting 36 times the stake.
    pub const fn from_odds(profit: u32, stake: u32) -> Self {
        Self::ratio(profit + stake, stake)
    }

    /// Rocks credited for the given stake, rounded down.
    pub fn apply(self, stake: u64) -> u64 {
        let credited =
            u128::from(stake) * u128::from(self.numerator) / u128::from(self.denominator);
        u64::try_from(credited).unwrap_or(u64::MAX)
    }
}

/// Why a ledger entry moved rocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxReason {
    /// Stake debited when a bet was placed.
    Bet,
    /// Credit from settling a bet.
    Payout,
    /// Stake handed back for a round abandoned before resolution.
    Refund,
    /// Credit outside any bet: cheats, streak bonuses, emergency top-ups.
    Grant,
}

impl fmt::Display for TxReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TxReason::Bet => "bet",
            TxReason::Payout => "payout",
            TxReason::Refund => "refund",
            TxReason::Grant => "grant",
        };
        f.write_str(label)
    }
}

/// One balance mutation, kept in process for auditing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Game (or `session` scope) that caused the mutation.
    pub game_id: String,
    /// Signed change in rocks.
    pub delta: i64,
    /// What kind of mutation this was.
    pub reason: TxReason,
}

/// Proof of a placed bet. Settling consumes it, so one bet cannot pay twice.
///
/// Serializable so a suspended round can carry its open bet across processes.
#[derive(Debug, Serialize, Deserialize)]
pub struct BetHandle {
    game_id: String,
    stake: u64,
}

impl BetHandle {
    /// Game the stake belongs to.
    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Rocks debited when the bet was placed.
    pub fn stake(&self) -> u64 {
        self.stake
    }
}

/// Balance plus the log of every mutation since process start.
///
/// The balance is unsigned and every debit is checked up front, so no call
/// sequence can drive it negative.
#[derive(Debug)]
pub struct Ledger {
    balance: u64,
    log: Vec<Transaction>,
}

impl Ledger {
    /// Ledger opening at the given balance.
    pub fn new(balance: u64) -> Self {
        Self {
            balance,
            log: Vec::new(),
        }
    }

    /// Current rocks balance.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Debit a stake, or explain why not. Nothing changes on failure.
    pub fn place_bet(&mut self, game_id: &str, amount: i64) -> EngineResult<BetHandle> {
        if amount <= 0 {
            return Err(EngineError::InvalidAmount);
        }
        let stake = amount as u64;
        if stake > self.balance {
            return Err(EngineError::InsufficientFunds {
                requested: stake,
                available: self.balance,
            });
        }

        self.balance -= stake;
        self.log.push(Transaction {
            game_id: game_id.to_string(),
            delta: -amount,
            reason: TxReason::Bet,
        });
        debug!("{game_id}: staked {stake}, balance now {}", self.balance);
        Ok(BetHandle {
            game_id: game_id.to_string(),
            stake,
        })
    }

    /// Settle a bet, crediting the stake times the payout, rounded down.
    pub fn settle(&mut self, handle: BetHandle, payout: Payout) -> u64 {
        let credited = payout.apply(handle.stake);
        self.balance = self.balance.saturating_add(credited);
        self.log.push(Transaction {
            game_id: handle.game_id,
            delta: i64::try_from(credited).unwrap_or(i64::MAX),
            reason: TxReason::Payout,
        });
        debug!("settled for {credited}, balance now {}", self.balance);
        credited
    }

    /// Hand a stake back untouched, for rounds abandoned before resolution.
    pub fn refund(&mut self, handle: BetHandle) -> u64 {
        let stake = handle.stake;
        self.balance = self.balance.saturating_add(stake);
        self.log.push(Transaction {
            game_id: handle.game_id,
            delta: i64::try_from(stake).unwrap_or(i64::MAX),
            reason: TxReason::Refund,
        });
        stake
    }

    /// Credit rocks outside any bet and return the new balance.
    pub fn grant(&mut self, game_id: &str, amount: u64) -> u64 {
        self.balance = self.balance.saturating_add(amount);
        self.log.push(Transaction {
            game_id: game_id.to_string(),
            delta: i64::try_from(amount).unwrap_or(i64::MAX),
            reason: TxReason::Grant,
        });
        debug!("{game_id}: granted {amount}, balance now {}", self.balance);
        self.balance
    }

    /// Every mutation applied so far, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_bets_are_invalid() {
        let mut ledger = Ledger::new(100);
        assert!(matches!(
            ledger.place_bet("blackjack", 0),
            Err(EngineError::InvalidAmount)
        ));
        assert!(matches!(
            ledger.place_bet("blackjack", -5),
            Err(EngineError::InvalidAmount)
        ));
        assert_eq!(ledger.balance(), 100);
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn over_balance_bet_is_rejected_without_mutation() {
        let mut ledger = Ledger::new(30);
        match ledger.place_bet("roulette", 31) {
            Err(EngineError::InsufficientFunds {
                requested,
                available,
            }) => {
                assert_eq!(requested, 31);
                assert_eq!(available, 30);
            }
            other => panic!("expected InsufficientFunds, got {other:?}"),
        }
        assert_eq!(ledger.balance(), 30);
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn bet_then_three_to_two_settlement() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(100);
        let handle = ledger.place_bet("blackjack", 20)?;
        assert_eq!(ledger.balance(), 80);

        let credited = ledger.settle(handle, Payout::ratio(3, 2));
        assert_eq!(credited, 30);
        assert_eq!(ledger.balance(), 110);
        Ok(())
    }

    #[test]
    fn fractional_credit_rounds_down() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(100);
        let handle = ledger.place_bet("blackjack", 5)?;
        // 5 * 3/2 = 7.5, credited as 7.
        assert_eq!(ledger.settle(handle, Payout::ratio(3, 2)), 7);
        assert_eq!(ledger.balance(), 102);
        Ok(())
    }

    #[test]
    fn loss_push_and_even_multipliers() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(60);

        let handle = ledger.place_bet("roulette", 10)?;
        assert_eq!(ledger.settle(handle, Payout::LOSS), 0);
        assert_eq!(ledger.balance(), 50);

        let handle = ledger.place_bet("roulette", 10)?;
        assert_eq!(ledger.settle(handle, Payout::PUSH), 10);
        assert_eq!(ledger.balance(), 50);

        let handle = ledger.place_bet("roulette", 10)?;
        assert_eq!(ledger.settle(handle, Payout::EVEN), 20);
        assert_eq!(ledger.balance(), 60);
        Ok(())
    }

    #[test]
    fn casino_odds_include_the_stake() {
        assert_eq!(Payout::from_odds(35, 1).apply(10), 360);
        assert_eq!(Payout::from_odds(3, 2).apply(20), 50);
        assert_eq!(Payout::from_odds(2, 1).apply(8), 24);
    }

    #[test]
    fn refund_restores_the_stake() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(40);
        let handle = ledger.place_bet("blackjack", 15)?;
        assert_eq!(ledger.balance(), 25);
        assert_eq!(ledger.refund(handle), 15);
        assert_eq!(ledger.balance(), 40);
        Ok(())
    }

    #[test]
    fn log_replays_to_the_current_balance() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(100);
        let handle = ledger.place_bet("roulette", 25)?;
        ledger.settle(handle, Payout::from_odds(1, 1));
        let handle = ledger.place_bet("roulette", 40)?;
        ledger.settle(handle, Payout::LOSS);
        ledger.grant("session", 777);
        let handle = ledger.place_bet("blackjack", 30)?;
        ledger.refund(handle);

        let replayed = ledger
            .transactions()
            .iter()
            .fold(100i64, |acc, tx| acc + tx.delta);
        assert_eq!(replayed, ledger.balance() as i64);
        Ok(())
    }

    #[test]
    fn exact_balance_can_be_staked() -> anyhow::Result<()> {
        let mut ledger = Ledger::new(50);
        let handle = ledger.place_bet("roulette", 50)?;
        assert_eq!(ledger.balance(), 0);
        ledger.settle(handle, Payout::LOSS);
        assert_eq!(ledger.balance(), 0);
        Ok(())
    }
}
