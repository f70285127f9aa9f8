#![warn(clippy::all, missing_docs)]

//! Session and command engine for the quarry terminal games.
//!
//! This crate hosts the persistent profile store, the rocks ledger,
//! statistics and streak tracking, universal input classification, the
//! cheat-code registry, and the session facade every game programs
//! against. The terminal frontend and the games themselves live in the
//! `quarry` binary crate.

pub mod cheats;
pub mod command;
pub mod config;
pub mod error;
pub mod ledger;
pub mod profile;
pub mod session;
pub mod stats;
pub mod store;

pub use cheats::{CheatCode, CheatEffect};
pub use command::{classify, parse_quick_bets, Command, PresetBet, Stake};
pub use config::AppConfig;
pub use error::{EngineError, EngineResult};
pub use ledger::{BetHandle, Payout, Transaction, TxReason};
pub use profile::{GameStats, Profile, SaveSlot, STARTING_ROCKS};
pub use session::{Session, EMERGENCY_ROCKS};
pub use stats::{Outcome, OutcomeRecord};
pub use store::ProfileStore;
