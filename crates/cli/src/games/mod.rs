//! The game collection; every game consumes the session facade.

use anyhow::Result;
use serde_json::Value;

use crate::console::Console;

mod blackjack;
mod hangman;
mod high_low;
mod mastermind;
mod roulette;

/// How a game session ended, from the launcher's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameExit {
    /// Back to the game menu.
    Menu,
    /// The player quit the whole program from inside the game.
    Quit,
}

/// One playable game in the collection.
pub trait Game {
    /// Stable id used in stats, save slots, and the ledger.
    fn id(&self) -> &'static str;
    /// Menu title.
    fn title(&self) -> &'static str;
    /// One-line menu tagline.
    fn tagline(&self) -> &'static str;
    /// Run rounds until the player leaves.
    fn play(&self, console: &Console<'_>) -> Result<GameExit>;
    /// Pick up a suspended round, then keep playing.
    ///
    /// Games without mid-round saving fall back to a fresh start.
    fn resume(&self, console: &Console<'_>, state: Value) -> Result<GameExit> {
        let _ = state;
        self.play(console)
    }
}

/// Every game, in menu order.
pub fn all() -> Vec<Box<dyn Game>> {
    vec![
        Box::new(high_low::HighLow),
        Box::new(hangman::Hangman),
        Box::new(mastermind::Mastermind),
        Box::new(roulette::Roulette),
        Box::new(blackjack::Blackjack),
    ]
}
