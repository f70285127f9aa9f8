//! Launcher menu: one session, five games, universal commands throughout.

use anyhow::Result;
use chrono::{DateTime, Utc};
use quarry_core::{Command, Session};

use crate::console::{Console, Tone};
use crate::games::{self, Game, GameExit};

const MENU_HELP: &str = "\
Pick a game by number. Universal commands work here and inside games:
  rocks | balance    show your Rocks
  stats | statistics your record, one game or all of them
  h | history        round history, where a game keeps one
  save               write progress to disk (save & quit leaves too)
  resume             pick up a suspended round
  color:switch       toggle colored output
  reset              wipe the profile back to stock (menu only)
  q | quit | exit    leave";

pub struct App<'a> {
    console: Console<'a>,
    games: Vec<Box<dyn Game>>,
}

impl<'a> App<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            console: Console::new(session),
            games: games::all(),
        }
    }

    pub fn run(&self) -> Result<()> {
        loop {
            self.show_menu();
            let line = self
                .console
                .read_line("Select a game (1-5), or q to quit")?;
            match self.console.session().classify(&line) {
                Command::Quit => break,
                Command::Save { and_quit } => {
                    self.console.save_progress();
                    if and_quit {
                        break;
                    }
                }
                Command::Resume => match self.resume_saved()? {
                    Some(GameExit::Quit) => break,
                    Some(GameExit::Menu) | None => self.after_game(),
                },
                Command::Balance => self.console.show_balance(),
                Command::History => self
                    .console
                    .say(Tone::Muted, "History lives inside the games."),
                Command::Help => self.console.line(MENU_HELP),
                Command::Stats { .. } => self.console.show_stats(None),
                Command::ColorToggle => self.console.toggle_color(),
                Command::ResetAll => self.reset_profile()?,
                Command::Cheat(effect) => self.console.apply_cheat("menu", effect),
                Command::QuickBet(_) => self
                    .console
                    .say(Tone::Muted, "Quick bets work at the roulette table."),
                Command::Move(text) => {
                    if text.is_empty() {
                        self.console
                            .say(Tone::Muted, "Type a number from the list, or help.");
                        continue;
                    }
                    if self.console.session().debug_enabled() {
                        if text.eq_ignore_ascii_case("cheats") {
                            self.console.show_cheat_listing();
                            continue;
                        }
                        if text.eq_ignore_ascii_case("ledger") {
                            self.console.show_transactions();
                            continue;
                        }
                    }
                    match text.parse::<usize>() {
                        Ok(pick) if (1..=self.games.len()).contains(&pick) => {
                            match self.launch(pick - 1)? {
                                GameExit::Quit => break,
                                GameExit::Menu => self.after_game(),
                            }
                        }
                        _ => self.console.say(
                            Tone::Muted,
                            &format!(
                                "Invalid choice. Please enter a number between 1 and {}.",
                                self.games.len()
                            ),
                        ),
                    }
                }
            }
        }
        self.goodbye();
        Ok(())
    }

    fn show_menu(&self) {
        let console = &self.console;
        console.blank();
        console.say(Tone::Accent, &"=".repeat(60));
        console.say(Tone::Accent, "                  Quarry Games Collection");
        console.say(Tone::Accent, &"=".repeat(60));
        console.line("      A collection of classic terminal games to enjoy!");
        console.line(&"-".repeat(60));
        console.blank();
        console.line("Available Games:");
        for (idx, game) in self.games.iter().enumerate() {
            console.line(&format!(
                "  {}. {} - {}",
                idx + 1,
                game.title(),
                game.tagline()
            ));
        }
        console.blank();
        console.show_balance();
        if let Some(slot) = console.session().resume_round() {
            let title = self
                .games
                .iter()
                .find(|game| game.id() == slot.game_id)
                .map(|game| game.title())
                .unwrap_or(slot.game_id.as_str());
            console.say(
                Tone::Info,
                &format!(
                    "Saved {title} round from {} - type resume to pick it up.",
                    age_text(slot.saved_at)
                ),
            );
        }
    }

    /// Launch a game by menu index, offering its saved round first.
    fn launch(&self, index: usize) -> Result<GameExit> {
        let game = &self.games[index];
        if let Some(slot) = self.console.session().resume_round() {
            if slot.game_id == game.id() {
                let question = format!("Resume your saved {} round?", game.title());
                if self.console.confirm(&question)? {
                    return game.resume(&self.console, slot.round_state);
                }
            }
        }
        game.play(&self.console)
    }

    /// The `resume` command: jump straight into the suspended round.
    fn resume_saved(&self) -> Result<Option<GameExit>> {
        let session = self.console.session();
        let slot = match session.resume_round() {
            Some(slot) => slot,
            None => {
                self.console.say(Tone::Muted, "No saved round to resume.");
                return Ok(None);
            }
        };
        match self.games.iter().find(|game| game.id() == slot.game_id) {
            Some(game) => Ok(Some(game.resume(&self.console, slot.round_state)?)),
            None => {
                self.console.say(
                    Tone::Warning,
                    &format!(
                        "The saved round belongs to \"{}\", which is not on the menu; discarding it.",
                        slot.game_id
                    ),
                );
                session.discard_round()?;
                Ok(None)
            }
        }
    }

    fn reset_profile(&self) -> Result<()> {
        let sure = self.console.confirm(
            "Reset balance, statistics, and any saved round? This cannot be undone",
        )?;
        if !sure {
            self.console.say(Tone::Muted, "Reset cancelled.");
            return Ok(());
        }
        match self.console.session().reset_all() {
            Ok(()) => {
                self.console
                    .say(Tone::Success, "Profile reset to a fresh start.");
                self.console.show_balance();
            }
            Err(err) => self
                .console
                .say(Tone::Warning, &format!("Reset failed to save: {err}")),
        }
        Ok(())
    }

    /// Write progress after every game visit, so a crash at the menu
    /// loses nothing.
    fn after_game(&self) {
        if let Err(err) = self.console.session().persist() {
            self.console
                .say(Tone::Warning, &format!("Saving failed: {err}"));
        }
    }

    fn goodbye(&self) {
        self.after_game();
        self.console
            .say(Tone::Accent, "Thanks for playing Quarry Games! Goodbye!");
    }
}

/// Rough age of a save, for the menu hint.
fn age_text(saved_at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(saved_at);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "moments ago".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn save_age_buckets() {
        let now = Utc::now();
        assert_eq!(age_text(now), "moments ago");
        assert_eq!(age_text(now - Duration::minutes(5)), "5m ago");
        assert_eq!(age_text(now - Duration::hours(3)), "3h ago");
        assert_eq!(age_text(now - Duration::days(2)), "2d ago");
    }
}
