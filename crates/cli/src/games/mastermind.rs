//! Mastermind: break the secret digit code.

use anyhow::Result;
use quarry_core::Outcome;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Game, GameExit};
use crate::console::{Console, MovePrompt, QuitChoice, Reply, Tone};

const HELP: &str = "\
Enter a guess with as many digits as the code; feedback tells you how
many digits sit in the right spot and how many are right but misplaced.
Type reveal to give up and see the code, h for your guess history.
Universal commands work too: rocks, stats, color:switch, save, q.";

const MAX_ATTEMPTS: u32 = 12;

/// A suspended or running round: the code plus every scored guess.
#[derive(Debug, Serialize, Deserialize)]
struct RoundState {
    code: String,
    allow_repeats: bool,
    history: Vec<ScoredGuess>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScoredGuess {
    guess: String,
    right_spot: u32,
    wrong_spot: u32,
}

impl RoundState {
    fn code_length(&self) -> usize {
        self.code.chars().count()
    }

    fn attempts(&self) -> u32 {
        self.history.len() as u32
    }
}

fn generate_code(length: usize, allow_repeats: bool) -> String {
    let mut rng = rand::thread_rng();
    if allow_repeats {
        (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    } else {
        let mut digits: Vec<char> = ('0'..='9').collect();
        digits.shuffle(&mut rng);
        digits.into_iter().take(length).collect()
    }
}

/// Score a guess: exact matches first, then misplaced digits, each code
/// digit consumed at most once.
fn evaluate_guess(guess: &str, code: &str) -> (u32, u32) {
    let mut spare_guess: Vec<char> = Vec::new();
    let mut spare_code: Vec<char> = Vec::new();
    let mut right_spot = 0;
    for (g, c) in guess.chars().zip(code.chars()) {
        if g == c {
            right_spot += 1;
        } else {
            spare_guess.push(g);
            spare_code.push(c);
        }
    }

    let mut wrong_spot = 0;
    for g in spare_guess {
        if let Some(pos) = spare_code.iter().position(|c| *c == g) {
            wrong_spot += 1;
            spare_code.remove(pos);
        }
    }
    (right_spot, wrong_spot)
}

enum RoundEnd {
    Finished,
    Quit,
}

pub struct Mastermind;

impl Mastermind {
    fn run(&self, console: &Console<'_>, mut pending: Option<RoundState>) -> Result<GameExit> {
        console.blank();
        console.say(Tone::Accent, "=== Welcome to Mastermind (Code Breaker)! ===");
        console.line("Try to break the secret code.");

        loop {
            let (state, owns_slot) = match pending.take() {
                Some(state) => {
                    console.say(Tone::Info, "Picking up where you left off.");
                    self.show_rules(console, &state);
                    (state, true)
                }
                None => match self.new_round(console)? {
                    Some(state) => (state, false),
                    None => return Ok(GameExit::Quit),
                },
            };

            match self.run_round(console, state, owns_slot)? {
                RoundEnd::Quit => return Ok(GameExit::Quit),
                RoundEnd::Finished => {
                    if !console.confirm("Do you want to play again?")? {
                        return Ok(GameExit::Menu);
                    }
                }
            }
        }
    }

    /// Length and mode selection. `None` means the player quit instead.
    fn new_round(&self, console: &Console<'_>) -> Result<Option<RoundState>> {
        let length = match self.choose_length(console)? {
            Some(length) => length,
            None => return Ok(None),
        };
        let allow_repeats = match self.choose_mode(console)? {
            Some(allow_repeats) => allow_repeats,
            None => return Ok(None),
        };

        let state = RoundState {
            code: generate_code(length, allow_repeats),
            allow_repeats,
            history: Vec::new(),
        };
        self.show_rules(console, &state);
        Ok(Some(state))
    }

    fn choose_length(&self, console: &Console<'_>) -> Result<Option<usize>> {
        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Choose code length (1-9, or 0 for 10 digits)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.parse::<usize>() {
                    Ok(0) => {
                        console.line("Setting code length to 10 digits.");
                        return Ok(Some(10));
                    }
                    Ok(length) if (1..=10).contains(&length) => return Ok(Some(length)),
                    _ => console.say(
                        Tone::Muted,
                        "Please enter a number between 0 and 9 (0 means 10 digits).",
                    ),
                },
                Reply::History => {
                    console.say(Tone::Muted, "No guesses yet; the round has not started.")
                }
                Reply::QuickBets(_) => console.say(Tone::Muted, "No betting in this game."),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(None);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn choose_mode(&self, console: &Console<'_>) -> Result<Option<bool>> {
        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Allow repeated digits? (y/n)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.to_lowercase().as_str() {
                    "y" | "yes" => return Ok(Some(true)),
                    "n" | "no" => return Ok(Some(false)),
                    _ => console.say(Tone::Muted, "Please enter 'y' or 'n'."),
                },
                Reply::History => {
                    console.say(Tone::Muted, "No guesses yet; the round has not started.")
                }
                Reply::QuickBets(_) => console.say(Tone::Muted, "No betting in this game."),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(None);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn show_rules(&self, console: &Console<'_>, state: &RoundState) {
        console.blank();
        console.line(&format!(
            "I'm thinking of a {}-digit code using digits 0-9.",
            state.code_length()
        ));
        if state.allow_repeats {
            console.line("This game mode allows repeated digits in the code.");
        } else {
            console.line("This game mode uses only unique digits in the code.");
        }
        console.line("Try to guess it in as few attempts as possible.");
    }

    fn run_round(
        &self,
        console: &Console<'_>,
        mut state: RoundState,
        mut owns_slot: bool,
    ) -> Result<RoundEnd> {
        let session = console.session();
        let length = state.code_length();

        loop {
            if state.attempts() >= MAX_ATTEMPTS {
                console.say(
                    Tone::Danger,
                    &format!("Out of attempts! The secret code was: {}", state.code),
                );
                return self.finish(console, Outcome::Loss, owns_slot);
            }

            console.blank();
            console.line(&format!(
                "Attempt {}/{MAX_ATTEMPTS}",
                state.attempts() + 1
            ));
            let guess_label = format!("Enter your {length}-digit guess");
            let prompt = MovePrompt {
                game_id: self.id(),
                prompt: &guess_label,
                help: HELP,
            };
            match console.read_move(&prompt)? {
                Reply::Move(input) => {
                    let lower = input.to_lowercase();
                    if matches!(lower.as_str(), "reveal" | "show" | "give up") {
                        if console.confirm("Reveal the code? This will end the game")? {
                            console.say(
                                Tone::Danger,
                                &format!("The secret code was: {}", state.code),
                            );
                            return self.finish(console, Outcome::Loss, owns_slot);
                        }
                        console.line("Continue playing! Good luck!");
                        continue;
                    }

                    if !lower.chars().all(|ch| ch.is_ascii_digit()) {
                        console.say(Tone::Muted, "Please enter digits only (0-9).");
                        continue;
                    }
                    if lower.chars().count() != length {
                        console.say(
                            Tone::Muted,
                            &format!("Please enter exactly {length} digits."),
                        );
                        continue;
                    }

                    let (right_spot, wrong_spot) = evaluate_guess(&lower, &state.code);
                    state.history.push(ScoredGuess {
                        guess: lower,
                        right_spot,
                        wrong_spot,
                    });
                    console.line(&format!(
                        "Feedback: {right_spot} correct position, {wrong_spot} correct digit but wrong position"
                    ));

                    if right_spot as usize == length {
                        console.blank();
                        console.say(
                            Tone::Success,
                            &format!(
                                "Congratulations! You've cracked the code in {} attempts!",
                                state.attempts()
                            ),
                        );
                        return self.finish(console, Outcome::Win, owns_slot);
                    }
                }
                Reply::History => self.show_history(console, &state),
                Reply::QuickBets(_) => console.say(Tone::Muted, "No betting in this game."),
                Reply::Save { and_quit } => {
                    if self.save_round(console, &state)? {
                        owns_slot = true;
                        if and_quit {
                            return Ok(RoundEnd::Quit);
                        }
                    }
                }
                Reply::Quit => match console.quit_round_dialog()? {
                    QuitChoice::SaveAndQuit => {
                        if self.save_round(console, &state)? {
                            return Ok(RoundEnd::Quit);
                        }
                    }
                    QuitChoice::Abandon => {
                        if owns_slot {
                            session.discard_round()?;
                        }
                        return Ok(RoundEnd::Quit);
                    }
                    QuitChoice::Cancel => {}
                },
            }
        }
    }

    fn finish(
        &self,
        console: &Console<'_>,
        outcome: Outcome,
        owns_slot: bool,
    ) -> Result<RoundEnd> {
        let session = console.session();
        let record = session.record_outcome(self.id(), outcome);
        console.announce_bonus(&record);
        if owns_slot {
            session.discard_round()?;
        }
        Ok(RoundEnd::Finished)
    }

    fn show_history(&self, console: &Console<'_>, state: &RoundState) {
        if state.history.is_empty() {
            console.say(Tone::Muted, "No guesses made yet.");
            return;
        }
        console.line("=== GUESS HISTORY ===");
        for (idx, scored) in state.history.iter().enumerate() {
            console.line(&format!(
                "Guess #{} | {} | {} Right Spot, {} Wrong Spot",
                idx + 1,
                scored.guess,
                scored.right_spot,
                scored.wrong_spot
            ));
        }
    }

    fn save_round(&self, console: &Console<'_>, state: &RoundState) -> Result<bool> {
        let snapshot = serde_json::to_value(state)?;
        match console.session().save_round(self.id(), snapshot) {
            Ok(()) => {
                console.say(Tone::Success, "Round saved.");
                Ok(true)
            }
            Err(err) => {
                console.say(Tone::Warning, &format!("Saving failed: {err}"));
                Ok(false)
            }
        }
    }
}

impl Game for Mastermind {
    fn id(&self) -> &'static str {
        "mastermind"
    }

    fn title(&self) -> &'static str {
        "Mastermind"
    }

    fn tagline(&self) -> &'static str {
        "Break the secret digit code"
    }

    fn play(&self, console: &Console<'_>) -> Result<GameExit> {
        self.run(console, None)
    }

    fn resume(&self, console: &Console<'_>, state: Value) -> Result<GameExit> {
        match serde_json::from_value::<RoundState>(state) {
            Ok(round) => self.run(console, Some(round)),
            Err(err) => {
                console.say(
                    Tone::Warning,
                    &format!("The saved round could not be read ({err}); starting fresh."),
                );
                console.session().discard_round()?;
                self.run(console, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_counts_exact_and_misplaced_digits() {
        assert_eq!(evaluate_guess("1357", "1234"), (1, 1));
        assert_eq!(evaluate_guess("1234", "1234"), (4, 0));
        assert_eq!(evaluate_guess("4321", "1234"), (0, 4));
        assert_eq!(evaluate_guess("0000", "1234"), (0, 0));
    }

    #[test]
    fn repeated_guess_digits_consume_code_digits_once() {
        // Only one 1 in the code; the extra 1s in the guess score nothing.
        assert_eq!(evaluate_guess("1111", "1000"), (1, 0));
        assert_eq!(evaluate_guess("1100", "0011"), (0, 4));
        assert_eq!(evaluate_guess("2211", "1122"), (0, 4));
    }

    #[test]
    fn no_repeats_codes_use_unique_digits() {
        for _ in 0..20 {
            let code = generate_code(10, false);
            let mut digits: Vec<char> = code.chars().collect();
            digits.sort_unstable();
            digits.dedup();
            assert_eq!(digits.len(), 10);
        }
    }

    #[test]
    fn generated_codes_have_the_requested_length() {
        for length in 1..=10 {
            assert_eq!(generate_code(length, true).chars().count(), length);
            assert_eq!(generate_code(length, false).chars().count(), length);
        }
    }

    #[test]
    fn snapshots_round_trip() {
        let state = RoundState {
            code: "0419".to_string(),
            allow_repeats: true,
            history: vec![ScoredGuess {
                guess: "1234".to_string(),
                right_spot: 0,
                wrong_spot: 2,
            }],
        };
        let snapshot = serde_json::to_value(&state).unwrap();
        let restored: RoundState = serde_json::from_value(snapshot).unwrap();
        assert_eq!(restored.code, "0419");
        assert_eq!(restored.attempts(), 1);
        assert_eq!(restored.history[0].wrong_spot, 2);
    }
}
