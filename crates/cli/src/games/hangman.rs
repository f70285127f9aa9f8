//! Hangman: uncover the word one letter at a time.

use anyhow::Result;
use once_cell::sync::Lazy;
use quarry_core::Outcome;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Game, GameExit};
use crate::console::{Console, MovePrompt, QuitChoice, Reply, Tone};

const HELP: &str = "\
Type a letter to guess it, or the whole word to go for the win. Letters
that collide with a command need the long form: guess h, guess q.
New letters and wrong word guesses each cost one guess. Universal
commands work too: rocks, stats, history, color:switch, save, q.";

/// Word bank, one word per line; parsed into a list on first use.
static WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    WORD_BANK
        .lines()
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .collect()
});

const WORD_BANK: &str = "\
anchor
basalt
bicycle
blanket
breeze
candle
canyon
cascade
compass
cricket
crystal
drizzle
echo
ember
feather
fossil
galaxy
garnet
glacier
granite
harbor
horizon
island
jigsaw
lantern
lighthouse
marble
meadow
meteor
mountain
nugget
obsidian
orchard
pebble
pickaxe
prism
quarry
quartz
rhythm
saddle
sequoia
thunder
tunnel
velvet
voyage
whistle
windmill
zephyr
";

/// Everything needed to put a suspended round back on the table.
#[derive(Debug, Serialize, Deserialize)]
struct RoundState {
    word: String,
    guessed: Vec<char>,
    used: u32,
    max_guesses: u32,
    infinite: bool,
}

impl RoundState {
    fn new(word: &str, max_guesses: u32) -> Self {
        Self {
            word: word.to_string(),
            guessed: Vec::new(),
            used: 0,
            max_guesses,
            infinite: false,
        }
    }

    fn masked(&self) -> String {
        self.word
            .chars()
            .map(|ch| {
                if self.guessed.contains(&ch) {
                    ch.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .map(|ch| ch.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn misses(&self) -> Vec<char> {
        self.guessed
            .iter()
            .copied()
            .filter(|ch| !self.word.contains(*ch))
            .collect()
    }

    fn solved(&self) -> bool {
        self.word.chars().all(|ch| self.guessed.contains(&ch))
    }

    fn remaining(&self) -> u32 {
        self.max_guesses.saturating_sub(self.used)
    }
}

/// One hangman turn, after the raw input survived command handling.
enum Turn {
    Hit(char, usize),
    Miss(char),
    Repeat,
    WrongWord,
    Solved,
    Unusable,
}

fn apply_guess(state: &mut RoundState, input: &str) -> Turn {
    let lower = input.to_lowercase();
    let target = match lower.strip_prefix("guess ") {
        Some(rest) => rest.trim(),
        None => lower.as_str(),
    };

    if target == state.word {
        for ch in state.word.clone().chars() {
            if !state.guessed.contains(&ch) {
                state.guessed.push(ch);
            }
        }
        state.used += 1;
        return Turn::Solved;
    }

    let mut chars = target.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            let letter = letter.to_ascii_lowercase();
            if state.guessed.contains(&letter) {
                return Turn::Repeat;
            }
            state.guessed.push(letter);
            state.used += 1;
            let count = state.word.chars().filter(|ch| *ch == letter).count();
            if count > 0 {
                Turn::Hit(letter, count)
            } else {
                Turn::Miss(letter)
            }
        }
        (Some(_), Some(_)) if target.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            state.used += 1;
            Turn::WrongWord
        }
        _ => Turn::Unusable,
    }
}

enum RoundEnd {
    Finished,
    Quit,
}

pub struct Hangman;

impl Hangman {
    fn run(&self, console: &Console<'_>, mut pending: Option<RoundState>) -> Result<GameExit> {
        console.blank();
        console.say(Tone::Accent, "=== Welcome to Hangman! ===");

        loop {
            let (state, owns_slot) = match pending.take() {
                Some(state) => {
                    console.say(Tone::Info, "Picking up where you left off.");
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
                    if !console.confirm("Play again?")? {
                        return Ok(GameExit::Menu);
                    }
                }
            }
        }
    }

    /// Difficulty selection. `None` means the player quit instead.
    fn new_round(&self, console: &Console<'_>) -> Result<Option<RoundState>> {
        console.blank();
        console.line("Select difficulty:");
        console.line("1. Easy (26 guesses)");
        console.line("2. Medium (word length + 15 guesses)");
        console.line("3. Hard (word length + 5 guesses)");

        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Choose difficulty (1-3)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => {
                    let word = pick_word();
                    let length = word.chars().count() as u32;
                    let max_guesses = match choice.to_lowercase().as_str() {
                        "1" => 26,
                        "2" => length + 15,
                        "3" => length + 5,
                        // Undocumented tester mode: one guess.
                        "d99" => 1,
                        _ => {
                            console.say(Tone::Muted, "Invalid choice. Please try again.");
                            continue;
                        }
                    };
                    return Ok(Some(RoundState::new(word, max_guesses)));
                }
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

    fn run_round(
        &self,
        console: &Console<'_>,
        mut state: RoundState,
        mut owns_slot: bool,
    ) -> Result<RoundEnd> {
        let session = console.session();
        self.show_state(console, &state);

        loop {
            let guess_label = format!("Guess {}", state.used + 1);
            let prompt = MovePrompt {
                game_id: self.id(),
                prompt: &guess_label,
                help: HELP,
            };
            match console.read_move(&prompt)? {
                Reply::Move(input) => match apply_guess(&mut state, &input) {
                    Turn::Solved => {}
                    Turn::Hit(letter, count) => {
                        let upper = letter.to_ascii_uppercase();
                        let text = if count == 1 {
                            format!("There is 1 letter '{upper}'")
                        } else {
                            format!("There are {count} letters '{upper}'")
                        };
                        console.say(Tone::Success, &text);
                    }
                    Turn::Miss(letter) => console.line(&format!(
                        "{} is not in the word.",
                        letter.to_ascii_uppercase()
                    )),
                    Turn::Repeat => {
                        console.say(Tone::Muted, "You already guessed that letter.")
                    }
                    Turn::WrongWord => console.say(Tone::Warning, "Incorrect word guess!"),
                    Turn::Unusable => {
                        console.say(
                            Tone::Muted,
                            "Please guess a single letter or the complete word.",
                        );
                        continue;
                    }
                },
                Reply::History => {
                    if state.guessed.is_empty() {
                        console.say(Tone::Muted, "No guesses yet this round.");
                    } else {
                        let listed: Vec<String> = state
                            .guessed
                            .iter()
                            .map(|ch| ch.to_ascii_uppercase().to_string())
                            .collect();
                        console.line(&format!("Guessed so far: {}", listed.join(", ")));
                    }
                    continue;
                }
                Reply::QuickBets(_) => {
                    console.say(Tone::Muted, "No betting in this game.");
                    continue;
                }
                Reply::Save { and_quit } => {
                    if self.save_round(console, &state)? {
                        owns_slot = true;
                        if and_quit {
                            return Ok(RoundEnd::Quit);
                        }
                    }
                    continue;
                }
                Reply::Quit => match console.quit_round_dialog()? {
                    QuitChoice::SaveAndQuit => {
                        if self.save_round(console, &state)? {
                            return Ok(RoundEnd::Quit);
                        }
                        continue;
                    }
                    QuitChoice::Abandon => {
                        if owns_slot {
                            session.discard_round()?;
                        }
                        return Ok(RoundEnd::Quit);
                    }
                    QuitChoice::Cancel => continue,
                },
            }

            if state.solved() {
                console.blank();
                console.say(
                    Tone::Success,
                    &format!(
                        "You won! The word was {}. It took you {} guesses.",
                        state.word.to_uppercase(),
                        state.used
                    ),
                );
                let record = session.record_outcome(self.id(), Outcome::Win);
                console.announce_bonus(&record);
                if owns_slot {
                    session.discard_round()?;
                }
                return Ok(RoundEnd::Finished);
            }

            if !state.infinite && state.remaining() == 0 {
                if console.confirm("Out of guesses! Keep guessing, instead of seeing the word")? {
                    state.infinite = true;
                    console.line("Continuing with unlimited guesses...");
                } else {
                    console.say(
                        Tone::Danger,
                        &format!("The word was {}!", state.word.to_uppercase()),
                    );
                    session.record_outcome(self.id(), Outcome::Loss);
                    if owns_slot {
                        session.discard_round()?;
                    }
                    return Ok(RoundEnd::Finished);
                }
            }

            self.show_state(console, &state);
        }
    }

    fn show_state(&self, console: &Console<'_>, state: &RoundState) {
        console.blank();
        console.line(&format!("Current Word: {}", state.masked()));
        let misses = state.misses();
        if !misses.is_empty() {
            let listed: Vec<String> = misses
                .iter()
                .map(|ch| ch.to_ascii_uppercase().to_string())
                .collect();
            console.line(&format!("Letters Not in Word: {}", listed.join(" ")));
        }
        if !state.infinite {
            console.line(&format!("You have {} guesses remaining.", state.remaining()));
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

fn pick_word() -> &'static str {
    WORDS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("quarry")
}

impl Game for Hangman {
    fn id(&self) -> &'static str {
        "hangman"
    }

    fn title(&self) -> &'static str {
        "Hangman"
    }

    fn tagline(&self) -> &'static str {
        "Uncover the word before the guesses run out"
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

    fn round(word: &str) -> RoundState {
        RoundState::new(word, 10)
    }

    #[test]
    fn letter_hits_reveal_and_misses_accumulate() {
        let mut state = round("basalt");
        assert!(matches!(apply_guess(&mut state, "a"), Turn::Hit('a', 2)));
        assert!(matches!(apply_guess(&mut state, "Z"), Turn::Miss('z')));
        assert!(matches!(apply_guess(&mut state, "a"), Turn::Repeat));
        assert_eq!(state.used, 2);
        assert_eq!(state.masked(), "_ A _ A _ _");
        assert_eq!(state.misses(), vec!['z']);
    }

    #[test]
    fn word_guesses_win_or_cost_a_guess() {
        let mut state = round("ember");
        assert!(matches!(apply_guess(&mut state, "amber"), Turn::WrongWord));
        assert_eq!(state.used, 1);
        assert!(matches!(apply_guess(&mut state, "EMBER"), Turn::Solved));
        assert!(state.solved());
    }

    #[test]
    fn guess_prefix_unlocks_command_letters() {
        let mut state = round("zephyr");
        assert!(matches!(apply_guess(&mut state, "guess h"), Turn::Hit('h', 1)));
        // A bare word guess through the long form works too.
        assert!(matches!(
            apply_guess(&mut state, "guess zephyr"),
            Turn::Solved
        ));
    }

    #[test]
    fn junk_input_costs_nothing() {
        let mut state = round("prism");
        assert!(matches!(apply_guess(&mut state, "4"), Turn::Unusable));
        assert!(matches!(apply_guess(&mut state, "it's"), Turn::Unusable));
        assert_eq!(state.used, 0);
    }

    #[test]
    fn snapshots_round_trip() {
        let mut state = round("granite");
        apply_guess(&mut state, "g");
        apply_guess(&mut state, "x");
        let snapshot = serde_json::to_value(&state).unwrap();
        let restored: RoundState = serde_json::from_value(snapshot).unwrap();
        assert_eq!(restored.word, "granite");
        assert_eq!(restored.guessed, vec!['g', 'x']);
        assert_eq!(restored.used, 2);
        assert_eq!(restored.max_guesses, 10);
    }

    #[test]
    fn word_bank_is_lowercase_ascii() {
        assert!(!WORDS.is_empty());
        for word in WORDS.iter() {
            assert!(word.len() >= 4, "{word} is too short");
            assert!(
                word.chars().all(|ch| ch.is_ascii_lowercase()),
                "{word} is not lowercase ascii"
            );
        }
    }
}
