//! Higher or lower: find the number between 1 and 10.

use anyhow::Result;
use quarry_core::Outcome;
use rand::Rng;

use super::{Game, GameExit};
use crate::console::{Console, MovePrompt, Reply, Tone};

const HELP: &str = "\
Guess the secret number between 1 and 10; after each guess you learn
whether the answer is higher or lower. Type a number to guess.
Universal commands work too: rocks, stats, statistics, history,
color:switch, save, q.";

pub struct HighLow;

impl Game for HighLow {
    fn id(&self) -> &'static str {
        "highlow"
    }

    fn title(&self) -> &'static str {
        "Higher or Lower"
    }

    fn tagline(&self) -> &'static str {
        "Find the number between 1 and 10"
    }

    fn play(&self, console: &Console<'_>) -> Result<GameExit> {
        let session = console.session();
        console.blank();
        console.say(Tone::Accent, "=== Welcome to Higher or Lower! ===");

        loop {
            let secret: u32 = rand::thread_rng().gen_range(1..=10);
            let mut guesses: Vec<u32> = Vec::new();
            let mut hint =
                String::from("I'm thinking of a number between 1 and 10. Your guess");

            loop {
                let prompt = MovePrompt {
                    game_id: self.id(),
                    prompt: &hint,
                    help: HELP,
                };
                match console.read_move(&prompt)? {
                    Reply::Move(text) => match text.parse::<u32>() {
                        Ok(guess) if (1..=10).contains(&guess) => {
                            guesses.push(guess);
                            if guess == secret {
                                break;
                            }
                            hint = if guess < secret {
                                format!("Higher than {guess}. Guess again")
                            } else {
                                format!("Lower than {guess}. Guess again")
                            };
                        }
                        _ => console
                            .say(Tone::Muted, "Please enter a number between 1 and 10."),
                    },
                    Reply::History => {
                        if guesses.is_empty() {
                            console.say(Tone::Muted, "No guesses yet this round.");
                        } else {
                            let listed: Vec<String> =
                                guesses.iter().map(u32::to_string).collect();
                            console.line(&format!("Guesses so far: {}", listed.join(", ")));
                        }
                    }
                    Reply::QuickBets(_) => {
                        console.say(Tone::Muted, "No betting in this game.")
                    }
                    Reply::Save { and_quit } => {
                        console.save_progress();
                        if and_quit {
                            return Ok(GameExit::Quit);
                        }
                    }
                    Reply::Quit => {
                        if console.confirm("Confirm quit?")? {
                            return Ok(GameExit::Quit);
                        }
                    }
                }
            }

            let count = guesses.len();
            if count == 1 {
                console.say(
                    Tone::Success,
                    &format!("Wow! The number was {secret}. You got it first try!"),
                );
            } else {
                console.say(
                    Tone::Success,
                    &format!("Well done! The number was {secret}. You got it in {count} guesses."),
                );
                if count <= 3 {
                    console.line("That's excellent guessing!");
                } else if count <= 5 {
                    console.line("Good job!");
                }
            }

            let record = session.record_outcome(self.id(), Outcome::Win);
            console.announce_bonus(&record);

            if !console.confirm("Play another round?")? {
                return Ok(GameExit::Menu);
            }
        }
    }
}
