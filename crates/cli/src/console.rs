//! Line console: colored output, prompts, and universal command handling.

use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::style::{Color, Stylize};
use quarry_core::{
    cheats, command, CheatEffect, Command, GameStats, OutcomeRecord, PresetBet, Session,
};

/// Named colors used by the console, one per kind of message.
struct Palette {
    info: Color,
    success: Color,
    warning: Color,
    danger: Color,
    accent: Color,
    muted: Color,
}

const PALETTE: Palette = Palette {
    info: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    accent: Color::Magenta,
    muted: Color::DarkGrey,
};

const RAINBOW: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

/// What a message is for; maps to one palette color.
#[derive(Debug, Clone, Copy)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
    Accent,
    Muted,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Info => PALETTE.info,
            Tone::Success => PALETTE.success,
            Tone::Warning => PALETTE.warning,
            Tone::Danger => PALETTE.danger,
            Tone::Accent => PALETTE.accent,
            Tone::Muted => PALETTE.muted,
        }
    }
}

/// Context a game hands to [`Console::read_move`].
pub struct MovePrompt<'a> {
    /// Game id for stats and cheat attribution.
    pub game_id: &'a str,
    /// Prompt text, without trailing punctuation.
    pub prompt: &'a str,
    /// Game help shown for the `help` command.
    pub help: &'a str,
}

/// What a move prompt hands back once universal commands have run.
pub enum Reply {
    /// A non-empty game move, verbatim.
    Move(String),
    /// Parsed quick-bet shortcut.
    QuickBets(Vec<PresetBet>),
    /// Player wants out of the round.
    Quit,
    /// Player asked to save; the game decides what to snapshot.
    Save {
        /// True for `save & quit`.
        and_quit: bool,
    },
    /// Player asked for history; the game knows what history means.
    History,
}

/// Outcome of the save-or-quit dialog for rounds in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitChoice {
    /// Snapshot the round, then leave.
    SaveAndQuit,
    /// Leave without saving; the round is forfeit.
    Abandon,
    /// Keep playing.
    Cancel,
}

/// Console bound to one session for the whole process.
pub struct Console<'a> {
    session: &'a Session,
}

impl<'a> Console<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        self.session
    }

    /// Print a toned line, honoring the color setting and rainbow mode.
    pub fn say(&self, tone: Tone, text: &str) {
        println!("{}", self.painted(tone, text));
    }

    /// Print a plain line (rainbow mode still applies).
    pub fn line(&self, text: &str) {
        if self.session.rainbow_enabled() {
            println!("{}", rainbow(text));
        } else {
            println!("{text}");
        }
    }

    /// Print an empty line.
    pub fn blank(&self) {
        println!();
    }

    fn painted(&self, tone: Tone, text: &str) -> String {
        if self.session.rainbow_enabled() {
            rainbow(text)
        } else if self.session.color_enabled() {
            format!("{}", text.with(tone.color()))
        } else {
            text.to_string()
        }
    }

    /// Prompt for one line of input. End of input behaves like quitting.
    pub fn read_line(&self, prompt: &str) -> Result<String> {
        print!("{prompt}: ");
        io::stdout().flush().context("failed to flush stdout")?;

        let mut buf = String::new();
        let read = io::stdin()
            .read_line(&mut buf)
            .context("failed to read input")?;
        if read == 0 {
            return Ok("q".to_string());
        }
        Ok(buf.trim_end().to_string())
    }

    /// Prompt for a game move, executing universal commands in place.
    ///
    /// Only input the game itself must handle comes back as a [`Reply`].
    /// Empty input never reaches the game.
    pub fn read_move(&self, prompt: &MovePrompt<'_>) -> Result<Reply> {
        loop {
            let line = self.read_line(prompt.prompt)?;
            match self.session.classify(&line) {
                Command::Quit => return Ok(Reply::Quit),
                Command::Save { and_quit } => return Ok(Reply::Save { and_quit }),
                Command::History => return Ok(Reply::History),
                Command::QuickBet(rest) => match command::parse_quick_bets(&rest) {
                    Some(bets) => return Ok(Reply::QuickBets(bets)),
                    None => self.say(
                        Tone::Warning,
                        "Quick bets look like quick:red 50, quick:red 25%, or quick:red 10;odd 5.",
                    ),
                },
                Command::Resume => self.say(Tone::Muted, "You are already in a round."),
                Command::Balance => self.show_balance(),
                Command::Help => self.line(prompt.help),
                Command::Stats { all_games } => {
                    let scope = if all_games { None } else { Some(prompt.game_id) };
                    self.show_stats(scope);
                }
                Command::ColorToggle => self.toggle_color(),
                Command::ResetAll => self.say(
                    Tone::Muted,
                    "Finish or quit the round first; reset works from the menu.",
                ),
                Command::Cheat(effect) => self.apply_cheat(prompt.game_id, effect),
                Command::Move(text) => {
                    if text.is_empty() {
                        self.say(Tone::Muted, "Type a move, or help to see what works here.");
                        continue;
                    }
                    if self.session.debug_enabled() {
                        if text.eq_ignore_ascii_case("cheats") {
                            self.show_cheat_listing();
                            continue;
                        }
                        if text.eq_ignore_ascii_case("ledger") {
                            self.show_transactions();
                            continue;
                        }
                    }
                    return Ok(Reply::Move(text));
                }
            }
        }
    }

    pub fn show_balance(&self) {
        self.say(
            Tone::Info,
            &format!("Your current rock balance: {} Rocks", self.session.balance()),
        );
    }

    /// One game's record, or the whole profile when `game_id` is `None`.
    pub fn show_stats(&self, game_id: Option<&str>) {
        match game_id {
            Some(game_id) => match self.session.stats_for(game_id) {
                Some(stats) => self.line(&stats_row(game_id, &stats)),
                None => self.say(Tone::Muted, &format!("No {game_id} rounds on record yet.")),
            },
            None => {
                let (rows, streak, best) = self.session.stats_overview();
                if rows.is_empty() {
                    self.say(Tone::Muted, "No rounds on record yet.");
                } else {
                    for (game_id, stats) in &rows {
                        self.line(&stats_row(game_id, stats));
                    }
                }
                self.line(&format!("Global win streak: {streak} (best {best})"));
            }
        }
    }

    pub fn toggle_color(&self) {
        match self.session.toggle_color() {
            Ok(true) => self.say(Tone::Success, "Color output is now ON"),
            Ok(false) => self.line("Color output is now OFF"),
            Err(err) => self.say(
                Tone::Warning,
                &format!("Color flipped, but saving the preference failed: {err}"),
            ),
        }
    }

    pub fn apply_cheat(&self, game_id: &str, effect: CheatEffect) {
        self.session.apply_cheat(game_id, effect);
        match effect {
            CheatEffect::GrantRocks(amount) => self.say(
                Tone::Success,
                &format!(
                    "Cheat code activated! +{amount} Rocks, balance {}.",
                    self.session.balance()
                ),
            ),
            CheatEffect::RainbowText => {
                self.say(Tone::Accent, "Cheat code activated! Rainbow text mode!")
            }
            CheatEffect::DebugOverlay => self.say(
                Tone::Warning,
                "Cheat code activated! Debug overlay on; try cheats or ledger.",
            ),
        }
    }

    /// Ask a yes/no question until the answer is one of the two.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        loop {
            let answer = self.read_line(&format!("{question} (y/n)"))?;
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say(Tone::Muted, "Please answer y or n."),
            }
        }
    }

    /// Save-or-quit dialog for a round in progress.
    pub fn quit_round_dialog(&self) -> Result<QuitChoice> {
        loop {
            let answer =
                self.read_line("(s)ave and quit, (q)uit without saving, or (c)ancel")?;
            match answer.trim().to_lowercase().as_str() {
                "s" | "save" => return Ok(QuitChoice::SaveAndQuit),
                "q" | "quit" => return Ok(QuitChoice::Abandon),
                "c" | "cancel" => return Ok(QuitChoice::Cancel),
                _ => self.say(Tone::Muted, "Please answer s, q, or c."),
            }
        }
    }

    /// Celebrate a streak bonus, if the outcome earned one.
    pub fn announce_bonus(&self, record: &OutcomeRecord) {
        if let Some(bonus) = record.bonus {
            self.say(
                Tone::Success,
                &format!(
                    "Win Streak Bonus! +{bonus} Rocks for {} wins in a row!",
                    record.game_streak
                ),
            );
        }
    }

    /// Persist now, warning instead of failing when the write goes wrong.
    pub fn save_progress(&self) {
        match self.session.persist() {
            Ok(()) => self.say(Tone::Success, "Progress saved."),
            Err(err) => self.say(Tone::Warning, &format!("Saving failed: {err}")),
        }
    }

    pub fn show_cheat_listing(&self) {
        self.say(Tone::Warning, "Known cheat codes:");
        for code in cheats::all() {
            self.line(&format!("  {}: {}", code.token, code.description));
        }
    }

    pub fn show_transactions(&self) {
        let log = self.session.transactions();
        if log.is_empty() {
            self.say(Tone::Muted, "No rocks have moved yet this session.");
            return;
        }
        self.say(Tone::Info, "Rocks moved this session:");
        for tx in &log {
            self.line(&format!("  {:>12}  {:+6}  {}", tx.game_id, tx.delta, tx.reason));
        }
        self.line(&format!("Balance: {} Rocks", self.session.balance()));
    }
}

fn stats_row(game_id: &str, stats: &GameStats) -> String {
    format!(
        "{game_id:>12}: {} played, {} won, {} lost, {} pushed, streak {} (best {})",
        stats.played, stats.wins, stats.losses, stats.pushes, stats.current_streak, stats.best_streak
    )
}

fn rainbow(text: &str) -> String {
    let mut out = String::new();
    let mut idx = 0;
    for ch in text.chars() {
        if ch.is_whitespace() {
            out.push(ch);
        } else {
            out.push_str(&format!("{}", ch.with(RAINBOW[idx % RAINBOW.len()])));
            idx += 1;
        }
    }
    out
}
