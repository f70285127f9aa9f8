//! Input classification: universal meta-commands before game moves.

use crate::cheats::{self, CheatEffect};

/// Every way one input line can be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Leave the current game or the launcher.
    Quit,
    /// Persist now; optionally leave right after.
    Save {
        /// True for the combined `save & quit` token.
        and_quit: bool,
    },
    /// Pick up the suspended round, if one exists.
    Resume,
    /// Show the rocks balance.
    Balance,
    /// Show history; the game decides what history means.
    History,
    /// Show help; the game supplies the text.
    Help,
    /// Show statistics for the current game or the whole profile.
    Stats {
        /// True for the long `statistics` token covering every game.
        all_games: bool,
    },
    /// Flip colored output and persist the flip.
    ColorToggle,
    /// Wipe balance, statistics, and the save slot.
    ResetAll,
    /// Game-defined shortcut with the `quick:` prefix stripped.
    QuickBet(String),
    /// A recognised cheat code.
    Cheat(CheatEffect),
    /// Anything else is the game's move, trimmed but otherwise verbatim.
    Move(String),
}

/// Classify one raw input line.
///
/// Tokens match case-insensitively after trimming. Unrecognised input is
/// never an error here; it falls through to [`Command::Move`] and the game
/// decides whether the move makes sense.
pub fn classify(line: &str) -> Command {
    let trimmed = line.trim();
    let lower = trimmed.to_lowercase();

    match lower.as_str() {
        "q" | "quit" | "exit" => return Command::Quit,
        "save" => return Command::Save { and_quit: false },
        "save & quit" | "save&quit" => return Command::Save { and_quit: true },
        "resume" => return Command::Resume,
        "rocks" | "balance" => return Command::Balance,
        "h" | "his" | "history" => return Command::History,
        "help" => return Command::Help,
        "stats" => return Command::Stats { all_games: false },
        "statistics" => return Command::Stats { all_games: true },
        "color:switch" => return Command::ColorToggle,
        "reset" => return Command::ResetAll,
        _ => {}
    }

    if lower.starts_with("quick:") {
        let rest = trimmed["quick:".len()..].trim();
        return Command::QuickBet(rest.to_string());
    }

    if let Some(code) = cheats::lookup(&lower) {
        return Command::Cheat(code.effect);
    }

    Command::Move(trimmed.to_string())
}

/// Stake attached to a quick bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stake {
    /// Absolute number of rocks.
    Rocks(u64),
    /// Percentage of the balance at bet time, floored.
    Percent(u32),
}

impl Stake {
    /// Concrete rocks amount against the given balance.
    pub fn resolve(self, balance: u64) -> u64 {
        match self {
            Stake::Rocks(amount) => amount,
            Stake::Percent(percent) => {
                (u128::from(balance) * u128::from(percent) / 100) as u64
            }
        }
    }
}

/// One preset bet parsed out of a quick shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetBet {
    /// Preset name, lower-cased; the game decides what it means.
    pub preset: String,
    /// Optional stake named together with the preset.
    pub stake: Option<Stake>,
}

/// Parse the forwarded remainder of a `quick:` shortcut.
///
/// Each semicolon-separated segment is `<preset> [<amount>]` where the
/// amount is either rocks (`red 50`) or a percentage of the balance
/// (`red 50%`). Percentages run 1 to 100; amounts must be positive. Any
/// malformed segment invalidates the whole shortcut.
pub fn parse_quick_bets(rest: &str) -> Option<Vec<PresetBet>> {
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }

    let mut bets = Vec::new();
    for segment in rest.split(';') {
        let segment = segment.trim().to_lowercase();
        if segment.is_empty() {
            continue;
        }
        // Later segments may repeat the prefix, `quick:red 50;quick:odd 25`.
        let segment = segment.strip_prefix("quick:").unwrap_or(&segment);

        let mut parts = segment.split_whitespace();
        let preset = parts.next()?.to_string();
        let stake = match parts.next() {
            None => None,
            Some(raw) => Some(parse_stake(raw)?),
        };
        if parts.next().is_some() {
            return None;
        }
        bets.push(PresetBet { preset, stake });
    }

    if bets.is_empty() {
        None
    } else {
        Some(bets)
    }
}

fn parse_stake(raw: &str) -> Option<Stake> {
    if let Some(percent) = raw.strip_suffix('%') {
        let percent: u32 = percent.parse().ok()?;
        if percent == 0 || percent > 100 {
            return None;
        }
        return Some(Stake::Percent(percent));
    }
    let amount: u64 = raw.parse().ok()?;
    if amount == 0 {
        return None;
    }
    Some(Stake::Rocks(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_tokens_match_case_insensitively() {
        assert_eq!(classify("quit"), Command::Quit);
        assert_eq!(classify("Q"), Command::Quit);
        assert_eq!(classify(" exit "), Command::Quit);
    }

    #[test]
    fn save_tokens_distinguish_the_combined_form() {
        assert_eq!(classify("save"), Command::Save { and_quit: false });
        assert_eq!(classify("save & quit"), Command::Save { and_quit: true });
        assert_eq!(classify("SAVE&QUIT"), Command::Save { and_quit: true });
        assert_eq!(classify("resume"), Command::Resume);
    }

    #[test]
    fn balance_history_and_help_tokens() {
        assert_eq!(classify("rocks"), Command::Balance);
        assert_eq!(classify("Balance"), Command::Balance);
        assert_eq!(classify("h"), Command::History);
        assert_eq!(classify("his"), Command::History);
        assert_eq!(classify("HISTORY"), Command::History);
        assert_eq!(classify("help"), Command::Help);
        assert_eq!(classify("stats"), Command::Stats { all_games: false });
        assert_eq!(classify("statistics"), Command::Stats { all_games: true });
        assert_eq!(classify("color:switch"), Command::ColorToggle);
        assert_eq!(classify("reset"), Command::ResetAll);
    }

    #[test]
    fn unrecognised_input_is_a_move() {
        assert_eq!(classify("hit"), Command::Move("hit".to_string()));
        assert_eq!(classify("  double down  "), Command::Move("double down".to_string()));
        assert_eq!(classify(""), Command::Move(String::new()));
        assert_eq!(classify("   "), Command::Move(String::new()));
    }

    #[test]
    fn quick_prefix_forwards_the_rest_verbatim() {
        assert_eq!(classify("quick:half"), Command::QuickBet("half".to_string()));
        assert_eq!(
            classify("Quick:Red 50"),
            Command::QuickBet("Red 50".to_string())
        );
        assert_eq!(classify("quick:"), Command::QuickBet(String::new()));
    }

    #[test]
    fn cheat_codes_classify_by_registry() {
        assert_eq!(
            classify("millionaire"),
            Command::Cheat(CheatEffect::GrantRocks(1000))
        );
        assert_eq!(
            classify("LUCKY"),
            Command::Cheat(CheatEffect::GrantRocks(777))
        );
        assert_eq!(
            classify("xyzzy"),
            Command::Move("xyzzy".to_string())
        );
    }

    #[test]
    fn quick_bets_parse_amounts_and_percentages() {
        let bets = parse_quick_bets("red 50").unwrap();
        assert_eq!(bets.len(), 1);
        assert_eq!(bets[0].preset, "red");
        assert_eq!(bets[0].stake, Some(Stake::Rocks(50)));

        let bets = parse_quick_bets("Red 50%").unwrap();
        assert_eq!(bets[0].stake, Some(Stake::Percent(50)));

        let bets = parse_quick_bets("half").unwrap();
        assert_eq!(bets[0].preset, "half");
        assert_eq!(bets[0].stake, None);
    }

    #[test]
    fn quick_bets_split_on_semicolons() {
        let bets = parse_quick_bets("red 50%; black 30").unwrap();
        assert_eq!(bets.len(), 2);
        assert_eq!(bets[0].preset, "red");
        assert_eq!(bets[1].preset, "black");
        assert_eq!(bets[1].stake, Some(Stake::Rocks(30)));

        // A repeated prefix on later segments is tolerated.
        let bets = parse_quick_bets("red 10;quick:odd 20").unwrap();
        assert_eq!(bets[1].preset, "odd");
    }

    #[test]
    fn malformed_quick_bets_are_rejected() {
        assert!(parse_quick_bets("").is_none());
        assert!(parse_quick_bets("red 0").is_none());
        assert!(parse_quick_bets("red -5").is_none());
        assert!(parse_quick_bets("red 150%").is_none());
        assert!(parse_quick_bets("red 0%").is_none());
        assert!(parse_quick_bets("red 50 extra").is_none());
    }

    #[test]
    fn percentages_floor_against_the_balance() {
        assert_eq!(Stake::Percent(50).resolve(201), 100);
        assert_eq!(Stake::Percent(30).resolve(200), 60);
        assert_eq!(Stake::Rocks(75).resolve(10), 75);
    }
}
