//! Roulette: bet on where the ball lands.

use std::{fmt, thread, time::Duration};

use anyhow::Result;
use quarry_core::{
    BetHandle, EngineError, Outcome, Payout, PresetBet, EMERGENCY_ROCKS,
};
use rand::Rng;

use super::{Game, GameExit};
use crate::console::{Console, MovePrompt, Reply, Tone};

const HELP: &str = "\
Place one or more bets, then spin. Inside bets (straight, split, street,
corner) pay big; outside bets (red/black, odd/even, low/high) pay 1:1.
Quick bets skip the menus: quick:red 10, quick:red 25%, quick:0 5, or
several at once with quick:red 10;odd 5. h shows recent spins.
Universal commands work too: rocks, stats, color:switch, save, q.";

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

/// One way to bet on the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BetKind {
    Straight(u8),
    Split(u8, u8),
    Street(u8),
    Corner(u8),
    Red,
    Black,
    Odd,
    Even,
    Low,
    High,
}

impl BetKind {
    fn covers(self, winning: u8) -> bool {
        match self {
            BetKind::Straight(n) => n == winning,
            BetKind::Split(a, b) => winning == a || winning == b,
            BetKind::Street(start) => (start..=start + 2).contains(&winning),
            BetKind::Corner(start) => {
                [start, start + 1, start + 3, start + 4].contains(&winning)
            }
            BetKind::Red => RED_NUMBERS.contains(&winning),
            BetKind::Black => winning != 0 && !RED_NUMBERS.contains(&winning),
            BetKind::Odd => winning != 0 && winning % 2 == 1,
            BetKind::Even => winning != 0 && winning % 2 == 0,
            BetKind::Low => (1..=18).contains(&winning),
            BetKind::High => (19..=36).contains(&winning),
        }
    }

    fn payout(self) -> Payout {
        match self {
            BetKind::Straight(_) => Payout::from_odds(35, 1),
            BetKind::Split(..) => Payout::from_odds(17, 1),
            BetKind::Street(_) => Payout::from_odds(11, 1),
            BetKind::Corner(_) => Payout::from_odds(8, 1),
            _ => Payout::EVEN,
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::Straight(n) => write!(f, "Straight Up bet on {n}"),
            BetKind::Split(a, b) => write!(f, "Split bet on {a} and {b}"),
            BetKind::Street(s) => write!(f, "Street bet on {s}, {}, and {}", s + 1, s + 2),
            BetKind::Corner(s) => {
                write!(f, "Corner bet on {s}, {}, {}, and {}", s + 1, s + 3, s + 4)
            }
            BetKind::Red => f.write_str("Red bet"),
            BetKind::Black => f.write_str("Black bet"),
            BetKind::Odd => f.write_str("Odd bet"),
            BetKind::Even => f.write_str("Even bet"),
            BetKind::Low => f.write_str("Low (1-18) bet"),
            BetKind::High => f.write_str("High (19-36) bet"),
        }
    }
}

fn color_name(number: u8) -> &'static str {
    if number == 0 {
        "GREEN"
    } else if RED_NUMBERS.contains(&number) {
        "RED"
    } else {
        "BLACK"
    }
}

/// Preset names accepted in quick bets: outside bets plus bare numbers.
fn preset_kind(preset: &str) -> Option<BetKind> {
    match preset {
        "red" => Some(BetKind::Red),
        "black" => Some(BetKind::Black),
        "odd" => Some(BetKind::Odd),
        "even" => Some(BetKind::Even),
        "low" => Some(BetKind::Low),
        "high" => Some(BetKind::High),
        _ => preset
            .parse::<u8>()
            .ok()
            .filter(|n| *n <= 36)
            .map(BetKind::Straight),
    }
}

fn valid_street_start(n: u8) -> bool {
    n % 3 == 1 && n <= 34
}

fn valid_corner_start(n: u8) -> bool {
    (1..=32).contains(&n) && n % 3 != 0
}

/// A bet on the table, stake already debited.
struct PlacedBet {
    kind: BetKind,
    handle: BetHandle,
}

enum Pick {
    Bet(BetKind),
    Back,
    Quit,
}

enum BetsFlow {
    Placed(Vec<PlacedBet>),
    Quit,
}

enum AmountFlow {
    Rocks(i64),
    Quit,
}

pub struct Roulette;

impl Roulette {
    fn show_rules(&self, console: &Console<'_>) {
        console.blank();
        console.line("Bet on where the ball lands. The wheel has numbers 0-36;");
        console.line("0 is green, the rest are red or black.");
        console.blank();
        console.line("Inside bets: Straight Up 35:1, Split 17:1, Street 11:1, Corner 8:1.");
        console.line("Outside bets: red/black, odd/even, low/high, all 1:1.");
        console.line("If the ball lands on 0, all outside bets lose.");
        console.line("You can place multiple bets in a single round.");
    }

    fn show_board(&self, console: &Console<'_>) {
        console.blank();
        console.line("===== ROULETTE BOARD =====");
        console.line("     [0] (GREEN)");
        console.blank();
        console.line("    1st Column    2nd Column    3rd Column");
        console.line("    -----------  -----------  -----------");
        for row in 0..12u8 {
            let mut line = String::new();
            for col in 0..3u8 {
                let num = 3 * row + col + 1;
                let tag = if RED_NUMBERS.contains(&num) { "RED" } else { "BLK" };
                line.push_str(&format!("    [{num:2}] ({tag})  "));
            }
            console.line(&line);
        }
        console.line("=========================");
    }

    fn show_history(&self, console: &Console<'_>, history: &[u8]) {
        if history.is_empty() {
            console.say(Tone::Muted, "No spins yet this session.");
            return;
        }
        let listed: Vec<String> = history
            .iter()
            .rev()
            .take(10)
            .map(|n| format!("{n} {}", color_name(*n)))
            .collect();
        console.line(&format!("Recent spins (latest first): {}", listed.join(", ")));
    }

    /// The betting menu. Returns the placed bets or the quit signal, with
    /// every open stake refunded on the way out.
    fn place_bets(&self, console: &Console<'_>, history: &[u8]) -> Result<BetsFlow> {
        let session = console.session();
        let mut placed: Vec<PlacedBet> = Vec::new();

        loop {
            console.blank();
            console.say(Tone::Warning, "=== BETTING MENU ===");
            console.line("1. Place Number Bets (straight, split, street, corner)");
            console.line("2. Place Outside Bets (red/black, odd/even, high/low)");
            console.line("3. View Current Bets");
            console.line("4. Finish Betting and Spin the Wheel");
            console.say(
                Tone::Info,
                "Quick betting available: quick:red 10, quick:black 30%, quick:0 5",
            );
            console.say(
                Tone::Info,
                &format!("You have {} Rocks remaining.", session.balance()),
            );

            let prompt = MovePrompt {
                game_id: self.id(),
                prompt: "Enter your choice (1-4) or quick bet command",
                help: HELP,
            };
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.trim() {
                    "1" => {
                        match self.number_bet(console)? {
                            Pick::Bet(kind) => {
                                if !self.stake_from_prompt(console, kind, &mut placed)? {
                                    self.refund_open(console, placed);
                                    return Ok(BetsFlow::Quit);
                                }
                            }
                            Pick::Back => continue,
                            Pick::Quit => {
                                self.refund_open(console, placed);
                                return Ok(BetsFlow::Quit);
                            }
                        }
                    }
                    "2" => {
                        match self.outside_bet(console)? {
                            Pick::Bet(kind) => {
                                if !self.stake_from_prompt(console, kind, &mut placed)? {
                                    self.refund_open(console, placed);
                                    return Ok(BetsFlow::Quit);
                                }
                            }
                            Pick::Back => continue,
                            Pick::Quit => {
                                self.refund_open(console, placed);
                                return Ok(BetsFlow::Quit);
                            }
                        }
                    }
                    "3" => self.show_placed(console, &placed),
                    "4" => {
                        if placed.is_empty() {
                            console.say(
                                Tone::Muted,
                                "You must place at least one bet before spinning.",
                            );
                        } else {
                            return Ok(BetsFlow::Placed(placed));
                        }
                    }
                    _ => console.say(
                        Tone::Muted,
                        "Invalid choice. Please enter a number between 1 and 4.",
                    ),
                },
                Reply::QuickBets(bets) => {
                    if !self.apply_quick_bets(console, bets, &mut placed)? {
                        self.refund_open(console, placed);
                        return Ok(BetsFlow::Quit);
                    }
                }
                Reply::History => self.show_history(console, history),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        self.refund_open(console, placed);
                        return Ok(BetsFlow::Quit);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        self.refund_open(console, placed);
                        return Ok(BetsFlow::Quit);
                    }
                }
            }

            // The table fills up; spin as soon as the last rock is staked.
            if !placed.is_empty() && session.balance() == 0 {
                console.say(Tone::Muted, "You have no more Rocks to bet.");
                return Ok(BetsFlow::Placed(placed));
            }
        }
    }

    fn show_placed(&self, console: &Console<'_>, placed: &[PlacedBet]) {
        if placed.is_empty() {
            console.say(Tone::Muted, "No bets placed yet.");
            return;
        }
        console.line("=== CURRENT BETS ===");
        let mut total = 0u64;
        for (idx, bet) in placed.iter().enumerate() {
            console.line(&format!(
                "{}. {} - {} Rocks",
                idx + 1,
                bet.kind,
                bet.handle.stake()
            ));
            total += bet.handle.stake();
        }
        console.line(&format!("Total bet: {total} Rocks"));
    }

    fn refund_open(&self, console: &Console<'_>, placed: Vec<PlacedBet>) {
        if placed.is_empty() {
            return;
        }
        let session = console.session();
        let mut returned = 0u64;
        for bet in placed {
            returned += session.refund(bet.handle);
        }
        console.say(
            Tone::Info,
            &format!("Open bets returned: +{returned} Rocks, balance {}.", session.balance()),
        );
    }

    /// Prompt for a stake and place the bet. `false` means the player quit.
    fn stake_from_prompt(
        &self,
        console: &Console<'_>,
        kind: BetKind,
        placed: &mut Vec<PlacedBet>,
    ) -> Result<bool> {
        match self.bet_amount(console)? {
            AmountFlow::Rocks(amount) => {
                if let Some(bet) = self.try_place(console, kind, amount) {
                    console.say(
                        Tone::Success,
                        &format!("Bet placed: {} - {} Rocks", bet.kind, bet.handle.stake()),
                    );
                    placed.push(bet);
                }
                Ok(true)
            }
            AmountFlow::Quit => Ok(false),
        }
    }

    fn bet_amount(&self, console: &Console<'_>) -> Result<AmountFlow> {
        let session = console.session();
        loop {
            console.say(
                Tone::Info,
                &format!("You have {} Rocks available.", session.balance()),
            );
            let prompt = MovePrompt {
                game_id: self.id(),
                prompt: "How many Rocks do you want to bet?",
                help: HELP,
            };
            match console.read_move(&prompt)? {
                Reply::Move(text) => match text.parse::<i64>() {
                    Ok(amount) if amount <= 0 => {
                        console.say(Tone::Danger, "Bet amount must be greater than zero.")
                    }
                    Ok(amount) if amount as u64 > session.balance() => console.say(
                        Tone::Danger,
                        &format!("You only have {} Rocks available.", session.balance()),
                    ),
                    Ok(amount) => return Ok(AmountFlow::Rocks(amount)),
                    Err(_) => console.say(Tone::Danger, "Please enter a valid number."),
                },
                Reply::QuickBets(_) => console.say(
                    Tone::Muted,
                    "Place quick bets from the betting menu, not the amount prompt.",
                ),
                Reply::History => console.say(Tone::Muted, "Finish this bet first."),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(AmountFlow::Quit);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(AmountFlow::Quit);
                    }
                }
            }
        }
    }

    fn try_place(
        &self,
        console: &Console<'_>,
        kind: BetKind,
        amount: i64,
    ) -> Option<PlacedBet> {
        match console.session().place_bet(self.id(), amount) {
            Ok(handle) => Some(PlacedBet { kind, handle }),
            Err(EngineError::InsufficientFunds { available, .. }) => {
                console.say(
                    Tone::Danger,
                    &format!("Skipping {kind} - only {available} Rocks available."),
                );
                None
            }
            Err(_) => {
                console.say(Tone::Danger, "Bet amount must be greater than zero.");
                None
            }
        }
    }

    /// Resolve and place quick bets in order. `false` means the player quit
    /// while being prompted for a missing amount.
    fn apply_quick_bets(
        &self,
        console: &Console<'_>,
        bets: Vec<PresetBet>,
        placed: &mut Vec<PlacedBet>,
    ) -> Result<bool> {
        let session = console.session();
        for bet in bets {
            let Some(kind) = preset_kind(&bet.preset) else {
                console.say(
                    Tone::Warning,
                    &format!("Unknown quick bet '{}'; try red, odd, low, or a number.", bet.preset),
                );
                continue;
            };
            let amount = match bet.stake {
                Some(stake) => stake.resolve(session.balance()) as i64,
                None => match self.bet_amount(console)? {
                    AmountFlow::Rocks(amount) => amount,
                    AmountFlow::Quit => return Ok(false),
                },
            };
            if let Some(bet) = self.try_place(console, kind, amount) {
                console.say(
                    Tone::Success,
                    &format!("Quick bet placed: {} - {} Rocks", bet.kind, bet.handle.stake()),
                );
                placed.push(bet);
            }
        }
        Ok(true)
    }

    fn number_bet(&self, console: &Console<'_>) -> Result<Pick> {
        console.blank();
        console.line("=== NUMBER BET OPTIONS ===");
        console.line("1. Straight Up - Bet on a single number (pays 35:1)");
        console.line("2. Split - Bet on two adjacent numbers (pays 17:1)");
        console.line("3. Street - Bet on three numbers in a row (pays 11:1)");
        console.line("4. Corner - Bet on four numbers that form a square (pays 8:1)");
        console.line("5. Return to main betting menu");

        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Enter your choice (1-5)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.trim() {
                    "1" => match self.read_number(console, "Enter a number to bet on (0-36)")? {
                        Some(n) => return Ok(Pick::Bet(BetKind::Straight(n))),
                        None => return Ok(Pick::Quit),
                    },
                    "2" => {
                        self.show_board(console);
                        console.line("For a Split bet, enter two adjacent numbers.");
                        loop {
                            let first =
                                match self.read_number(console, "Enter first number (0-36)")? {
                                    Some(n) => n,
                                    None => return Ok(Pick::Quit),
                                };
                            let second =
                                match self.read_number(console, "Enter second number (0-36)")? {
                                    Some(n) => n,
                                    None => return Ok(Pick::Quit),
                                };
                            let gap = first.abs_diff(second);
                            if gap == 1 || gap == 3 {
                                return Ok(Pick::Bet(BetKind::Split(first, second)));
                            }
                            console.say(
                                Tone::Muted,
                                "The numbers must be adjacent on the roulette board.",
                            );
                        }
                    }
                    "3" => {
                        self.show_board(console);
                        console.line("For a Street bet, enter the first number in a row of three.");
                        console.line("Valid starting numbers: 1, 4, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34");
                        loop {
                            match self.read_number(console, "Enter the starting number")? {
                                Some(n) if valid_street_start(n) => {
                                    return Ok(Pick::Bet(BetKind::Street(n)))
                                }
                                Some(_) => console.say(
                                    Tone::Muted,
                                    "Please enter a valid starting number for a street bet.",
                                ),
                                None => return Ok(Pick::Quit),
                            }
                        }
                    }
                    "4" => {
                        self.show_board(console);
                        console.line("For a Corner bet, enter the smallest number in a square of four.");
                        console.line("Valid starting numbers run 1-32, skipping the third column.");
                        loop {
                            match self.read_number(console, "Enter the starting number")? {
                                Some(n) if valid_corner_start(n) => {
                                    return Ok(Pick::Bet(BetKind::Corner(n)))
                                }
                                Some(_) => console.say(
                                    Tone::Muted,
                                    "Please enter a valid starting number for a corner bet.",
                                ),
                                None => return Ok(Pick::Quit),
                            }
                        }
                    }
                    "5" => return Ok(Pick::Back),
                    _ => console.say(
                        Tone::Muted,
                        "Invalid choice. Please enter a number between 1 and 5.",
                    ),
                },
                Reply::History => console.say(Tone::Muted, "Pick a bet first."),
                Reply::QuickBets(_) => console.say(
                    Tone::Muted,
                    "Place quick bets from the betting menu.",
                ),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(Pick::Quit);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(Pick::Quit);
                    }
                }
            }
        }
    }

    fn outside_bet(&self, console: &Console<'_>) -> Result<Pick> {
        console.blank();
        console.line("=== OUTSIDE BET OPTIONS ===");
        console.line("1. Red - Bet on any red number (pays 1:1)");
        console.line("2. Black - Bet on any black number (pays 1:1)");
        console.line("3. Odd - Bet on any odd number (pays 1:1)");
        console.line("4. Even - Bet on any even number (pays 1:1)");
        console.line("5. Low (1-18) - Bet on numbers 1-18 (pays 1:1)");
        console.line("6. High (19-36) - Bet on numbers 19-36 (pays 1:1)");
        console.line("7. Return to main betting menu");

        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Enter your choice (1-7)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.trim() {
                    "1" => return Ok(Pick::Bet(BetKind::Red)),
                    "2" => return Ok(Pick::Bet(BetKind::Black)),
                    "3" => return Ok(Pick::Bet(BetKind::Odd)),
                    "4" => return Ok(Pick::Bet(BetKind::Even)),
                    "5" => return Ok(Pick::Bet(BetKind::Low)),
                    "6" => return Ok(Pick::Bet(BetKind::High)),
                    "7" => return Ok(Pick::Back),
                    _ => console.say(
                        Tone::Muted,
                        "Invalid choice. Please enter a number between 1 and 7.",
                    ),
                },
                Reply::History => console.say(Tone::Muted, "Pick a bet first."),
                Reply::QuickBets(_) => console.say(
                    Tone::Muted,
                    "Place quick bets from the betting menu.",
                ),
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(Pick::Quit);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(Pick::Quit);
                    }
                }
            }
        }
    }

    /// Read one wheel number. `None` means the player quit.
    fn read_number(&self, console: &Console<'_>, label: &str) -> Result<Option<u8>> {
        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: label,
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(text) => match text.parse::<u8>() {
                    Ok(n) if n <= 36 => return Ok(Some(n)),
                    _ => console.say(Tone::Muted, "Please enter a number between 0 and 36."),
                },
                Reply::History => console.say(Tone::Muted, "Finish this bet first."),
                Reply::QuickBets(_) => console.say(
                    Tone::Muted,
                    "Place quick bets from the betting menu.",
                ),
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

    fn spin_wheel(&self, console: &Console<'_>) -> u8 {
        console.blank();
        console.line("The wheel is spinning...");
        for n in (1..=3).rev() {
            console.line(&format!("{n}..."));
            thread::sleep(Duration::from_millis(500));
        }
        let winning = rand::thread_rng().gen_range(0..=36u8);
        let announcement = format!("The ball lands on: {winning} {}", color_name(winning));
        match color_name(winning) {
            "RED" => console.say(Tone::Danger, &announcement),
            "GREEN" => console.say(Tone::Success, &announcement),
            _ => console.line(&announcement),
        }
        winning
    }

    fn settle_bets(&self, console: &Console<'_>, placed: Vec<PlacedBet>, winning: u8) -> i64 {
        let session = console.session();
        let mut net: i64 = 0;
        for bet in placed {
            let stake = bet.handle.stake();
            if bet.kind.covers(winning) {
                let credited = session.settle(bet.handle, bet.kind.payout());
                net += credited as i64 - stake as i64;
                console.say(
                    Tone::Success,
                    &format!(
                        "WIN! {} - Won {credited} Rocks (Bet: {stake}, Payout: {})",
                        bet.kind,
                        credited - stake
                    ),
                );
            } else {
                session.settle(bet.handle, Payout::LOSS);
                net -= stake as i64;
                console.say(Tone::Danger, &format!("LOSS! {} - Lost {stake} Rocks", bet.kind));
            }
        }
        net
    }
}

impl Game for Roulette {
    fn id(&self) -> &'static str {
        "roulette"
    }

    fn title(&self) -> &'static str {
        "Roulette"
    }

    fn tagline(&self) -> &'static str {
        "Bet your Rocks on the spinning wheel"
    }

    fn play(&self, console: &Console<'_>) -> Result<GameExit> {
        let session = console.session();
        console.blank();
        console.say(Tone::Accent, "=== Welcome to Roulette! ===");
        self.show_rules(console);

        let mut history: Vec<u8> = Vec::new();
        loop {
            console.blank();
            console.say(
                Tone::Info,
                &format!("You have {} Rocks.", session.balance()),
            );
            if session.emergency_rocks(self.id()).is_some() {
                console.say(Tone::Danger, "You're out of Rocks!");
                console.say(
                    Tone::Success,
                    &format!("Here's an emergency {EMERGENCY_ROCKS} Rocks to keep playing."),
                );
            }
            self.show_board(console);

            let before = session.balance();
            let placed = match self.place_bets(console, &history)? {
                BetsFlow::Placed(placed) => placed,
                BetsFlow::Quit => return Ok(GameExit::Quit),
            };

            let winning = self.spin_wheel(console);
            history.push(winning);
            if history.len() > 50 {
                history.remove(0);
            }

            console.blank();
            let net = self.settle_bets(console, placed, winning);
            debug_assert_eq!(session.balance() as i64, before as i64 + net);
            console.line(&format!("Result: {winning} {}", color_name(winning)));
            match net {
                n if n > 0 => {
                    console.say(
                        Tone::Success,
                        &format!("Congratulations! You won a total of {n} Rocks!"),
                    );
                    let record = session.record_outcome(self.id(), Outcome::Win);
                    console.announce_bonus(&record);
                    console.say(
                        Tone::Info,
                        &format!("Current win streak: {}", record.game_streak),
                    );
                }
                n if n < 0 => {
                    console.say(
                        Tone::Danger,
                        &format!("Too bad! You lost a total of {} Rocks.", -n),
                    );
                    session.record_outcome(self.id(), Outcome::Loss);
                }
                _ => {
                    console.line("You broke even - no Rocks gained or lost.");
                    session.record_outcome(self.id(), Outcome::Push);
                }
            }
            console.say(
                Tone::Info,
                &format!("New balance: {} Rocks", session.balance()),
            );

            if !console.confirm("Do you want to play another round?")? {
                return Ok(GameExit::Menu);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_bets_lose_on_zero() {
        for kind in [
            BetKind::Red,
            BetKind::Black,
            BetKind::Odd,
            BetKind::Even,
            BetKind::Low,
            BetKind::High,
        ] {
            assert!(!kind.covers(0));
        }
        assert!(BetKind::Straight(0).covers(0));
    }

    #[test]
    fn color_properties_follow_the_wheel() {
        assert!(BetKind::Red.covers(1));
        assert!(!BetKind::Red.covers(2));
        assert!(BetKind::Black.covers(2));
        assert!(BetKind::Odd.covers(35));
        assert!(BetKind::Even.covers(36));
        assert!(BetKind::Low.covers(18));
        assert!(!BetKind::Low.covers(19));
        assert!(BetKind::High.covers(19));
    }

    #[test]
    fn inside_bets_cover_their_numbers() {
        assert!(BetKind::Split(8, 9).covers(8));
        assert!(BetKind::Split(8, 9).covers(9));
        assert!(!BetKind::Split(8, 9).covers(10));

        let street = BetKind::Street(4);
        assert!(street.covers(4) && street.covers(5) && street.covers(6));
        assert!(!street.covers(7));

        let corner = BetKind::Corner(7);
        for n in [7, 8, 10, 11] {
            assert!(corner.covers(n));
        }
        assert!(!corner.covers(9));
    }

    #[test]
    fn payouts_match_table_odds() {
        // A 10-rock straight hit returns 360 rocks all told.
        assert_eq!(BetKind::Straight(7).payout().apply(10), 360);
        assert_eq!(BetKind::Split(7, 8).payout().apply(10), 180);
        assert_eq!(BetKind::Street(7).payout().apply(10), 120);
        assert_eq!(BetKind::Corner(7).payout().apply(10), 90);
        assert_eq!(BetKind::Red.payout().apply(10), 20);
    }

    #[test]
    fn quick_bet_presets_map_to_bets() {
        assert_eq!(preset_kind("red"), Some(BetKind::Red));
        assert_eq!(preset_kind("high"), Some(BetKind::High));
        assert_eq!(preset_kind("0"), Some(BetKind::Straight(0)));
        assert_eq!(preset_kind("17"), Some(BetKind::Straight(17)));
        assert_eq!(preset_kind("37"), None);
        assert_eq!(preset_kind("pebbles"), None);
    }

    #[test]
    fn street_and_corner_starts_stay_on_the_board() {
        let streets: Vec<u8> = (0..=36).filter(|n| valid_street_start(*n)).collect();
        assert_eq!(streets, vec![1, 4, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34]);

        // Corners need the full square on the board, so 34 is out.
        assert!(valid_corner_start(32));
        assert!(!valid_corner_start(34));
        assert!(!valid_corner_start(33));
        assert!(!valid_corner_start(0));
    }
}
