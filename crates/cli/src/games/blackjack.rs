//! Blackjack: beat the dealer to 21, Rocks on the line.

use std::fmt;

use anyhow::Result;
use quarry_core::{
    BetHandle, EngineError, Outcome, Payout, Session, EMERGENCY_ROCKS,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Game, GameExit};
use crate::console::{Console, MovePrompt, QuitChoice, Reply, Tone};

const HELP: &str = "\
Type hit to take a card, s to stand, d to double down when offered.
Since h is the history shortcut everywhere, hit must be spelled out;
in here history redraws the table. Naturals pay 3:2, insurance 2:1.
Universal commands work too: rocks, stats, color:switch, save, q.";

const NUM_DECKS: usize = 6;
const DEALER_STAND: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

const SUITS: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

const RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

const SHOE_SIZE: usize = RANKS.len() * SUITS.len() * NUM_DECKS;

impl Rank {
    /// Face value with aces high; [`hand_value`] flexes them down.
    fn value(self) -> u32 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl Suit {
    fn label(self) -> &'static str {
        match self {
            Suit::Hearts => "Hearts",
            Suit::Diamonds => "Diamonds",
            Suit::Clubs => "Clubs",
            Suit::Spades => "Spades",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Card {
    rank: Rank,
    suit: Suit,
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.rank.label(), self.suit.label())
    }
}

/// Six decks shuffled together, refilled silently if ever run dry mid-hand.
struct Shoe {
    cards: Vec<Card>,
}

impl Shoe {
    fn new() -> Self {
        let mut cards: Vec<Card> = Vec::with_capacity(SHOE_SIZE);
        for _ in 0..NUM_DECKS {
            for rank in RANKS {
                for suit in SUITS {
                    cards.push(Card { rank, suit });
                }
            }
        }
        cards.shuffle(&mut rand::thread_rng());
        Self { cards }
    }

    fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Below a fifth of capacity the shoe is rebuilt before the next round.
    fn needs_shuffle(&self) -> bool {
        self.cards.len() * 5 < SHOE_SIZE
    }

    fn deal(&mut self) -> Card {
        match self.cards.pop() {
            Some(card) => card,
            None => {
                *self = Shoe::new();
                self.cards.pop().expect("fresh shoe is never empty")
            }
        }
    }
}

fn hand_value(cards: &[Card]) -> u32 {
    let mut total: u32 = cards.iter().map(|card| card.rank.value()).sum();
    let mut aces = cards.iter().filter(|card| card.rank == Rank::Ace).count();
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    total
}

/// A two-card 21, paying 3:2.
fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards) == 21
}

fn hand_text(cards: &[Card]) -> String {
    let listed: Vec<String> = cards.iter().map(|card| card.to_string()).collect();
    format!("[{}]", listed.join(", "))
}

/// One player hand with the stake(s) riding on it.
#[derive(Serialize, Deserialize)]
struct HandState {
    cards: Vec<Card>,
    handle: BetHandle,
    /// Second equal stake added by doubling down.
    extra: Option<BetHandle>,
}

impl HandState {
    fn staked(&self) -> u64 {
        self.handle.stake() + self.extra.as_ref().map_or(0, |extra| extra.stake())
    }
}

/// Live round state once the opening deal survived naturals and insurance.
struct Table {
    dealer: Vec<Card>,
    hands: Vec<HandState>,
    active: usize,
    doubled: bool,
}

#[derive(Serialize)]
struct RoundSnapshot<'a> {
    shoe: &'a [Card],
    dealer: &'a [Card],
    hands: &'a [HandState],
    active: usize,
    doubled: bool,
}

#[derive(Deserialize)]
struct SavedRound {
    shoe: Vec<Card>,
    dealer: Vec<Card>,
    hands: Vec<HandState>,
    active: usize,
    doubled: bool,
}

enum Opening {
    Table(Table),
    Settled,
    Quit,
}

enum RoundEnd {
    Finished,
    Quit,
}

pub struct Blackjack;

impl Blackjack {
    fn run(&self, console: &Console<'_>, pending: Option<SavedRound>) -> Result<GameExit> {
        let session = console.session();
        console.blank();
        console.say(Tone::Accent, "=== Welcome to Blackjack! ===");

        let (mut shoe, mut pending_table) = match pending {
            Some(saved) => (
                Shoe::from_cards(saved.shoe),
                Some(Table {
                    dealer: saved.dealer,
                    hands: saved.hands,
                    active: saved.active,
                    doubled: saved.doubled,
                }),
            ),
            None => (Shoe::new(), None),
        };

        loop {
            let flow = match pending_table.take() {
                Some(table) => {
                    console.say(Tone::Info, "Picking up where you left off.");
                    self.run_round(console, &mut shoe, table, true)?
                }
                None => {
                    if shoe.needs_shuffle() {
                        console.say(Tone::Muted, "Deck is getting low. Reshuffling...");
                        shoe = Shoe::new();
                    }
                    if session.emergency_rocks(self.id()).is_some() {
                        console.say(
                            Tone::Success,
                            &format!(
                                "You're out of Rocks! Here's {EMERGENCY_ROCKS} more to keep playing."
                            ),
                        );
                    }
                    match self.open_round(console, &mut shoe)? {
                        Opening::Table(table) => {
                            self.run_round(console, &mut shoe, table, false)?
                        }
                        Opening::Settled => RoundEnd::Finished,
                        Opening::Quit => return Ok(GameExit::Quit),
                    }
                }
            };

            match flow {
                RoundEnd::Quit => return Ok(GameExit::Quit),
                RoundEnd::Finished => {
                    if !console.confirm("Play again?")? {
                        return Ok(GameExit::Menu);
                    }
                }
            }
        }
    }

    /// Bet, deal, and resolve naturals and insurance. Only hands that still
    /// need playing come back as a table.
    fn open_round(&self, console: &Console<'_>, shoe: &mut Shoe) -> Result<Opening> {
        let session = console.session();
        let handle = match self.take_bet(console)? {
            Some(handle) => handle,
            None => return Ok(Opening::Quit),
        };
        let stake = handle.stake();

        let mut player = vec![shoe.deal()];
        let mut dealer = vec![shoe.deal()];
        player.push(shoe.deal());
        dealer.push(shoe.deal());

        console.blank();
        console.line("--- New Round ---");
        console.line(&format!(
            "Your initial hand: {}, value: {}",
            hand_text(&player),
            hand_value(&player)
        ));
        console.line(&format!("Dealer showing: [{}, ?]", dealer[0]));

        let player_natural = is_natural(&player);
        let dealer_natural = is_natural(&dealer);

        // Insurance window: dealer shows an ace and half the stake is coverable.
        if dealer[0].rank == Rank::Ace && stake >= 2 && session.balance() >= stake / 2 {
            match self.offer_insurance(console, stake / 2)? {
                InsuranceFlow::Taken(insurance) => {
                    if dealer_natural {
                        console.say(Tone::Danger, "Dealer has Blackjack!");
                        self.reveal_dealer(console, &dealer);
                        let credited = session.settle(insurance, Payout::from_odds(2, 1));
                        console.say(
                            Tone::Success,
                            &format!("Insurance pays {credited} Rocks!"),
                        );
                        if player_natural {
                            console.line("You also have Blackjack! It's a push on your main bet.");
                            session.settle(handle, Payout::PUSH);
                            session.record_outcome(self.id(), Outcome::Push);
                        } else {
                            console.line("You lose your main bet.");
                            session.settle(handle, Payout::LOSS);
                            session.record_outcome(self.id(), Outcome::Loss);
                        }
                        return Ok(Opening::Settled);
                    }
                    console.line("Dealer doesn't have Blackjack. You lose your insurance bet.");
                    session.settle(insurance, Payout::LOSS);
                }
                InsuranceFlow::Declined => console.line("No insurance taken."),
                InsuranceFlow::Quit => {
                    let returned = session.refund(handle);
                    console.say(
                        Tone::Info,
                        &format!("Your {returned} Rocks stake is returned."),
                    );
                    return Ok(Opening::Quit);
                }
            }
        }

        if player_natural && dealer_natural {
            self.reveal_dealer(console, &dealer);
            console.line("Both player and dealer have Blackjack! It's a push.");
            session.settle(handle, Payout::PUSH);
            session.record_outcome(self.id(), Outcome::Push);
            return Ok(Opening::Settled);
        }
        if player_natural {
            console.say(Tone::Success, "Blackjack! You win 3:2 on your bet!");
            self.reveal_dealer(console, &dealer);
            session.settle(handle, Payout::from_odds(3, 2));
            let record = session.record_outcome(self.id(), Outcome::Win);
            console.announce_bonus(&record);
            return Ok(Opening::Settled);
        }
        if dealer_natural {
            console.say(Tone::Danger, "Dealer has Blackjack! You lose your bet.");
            self.reveal_dealer(console, &dealer);
            session.settle(handle, Payout::LOSS);
            session.record_outcome(self.id(), Outcome::Loss);
            return Ok(Opening::Settled);
        }

        Ok(Opening::Table(Table {
            dealer,
            hands: vec![HandState {
                cards: player,
                handle,
                extra: None,
            }],
            active: 0,
            doubled: false,
        }))
    }

    fn take_bet(&self, console: &Console<'_>) -> Result<Option<BetHandle>> {
        let session = console.session();
        loop {
            console.say(Tone::Info, &format!("You have {} Rocks.", session.balance()));
            let prompt = MovePrompt {
                game_id: self.id(),
                prompt: "How much would you like to bet?",
                help: HELP,
            };
            match console.read_move(&prompt)? {
                Reply::Move(text) => match text.parse::<i64>() {
                    Ok(amount) => match session.place_bet(self.id(), amount) {
                        Ok(handle) => return Ok(Some(handle)),
                        Err(EngineError::InsufficientFunds { available, .. }) => console.say(
                            Tone::Danger,
                            &format!("You don't have enough Rocks. You have {available} Rocks."),
                        ),
                        Err(_) => console
                            .say(Tone::Danger, "Please enter a positive bet amount."),
                    },
                    Err(_) => console.say(Tone::Danger, "Please enter a valid number."),
                },
                Reply::History => console.say(Tone::Muted, "No cards on the table yet."),
                Reply::QuickBets(_) => {
                    console.say(Tone::Muted, "No quick bets at the blackjack table.")
                }
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

    fn offer_insurance(&self, console: &Console<'_>, cost: u64) -> Result<InsuranceFlow> {
        let session = console.session();
        console.blank();
        console.line("Dealer is showing an Ace. Insurance?");
        console.line(&format!("Insurance costs {cost} Rocks (half your bet)."));
        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Take insurance? (y/n)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.to_lowercase().as_str() {
                    "y" | "yes" => match session.place_bet(self.id(), cost as i64) {
                        Ok(insurance) => {
                            console.line(&format!(
                                "Insurance bet placed: {} Rocks",
                                insurance.stake()
                            ));
                            return Ok(InsuranceFlow::Taken(insurance));
                        }
                        Err(_) => {
                            console.say(Tone::Danger, "Not enough Rocks for insurance.");
                            return Ok(InsuranceFlow::Declined);
                        }
                    },
                    "n" | "no" => return Ok(InsuranceFlow::Declined),
                    _ => console.say(Tone::Muted, "Invalid choice. Please enter 'y' or 'n'."),
                },
                Reply::History => console.say(Tone::Muted, "Decide on insurance first."),
                Reply::QuickBets(_) => {
                    console.say(Tone::Muted, "No quick bets at the blackjack table.")
                }
                Reply::Save { and_quit } => {
                    console.save_progress();
                    if and_quit {
                        return Ok(InsuranceFlow::Quit);
                    }
                }
                Reply::Quit => {
                    if console.confirm("Confirm quit?")? {
                        return Ok(InsuranceFlow::Quit);
                    }
                }
            }
        }
    }

    fn reveal_dealer(&self, console: &Console<'_>, dealer: &[Card]) {
        console.line(&format!(
            "Dealer's hand: {}, value: {}",
            hand_text(dealer),
            hand_value(dealer)
        ));
    }

    fn show_table(&self, console: &Console<'_>, table: &Table) {
        for (idx, hand) in table.hands.iter().enumerate() {
            let label = if table.hands.len() > 1 {
                format!("Split Hand {}", idx + 1)
            } else {
                "Your hand".to_string()
            };
            console.line(&format!(
                "{label}: {}, value: {}",
                hand_text(&hand.cards),
                hand_value(&hand.cards)
            ));
        }
        if let Some(upcard) = table.dealer.first() {
            console.line(&format!("Dealer showing: [{upcard}, ?]"));
        }
    }

    fn save_table(&self, console: &Console<'_>, shoe: &Shoe, table: &Table) -> Result<bool> {
        let snapshot = serde_json::to_value(RoundSnapshot {
            shoe: shoe.cards(),
            dealer: &table.dealer,
            hands: &table.hands,
            active: table.active,
            doubled: table.doubled,
        })?;
        match console.session().save_round(self.id(), snapshot) {
            Ok(()) => {
                console.say(Tone::Success, "Hand saved.");
                Ok(true)
            }
            Err(err) => {
                console.say(Tone::Warning, &format!("Saving failed: {err}"));
                Ok(false)
            }
        }
    }

    fn run_round(
        &self,
        console: &Console<'_>,
        shoe: &mut Shoe,
        mut table: Table,
        mut owns_slot: bool,
    ) -> Result<RoundEnd> {
        let session = console.session();

        if let Some(end) = self.offer_split(console, shoe, &mut table, &mut owns_slot)? {
            return Ok(end);
        }

        while table.active < table.hands.len() {
            let split_mode = table.hands.len() > 1;
            if split_mode {
                console.blank();
                console.line(&format!("--- Playing Split Hand {} ---", table.active + 1));
            }

            loop {
                let idx = table.active;
                let value = hand_value(&table.hands[idx].cards);
                let label = if split_mode {
                    format!("Split Hand {}", idx + 1)
                } else {
                    "Your hand".to_string()
                };
                console.line(&format!(
                    "{label}: {}, value: {value}",
                    hand_text(&table.hands[idx].cards)
                ));

                if value > 21 {
                    if split_mode {
                        console.say(
                            Tone::Danger,
                            &format!("Split hand {} busts with {value}!", idx + 1),
                        );
                        break;
                    }
                    let doubled_msg = if table.doubled { " doubled" } else { "" };
                    console.say(
                        Tone::Danger,
                        &format!("Bust! You lose your{doubled_msg} bet."),
                    );
                    let hand = table.hands.remove(0);
                    self.settle_hand(session, hand, Payout::LOSS);
                    session.record_outcome(self.id(), Outcome::Loss);
                    if owns_slot {
                        session.discard_round()?;
                    }
                    return Ok(RoundEnd::Finished);
                }

                let can_double = !split_mode
                    && table.hands[idx].cards.len() == 2
                    && table.hands[idx].extra.is_none()
                    && session.balance() >= table.hands[idx].handle.stake();
                let question = if can_double {
                    "Hit, Stand, or Double Down? (hit/s/d)"
                } else {
                    "Hit or Stand? (hit/s)"
                };
                let prompt = MovePrompt {
                    game_id: self.id(),
                    prompt: question,
                    help: HELP,
                };
                match console.read_move(&prompt)? {
                    Reply::Move(choice) => match choice.to_lowercase().as_str() {
                        "hit" => {
                            let card = shoe.deal();
                            table.hands[idx].cards.push(card);
                        }
                        "s" | "stand" => break,
                        "d" | "double" if can_double => {
                            let stake = table.hands[idx].handle.stake();
                            match session.place_bet(self.id(), stake as i64) {
                                Ok(extra) => {
                                    console.say(
                                        Tone::Accent,
                                        &format!("Doubling down! Additional bet: {stake} Rocks"),
                                    );
                                    table.hands[idx].extra = Some(extra);
                                    table.doubled = true;
                                    let card = shoe.deal();
                                    table.hands[idx].cards.push(card);
                                    let value = hand_value(&table.hands[idx].cards);
                                    console.line(&format!(
                                        "Your hand after doubling down: {}, value: {value}",
                                        hand_text(&table.hands[idx].cards)
                                    ));
                                    if value > 21 {
                                        console.say(
                                            Tone::Danger,
                                            "Bust! You lose your doubled bet.",
                                        );
                                        let hand = table.hands.remove(0);
                                        self.settle_hand(session, hand, Payout::LOSS);
                                        session.record_outcome(self.id(), Outcome::Loss);
                                        if owns_slot {
                                            session.discard_round()?;
                                        }
                                        return Ok(RoundEnd::Finished);
                                    }
                                    break;
                                }
                                Err(_) => console.say(
                                    Tone::Danger,
                                    "Not enough Rocks to double down.",
                                ),
                            }
                        }
                        _ => {
                            let expected = if can_double { "'hit', 's', or 'd'" } else { "'hit' or 's'" };
                            console.say(
                                Tone::Muted,
                                &format!("Invalid choice. Please enter {expected}."),
                            );
                        }
                    },
                    Reply::History => self.show_table(console, &table),
                    Reply::QuickBets(_) => {
                        console.say(Tone::Muted, "No quick bets at the blackjack table.")
                    }
                    Reply::Save { and_quit } => {
                        if self.save_table(console, shoe, &table)? {
                            owns_slot = true;
                            if and_quit {
                                return Ok(RoundEnd::Quit);
                            }
                        }
                    }
                    Reply::Quit => match console.quit_round_dialog()? {
                        QuitChoice::SaveAndQuit => {
                            if self.save_table(console, shoe, &table)? {
                                return Ok(RoundEnd::Quit);
                            }
                        }
                        QuitChoice::Abandon => {
                            console.say(Tone::Danger, "Hand forfeited; your stake is lost.");
                            for hand in table.hands.drain(..) {
                                self.settle_hand(session, hand, Payout::LOSS);
                            }
                            session.record_outcome(self.id(), Outcome::Loss);
                            if owns_slot {
                                session.discard_round()?;
                            }
                            return Ok(RoundEnd::Quit);
                        }
                        QuitChoice::Cancel => {}
                    },
                }
            }

            table.active += 1;
        }

        // Dealer plays out, then every surviving hand is compared against it.
        console.blank();
        console.line("--- Dealer's Turn ---");
        self.reveal_dealer(console, &table.dealer);
        while hand_value(&table.dealer) < DEALER_STAND {
            console.line("Dealer hits.");
            let card = shoe.deal();
            table.dealer.push(card);
            self.reveal_dealer(console, &table.dealer);
        }
        let dealer_value = hand_value(&table.dealer);

        let outcome = if table.hands.len() > 1 {
            self.settle_split(console, table, dealer_value)
        } else {
            self.settle_single(console, table, dealer_value)
        };
        let record = session.record_outcome(self.id(), outcome);
        if outcome == Outcome::Win {
            console.announce_bonus(&record);
        }
        if owns_slot {
            session.discard_round()?;
        }
        Ok(RoundEnd::Finished)
    }

    /// One optional split of a fresh pair into two evenly staked hands.
    /// Save and quit work here too; the pre-split table is a full snapshot.
    fn offer_split(
        &self,
        console: &Console<'_>,
        shoe: &mut Shoe,
        table: &mut Table,
        owns_slot: &mut bool,
    ) -> Result<Option<RoundEnd>> {
        let session = console.session();
        if table.hands.len() != 1 || table.hands[0].cards.len() != 2 {
            return Ok(None);
        }
        let (first, second) = (table.hands[0].cards[0], table.hands[0].cards[1]);
        let stake = table.hands[0].handle.stake();
        if first.rank != second.rank || session.balance() < stake {
            return Ok(None);
        }

        console.blank();
        console.line("You have a pair. Would you like to split?");
        let prompt = MovePrompt {
            game_id: self.id(),
            prompt: "Split your hand? (y/n)",
            help: HELP,
        };
        loop {
            match console.read_move(&prompt)? {
                Reply::Move(choice) => match choice.to_lowercase().as_str() {
                    "y" | "yes" => match session.place_bet(self.id(), stake as i64) {
                        Ok(second_handle) => {
                            console.line(&format!(
                                "Split your hand. Using another {stake} Rocks for the second hand."
                            ));
                            table.hands[0].cards = vec![first, shoe.deal()];
                            table.hands.push(HandState {
                                cards: vec![second, shoe.deal()],
                                handle: second_handle,
                                extra: None,
                            });
                            return Ok(None);
                        }
                        Err(_) => {
                            console.say(Tone::Danger, "Not enough Rocks to split.");
                            return Ok(None);
                        }
                    },
                    "n" | "no" => {
                        console.line("You chose not to split.");
                        return Ok(None);
                    }
                    _ => console.say(Tone::Muted, "Invalid choice. Please enter 'y' or 'n'."),
                },
                Reply::History => self.show_table(console, table),
                Reply::QuickBets(_) => {
                    console.say(Tone::Muted, "No quick bets at the blackjack table.")
                }
                Reply::Save { and_quit } => {
                    if self.save_table(console, shoe, table)? {
                        *owns_slot = true;
                        if and_quit {
                            return Ok(Some(RoundEnd::Quit));
                        }
                    }
                }
                Reply::Quit => match console.quit_round_dialog()? {
                    QuitChoice::SaveAndQuit => {
                        if self.save_table(console, shoe, table)? {
                            return Ok(Some(RoundEnd::Quit));
                        }
                    }
                    QuitChoice::Abandon => {
                        console.say(Tone::Danger, "Hand forfeited; your stake is lost.");
                        for hand in table.hands.drain(..) {
                            self.settle_hand(session, hand, Payout::LOSS);
                        }
                        session.record_outcome(self.id(), Outcome::Loss);
                        if *owns_slot {
                            session.discard_round()?;
                        }
                        return Ok(Some(RoundEnd::Quit));
                    }
                    QuitChoice::Cancel => {}
                },
            }
        }
    }

    fn settle_single(
        &self,
        console: &Console<'_>,
        mut table: Table,
        dealer_value: u32,
    ) -> Outcome {
        let session = console.session();
        let hand = table.hands.remove(0);
        let player_value = hand_value(&hand.cards);
        let doubled_msg = if table.doubled { " (doubled)" } else { "" };

        console.blank();
        console.line("--- Final Hands ---");
        console.line(&format!(
            "Your hand: {}, value: {player_value}",
            hand_text(&hand.cards)
        ));
        console.line(&format!(
            "Dealer's hand: {}, value: {dealer_value}",
            hand_text(&table.dealer)
        ));

        let (payout, outcome) = if dealer_value > 21 {
            console.say(
                Tone::Success,
                &format!("Dealer busts! You win your bet{doubled_msg}!"),
            );
            (Payout::EVEN, Outcome::Win)
        } else if dealer_value > player_value {
            console.say(
                Tone::Danger,
                &format!("Dealer wins. You lose your bet{doubled_msg}."),
            );
            (Payout::LOSS, Outcome::Loss)
        } else if dealer_value < player_value {
            console.say(
                Tone::Success,
                &format!("You win! You win your bet{doubled_msg}!"),
            );
            (Payout::EVEN, Outcome::Win)
        } else {
            console.line(&format!("It's a push. Your bet{doubled_msg} is returned."));
            (Payout::PUSH, Outcome::Push)
        };
        self.settle_hand(session, hand, payout);
        outcome
    }

    fn settle_split(
        &self,
        console: &Console<'_>,
        mut table: Table,
        dealer_value: u32,
    ) -> Outcome {
        let session = console.session();
        let mut credited_total: u64 = 0;
        let mut staked_total: u64 = 0;

        for (idx, hand) in table.hands.drain(..).enumerate() {
            let value = hand_value(&hand.cards);
            staked_total += hand.staked();

            console.blank();
            console.line(&format!("--- Result for Split Hand {} ---", idx + 1));
            console.line(&format!(
                "Your hand: {}, value: {value}",
                hand_text(&hand.cards)
            ));
            console.line(&format!("Dealer's hand value: {dealer_value}"));

            let payout = if value > 21 {
                console.say(Tone::Danger, &format!("Split hand {} busted. Bet lost.", idx + 1));
                Payout::LOSS
            } else if dealer_value > 21 {
                console.say(
                    Tone::Success,
                    &format!("Dealer busts! Split hand {} wins!", idx + 1),
                );
                Payout::EVEN
            } else if value > dealer_value {
                console.say(Tone::Success, &format!("Split hand {} wins!", idx + 1));
                Payout::EVEN
            } else if value < dealer_value {
                console.say(Tone::Danger, &format!("Split hand {} loses.", idx + 1));
                Payout::LOSS
            } else {
                console.line(&format!("Split hand {} pushes.", idx + 1));
                Payout::PUSH
            };
            credited_total += self.settle_hand(session, hand, payout);
        }

        console.line(&format!(
            "Total winnings from split hands: {credited_total} Rocks"
        ));
        let net = credited_total as i64 - staked_total as i64;
        if net > 0 {
            Outcome::Win
        } else if net < 0 {
            Outcome::Loss
        } else {
            Outcome::Push
        }
    }

    fn settle_hand(&self, session: &Session, hand: HandState, payout: Payout) -> u64 {
        let mut credited = session.settle(hand.handle, payout);
        if let Some(extra) = hand.extra {
            credited += session.settle(extra, payout);
        }
        credited
    }
}

enum InsuranceFlow {
    Taken(BetHandle),
    Declined,
    Quit,
}

impl Game for Blackjack {
    fn id(&self) -> &'static str {
        "blackjack"
    }

    fn title(&self) -> &'static str {
        "Blackjack"
    }

    fn tagline(&self) -> &'static str {
        "Beat the dealer to 21"
    }

    fn play(&self, console: &Console<'_>) -> Result<GameExit> {
        self.run(console, None)
    }

    fn resume(&self, console: &Console<'_>, state: Value) -> Result<GameExit> {
        match serde_json::from_value::<SavedRound>(state) {
            Ok(saved) => self.run(console, Some(saved)),
            Err(err) => {
                console.say(
                    Tone::Warning,
                    &format!("The saved hand could not be read ({err}); starting fresh."),
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
    use quarry_core::ProfileStore;
    use tempfile::tempdir;

    fn card(rank: Rank) -> Card {
        Card {
            rank,
            suit: Suit::Spades,
        }
    }

    #[test]
    fn aces_flex_down_to_avoid_busting() {
        assert_eq!(hand_value(&[card(Rank::Ace), card(Rank::King)]), 21);
        assert_eq!(
            hand_value(&[card(Rank::Ace), card(Rank::Five), card(Rank::Ten)]),
            16
        );
        assert_eq!(hand_value(&[card(Rank::Ace), card(Rank::Ace)]), 12);
        assert_eq!(
            hand_value(&[card(Rank::Ace), card(Rank::Ace), card(Rank::Nine)]),
            21
        );
    }

    #[test]
    fn naturals_need_exactly_two_cards() {
        assert!(is_natural(&[card(Rank::Ace), card(Rank::Queen)]));
        assert!(!is_natural(&[
            card(Rank::Seven),
            card(Rank::Seven),
            card(Rank::Seven)
        ]));
        assert!(!is_natural(&[card(Rank::Ten), card(Rank::Nine)]));
    }

    #[test]
    fn shoe_holds_six_full_decks() {
        let shoe = Shoe::new();
        assert_eq!(shoe.cards().len(), 312);
        let aces = shoe
            .cards()
            .iter()
            .filter(|card| card.rank == Rank::Ace)
            .count();
        assert_eq!(aces, 24);
    }

    #[test]
    fn shoe_reshuffles_below_a_fifth() {
        let mut shoe = Shoe::new();
        assert!(!shoe.needs_shuffle());
        for _ in 0..249 {
            shoe.deal();
        }
        // 63 cards left is still above the line, 62 is below it.
        assert!(!shoe.needs_shuffle());
        shoe.deal();
        assert!(shoe.needs_shuffle());
    }

    #[test]
    fn natural_payout_floors_odd_stakes() {
        assert_eq!(Payout::from_odds(3, 2).apply(10), 25);
        assert_eq!(Payout::from_odds(3, 2).apply(5), 12);
    }

    #[test]
    fn saved_hands_round_trip_with_their_stakes() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = ProfileStore::new(dir.path().join("profile.json"));
        let session = quarry_core::Session::open(store)?;
        let handle = session.place_bet("blackjack", 20)?;

        let mut shoe = Shoe::new();
        let table = Table {
            dealer: vec![shoe.deal(), shoe.deal()],
            hands: vec![HandState {
                cards: vec![shoe.deal(), shoe.deal()],
                handle,
                extra: None,
            }],
            active: 0,
            doubled: false,
        };
        let snapshot = serde_json::to_value(RoundSnapshot {
            shoe: shoe.cards(),
            dealer: &table.dealer,
            hands: &table.hands,
            active: table.active,
            doubled: table.doubled,
        })?;

        let saved: SavedRound = serde_json::from_value(snapshot)?;
        assert_eq!(saved.shoe.len(), 312 - 4);
        assert_eq!(saved.hands.len(), 1);
        assert_eq!(saved.hands[0].handle.stake(), 20);
        assert_eq!(saved.hands[0].cards, table.hands[0].cards);

        // The restored stake settles against the live ledger like any bet.
        let saved_hand = saved.hands.into_iter().next().unwrap();
        session.settle(saved_hand.handle, Payout::EVEN);
        assert_eq!(session.balance(), 120);
        Ok(())
    }
}
