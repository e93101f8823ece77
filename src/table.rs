//! Betting-round state machine for one table.
//!
//! A hand runs PreFlop -> Flop -> Turn -> River -> Showdown -> Rake, then the
//! table resets for the next hand. Each round ends when its action queue
//! drains. All actions go through [`Table::apply`], which checks turn order,
//! dispatches on the [`Action`], then does the queue bookkeeping.

use std::collections::VecDeque;
use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::{short_names, Deck};
use crate::config::TableConfig;
use crate::error::{HoldemError, HoldemResult};
use crate::hand_evaluator::{evaluate_hand, HandResult};
pub use crate::player::{Player, PlayerId};
use crate::snapshot::WinningHand;

/// Seats that still leave enough cards for burns and a full board.
pub const MAX_SEATS: usize = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Round {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Rake,
}

impl Round {
    pub fn next(self) -> Round {
        match self {
            Round::PreFlop => Round::Flop,
            Round::Flop => Round::Turn,
            Round::Turn => Round::River,
            Round::River => Round::Showdown,
            Round::Showdown => Round::Rake,
            Round::Rake => Round::PreFlop,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Round::PreFlop => write!(f, "Preflop"),
            Round::Flop => write!(f, "Flop"),
            Round::Turn => write!(f, "Turn"),
            Round::River => write!(f, "River"),
            Round::Showdown => write!(f, "Showdown"),
            Round::Rake => write!(f, "Rake"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Check,
    /// Raise the required bet to this total for the round.
    Bet(u32),
    Call,
    Fold,
    AllIn,
    ShowHand,
}

impl Action {
    pub fn letter(&self) -> char {
        match self {
            Action::Check => 'C',
            Action::Bet(_) => 'B',
            Action::Call => 'K',
            Action::Fold => 'F',
            Action::AllIn => 'A',
            Action::ShowHand => 'S',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: PlayerId,
    pub round: Round,
    pub action: Action,
    /// Chips moved into the pot by the action.
    pub amount: u32,
}

/// Outcome of a finished hand, kept after the table resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSummary {
    pub winner: PlayerId,
    pub winner_name: String,
    pub pot: u32,
    /// `None` when everyone else folded.
    pub winning_hand: Option<WinningHand>,
    pub actions: Vec<ActionRecord>,
}

enum QueueEffect {
    Pop,
    Reopen,
}

pub struct Table {
    config: TableConfig,
    deck: Deck,
    board: Board,
    players: Vec<Player>,
    next_id: u32,
    dealer: usize,
    queue: VecDeque<PlayerId>,
    pot: u32,
    required_bet: u32,
    required_raise: u32,
    round: Round,
    in_hand: bool,
    winner: Option<PlayerId>,
    winning_hand: Option<HandResult>,
    history: Vec<ActionRecord>,
    last_result: Option<HandSummary>,
    rng: StdRng,
}

impl Table {
    pub fn new(config: TableConfig) -> HoldemResult<Table> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut table = Table {
            config,
            deck: Deck::new(None),
            board: Board::new(),
            players: Vec::new(),
            next_id: 0,
            dealer: 0,
            queue: VecDeque::new(),
            pot: 0,
            required_bet: 0,
            required_raise: 0,
            round: Round::PreFlop,
            in_hand: false,
            winner: None,
            winning_hand: None,
            history: Vec::new(),
            last_result: None,
            rng,
        };
        table.deck.shuffle_with(&mut table.rng);
        Ok(table)
    }

    // ------------------------------------------------------------------
    // Seating
    // ------------------------------------------------------------------

    pub fn add_player(&mut self, name: &str) -> HoldemResult<PlayerId> {
        let balance = self.config.starting_balance;
        self.add_player_with_balance(name, balance)
    }

    pub fn add_player_with_balance(&mut self, name: &str, balance: u32) -> HoldemResult<PlayerId> {
        if self.in_hand {
            return Err(HoldemError::HandInProgress);
        }
        if self.players.len() >= MAX_SEATS {
            return Err(HoldemError::TableFull(MAX_SEATS));
        }
        let id = PlayerId(self.next_id);
        self.next_id += 1;
        self.players.push(Player::new(id, name, balance));
        Ok(id)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> HoldemResult<Player> {
        if self.in_hand {
            return Err(HoldemError::HandInProgress);
        }
        let seat = self.seat_of(id)?;
        let player = self.players.remove(seat);
        if !self.players.is_empty() {
            self.dealer %= self.players.len();
        }
        Ok(player)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> HoldemResult<&Player> {
        Ok(&self.players[self.seat_of(id)?])
    }

    pub fn seat_of(&self, id: PlayerId) -> HoldemResult<usize> {
        self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or(HoldemError::UnknownPlayer(id))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn deck_remaining(&self) -> usize {
        self.deck.len()
    }

    pub fn dealer(&self) -> usize {
        self.dealer
    }

    pub fn queue(&self) -> Vec<PlayerId> {
        self.queue.iter().copied().collect()
    }

    pub fn to_act(&self) -> Option<PlayerId> {
        self.queue.front().copied()
    }

    pub fn pot(&self) -> u32 {
        self.pot
    }

    pub fn required_bet(&self) -> u32 {
        self.required_bet
    }

    pub fn required_raise(&self) -> u32 {
        self.required_raise
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn in_hand(&self) -> bool {
        self.in_hand
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn winning_hand(&self) -> Option<&HandResult> {
        self.winning_hand.as_ref()
    }

    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    pub fn last_result(&self) -> Option<&HandSummary> {
        self.last_result.as_ref()
    }

    // ------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------

    pub fn check(&mut self, id: PlayerId) -> HoldemResult<()> {
        self.apply(id, Action::Check)
    }

    pub fn bet(&mut self, id: PlayerId, amount: u32) -> HoldemResult<()> {
        self.apply(id, Action::Bet(amount))
    }

    pub fn call(&mut self, id: PlayerId) -> HoldemResult<()> {
        self.apply(id, Action::Call)
    }

    pub fn fold(&mut self, id: PlayerId) -> HoldemResult<()> {
        self.apply(id, Action::Fold)
    }

    pub fn all_in(&mut self, id: PlayerId) -> HoldemResult<()> {
        self.apply(id, Action::AllIn)
    }

    pub fn show_hand(&mut self, id: PlayerId) -> HoldemResult<()> {
        self.apply(id, Action::ShowHand)
    }

    /// Validates and applies one action for the player at the head of the
    /// queue. A rejected action leaves the table untouched.
    pub fn apply(&mut self, id: PlayerId, action: Action) -> HoldemResult<()> {
        let head = *self.queue.front().ok_or(HoldemError::NoPendingAction)?;
        if head != id {
            return Err(HoldemError::OutOfTurn {
                expected: head,
                actual: id,
            });
        }
        let seat = self.seat_of(id)?;
        let starting_balance = self.players[seat].balance();

        let (amount, effect) = match action {
            Action::Check => self.handle_check(seat)?,
            Action::Bet(total) => self.handle_bet(seat, total)?,
            Action::Call => self.handle_call(seat)?,
            Action::Fold => self.handle_fold(seat),
            Action::AllIn => self.handle_all_in(seat)?,
            Action::ShowHand => self.handle_show_hand(seat)?,
        };

        let player = &self.players[seat];
        log::info!(
            "{:<8} : {:<4} -> {:<4} | {} {}",
            player.name(),
            starting_balance,
            player.balance(),
            action.letter(),
            if amount > 0 { amount.to_string() } else { String::new() }
        );
        self.history.push(ActionRecord {
            player: id,
            round: self.round,
            action,
            amount,
        });

        match effect {
            QueueEffect::Pop => {
                self.queue.pop_front();
            }
            QueueEffect::Reopen => {
                self.set_queue(seat, false);
                if self.queue.front() == Some(&id) {
                    self.queue.pop_front();
                }
            }
        }

        if self.live_count() == 1 {
            return self.award_uncontested();
        }
        if self.queue.is_empty() {
            self.advance_round()?;
        }
        Ok(())
    }

    fn ensure_betting_open(&self) -> HoldemResult<()> {
        if self.round == Round::Showdown {
            return Err(HoldemError::BettingClosed);
        }
        Ok(())
    }

    fn handle_check(&mut self, seat: usize) -> HoldemResult<(u32, QueueEffect)> {
        self.ensure_betting_open()?;
        let player = &self.players[seat];
        if player.current_bet() != self.required_bet {
            return Err(HoldemError::CallRequired {
                owed: self.required_bet - player.current_bet(),
            });
        }
        Ok((0, QueueEffect::Pop))
    }

    fn handle_bet(&mut self, seat: usize, total: u32) -> HoldemResult<(u32, QueueEffect)> {
        self.ensure_betting_open()?;
        let minimum = self.required_bet + self.required_raise;
        if total < minimum {
            return Err(HoldemError::RaiseTooSmall {
                amount: total,
                minimum,
            });
        }
        let added = total - self.players[seat].current_bet();
        self.players[seat].commit(added)?;
        self.pot += added;
        self.required_raise = total - self.required_bet;
        self.required_bet = total;
        Ok((added, QueueEffect::Reopen))
    }

    fn handle_call(&mut self, seat: usize) -> HoldemResult<(u32, QueueEffect)> {
        self.ensure_betting_open()?;
        let gap = self.required_bet - self.players[seat].current_bet();
        if gap == 0 {
            return Err(HoldemError::NothingToCall);
        }
        self.players[seat].commit(gap)?;
        self.pot += gap;
        Ok((gap, QueueEffect::Pop))
    }

    fn handle_fold(&mut self, seat: usize) -> (u32, QueueEffect) {
        self.players[seat].fold();
        (0, QueueEffect::Pop)
    }

    fn handle_all_in(&mut self, seat: usize) -> HoldemResult<(u32, QueueEffect)> {
        self.ensure_betting_open()?;
        let amount = self.players[seat].balance();
        self.players[seat].commit(amount)?;
        self.pot += amount;

        let total = self.players[seat].current_bet();
        if total <= self.required_bet {
            return Ok((amount, QueueEffect::Pop));
        }
        let raise = total - self.required_bet;
        if raise >= self.required_raise {
            self.required_raise = raise;
        }
        self.required_bet = total;
        Ok((amount, QueueEffect::Reopen))
    }

    fn handle_show_hand(&mut self, seat: usize) -> HoldemResult<(u32, QueueEffect)> {
        if self.round != Round::Showdown {
            return Err(HoldemError::NotShowdown);
        }
        let player = &self.players[seat];
        let result = evaluate_hand(player.hand(), self.board.cards())?;
        let better = self
            .winning_hand
            .as_ref()
            .map_or(true, |best| result > *best);
        log::info!("{} shows {} {:?}", player.name(), result, short_names(&result.cards));
        if better {
            self.winner = Some(player.id());
            self.winning_hand = Some(result);
        }
        self.players[seat].show();
        Ok((0, QueueEffect::Pop))
    }

    // ------------------------------------------------------------------
    // Game logic
    // ------------------------------------------------------------------

    /// Deals a new hand and opens the preflop round.
    pub fn start_hand(&mut self) -> HoldemResult<()> {
        if self.in_hand {
            return Err(HoldemError::HandInProgress);
        }
        self.players.retain(|p| p.balance() > 0);
        if self.players.len() < 2 {
            return Err(HoldemError::NotEnoughPlayers(self.players.len()));
        }
        self.dealer %= self.players.len();
        self.deck.reset();
        self.deck.shuffle_with(&mut self.rng);
        self.in_hand = true;
        self.round = Round::PreFlop;
        if !self.open_round()? {
            self.advance_round()?;
        }
        Ok(())
    }

    /// Active players in seat order starting at `start`. All-in players only
    /// take part at the showdown.
    fn set_queue(&mut self, start: usize, include_all_in: bool) {
        let n = self.players.len();
        self.queue = (0..n)
            .map(|k| &self.players[(start + k) % n])
            .filter(|p| p.is_active() && (include_all_in || !p.is_all_in()))
            .map(|p| p.id())
            .collect();
    }

    fn live_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    fn deal_board(&mut self, count: usize) -> HoldemResult<()> {
        if self.config.burn_cards {
            self.deck.burn()?;
        }
        for _ in 0..count {
            let card = self.deck.draw()?;
            self.board.place_card(card);
        }
        Ok(())
    }

    fn post_blind(&mut self, seat: usize, blind: u32) -> HoldemResult<()> {
        let player = &mut self.players[seat];
        let amount = blind.min(player.balance());
        if amount < blind {
            log::warn!("{} is short for the {} blind, all-in for {}", player.name(), blind, amount);
        }
        player.commit(amount)?;
        self.pot += amount;
        // a short blind still sets the full price for everyone else
        self.required_bet = self.required_bet.max(blind);
        log::info!("{:<8} : posts {}", player.name(), amount);
        Ok(())
    }

    fn advance_round(&mut self) -> HoldemResult<()> {
        loop {
            log::info!("Pot: ${}", self.pot);
            self.round = self.round.next();
            if self.open_round()? {
                return Ok(());
            }
        }
    }

    /// Sets up the current round. Returns false when nobody has to act and
    /// the hand should move straight on.
    fn open_round(&mut self) -> HoldemResult<bool> {
        self.required_bet = 0;
        self.required_raise = self.config.big_blind();
        for player in &mut self.players {
            player.clear_bet();
        }

        match self.round {
            Round::PreFlop => {
                self.pre_flop()?;
                Ok(!self.queue.is_empty())
            }
            Round::Flop => {
                self.board.reveal();
                log::info!("Flop: {:?}", short_names(self.board.cards()));
                self.set_queue(self.dealer + 1, false);
                Ok(self.queue.len() > 1)
            }
            Round::Turn | Round::River => {
                self.deal_board(1)?;
                log::info!("{}: {:?}", self.round, short_names(self.board.cards()));
                self.set_queue(self.dealer + 1, false);
                Ok(self.queue.len() > 1)
            }
            Round::Showdown => {
                log::info!("Showdown: {:?}", short_names(self.board.cards()));
                self.set_queue(self.dealer + 1, true);
                Ok(!self.queue.is_empty())
            }
            Round::Rake => {
                self.rake()?;
                Ok(true)
            }
        }
    }

    fn pre_flop(&mut self) -> HoldemResult<()> {
        let n = self.players.len();
        for _ in 0..2 {
            for k in 1..=n {
                let card = self.deck.draw()?;
                self.players[(self.dealer + k) % n].receive(card);
            }
        }
        self.deal_board(3)?;

        log::info!("Preflop");
        self.post_blind((self.dealer + 1) % n, self.config.small_blind)?;
        self.post_blind((self.dealer + 2) % n, self.config.big_blind())?;
        self.set_queue(self.dealer + 3, false);
        Ok(())
    }

    fn award_uncontested(&mut self) -> HoldemResult<()> {
        let survivor = self.players.iter().find(|p| p.is_active()).map(|p| p.id());
        // a hand shown by the survivor still counts as the winning hand
        if self.winner != survivor {
            self.winner = survivor;
            self.winning_hand = None;
        }
        self.queue.clear();
        self.round = Round::Rake;
        self.rake()
    }

    fn rake(&mut self) -> HoldemResult<()> {
        let winner = match self.winner {
            Some(id) => id,
            None => self
                .players
                .iter()
                .find(|p| p.is_active())
                .map(|p| p.id())
                .ok_or(HoldemError::NotEnoughPlayers(0))?,
        };
        let seat = self.seat_of(winner)?;
        let pot = self.pot;
        self.players[seat].win(pot);

        let winning_hand = self.winning_hand.as_ref().map(WinningHand::from);
        match &winning_hand {
            Some(hand) => log::info!(
                "The winning player is {}, with a hand of {} {:?}",
                self.players[seat].name(),
                hand.category,
                hand.cards
            ),
            None => log::info!(
                "The winning player is {}, uncontested",
                self.players[seat].name()
            ),
        }
        self.last_result = Some(HandSummary {
            winner,
            winner_name: self.players[seat].name().to_string(),
            pot,
            winning_hand,
            actions: std::mem::take(&mut self.history),
        });
        self.reset();
        Ok(())
    }

    /// Fresh deck and board, busted players out, dealer button moves on.
    fn reset(&mut self) {
        log::info!("Reset");
        self.deck.reset();
        self.deck.shuffle_with(&mut self.rng);
        self.board.clear();
        self.players.retain(|p| p.balance() > 0);
        self.dealer = if self.players.is_empty() {
            0
        } else {
            (self.dealer + 1) % self.players.len()
        };
        self.queue.clear();
        self.pot = 0;
        self.required_bet = 0;
        self.required_raise = 0;
        self.round = Round::PreFlop;
        self.in_hand = false;
        self.winner = None;
        self.winning_hand = None;
        self.history.clear();
        for player in &mut self.players {
            player.reset();
        }
    }
}
