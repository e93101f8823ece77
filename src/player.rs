use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::error::{HoldemError, HoldemResult};

/// Stable handle for a seated player, assigned by the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    hand: Vec<Card>,
    balance: u32,
    /// Chips put in during the current betting round.
    current_bet: u32,
    /// Chips put in during the whole hand.
    committed: u32,
    /// False once folded.
    active: bool,
    all_in: bool,
    shown: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, balance: u32) -> Self {
        Player {
            id,
            name: name.into(),
            hand: Vec::with_capacity(2),
            balance,
            current_bet: 0,
            committed: 0,
            active: true,
            all_in: false,
            shown: false,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }

    pub fn committed(&self) -> u32 {
        self.committed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_all_in(&self) -> bool {
        self.all_in
    }

    pub fn has_shown(&self) -> bool {
        self.shown
    }

    pub fn receive(&mut self, card: Card) {
        self.hand.push(card);
    }

    /// Moves `amount` from the balance into this round's contribution.
    pub fn commit(&mut self, amount: u32) -> HoldemResult<()> {
        if amount > self.balance {
            return Err(HoldemError::InsufficientBalance {
                player: self.id,
                needed: amount,
                balance: self.balance,
            });
        }
        self.balance -= amount;
        self.current_bet += amount;
        self.committed += amount;
        if self.balance == 0 {
            self.all_in = true;
        }
        Ok(())
    }

    pub fn win(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    pub fn fold(&mut self) {
        self.active = false;
    }

    pub fn show(&mut self) {
        self.shown = true;
    }

    pub fn clear_bet(&mut self) {
        self.current_bet = 0;
    }

    /// Clears every per-hand field; the balance carries over.
    pub fn reset(&mut self) {
        self.hand.clear();
        self.current_bet = 0;
        self.committed = 0;
        self.active = true;
        self.all_in = false;
        self.shown = false;
    }
}
