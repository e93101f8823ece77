use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{ensure_distinct, rank_key, Card, RankKey, ALL_SUITS};
use crate::error::{HoldemError, HoldemResult};
use crate::hand_tables::{tables, HandPattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HandCategory {
    HighCard = 1,
    OnePair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

impl HandCategory {
    pub fn value(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::ThreeOfAKind => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::FourOfAKind => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
            HandCategory::RoyalFlush => write!(f, "Royal Flush"),
        }
    }
}

/// Best five-card hand out of a 5, 6 or 7 card set.
///
/// `cards` are in tie-break order (largest group first, then rank) and
/// `kickers` holds their rank values in the same order, with the ace of a
/// wheel counted as 1. Comparison looks at the category, then the kickers.
#[derive(Debug, Clone)]
pub struct HandResult {
    pub category: HandCategory,
    pub kickers: Vec<u8>,
    pub cards: Vec<Card>,
}

impl HandResult {
    pub fn new(category: HandCategory, cards: Vec<Card>) -> Self {
        let wheel = matches!(
            category,
            HandCategory::Straight | HandCategory::StraightFlush
        ) && cards.first().map(|c| c.value()) == Some(5);
        let kickers = cards
            .iter()
            .map(|c| if wheel && c.value() == 14 { 1 } else { c.value() })
            .collect();
        HandResult {
            category,
            kickers,
            cards,
        }
    }

    pub fn rank(&self) -> u8 {
        self.category.value()
    }

    /// Allocation-free comparison key, ordered the same way as the result.
    pub fn strength(&self) -> (HandCategory, [u8; 5]) {
        let mut k = [0u8; 5];
        for (slot, v) in k.iter_mut().zip(&self.kickers) {
            *slot = *v;
        }
        (self.category, k)
    }
}

impl fmt::Display for HandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

impl PartialEq for HandResult {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category && self.kickers == other.kickers
    }
}

impl Eq for HandResult {}

impl PartialOrd for HandResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandResult {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.category.cmp(&other.category) {
            Ordering::Equal => self.kickers.cmp(&other.kickers),
            ord => ord,
        }
    }
}

fn lookup(cards: &[Card], key: RankKey) -> HoldemResult<HandPattern> {
    tables().get(cards.len(), key).ok_or_else(|| {
        log::error!("no {}-card table entry for {}", cards.len(), key);
        HoldemError::UnrecognizedEncoding(key.to_string())
    })
}

/// Cards of the first suit holding at least five members, kept in input order.
fn flush_cards(sorted: &[Card]) -> Option<Vec<Card>> {
    ALL_SUITS.iter().find_map(|&suit| {
        let suited: Vec<Card> = sorted.iter().filter(|c| c.suit == suit).copied().collect();
        (suited.len() >= 5).then_some(suited)
    })
}

/// Pulls the cards named by a table pattern out of the hand, in pattern order.
fn materialize(category: HandCategory, pattern: &[u8; 5], hand: &[Card]) -> HoldemResult<HandResult> {
    let mut pool = hand.to_vec();
    let mut picked = Vec::with_capacity(5);
    for &value in pattern {
        let pos = pool
            .iter()
            .position(|c| c.value() == value)
            .ok_or_else(|| HoldemError::InvalidTable(format!("pattern {:?} not in hand", pattern)))?;
        picked.push(pool.remove(pos));
    }
    Ok(HandResult::new(category, picked))
}

/// Classifies 5 to 7 distinct cards.
pub fn evaluate(cards: &[Card]) -> HoldemResult<HandResult> {
    if !(5..=7).contains(&cards.len()) {
        return Err(HoldemError::InvalidHandSize {
            expected: "5 to 7",
            got: cards.len(),
        });
    }
    ensure_distinct(cards)?;

    let mut hand = cards.to_vec();
    hand.sort();
    let pattern = lookup(&hand, rank_key(&hand))?;

    if pattern.category >= HandCategory::FourOfAKind {
        return materialize(pattern.category, &pattern.best, &hand);
    }

    if let Some(suited) = flush_cards(&hand) {
        if pattern.category == HandCategory::Straight {
            let suited_pattern = lookup(&suited, rank_key(&suited))?;
            if suited_pattern.category == HandCategory::Straight {
                let category = if suited_pattern.best[0] == 14 {
                    HandCategory::RoyalFlush
                } else {
                    HandCategory::StraightFlush
                };
                return materialize(category, &suited_pattern.best, &suited);
            }
        }
        let top: Vec<Card> = suited.iter().rev().take(5).copied().collect();
        return Ok(HandResult::new(HandCategory::Flush, top));
    }

    if pattern.category == HandCategory::HighCard {
        let top: Vec<Card> = hand.iter().rev().take(5).copied().collect();
        return Ok(HandResult::new(HandCategory::HighCard, top));
    }

    materialize(pattern.category, &pattern.best, &hand)
}

pub fn evaluate_hand(hole_cards: &[Card], board: &[Card]) -> HoldemResult<HandResult> {
    let mut all_cards: Vec<Card> = Vec::with_capacity(hole_cards.len() + board.len());
    all_cards.extend_from_slice(hole_cards);
    all_cards.extend_from_slice(board);
    evaluate(&all_cards)
}

pub fn compare_hands(hand1: &[Card], hand2: &[Card], board: &[Card]) -> HoldemResult<Ordering> {
    let r1 = evaluate_hand(hand1, board)?;
    let r2 = evaluate_hand(hand2, board)?;
    Ok(r1.cmp(&r2))
}
