use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{HoldemError, HoldemResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_char(c: char) -> HoldemResult<Rank> {
        match c {
            '2' => Ok(Rank::Two),
            '3' => Ok(Rank::Three),
            '4' => Ok(Rank::Four),
            '5' => Ok(Rank::Five),
            '6' => Ok(Rank::Six),
            '7' => Ok(Rank::Seven),
            '8' => Ok(Rank::Eight),
            '9' => Ok(Rank::Nine),
            'T' => Ok(Rank::Ten),
            'J' => Ok(Rank::Jack),
            'Q' => Ok(Rank::Queen),
            'K' => Ok(Rank::King),
            'A' => Ok(Rank::Ace),
            _ => Err(HoldemError::InvalidRank(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }
}

pub const ALL_RANKS: [Rank; 13] = [
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub fn from_char(c: char) -> HoldemResult<Suit> {
        match c {
            's' => Ok(Suit::Spades),
            'h' => Ok(Suit::Hearts),
            'd' => Ok(Suit::Diamonds),
            'c' => Ok(Suit::Clubs),
            _ => Err(HoldemError::InvalidSuit(c)),
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Suit::Spades => 's',
            Suit::Hearts => 'h',
            Suit::Diamonds => 'd',
            Suit::Clubs => 'c',
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "\u{2660}",
            Suit::Hearts => "\u{2665}",
            Suit::Diamonds => "\u{2666}",
            Suit::Clubs => "\u{2663}",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

pub const ALL_SUITS: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

/// A playing card. Equality and hashing use the full identity, ordering
/// looks at the rank only.
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Card {
        Card { rank, suit }
    }

    /// Exact short-name lookup (`"As"`, `"Td"`) against the reference deck.
    pub fn from_short_name(name: &str) -> HoldemResult<Card> {
        CARD_LOOKUP
            .get(name)
            .copied()
            .ok_or_else(|| HoldemError::UnknownCard(name.to_string()))
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Rank as a single hex digit, 0x2 through 0xE.
    pub fn hex_rank(&self) -> u8 {
        self.rank.value()
    }

    /// Position in 0..52, suit-major.
    pub fn index(&self) -> usize {
        self.suit.index() * 13 + (self.rank.value() as usize - 2)
    }

    pub fn mask(&self) -> u64 {
        1u64 << self.index()
    }

    pub fn short_name(&self) -> String {
        self.to_string()
    }

    pub fn pretty(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.to_char())
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank.hash(state);
        self.suit.hash(state);
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

static REFERENCE_DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    ALL_SUITS
        .iter()
        .flat_map(|&s| ALL_RANKS.iter().map(move |&r| Card::new(r, s)))
        .collect()
});

static CARD_LOOKUP: Lazy<HashMap<String, Card>> = Lazy::new(|| {
    REFERENCE_DECK
        .iter()
        .map(|c| (c.short_name(), *c))
        .collect()
});

/// The 52 cards in reference order, built once per process.
pub fn reference_deck() -> &'static [Card] {
    &REFERENCE_DECK
}

#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Full reference deck minus `exclude`, unshuffled.
    pub fn new(exclude: Option<&[Card]>) -> Deck {
        Deck::from_cards(reference_deck(), exclude.unwrap_or_default())
    }

    /// Deck built from an existing card pool, dropping `exclude` by identity.
    pub fn from_cards(cards: &[Card], exclude: &[Card]) -> Deck {
        let excluded = card_mask(exclude);
        let cards = cards
            .iter()
            .copied()
            .filter(|c| excluded & c.mask() == 0)
            .collect();
        Deck { cards }
    }

    pub fn shuffle(&mut self) -> &mut Self {
        let mut rng = thread_rng();
        self.shuffle_with(&mut rng)
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &mut Self {
        self.cards.shuffle(rng);
        self
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> HoldemResult<Card> {
        self.cards.pop().ok_or(HoldemError::EmptyDeck)
    }

    pub fn burn(&mut self) -> HoldemResult<()> {
        self.draw().map(|_| ())
    }

    pub fn deal(&mut self, n: usize) -> HoldemResult<Vec<Card>> {
        if n > self.cards.len() {
            return Err(HoldemError::EmptyDeck);
        }
        let at = self.cards.len() - n;
        let mut dealt = self.cards.split_off(at);
        dealt.reverse();
        Ok(dealt)
    }

    /// Restores every reference card, in reference order.
    pub fn reset(&mut self) {
        self.cards = reference_deck().to_vec();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards.contains(card)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

pub fn card_mask(cards: &[Card]) -> u64 {
    cards.iter().fold(0u64, |m, c| m | c.mask())
}

/// Fails with `DuplicateCard` on the first card seen twice.
pub fn ensure_distinct(cards: &[Card]) -> HoldemResult<u64> {
    let mut mask = 0u64;
    for c in cards {
        if mask & c.mask() != 0 {
            return Err(HoldemError::DuplicateCard(c.short_name()));
        }
        mask |= c.mask();
    }
    Ok(mask)
}

/// Suit-blind canonical encoding: hex rank digits in ascending order packed
/// four bits apiece. Ranks are never zero, so the digit count is implied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankKey(pub u32);

impl RankKey {
    pub fn from_values(values: &[u8]) -> RankKey {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        RankKey(sorted.iter().fold(0u32, |k, &v| (k << 4) | v as u32))
    }

    /// Rank values, ascending.
    pub fn values(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(7);
        let mut k = self.0;
        while k != 0 {
            out.push((k & 0xF) as u8);
            k >>= 4;
        }
        out.reverse();
        out
    }

    pub fn len(&self) -> usize {
        (32 - self.0.leading_zeros() as usize).div_ceil(4)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0)
    }
}

pub fn rank_key(cards: &[Card]) -> RankKey {
    let values: Vec<u8> = cards.iter().map(|c| c.hex_rank()).collect();
    RankKey::from_values(&values)
}

/// Cache key for a card set. Suit-aware only when a flush is still reachable,
/// so hands differing only in suit share an entry otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandKey {
    Ranks(RankKey),
    Cards(u64),
}

pub fn hand_key(cards: &[Card], flush_possible: bool) -> HandKey {
    if flush_possible {
        HandKey::Cards(card_mask(cards))
    } else {
        HandKey::Ranks(rank_key(cards))
    }
}

/// Whether `known` plus `to_come` further cards can still hold five of a suit.
pub fn flush_possible(known: &[Card], to_come: usize) -> bool {
    let mut counts = [0usize; 4];
    for c in known {
        counts[c.suit.index()] += 1;
    }
    counts.iter().any(|&n| n + to_come >= 5)
}

/// Parses a run of short names, ignoring whitespace and commas.
pub fn parse_cards(notation: &str) -> HoldemResult<Vec<Card>> {
    let compact: String = notation
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let chars: Vec<char> = compact.chars().collect();
    if chars.len() % 2 != 0 {
        return Err(HoldemError::UnknownCard(compact));
    }
    chars
        .chunks(2)
        .map(|pair| Card::from_short_name(&pair.iter().collect::<String>()))
        .collect()
}

pub fn short_names(cards: &[Card]) -> Vec<String> {
    cards.iter().map(|c| c.short_name()).collect()
}
