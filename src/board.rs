use crate::cards::Card;

/// Community cards. The flop is dealt face down with the hole cards and
/// turned over when the flop round opens.
#[derive(Debug, Clone, Default)]
pub struct Board {
    cards: Vec<Card>,
    revealed: bool,
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    pub fn place_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Short names, or `None` for every card still face down.
    pub fn display(&self, reveal_all: bool) -> Vec<Option<String>> {
        self.cards
            .iter()
            .map(|c| (self.revealed || reveal_all).then(|| c.short_name()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.revealed = false;
    }
}
