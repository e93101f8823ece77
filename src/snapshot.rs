use serde::{Deserialize, Serialize};

use crate::cards::short_names;
use crate::error::HoldemResult;
use crate::hand_evaluator::{HandCategory, HandResult};
use crate::player::PlayerId;
use crate::table::{HandSummary, Round, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningHand {
    pub category: HandCategory,
    pub cards: Vec<String>,
}

impl From<&HandResult> for WinningHand {
    fn from(result: &HandResult) -> Self {
        WinningHand {
            category: result.category,
            cards: short_names(&result.cards),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    /// `None` for each card the viewer may not see.
    pub hand: Vec<Option<String>>,
    pub balance: u32,
    pub current_bet: u32,
    /// Chips put in over the whole hand, blinds included.
    pub committed: u32,
    pub active: bool,
    pub all_in: bool,
}

/// Serializable view of a table from one seat, or from above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub board: Vec<Option<String>>,
    pub players: Vec<PlayerView>,
    pub queue: Vec<PlayerId>,
    pub dealer: usize,
    pub pot: u32,
    pub required_bet: u32,
    pub required_raise: u32,
    pub round: Round,
    pub winner: Option<PlayerId>,
    pub winning_hand: Option<WinningHand>,
    pub last_result: Option<HandSummary>,
}

impl TableSnapshot {
    pub fn to_json(&self) -> HoldemResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Table {
    /// What `viewer` may see: their own hole cards and any hand already shown.
    pub fn snapshot(&self, viewer: PlayerId) -> TableSnapshot {
        self.build_snapshot(Some(viewer))
    }

    /// Every card face up, for logging and replays.
    pub fn snapshot_all(&self) -> TableSnapshot {
        self.build_snapshot(None)
    }

    fn build_snapshot(&self, viewer: Option<PlayerId>) -> TableSnapshot {
        let reveal_all = viewer.is_none();
        let players = self
            .players()
            .iter()
            .map(|p| {
                let visible = reveal_all || viewer == Some(p.id()) || p.has_shown();
                PlayerView {
                    id: p.id(),
                    name: p.name().to_string(),
                    hand: p
                        .hand()
                        .iter()
                        .map(|c| visible.then(|| c.short_name()))
                        .collect(),
                    balance: p.balance(),
                    current_bet: p.current_bet(),
                    committed: p.committed(),
                    active: p.is_active(),
                    all_in: p.is_all_in(),
                }
            })
            .collect();

        TableSnapshot {
            board: self.board().display(reveal_all),
            players,
            queue: self.queue(),
            dealer: self.dealer(),
            pot: self.pot(),
            required_bet: self.required_bet(),
            required_raise: self.required_raise(),
            round: self.round(),
            winner: self.winner(),
            winning_hand: self.winning_hand().map(WinningHand::from),
            last_result: self.last_result().cloned(),
        }
    }
}
