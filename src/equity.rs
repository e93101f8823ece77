use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cards::{ensure_distinct, flush_possible, hand_key, Card, Deck, HandKey};
use crate::config::EquityConfig;
use crate::error::{HoldemError, HoldemResult};
use crate::hand_evaluator::{evaluate_hand, HandCategory};

type Strength = (HandCategory, [u8; 5]);

/// Win/tie/loss counts from an exact enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrengthTally {
    pub wins: u64,
    pub ties: u64,
    pub losses: u64,
}

impl StrengthTally {
    pub fn record(&mut self, ord: Ordering) {
        match ord {
            Ordering::Greater => self.wins += 1,
            Ordering::Equal => self.ties += 1,
            Ordering::Less => self.losses += 1,
        }
    }

    pub fn merge(&mut self, other: &StrengthTally) {
        self.wins += other.wins;
        self.ties += other.ties;
        self.losses += other.losses;
    }

    pub fn total(&self) -> u64 {
        self.wins + self.ties + self.losses
    }

    /// `(wins + ties / 2) / total`, 0 when nothing was counted.
    pub fn equity(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.wins as f64 + 0.5 * self.ties as f64) / total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityResult {
    pub win: f64,
    pub tie: f64,
    pub lose: f64,
    pub scenarios: u64,
}

impl EquityResult {
    pub fn equity(&self) -> f64 {
        self.win + self.tie / 2.0
    }
}

impl From<StrengthTally> for EquityResult {
    fn from(t: StrengthTally) -> Self {
        let total = t.total().max(1) as f64;
        EquityResult {
            win: t.wins as f64 / total,
            tie: t.ties as f64 / total,
            lose: t.losses as f64 / total,
            scenarios: t.total(),
        }
    }
}

impl fmt::Display for EquityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.1}% | Tie {:.1}% | Lose {:.1}% (equity: {:.1}%)",
            self.win * 100.0,
            self.tie * 100.0,
            self.lose * 100.0,
            self.equity() * 100.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Ahead = 0,
    Tied = 1,
    Behind = 2,
}

impl Standing {
    fn of(ord: Ordering) -> Standing {
        match ord {
            Ordering::Greater => Standing::Ahead,
            Ordering::Equal => Standing::Tied,
            Ordering::Less => Standing::Behind,
        }
    }
}

/// Scenario counts indexed by `[standing now][standing at showdown]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandPotential {
    pub cells: [[u64; 3]; 3],
}

impl HandPotential {
    pub fn record(&mut self, now: Standing, last: Standing) {
        self.cells[now as usize][last as usize] += 1;
    }

    pub fn get(&self, now: Standing, last: Standing) -> u64 {
        self.cells[now as usize][last as usize]
    }

    pub fn merge(&mut self, other: &HandPotential) {
        for (row, other_row) in self.cells.iter_mut().zip(&other.cells) {
            for (cell, o) in row.iter_mut().zip(other_row) {
                *cell += o;
            }
        }
    }

    pub fn row_total(&self, now: Standing) -> u64 {
        self.cells[now as usize].iter().sum()
    }

    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Ahead-and-holding plus behind-and-catching-up, ties at half value,
    /// over every scenario counted.
    pub fn equity(&self) -> f64 {
        use Standing::*;
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let good = self.get(Ahead, Ahead) as f64
            + 0.5 * self.get(Ahead, Tied) as f64
            + self.get(Behind, Ahead) as f64
            + 0.5 * self.get(Behind, Tied) as f64;
        good / total as f64
    }

    /// Chance of improving from behind or tied to ahead.
    pub fn positive_potential(&self) -> f64 {
        use Standing::*;
        let denom = self.row_total(Behind) as f64 + 0.5 * self.row_total(Tied) as f64;
        if denom == 0.0 {
            return 0.0;
        }
        (self.get(Behind, Ahead) as f64
            + 0.5 * self.get(Behind, Tied) as f64
            + 0.5 * self.get(Tied, Ahead) as f64)
            / denom
    }

    /// Chance of falling from ahead or tied to behind.
    pub fn negative_potential(&self) -> f64 {
        use Standing::*;
        let denom = self.row_total(Ahead) as f64 + 0.5 * self.row_total(Tied) as f64;
        if denom == 0.0 {
            return 0.0;
        }
        (self.get(Ahead, Behind) as f64
            + 0.5 * self.get(Tied, Behind) as f64
            + 0.5 * self.get(Ahead, Tied) as f64)
            / denom
    }
}

/// Memo of final-hand strengths for one worker.
#[derive(Default)]
struct Memo {
    entries: HashMap<HandKey, Strength>,
    hits: u64,
}

impl Memo {
    fn get_or_eval(&mut self, key: HandKey, hole: &[Card], board: &[Card]) -> HoldemResult<Strength> {
        if let Some(s) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*s);
        }
        let s = evaluate_hand(hole, board)?.strength();
        self.entries.insert(key, s);
        Ok(s)
    }
}

/// Read-only inputs shared by every worker of one potential computation.
struct PotentialJob<'a> {
    hole: &'a [Card],
    board: &'a [Card],
    unseen: &'a [Card],
    lookahead: usize,
    hero_now: Strength,
    hero_flush: bool,
}

impl PotentialJob<'_> {
    fn run(&self, opponents: &[[Card; 2]]) -> HoldemResult<(HandPotential, u64)> {
        let mut potential = HandPotential::default();
        let mut hero_memo = Memo::default();
        let mut villain_memo = Memo::default();
        let mut full_board: Vec<Card> = Vec::with_capacity(5);

        for villain in opponents {
            let now = Standing::of(self.hero_now.cmp(&evaluate_hand(villain, self.board)?.strength()));

            let mut villain_known = villain.to_vec();
            villain_known.extend_from_slice(self.board);
            let villain_flush = flush_possible(&villain_known, self.lookahead);

            let remaining: Vec<Card> = self
                .unseen
                .iter()
                .filter(|c| !villain.contains(c))
                .copied()
                .collect();
            if remaining.len() < self.lookahead {
                return Err(HoldemError::InsufficientUnseenCards {
                    needed: self.lookahead,
                    available: remaining.len(),
                });
            }

            for runout in remaining.iter().copied().combinations(self.lookahead) {
                full_board.clear();
                full_board.extend_from_slice(self.board);
                full_board.extend_from_slice(&runout);

                let hero_last = hero_memo.get_or_eval(
                    hand_key(&runout, self.hero_flush),
                    self.hole,
                    &full_board,
                )?;
                // suit-aware keys embed the villain's cards and never repeat
                let villain_last = if villain_flush {
                    evaluate_hand(villain, &full_board)?.strength()
                } else {
                    let mut key_cards = runout.clone();
                    key_cards.extend_from_slice(villain);
                    villain_memo.get_or_eval(hand_key(&key_cards, false), villain, &full_board)?
                };

                potential.record(now, Standing::of(hero_last.cmp(&villain_last)));
            }
        }
        Ok((potential, hero_memo.hits + villain_memo.hits))
    }
}

fn check_hole(hole: &[Card]) -> HoldemResult<()> {
    if hole.len() != 2 {
        return Err(HoldemError::InvalidHandSize {
            expected: "2",
            got: hole.len(),
        });
    }
    Ok(())
}

fn check_board(board: &[Card], allowed: &[usize], expected: &'static str) -> HoldemResult<()> {
    if !allowed.contains(&board.len()) {
        return Err(HoldemError::InvalidBoardSize {
            expected,
            got: board.len(),
        });
    }
    Ok(())
}

fn known_cards(parts: &[&[Card]]) -> HoldemResult<Vec<Card>> {
    let known: Vec<Card> = parts.iter().flat_map(|p| p.iter().copied()).collect();
    ensure_distinct(&known)?;
    Ok(known)
}

/// Exact strength against every opposing two-card hand.
pub fn hand_strength(hole: &[Card], board: &[Card]) -> HoldemResult<StrengthTally> {
    check_hole(hole)?;
    check_board(board, &[3, 4, 5], "3 to 5")?;
    let known = known_cards(&[hole, board])?;
    let hero = evaluate_hand(hole, board)?.strength();

    let unseen = Deck::new(Some(known.as_slice()));
    if unseen.len() < 2 {
        return Err(HoldemError::InsufficientUnseenCards {
            needed: 2,
            available: unseen.len(),
        });
    }

    let mut tally = StrengthTally::default();
    for (a, b) in unseen.cards().iter().tuple_combinations() {
        let villain = evaluate_hand(&[*a, *b], board)?.strength();
        tally.record(hero.cmp(&villain));
    }
    Ok(tally)
}

/// Equity calculator backed by a dedicated worker pool.
pub struct EquityEstimator {
    config: EquityConfig,
    pool: ThreadPool,
}

impl EquityEstimator {
    pub fn new(config: EquityConfig) -> HoldemResult<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_count())
            .thread_name(|i| format!("equity-{}", i))
            .build()?;
        Ok(EquityEstimator { config, pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn hand_strength(&self, hole: &[Card], board: &[Card]) -> HoldemResult<f64> {
        Ok(hand_strength(hole, board)?.equity())
    }

    /// Full ahead/tied/behind transition matrix for a 3, 4 or 5 card board.
    pub fn potential(&self, hole: &[Card], board: &[Card]) -> HoldemResult<HandPotential> {
        check_hole(hole)?;
        check_board(board, &[3, 4, 5], "3 to 5")?;
        let known = known_cards(&[hole, board])?;
        let lookahead = 5 - board.len();
        let hero_now = evaluate_hand(hole, board)?.strength();

        let unseen: Vec<Card> = Deck::new(Some(known.as_slice())).cards().to_vec();
        if unseen.len() < 2 + lookahead {
            return Err(HoldemError::InsufficientUnseenCards {
                needed: 2 + lookahead,
                available: unseen.len(),
            });
        }

        let mut opponents: Vec<[Card; 2]> = unseen
            .iter()
            .tuple_combinations()
            .map(|(a, b)| [*a, *b])
            .collect();
        if let Some(fraction) = self.config.sample_fraction {
            let keep = ((opponents.len() as f64 * fraction).round() as usize).max(1);
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            opponents = opponents.choose_multiple(&mut rng, keep).copied().collect();
        }

        let job = PotentialJob {
            hole,
            board,
            unseen: &unseen,
            lookahead,
            hero_now,
            hero_flush: flush_possible(&known, lookahead),
        };

        // one contiguous chunk per worker, each with its own matrix and memo
        let chunk = opponents.len().div_ceil(self.workers()).max(1);
        let partials: Vec<(HandPotential, u64)> = self.pool.install(|| {
            opponents
                .par_chunks(chunk)
                .map(|part| job.run(part))
                .collect::<HoldemResult<Vec<_>>>()
        })?;

        let mut total = HandPotential::default();
        let mut hits = 0u64;
        for (partial, h) in &partials {
            total.merge(partial);
            hits += h;
        }
        log::debug!(
            "potential over {} opponent hands in {} chunks: {} scenarios, {} memo hits",
            opponents.len(),
            partials.len(),
            total.total(),
            hits
        );
        Ok(total)
    }

    /// Potential hand strength; a complete board falls back to exact strength.
    pub fn potential_hand_strength(&self, hole: &[Card], board: &[Card]) -> HoldemResult<f64> {
        if board.len() == 5 {
            return self.hand_strength(hole, board);
        }
        check_board(board, &[3, 4], "3 or 4")?;
        Ok(self.potential(hole, board)?.equity())
    }

    /// Exact head-to-head equity over every completion of the board.
    pub fn equity_vs_hand(
        &self,
        hero: &[Card],
        villain: &[Card],
        board: &[Card],
    ) -> HoldemResult<EquityResult> {
        check_hole(hero)?;
        check_hole(villain)?;
        check_board(board, &[0, 3, 4, 5], "0, 3, 4 or 5")?;
        let known = known_cards(&[hero, villain, board])?;
        let remaining: Vec<Card> = Deck::new(Some(known.as_slice())).cards().to_vec();
        let needed = 5 - board.len();
        if remaining.len() < needed {
            return Err(HoldemError::InsufficientUnseenCards {
                needed,
                available: remaining.len(),
            });
        }

        let showdown = |full_board: &[Card]| -> HoldemResult<Ordering> {
            let h = evaluate_hand(hero, full_board)?.strength();
            let v = evaluate_hand(villain, full_board)?.strength();
            Ok(h.cmp(&v))
        };

        if needed == 0 {
            let mut tally = StrengthTally::default();
            tally.record(showdown(board)?);
            return Ok(tally.into());
        }

        // partitioned by the lowest-indexed runout card
        let partials: Vec<StrengthTally> = self.pool.install(|| {
            (0..remaining.len())
                .into_par_iter()
                .map(|first| {
                    let mut tally = StrengthTally::default();
                    let mut full_board: Vec<Card> = Vec::with_capacity(5);
                    let rests: Vec<Vec<Card>> = if needed == 1 {
                        vec![Vec::new()]
                    } else {
                        remaining[first + 1..]
                            .iter()
                            .copied()
                            .combinations(needed - 1)
                            .collect()
                    };
                    for rest in rests {
                        full_board.clear();
                        full_board.extend_from_slice(board);
                        full_board.push(remaining[first]);
                        full_board.extend(rest);
                        tally.record(showdown(&full_board)?);
                    }
                    Ok(tally)
                })
                .collect::<HoldemResult<Vec<_>>>()
        })?;

        let mut tally = StrengthTally::default();
        for p in &partials {
            tally.merge(p);
        }
        Ok(tally.into())
    }
}
