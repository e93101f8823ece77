//! Precomputed category tables keyed by the suit-blind rank encoding.
//!
//! Every multiset of 5, 6 or 7 ranks (at most four of each) is classified
//! once, ignoring suits. Flushes and straight flushes are layered on top by
//! the evaluator.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::cards::RankKey;
use crate::error::{HoldemError, HoldemResult};
use crate::hand_evaluator::HandCategory;

/// Category of a rank multiset plus the five rank values that make it,
/// in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandPattern {
    pub category: HandCategory,
    pub best: [u8; 5],
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandTables {
    five: HashMap<RankKey, HandPattern>,
    six: HashMap<RankKey, HandPattern>,
    seven: HashMap<RankKey, HandPattern>,
}

#[derive(Serialize, Deserialize)]
struct TableFile {
    five: BTreeMap<String, HandPattern>,
    six: BTreeMap<String, HandPattern>,
    seven: BTreeMap<String, HandPattern>,
}

static TABLES: OnceCell<HandTables> = OnceCell::new();

/// Global tables, generated on first use unless a set was installed.
pub fn tables() -> &'static HandTables {
    TABLES.get_or_init(|| {
        log::debug!("generating hand category tables");
        HandTables::generate()
    })
}

pub fn install_tables(tables: HandTables) -> HoldemResult<()> {
    TABLES
        .set(tables)
        .map_err(|_| HoldemError::TablesAlreadyInstalled)
}

/// Reads, validates and installs a persisted table set.
pub fn load_tables<P: AsRef<Path>>(path: P) -> HoldemResult<()> {
    let json = std::fs::read_to_string(path.as_ref())?;
    let loaded = HandTables::from_json(&json)?;
    log::info!("loaded hand tables from {}", path.as_ref().display());
    install_tables(loaded)
}

impl HandTables {
    pub fn generate() -> HandTables {
        let build = |n: usize| -> HashMap<RankKey, HandPattern> {
            rank_multisets(n)
                .iter()
                .map(|counts| (key_of(counts), classify(counts)))
                .collect()
        };
        HandTables {
            five: build(5),
            six: build(6),
            seven: build(7),
        }
    }

    pub fn get(&self, card_count: usize, key: RankKey) -> Option<HandPattern> {
        if key.len() != card_count {
            return None;
        }
        self.by_count(card_count)?.get(&key).copied()
    }

    pub fn len(&self, card_count: usize) -> usize {
        self.by_count(card_count).map_or(0, |t| t.len())
    }

    fn by_count(&self, card_count: usize) -> Option<&HashMap<RankKey, HandPattern>> {
        match card_count {
            5 => Some(&self.five),
            6 => Some(&self.six),
            7 => Some(&self.seven),
            _ => None,
        }
    }

    pub fn to_json(&self) -> HoldemResult<String> {
        let dump = |t: &HashMap<RankKey, HandPattern>| -> BTreeMap<String, HandPattern> {
            t.iter().map(|(k, p)| (k.to_string(), *p)).collect()
        };
        let file = TableFile {
            five: dump(&self.five),
            six: dump(&self.six),
            seven: dump(&self.seven),
        };
        Ok(serde_json::to_string(&file)?)
    }

    pub fn from_json(json: &str) -> HoldemResult<HandTables> {
        let file: TableFile = serde_json::from_str(json)?;
        let parse = |t: BTreeMap<String, HandPattern>| -> HoldemResult<HashMap<RankKey, HandPattern>> {
            t.into_iter()
                .map(|(k, p)| {
                    u32::from_str_radix(&k, 16)
                        .map(|v| (RankKey(v), p))
                        .map_err(|_| HoldemError::InvalidTable(format!("bad key {}", k)))
                })
                .collect()
        };
        let tables = HandTables {
            five: parse(file.five)?,
            six: parse(file.six)?,
            seven: parse(file.seven)?,
        };
        tables.validate()?;
        Ok(tables)
    }

    /// Checks that each table is exhaustive and that every entry agrees with
    /// a fresh classification of its key.
    pub fn validate(&self) -> HoldemResult<()> {
        for n in 5..=7 {
            let table = self
                .by_count(n)
                .ok_or_else(|| HoldemError::InvalidTable(format!("missing {}-card table", n)))?;
            let expected = rank_multisets(n);
            if table.len() != expected.len() {
                return Err(HoldemError::InvalidTable(format!(
                    "{}-card table has {} entries, expected {}",
                    n,
                    table.len(),
                    expected.len()
                )));
            }
            for counts in &expected {
                let key = key_of(counts);
                let found = table.get(&key).ok_or_else(|| {
                    HoldemError::InvalidTable(format!("{}-card table is missing {}", n, key))
                })?;
                if *found != classify(counts) {
                    return Err(HoldemError::InvalidTable(format!(
                        "{}-card entry {} is inconsistent",
                        n, key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// All rank-count vectors (index 0 = deuce) summing to `n` with at most
/// four of any rank.
fn rank_multisets(n: usize) -> Vec<[u8; 13]> {
    fn fill(idx: usize, left: u8, counts: &mut [u8; 13], out: &mut Vec<[u8; 13]>) {
        if idx == 13 {
            if left == 0 {
                out.push(*counts);
            }
            return;
        }
        for take in 0..=left.min(4) {
            counts[idx] = take;
            fill(idx + 1, left - take, counts, out);
        }
        counts[idx] = 0;
    }
    let mut out = Vec::new();
    fill(0, n as u8, &mut [0u8; 13], &mut out);
    out
}

fn key_of(counts: &[u8; 13]) -> RankKey {
    let values: Vec<u8> = counts
        .iter()
        .enumerate()
        .flat_map(|(i, &c)| std::iter::repeat(i as u8 + 2).take(c as usize))
        .collect();
    RankKey::from_values(&values)
}

fn straight_high(counts: &[u8; 13]) -> Option<u8> {
    let has = |v: u8| counts[(v - 2) as usize] > 0;
    (6..=14u8)
        .rev()
        .find(|&high| (high - 4..=high).all(has))
        .or_else(|| [14, 2, 3, 4, 5].iter().all(|&v| has(v)).then_some(5))
}

fn classify(counts: &[u8; 13]) -> HandPattern {
    // (count, rank) by count desc, then rank desc
    let mut groups: Vec<(u8, u8)> = (0..13)
        .rev()
        .filter(|&i| counts[i] > 0)
        .map(|i| (counts[i], i as u8 + 2))
        .collect();
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let kickers_after = |skip: usize, take: usize| -> Vec<u8> {
        let mut rest: Vec<u8> = groups[skip..].iter().map(|g| g.1).collect();
        rest.sort_unstable_by(|a, b| b.cmp(a));
        rest.truncate(take);
        rest
    };
    let pattern = |category: HandCategory, values: Vec<u8>| {
        let mut best = [0u8; 5];
        best.copy_from_slice(&values[..5]);
        HandPattern { category, best }
    };

    let (top_count, top) = groups[0];

    if top_count == 4 {
        let mut v = vec![top; 4];
        v.extend(kickers_after(1, 1));
        return pattern(HandCategory::FourOfAKind, v);
    }

    if top_count == 3 {
        let pair = groups[1..].iter().filter(|g| g.0 >= 2).map(|g| g.1).max();
        if let Some(pair) = pair {
            return pattern(HandCategory::FullHouse, vec![top, top, top, pair, pair]);
        }
    }

    if let Some(high) = straight_high(counts) {
        let v = if high == 5 {
            vec![5, 4, 3, 2, 14]
        } else {
            (high - 4..=high).rev().collect()
        };
        return pattern(HandCategory::Straight, v);
    }

    if top_count == 3 {
        let mut v = vec![top; 3];
        v.extend(kickers_after(1, 2));
        return pattern(HandCategory::ThreeOfAKind, v);
    }

    if top_count == 2 && groups[1].0 == 2 {
        let low = groups[1].1;
        let mut v = vec![top, top, low, low];
        v.extend(kickers_after(2, 1));
        return pattern(HandCategory::TwoPair, v);
    }

    if top_count == 2 {
        let mut v = vec![top, top];
        v.extend(kickers_after(1, 3));
        return pattern(HandCategory::OnePair, v);
    }

    pattern(HandCategory::HighCard, kickers_after(0, 5))
}
