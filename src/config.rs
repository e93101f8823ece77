use serde::{Deserialize, Serialize};

use crate::error::{HoldemError, HoldemResult};

/// Stakes and dealing options for a [`crate::table::Table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Big blind is always twice this.
    pub small_blind: u32,
    pub starting_balance: u32,
    /// Fixed shuffle seed; entropy when absent.
    pub seed: Option<u64>,
    pub burn_cards: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            small_blind: 5,
            starting_balance: 1000,
            seed: None,
            burn_cards: true,
        }
    }
}

impl TableConfig {
    pub fn from_json(json: &str) -> HoldemResult<TableConfig> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HoldemResult<()> {
        if self.small_blind == 0 {
            return Err(HoldemError::InvalidConfig("small_blind must be positive".into()));
        }
        if self.starting_balance == 0 {
            return Err(HoldemError::InvalidConfig(
                "starting_balance must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn big_blind(&self) -> u32 {
        self.small_blind * 2
    }
}

/// Worker and sampling options for [`crate::equity::EquityEstimator`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    /// Pool size; hardware parallelism when absent.
    pub workers: Option<usize>,
    /// Share of opponent hands to sample, in (0, 1]. Exhaustive when absent.
    pub sample_fraction: Option<f64>,
    pub seed: Option<u64>,
}

impl EquityConfig {
    pub fn from_json(json: &str) -> HoldemResult<EquityConfig> {
        let config: EquityConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> HoldemResult<()> {
        if self.workers == Some(0) {
            return Err(HoldemError::InvalidConfig("workers must be positive".into()));
        }
        if let Some(f) = self.sample_fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err(HoldemError::InvalidConfig(format!(
                    "sample_fraction {} outside (0, 1]",
                    f
                )));
            }
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
