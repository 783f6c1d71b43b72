//! Reward table loader.

use std::path::Path;

use game_core::{RewardRow, RewardTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Reward table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardFile {
    pub sources: Vec<RewardRow>,
}

/// Loader for per-source reward rates from RON files.
pub struct RewardLoader;

impl RewardLoader {
    /// Load a reward table from a RON file.
    pub fn load(path: &Path) -> LoadResult<RewardTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a RON document.
    pub fn parse(content: &str) -> LoadResult<RewardTable> {
        let file: RewardFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse reward table RON: {}", e))?;

        ensure_unique_ids("reward source", file.sources.iter().map(|row| row.id.as_str()))?;
        for row in &file.sources {
            Self::validate(row)?;
        }

        Ok(file.sources.into_iter().collect())
    }

    fn validate(row: &RewardRow) -> LoadResult<()> {
        let rates = [
            ("gold_per_hour", row.gold_per_hour),
            ("exp_per_hour", row.exp_per_hour),
            ("special_currency_per_hour", row.special_currency_per_hour),
        ];
        for (field, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                anyhow::bail!("Source '{}' has invalid {}: {}", row.id, field, rate);
            }
        }
        for material in &row.materials {
            if !material.per_hour.is_finite() || material.per_hour < 0.0 {
                anyhow::bail!(
                    "Source '{}' has invalid rate for material '{}'",
                    row.id,
                    material.item_id
                );
            }
        }
        Ok(())
    }
}
