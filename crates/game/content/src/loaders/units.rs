//! Enemy and crew template loader.

use std::path::Path;

use game_core::UnitTemplate;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Unit roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRoster {
    pub units: Vec<UnitTemplate>,
}

/// Loader for unit templates (enemies and crew share the format).
pub struct UnitLoader;

impl UnitLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<UnitTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<UnitTemplate>> {
        let roster: UnitRoster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse unit roster RON: {}", e))?;

        ensure_unique_ids("unit", roster.units.iter().map(|unit| unit.id.as_str()))?;
        for unit in &roster.units {
            if unit.hp == 0 {
                anyhow::bail!("Unit '{}' must have positive hp", unit.id);
            }
            if !unit.speed.is_finite() || unit.speed < 0.0 {
                anyhow::bail!("Unit '{}' has invalid speed: {}", unit.id, unit.speed);
            }
        }

        Ok(roster.units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combat_extras_default() {
        let units = UnitLoader::parse(
            r#"(units: [(id: "rat", name: "Rat", hp: 20, attack: 3, defense: 1, speed: 1.0)])"#,
        )
        .expect("valid");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].guard, None);
        assert!(!units[0].is_boss);
    }

    #[test]
    fn zero_hp_is_rejected() {
        let result = UnitLoader::parse(
            r#"(units: [(id: "ghost", name: "Ghost", hp: 0, attack: 3, defense: 1, speed: 1.0)])"#,
        );
        assert!(result.is_err());
    }
}
