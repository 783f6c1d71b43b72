//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing sections and keys fall back to [`GameConfig::default`] values.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a TOML document.
    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &GameConfig) -> LoadResult<()> {
        let accrual = &config.accrual;
        if !(accrual.session_cap_hours > 0.0) {
            anyhow::bail!("accrual.session_cap_hours must be positive");
        }
        if !(accrual.daily_cap_hours > 0.0) {
            anyhow::bail!("accrual.daily_cap_hours must be positive");
        }
        if !(0.0..1.0).contains(&accrual.variance) {
            anyhow::bail!("accrual.variance must be in [0, 1)");
        }
        if accrual.mode_bonus < 1.0 || accrual.boss_bonus_per_kill < 0.0 {
            anyhow::bail!("accrual bonuses must not reduce rewards");
        }

        let combat = &config.combat;
        if !(combat.defense_soft_cap > 0.0) || !(combat.crit_guard_scale > 0.0) {
            anyhow::bail!("combat.defense_soft_cap and crit_guard_scale must be positive");
        }
        if combat.min_attack_interval_ms == 0 || combat.cooldown_tick_ms == 0 {
            anyhow::bail!("combat timer intervals must be non-zero");
        }

        let minions = &combat.minions;
        if minions.min_count > minions.max_count {
            anyhow::bail!("combat.minions.min_count exceeds max_count");
        }
        let back_row = (GameConfig::TEAM_SIZE - GameConfig::ROW_SIZE) as u32;
        if minions.max_count > back_row {
            anyhow::bail!("combat.minions.max_count exceeds the {} back-row slots", back_row);
        }
        if minions.hp_percent.0 > minions.hp_percent.1
            || minions.attack_percent.0 > minions.attack_percent.1
        {
            anyhow::bail!("combat.minions percent ranges must be (low, high)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ConfigLoader::parse("").expect("defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = ConfigLoader::parse(
            r#"
            [accrual]
            session_cap_hours = 4.0

            [combat.minions]
            hp_percent = [10, 15]
            "#,
        )
        .expect("valid");
        assert_eq!(config.accrual.session_cap_hours, 4.0);
        assert_eq!(config.accrual.daily_cap_hours, 24.0);
        assert_eq!(config.combat.minions.hp_percent, (10, 15));
        assert_eq!(config.combat.minions.attack_percent, (30, 50));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ConfigLoader::parse("[accrual]\nvariance = 1.5").is_err());
        assert!(ConfigLoader::parse("[combat]\ncooldown_tick_ms = 0").is_err());
        assert!(ConfigLoader::parse("[combat.minions]\nmax_count = 4").is_err());
        assert!(ConfigLoader::parse("[accrual]\nsession_cap_hours = \"eight\"").is_err());
    }
}
