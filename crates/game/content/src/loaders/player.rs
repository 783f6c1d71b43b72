//! Starting player loader.

use std::path::Path;

use game_core::{GearCapabilities, PlayerState, SkillDefinition};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Starting player structure for RON files.
///
/// Skills are referenced by id and resolved against the skill book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub stats: PlayerState,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub overflow_to_shield: bool,
}

pub struct PlayerLoader;

impl PlayerLoader {
    pub fn load(path: &Path, skill_book: &[SkillDefinition]) -> LoadResult<PlayerState> {
        let content = read_file(path)?;
        Self::parse(&content, skill_book)
    }

    pub fn parse(content: &str, skill_book: &[SkillDefinition]) -> LoadResult<PlayerState> {
        let spec: PlayerSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse player RON: {}", e))?;

        let mut player = spec.stats;
        if player.max_hp == 0 {
            anyhow::bail!("Player '{}' must have positive max_hp", player.name);
        }
        player.hp = player.hp.min(player.max_hp);

        player.skills = spec
            .skills
            .iter()
            .map(|id| {
                skill_book
                    .iter()
                    .find(|skill| &skill.id == id)
                    .cloned()
                    .ok_or_else(|| anyhow::anyhow!("Player references unknown skill '{}'", id))
            })
            .collect::<LoadResult<_>>()?;

        if spec.overflow_to_shield {
            player.capabilities |= GearCapabilities::OVERFLOW_TO_SHIELD;
        }

        Ok(player)
    }
}
