//! Active skill loader.

use std::path::Path;

use game_core::{SkillDefinition, SkillEffect};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Skill list structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillBook {
    pub skills: Vec<SkillDefinition>,
}

pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SkillDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<SkillDefinition>> {
        let book: SkillBook = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill book RON: {}", e))?;

        ensure_unique_ids("skill", book.skills.iter().map(|skill| skill.id.as_str()))?;
        for skill in &book.skills {
            if skill.cooldown_ms == 0 {
                anyhow::bail!("Skill '{}' must have a non-zero cooldown", skill.id);
            }
            if let SkillEffect::DamagePercent(0) | SkillEffect::HealPercent(0) = skill.effect {
                anyhow::bail!("Skill '{}' has a zero percent effect", skill.id);
            }
        }

        Ok(book.skills)
    }
}
