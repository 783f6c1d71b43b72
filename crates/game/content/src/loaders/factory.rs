//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use game_core::{
    GameConfig, ItemCatalog, PlayerState, RewardTable, SkillDefinition, UnitTemplate,
};

use crate::loaders::{
    ConfigLoader, ItemLoader, LoadResult, PlayerLoader, RewardLoader, SkillLoader, UnitLoader,
};

/// Directory of the data set shipped with this crate.
pub fn default_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Everything a session needs, loaded and cross-checked.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub config: GameConfig,
    pub rewards: RewardTable,
    pub items: ItemCatalog,
    pub enemies: Vec<UnitTemplate>,
    pub crew: Vec<UnitTemplate>,
    pub skills: Vec<SkillDefinition>,
    pub player: PlayerState,
}

impl ContentBundle {
    pub fn enemy(&self, enemy_id: &str) -> Option<&UnitTemplate> {
        self.enemies.iter().find(|enemy| enemy.id == enemy_id)
    }

    pub fn bosses(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.enemies.iter().filter(|enemy| enemy.is_boss)
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── rewards.ron
/// ├── items.ron
/// ├── enemies.ron
/// ├── crew.ron
/// ├── skills.ron
/// └── player.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data set shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(default_data_dir())
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load per-source reward rates from `rewards.ron`.
    pub fn load_rewards(&self) -> LoadResult<RewardTable> {
        let path = self.data_dir.join("rewards.ron");
        RewardLoader::load(&path)
    }

    /// Load material display templates from `items.ron`.
    pub fn load_items(&self) -> LoadResult<ItemCatalog> {
        let path = self.data_dir.join("items.ron");
        ItemLoader::load(&path)
    }

    /// Load enemy templates from `enemies.ron`.
    pub fn load_enemies(&self) -> LoadResult<Vec<UnitTemplate>> {
        let path = self.data_dir.join("enemies.ron");
        UnitLoader::load(&path)
    }

    /// Load crew templates from `crew.ron`.
    pub fn load_crew(&self) -> LoadResult<Vec<UnitTemplate>> {
        let path = self.data_dir.join("crew.ron");
        UnitLoader::load(&path)
    }

    /// Load the skill book from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<Vec<SkillDefinition>> {
        let path = self.data_dir.join("skills.ron");
        SkillLoader::load(&path)
    }

    /// Load the starting player from `player.ron`, resolving skill ids.
    pub fn load_player(&self, skill_book: &[SkillDefinition]) -> LoadResult<PlayerState> {
        let path = self.data_dir.join("player.ron");
        PlayerLoader::load(&path, skill_book)
    }

    /// Load every file and check references between them.
    ///
    /// Materials without an item template are allowed; they only lose their
    /// display line.
    pub fn load_all(&self) -> LoadResult<ContentBundle> {
        let config = self.load_config()?;
        let rewards = self.load_rewards()?;
        let items = self.load_items()?;
        let enemies = self.load_enemies()?;
        let crew = self.load_crew()?;
        let skills = self.load_skills()?;
        let player = self.load_player(&skills)?;

        if rewards.is_empty() {
            anyhow::bail!("rewards.ron defines no sources");
        }
        if enemies.is_empty() {
            anyhow::bail!("enemies.ron defines no enemies");
        }
        if let Some(clash) = crew
            .iter()
            .find(|member| enemies.iter().any(|enemy| enemy.id == member.id))
        {
            anyhow::bail!("Unit id '{}' is both crew and enemy", clash.id);
        }

        Ok(ContentBundle {
            config,
            rewards,
            items,
            enemies,
            crew,
            skills,
            player,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
