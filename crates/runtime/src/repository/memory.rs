//! In-memory SaveRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use super::{GameSave, RepositoryError, Result, SaveRepository, validate_profile};

/// In-memory implementation of SaveRepository.
pub struct InMemorySaveRepo {
    saves: RwLock<HashMap<String, GameSave>>,
}

impl InMemorySaveRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            saves: RwLock::new(HashMap::new()),
        }
    }

    /// Create with an existing save for `profile`.
    pub fn with_save(profile: &str, save: GameSave) -> Self {
        let mut saves = HashMap::new();
        saves.insert(profile.to_string(), save);
        Self {
            saves: RwLock::new(saves),
        }
    }
}

impl Default for InMemorySaveRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SaveRepository for InMemorySaveRepo {
    fn save(&self, profile: &str, save: &GameSave) -> Result<()> {
        validate_profile(profile)?;
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.insert(profile.to_string(), save.clone());
        Ok(())
    }

    fn load(&self, profile: &str) -> Result<Option<GameSave>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(saves.get(profile).cloned())
    }

    fn exists(&self, profile: &str) -> bool {
        self.saves
            .read()
            .map(|saves| saves.contains_key(profile))
            .unwrap_or(false)
    }

    fn delete(&self, profile: &str) -> Result<()> {
        let mut saves = self
            .saves
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        saves.remove(profile);
        Ok(())
    }

    fn list_profiles(&self) -> Result<Vec<String>> {
        let saves = self
            .saves
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut profiles: Vec<String> = saves.keys().cloned().collect();
        profiles.sort_unstable();
        Ok(profiles)
    }
}
