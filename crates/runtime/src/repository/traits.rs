//! Repository contract for saving and loading player progress.

use super::{GameSave, Result};

/// Repository for save persistence, one save per profile.
///
/// This is for DYNAMIC data that changes during play: the accrual session,
/// daily cap usage, defeated bosses and the player's stats. Static content
/// lives in `game-content`.
pub trait SaveRepository: Send + Sync {
    /// Store `save` for `profile`, replacing any previous one.
    fn save(&self, profile: &str, save: &GameSave) -> Result<()>;

    /// Load the save for `profile`.
    ///
    /// Missing or malformed fields come back as defaults; only a document
    /// that is not JSON at all is an error.
    fn load(&self, profile: &str) -> Result<Option<GameSave>>;

    fn exists(&self, profile: &str) -> bool;

    fn delete(&self, profile: &str) -> Result<()>;

    /// List all profiles that have a save
    fn list_profiles(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}
