//! File-based SaveRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use super::{
    GameSave, RepositoryError, Result, SaveRepository, decode_save, encode_save, validate_profile,
};

/// File-based implementation of SaveRepository.
///
/// # File Format
///
/// Saves are stored as `{profile}.json`, pretty-printed so they can be
/// inspected by hand. Writes go to a temp file first and are renamed into
/// place, so a crash mid-write leaves the previous save intact.
pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    /// Create a new file-based save repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a save file.
    fn save_path(&self, profile: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", profile))
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, profile: &str, save: &GameSave) -> Result<()> {
        validate_profile(profile)?;
        let path = self.save_path(profile);
        let temp_path = path.with_extension("json.tmp");

        let text = encode_save(save)?;

        fs::write(&temp_path, text).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved profile {} to {}", profile, path.display());

        Ok(())
    }

    fn load(&self, profile: &str) -> Result<Option<GameSave>> {
        validate_profile(profile)?;
        let path = self.save_path(profile);

        if !path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(RepositoryError::Io)?;
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            RepositoryError::CorruptedData(format!("{}: {}", path.display(), e))
        })?;

        tracing::debug!("Loaded profile {} from {}", profile, path.display());

        Ok(Some(decode_save(&value)))
    }

    fn exists(&self, profile: &str) -> bool {
        validate_profile(profile).is_ok() && self.save_path(profile).exists()
    }

    fn delete(&self, profile: &str) -> Result<()> {
        validate_profile(profile)?;
        let path = self.save_path(profile);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted profile {}", profile);
        }

        Ok(())
    }

    fn list_profiles(&self) -> Result<Vec<String>> {
        let mut profiles = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(profile) = filename.strip_suffix(".json")
                && validate_profile(profile).is_ok()
            {
                profiles.push(profile.to_string());
            }
        }

        profiles.sort_unstable();
        Ok(profiles)
    }
}
