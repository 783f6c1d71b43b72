//! Repository layer for player progress.
//!
//! Repositories handle data that CHANGES during play (the save document).
//! Static game content (reward tables, enemies, skills) comes from
//! `game-content`, not from here.

mod codec;
mod error;
mod file;
mod memory;
mod traits;

pub use codec::{GameSave, SAVE_VERSION, decode_save, encode_save};
pub use error::{RepositoryError, Result};
pub use file::FileSaveRepository;
pub use memory::InMemorySaveRepo;
pub use traits::SaveRepository;

/// Profile names become file names, so keep them to a safe alphabet.
pub(crate) fn validate_profile(profile: &str) -> Result<()> {
    let valid = !profile.is_empty()
        && profile
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidProfile(profile.to_string()))
    }
}
