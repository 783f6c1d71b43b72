//! Content loaders for reading game data from files.
//!
//! Each loader turns one RON/TOML file into the game-core type (or oracle)
//! that consumes it. [`ContentFactory`] wires them to a data directory.

pub mod config;
pub mod factory;
pub mod item;
pub mod player;
pub mod rewards;
pub mod skills;
pub mod units;

pub use config::ConfigLoader;
pub use factory::{ContentBundle, ContentFactory, default_data_dir};
pub use item::ItemLoader;
pub use player::{PlayerLoader, PlayerSpec};
pub use rewards::RewardLoader;
pub use skills::SkillLoader;
pub use units::UnitLoader;

use std::collections::BTreeSet;
use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Fails on the first id that appears twice.
pub(crate) fn ensure_unique_ids<'a>(
    kind: &str,
    ids: impl IntoIterator<Item = &'a str>,
) -> LoadResult<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            anyhow::bail!("{} entry with empty id", kind);
        }
        if !seen.insert(id) {
            anyhow::bail!("Duplicate {} id '{}'", kind, id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ensure_unique_ids("skill", ["a", "b", "a"]).unwrap_err();
        assert!(err.to_string().contains("'a'"));
        assert!(ensure_unique_ids("skill", ["a", ""]).is_err());
        assert!(ensure_unique_ids("skill", ["a", "b"]).is_ok());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_file(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.ron"));
    }
}
