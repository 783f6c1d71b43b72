//! Item template loader.

use std::path::Path;

use game_core::{ItemCatalog, ItemTemplate};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, ensure_unique_ids, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFile {
    pub items: Vec<ItemTemplate>,
}

/// Loader for material display templates from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load item templates from a RON file into an [`ItemCatalog`].
    pub fn load(path: &Path) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        let file: ItemFile = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse item catalog RON: {}", e))?;

        ensure_unique_ids("item", file.items.iter().map(|item| item.id.as_str()))?;

        Ok(file.items.into_iter().collect())
    }
}
