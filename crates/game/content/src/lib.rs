//! Data-driven content for the idle game.
//!
//! This crate ships the default data set under `data/` and provides loaders
//! for its RON/TOML files:
//! - Reward tables per collection source (RON)
//! - Enemy and crew unit templates (RON)
//! - Active skill definitions and the starting player (RON)
//! - Material display templates (RON)
//! - Game configuration (TOML)
//!
//! Content feeds the runtime oracles and never appears in saved state.
//!
//! All loaders use game-core types directly with serde for RON/TOML deserialization.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentBundle, ContentFactory, ItemLoader, LoadResult, PlayerLoader,
    RewardLoader, SkillLoader, UnitLoader, default_data_dir,
};
