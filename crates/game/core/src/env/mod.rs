//! Traits describing read-only game data.
//!
//! Oracles expose reward rates, item display templates and randomness. The
//! [`Env`] aggregate bundles them so the engines can reach everything they
//! need without hard coupling to concrete implementations.
mod items;
mod rewards;
mod rng;

pub use items::{ItemCatalog, ItemOracle, ItemTemplate};
pub use rewards::{MaterialRate, RewardOracle, RewardRow, RewardTable};
pub use rng::{FixedRng, PcgRng, RngOracle, compute_seed};

/// Aggregates read-only oracles required by the accrual engine.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    rewards: &'a dyn RewardOracle,
    rng: &'a dyn RngOracle,
}

impl<'a> Env<'a> {
    pub fn new(rewards: &'a dyn RewardOracle, rng: &'a dyn RngOracle) -> Self {
        Self { rewards, rng }
    }

    pub fn rewards(&self) -> &'a dyn RewardOracle {
        self.rewards
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}

impl core::fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Env").finish_non_exhaustive()
    }
}
