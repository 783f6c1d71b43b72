//! Reward data shapes and the hours → reward conversion.
//!
//! - [`Reward`]: gold, exp, enhancement currency and materials
//! - [`CollectMode`]: which metrics a session favours
//! - [`MultiplierStack`]: ordered, auditable multiplier layers
//! - [`generate_rewards`]: the conversion itself, deterministic per seed

mod display;
mod generate;
mod mode;
mod multiplier;
mod reward;

pub use display::{MaterialLine, material_lines};
pub use generate::{fractional_drops, generate_rewards};
pub use mode::CollectMode;
pub use multiplier::{MetricSet, Multiplier, MultiplierSource, MultiplierStack};
pub use reward::{Reward, RewardMetric};
