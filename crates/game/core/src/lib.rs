//! Deterministic idle-game engines shared across hosts.
//!
//! `game-core` defines the two engines that carry real rules, offline
//! [`accrual`] and real-time [`combat`], together with the reward math they
//! share. Nothing here reads a clock, touches the filesystem or spawns tasks:
//! callers pass `now` and an [`env::RngOracle`], which keeps every outcome
//! reproducible for the runtime and for tests.
pub mod accrual;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod rewards;
pub mod time;

pub use accrual::{
    AccrualEngine, AccrualError, AccrualResult, AccrualSave, BossBonusState, ClaimReport,
    CollectConfig, CollectionState, DailyCapState, DailyCapTracker, SettleReport,
};
pub use combat::{
    AttackOutcome, BattleEvent, BattlePhase, BattleReport, Cadence, CombatScheduler, CombatUnit,
    GearCapabilities, PlayerState, Side, SkillCooldownManager, SkillDefinition, SkillEffect,
    SkillError, SkillOutcome, Team, TimerKind, TimerSet, UnitTemplate, attack_order,
    resolve_attack, select_target,
};
pub use config::{AccrualConfig, CombatConfig, GameConfig, MinionConfig};
pub use env::{
    Env, FixedRng, ItemCatalog, ItemOracle, ItemTemplate, MaterialRate, PcgRng, RewardOracle,
    RewardRow, RewardTable, RngOracle, compute_seed,
};
pub use error::{ErrorKind, ErrorSeverity, GameError, OperationReport};
pub use rewards::{
    CollectMode, MaterialLine, MultiplierStack, Reward, RewardMetric, generate_rewards,
    material_lines,
};
pub use time::Timestamp;
