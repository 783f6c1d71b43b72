//! Real-time team combat.
//!
//! Two six-slot teams trade blows on per-side cadences until one side is
//! wiped or the player escapes.
//!
//! # Architecture
//!
//! - **Pure resolution**: [`targeting`] and [`damage`] are side-effect free
//!   apart from the units handed to them
//! - **State machine**: [`CombatScheduler`] owns the teams for one battle and
//!   borrows the persistent [`PlayerState`]
//! - **Skills**: [`SkillCooldownManager`] gates equipped skills per tick
//!
//! Randomness comes in as an [`RngOracle`](crate::env::RngOracle) plus a seed,
//! so a battle replays exactly for the same inputs.

pub mod damage;
pub mod encounter;
pub mod events;
pub mod player;
pub mod scheduler;
pub mod skills;
pub mod targeting;
pub mod unit;

pub use damage::{
    AttackOutcome, crit_chance, crit_damage, effective_defense, mitigate, resolve_attack,
};
pub use encounter::{UnitTemplate, build_ally_team, build_enemy_team};
pub use events::{BattleEvent, BattlePhase, BattleReport, Side};
pub use player::{GearCapabilities, OffenseTraits, PLAYER_UNIT_ID, PlayerState};
pub use scheduler::{Cadence, CombatScheduler, TimerKind, TimerSet};
pub use skills::{
    SkillCooldown, SkillCooldownManager, SkillDefinition, SkillEffect, SkillError, SkillOutcome,
};
pub use targeting::{attack_order, select_target};
pub use unit::{CombatUnit, FALLBACK_INTERVAL_MS, Team, interval_from_speed};
