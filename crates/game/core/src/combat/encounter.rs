//! Team construction from templates.
//!
//! Enemy teams get the primary enemy in slot 0 and 2–3 minions in the back
//! row. Minion stats are fractions of the primary's, rolled once per battle.

use crate::config::{CombatConfig, GameConfig};
use crate::env::{RngOracle, compute_seed};

use super::player::PlayerState;
use super::unit::{CombatUnit, Team, interval_from_speed};

/// Seed contexts for the minion rolls.
const CONTEXT_COUNT: u32 = 0;
const CONTEXT_HP: u32 = 1;
const CONTEXT_ATTACK: u32 = 2;

/// Static stats of an enemy or crew member.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    /// Attacks per second.
    pub speed: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_rate: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_damage: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub guard: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_boss: bool,
}

impl UnitTemplate {
    pub fn to_unit(&self, min_interval_ms: u64) -> CombatUnit {
        CombatUnit {
            id: self.id.clone(),
            name: self.name.clone(),
            hp: self.hp,
            max_hp: self.hp,
            attack: self.attack,
            defense: self.defense,
            attack_interval_ms: interval_from_speed(self.speed, min_interval_ms),
            crit_rate: self.crit_rate,
            crit_damage: self.crit_damage,
            guard: self.guard,
            shield: 0,
            is_primary: false,
            is_boss: self.is_boss,
        }
    }
}

/// Player in slot 0, crew filling the following slots in order.
///
/// Crew beyond the five free slots is left out.
pub fn build_ally_team(player: &PlayerState, crew: &[UnitTemplate], config: &CombatConfig) -> Team {
    let mut team = Team::new();
    team.place(0, player.to_unit(config.min_attack_interval_ms));
    for (slot, member) in (1..GameConfig::TEAM_SIZE).zip(crew) {
        team.place(slot, member.to_unit(config.min_attack_interval_ms));
    }
    team
}

/// Primary enemy in slot 0 plus rolled minions backfilled into slots 3..6.
pub fn build_enemy_team(
    primary: &UnitTemplate,
    config: &CombatConfig,
    rng: &(impl RngOracle + ?Sized),
    seed: u64,
) -> Team {
    let mut team = Team::new();
    team.place(0, primary.to_unit(config.min_attack_interval_ms));

    let minions = &config.minions;
    let back_row = GameConfig::ROW_SIZE..GameConfig::TEAM_SIZE;
    let count = rng
        .range(compute_seed(seed, 0, 0, CONTEXT_COUNT), minions.min_count, minions.max_count)
        .min(back_row.len() as u32);

    for (index, slot) in back_row.take(count as usize).enumerate() {
        let actor = index as u32 + 1;
        let hp_percent = rng.range(
            compute_seed(seed, 0, actor, CONTEXT_HP),
            minions.hp_percent.0,
            minions.hp_percent.1,
        );
        let attack_percent = rng.range(
            compute_seed(seed, 0, actor, CONTEXT_ATTACK),
            minions.attack_percent.0,
            minions.attack_percent.1,
        );

        let hp = scale(primary.hp, hp_percent).max(1);
        let speed = primary.speed * minions.speed_percent as f64 / 100.0;
        team.place(
            slot,
            CombatUnit {
                id: format!("{}_minion_{}", primary.id, actor),
                name: format!("{} Minion", primary.name),
                hp,
                max_hp: hp,
                attack: scale(primary.attack, attack_percent),
                defense: scale(primary.defense, minions.defense_percent),
                attack_interval_ms: interval_from_speed(speed, config.min_attack_interval_ms),
                crit_rate: primary.crit_rate,
                crit_damage: primary.crit_damage,
                guard: primary.guard,
                shield: 0,
                is_primary: false,
                is_boss: false,
            },
        );
    }
    team
}

fn scale(value: u32, percent: u32) -> u32 {
    (value as u64 * percent as u64 / 100).min(u32::MAX as u64) as u32
}
