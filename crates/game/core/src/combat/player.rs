use bitflags::bitflags;

use super::skills::SkillDefinition;
use super::unit::{CombatUnit, interval_from_speed};

/// Unit id used for the player's slot.
pub const PLAYER_UNIT_ID: &str = "player";

bitflags! {
    /// Capabilities granted by equipped gear.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct GearCapabilities: u8 {
        /// Life steal beyond max hp turns into shield.
        const OVERFLOW_TO_SHIELD = 1 << 0;
    }
}

/// Offensive extras only the primary player carries.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct OffenseTraits {
    pub penetration_percent: f64,
    pub penetration_flat: f64,
    pub life_steal_percent: f64,
    pub capabilities: GearCapabilities,
}

/// Persistent player stats.
///
/// A battle borrows this mutably for its whole duration; hp and shield
/// changes land here directly and outlive the battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerState {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    /// Attacks per second.
    pub attack_speed: f64,
    pub crit_rate: u32,
    pub crit_damage: u32,
    pub guard: Option<u32>,
    pub shield: u32,
    pub penetration_percent: f64,
    pub penetration_flat: f64,
    pub life_steal_percent: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub capabilities: GearCapabilities,
    pub skills: Vec<SkillDefinition>,
    pub auto_combat: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            hp: 100,
            max_hp: 100,
            attack: 10,
            defense: 0,
            attack_speed: 1.0,
            crit_rate: 5,
            crit_damage: 50,
            guard: None,
            shield: 0,
            penetration_percent: 0.0,
            penetration_flat: 0.0,
            life_steal_percent: 0.0,
            capabilities: GearCapabilities::empty(),
            skills: Vec::new(),
            auto_combat: true,
        }
    }
}

impl PlayerState {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn offense(&self) -> OffenseTraits {
        OffenseTraits {
            penetration_percent: self.penetration_percent,
            penetration_flat: self.penetration_flat,
            life_steal_percent: self.life_steal_percent,
            capabilities: self.capabilities,
        }
    }

    /// Battle unit mirroring the current stats.
    pub fn to_unit(&self, min_interval_ms: u64) -> CombatUnit {
        CombatUnit {
            id: PLAYER_UNIT_ID.to_string(),
            name: self.name.clone(),
            hp: self.hp.min(self.max_hp),
            max_hp: self.max_hp,
            attack: self.attack,
            defense: self.defense,
            attack_interval_ms: interval_from_speed(self.attack_speed, min_interval_ms),
            crit_rate: self.crit_rate,
            crit_damage: self.crit_damage,
            guard: self.guard,
            shield: self.shield,
            is_primary: true,
            is_boss: false,
        }
    }

    /// Copies live hp and shield onto the battle unit.
    pub fn refresh_unit(&self, unit: &mut CombatUnit) {
        unit.hp = self.hp.min(unit.max_hp);
        unit.shield = self.shield;
    }

    /// Writes the battle unit's hp and shield back.
    pub fn commit_unit(&mut self, unit: &CombatUnit) {
        self.hp = unit.hp;
        self.shield = unit.shield;
    }

    /// Back to full hp with no shield. A defeat leaves hp at 0 until this runs.
    pub fn rest(&mut self) {
        self.hp = self.max_hp;
        self.shield = 0;
    }
}
