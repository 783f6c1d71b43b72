use crate::config::GameConfig;
use crate::time::MS_PER_SECOND;

/// Interval used when a speed stat is missing or non-positive.
pub const FALLBACK_INTERVAL_MS: u64 = 1_000;

/// `max(min_interval_ms, 1000 / speed)`.
pub fn interval_from_speed(speed: f64, min_interval_ms: u64) -> u64 {
    let raw = if speed.is_finite() && speed > 0.0 {
        (MS_PER_SECOND as f64 / speed).floor() as u64
    } else {
        FALLBACK_INTERVAL_MS
    };
    raw.max(min_interval_ms)
}

/// Any combatant: player, crew member, enemy or minion.
///
/// A unit is alive while `hp > 0`. Empty team slots hold a [`CombatUnit::empty`]
/// placeholder instead of nothing so slot indices stay stable.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatUnit {
    pub id: String,
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub attack_interval_ms: u64,
    pub crit_rate: u32,
    /// Bonus damage on a crit, in percent.
    pub crit_damage: u32,
    /// Crit resistance; `None` falls back to the configured default.
    pub guard: Option<u32>,
    pub shield: u32,
    /// Backed by the persistent player state.
    pub is_primary: bool,
    pub is_boss: bool,
}

impl CombatUnit {
    /// Dead placeholder for an unoccupied slot.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty() && self.max_hp == 0
    }

    /// Restores hp up to `max_hp`; returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }
}

/// Fixed six-slot formation. Slots 0..3 are the front row, 3..6 the back row.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team {
    slots: [CombatUnit; GameConfig::TEAM_SIZE],
}

impl Team {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `unit` in `slot`, replacing whatever was there.
    ///
    /// Returns false when `slot` is out of range.
    pub fn place(&mut self, slot: usize, unit: CombatUnit) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = unit;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: usize) -> Option<&CombatUnit> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut CombatUnit> {
        self.slots.get_mut(slot)
    }

    pub fn slots(&self) -> &[CombatUnit; GameConfig::TEAM_SIZE] {
        &self.slots
    }

    pub fn is_alive(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(CombatUnit::is_alive)
    }

    /// True when no slot holds a living unit.
    pub fn is_wiped(&self) -> bool {
        !self.slots.iter().any(CombatUnit::is_alive)
    }

    pub fn alive_count(&self) -> usize {
        self.slots.iter().filter(|unit| unit.is_alive()).count()
    }

    pub fn primary_slot(&self) -> Option<usize> {
        self.slots.iter().position(|unit| unit.is_primary)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CombatUnit)> {
        self.slots.iter().enumerate()
    }
}
