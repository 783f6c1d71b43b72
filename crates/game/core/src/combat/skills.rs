//! Active skills and their cooldowns.
//!
//! Skill effects skip the crit/penetration pipeline and use
//! `max(1, damage - target.defense)`. Heals always land on the caster.

use arrayvec::ArrayVec;

use crate::config::GameConfig;
use crate::error::{ErrorKind, GameError};

use super::targeting::select_target;
use super::unit::{CombatUnit, Team};

/// What a skill does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SkillEffect {
    DamageFlat(u32),
    /// Percent of the caster's attack.
    DamagePercent(u32),
    HealFlat(u32),
    /// Percent of the caster's max hp.
    HealPercent(u32),
}

impl SkillEffect {
    pub fn is_heal(self) -> bool {
        matches!(self, Self::HealFlat(_) | Self::HealPercent(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub cooldown_ms: u64,
    pub effect: SkillEffect,
}

/// One equipped skill and its remaining cooldown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillCooldown {
    pub skill: SkillDefinition,
    pub remaining_ms: u64,
}

impl SkillCooldown {
    pub fn max_ms(&self) -> u64 {
        self.skill.cooldown_ms
    }

    pub fn is_ready(&self) -> bool {
        self.remaining_ms == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillOutcome {
    pub skill_id: String,
    pub target_slot: Option<usize>,
    pub damage: u32,
    pub healed: u32,
    pub killed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SkillError {
    #[error("unknown skill `{skill_id}`")]
    UnknownSkill { skill_id: String },

    #[error("skill `{skill_id}` is cooling down ({remaining_ms}ms left)")]
    OnCooldown { skill_id: String, remaining_ms: u64 },

    #[error("no living target")]
    NoTarget,

    #[error("caster is down")]
    CasterDown,

    #[error("battle is already over")]
    BattleOver,
}

impl GameError for SkillError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownSkill { .. } => ErrorKind::NotFound,
            Self::OnCooldown { .. } | Self::CasterDown => ErrorKind::PreconditionFailed,
            Self::NoTarget | Self::BattleOver => ErrorKind::NoOp,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSkill { .. } => "SKILL_UNKNOWN",
            Self::OnCooldown { .. } => "SKILL_ON_COOLDOWN",
            Self::NoTarget => "SKILL_NO_TARGET",
            Self::CasterDown => "SKILL_CASTER_DOWN",
            Self::BattleOver => "SKILL_BATTLE_OVER",
        }
    }
}

/// Cooldown bookkeeping for the player's equipped skills.
///
/// Skills start ready. A cast resets the cooldown to its maximum; a failed
/// cast leaves it untouched.
#[derive(Clone, Debug, Default)]
pub struct SkillCooldownManager {
    slots: ArrayVec<SkillCooldown, { GameConfig::MAX_SKILLS }>,
}

impl SkillCooldownManager {
    /// Equips up to `MAX_SKILLS`; extras and duplicate ids are ignored.
    pub fn new<'a>(skills: impl IntoIterator<Item = &'a SkillDefinition>) -> Self {
        let mut slots: ArrayVec<SkillCooldown, { GameConfig::MAX_SKILLS }> = ArrayVec::new();
        for skill in skills {
            if slots.is_full() {
                break;
            }
            if slots.iter().any(|slot| slot.skill.id == skill.id) {
                continue;
            }
            slots.push(SkillCooldown {
                skill: skill.clone(),
                remaining_ms: 0,
            });
        }
        Self { slots }
    }

    pub fn cooldowns(&self) -> &[SkillCooldown] {
        &self.slots
    }

    pub fn remaining_ms(&self, skill_id: &str) -> Option<u64> {
        self.find(skill_id).map(|slot| slot.remaining_ms)
    }

    /// Decays every cooldown by `elapsed_ms`, clamped at zero.
    pub fn tick(&mut self, elapsed_ms: u64) {
        for slot in &mut self.slots {
            slot.remaining_ms = slot.remaining_ms.saturating_sub(elapsed_ms);
        }
    }

    /// Casts if ready; returns false on any failure.
    pub fn try_cast(
        &mut self,
        skill_id: &str,
        caster: &mut CombatUnit,
        caster_slot: usize,
        enemies: &mut Team,
    ) -> bool {
        self.cast(skill_id, caster, caster_slot, enemies).is_ok()
    }

    /// Applies the skill and restarts its cooldown.
    ///
    /// Damage goes to the target the auto-attack would pick from
    /// `caster_slot`.
    pub fn cast(
        &mut self,
        skill_id: &str,
        caster: &mut CombatUnit,
        caster_slot: usize,
        enemies: &mut Team,
    ) -> Result<SkillOutcome, SkillError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.skill.id == skill_id)
            .ok_or_else(|| SkillError::UnknownSkill {
                skill_id: skill_id.to_string(),
            })?;
        if !slot.is_ready() {
            return Err(SkillError::OnCooldown {
                skill_id: skill_id.to_string(),
                remaining_ms: slot.remaining_ms,
            });
        }
        if !caster.is_alive() {
            return Err(SkillError::CasterDown);
        }

        let mut outcome = SkillOutcome {
            skill_id: skill_id.to_string(),
            target_slot: None,
            damage: 0,
            healed: 0,
            killed: false,
        };

        match slot.skill.effect {
            SkillEffect::HealFlat(amount) => {
                outcome.healed = caster.heal(amount);
            }
            SkillEffect::HealPercent(percent) => {
                outcome.healed = caster.heal(percent_of(caster.max_hp, percent));
            }
            SkillEffect::DamageFlat(amount) => {
                strike(&mut outcome, amount, caster_slot, enemies)?;
            }
            SkillEffect::DamagePercent(percent) => {
                let raw = percent_of(caster.attack, percent);
                strike(&mut outcome, raw, caster_slot, enemies)?;
            }
        }

        slot.remaining_ms = slot.skill.cooldown_ms;
        Ok(outcome)
    }

    fn find(&self, skill_id: &str) -> Option<&SkillCooldown> {
        self.slots.iter().find(|slot| slot.skill.id == skill_id)
    }
}

/// Hits the caster's preferred target for `max(1, raw - defense)`.
fn strike(
    outcome: &mut SkillOutcome,
    raw: u32,
    caster_slot: usize,
    enemies: &mut Team,
) -> Result<(), SkillError> {
    let target_slot = select_target(enemies, caster_slot).ok_or(SkillError::NoTarget)?;
    let target = enemies.get_mut(target_slot).ok_or(SkillError::NoTarget)?;
    let damage = raw.saturating_sub(target.defense).max(1);
    target.hp = target.hp.saturating_sub(damage);

    outcome.target_slot = Some(target_slot);
    outcome.damage = damage;
    outcome.killed = !target.is_alive();
    Ok(())
}

fn percent_of(value: u32, percent: u32) -> u32 {
    (value as u64 * percent as u64 / 100).min(u32::MAX as u64) as u32
}
