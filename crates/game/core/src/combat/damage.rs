//! Single-attack resolution.
//!
//! # Pipeline
//!
//! ```text
//! 1. crit      chance = clamp((crit - guard) / (guard * 1.5), 0, 1)
//!              dmg    = floor(atk * (1 + crit_damage / 100))   on a crit
//! 2. defense   eff    = max(0, def * (1 - pen% / 100) - pen_flat)   primary attacker only
//!              dmg    = max(1, floor(dmg * (1 - eff / (eff + 600))))
//! 3. shield    absorbs first                                     primary defender only
//! 4. lifesteal healed = floor(dmg * ls% / 100), overflow → shield (gear flag, ≤ 50% max hp)
//! 5. death     hp == 0
//! ```
//!
//! Balance constants come from [`CombatConfig`]. The crit roll is passed in
//! so resolution stays a pure function of its inputs.

use crate::config::CombatConfig;

use super::player::{GearCapabilities, OffenseTraits};
use super::unit::CombatUnit;

/// Everything one attack did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOutcome {
    /// Damage after mitigation, before the shield split.
    pub damage: u32,
    pub is_crit: bool,
    pub shield_absorbed: u32,
    /// Hp actually restored to the attacker.
    pub life_steal_healed: u32,
    pub shield_gained: u32,
    pub killed: bool,
}

// ============================================================================
// Crit
// ============================================================================

/// Crit chance in `[0, 1]`.
///
/// A missing or zero guard uses `config.default_guard`. If that is zero as
/// well any positive crit is a guaranteed crit.
pub fn crit_chance(attacker_crit: u32, defender_guard: Option<u32>, config: &CombatConfig) -> f64 {
    let guard = defender_guard
        .filter(|&guard| guard > 0)
        .unwrap_or(config.default_guard) as f64;
    let numerator = attacker_crit as f64 - guard;
    let denominator = guard * config.crit_guard_scale;

    if denominator <= 0.0 || !denominator.is_finite() {
        return if numerator > 0.0 { 1.0 } else { 0.0 };
    }
    (numerator / denominator).clamp(0.0, 1.0)
}

/// `floor(attack * (1 + crit_damage / 100))`.
pub fn crit_damage(attack: u32, crit_damage_percent: u32) -> u32 {
    let scaled = attack as f64 * (1.0 + crit_damage_percent as f64 / 100.0);
    scaled.floor().min(u32::MAX as f64) as u32
}

// ============================================================================
// Defense
// ============================================================================

/// Defense left after penetration; unmodified without offense traits.
pub fn effective_defense(defense: u32, offense: Option<&OffenseTraits>) -> f64 {
    let defense = defense as f64;
    match offense {
        Some(traits) => {
            let reduced = defense * (1.0 - traits.penetration_percent / 100.0)
                - traits.penetration_flat;
            if reduced.is_finite() { reduced.max(0.0) } else { 0.0 }
        }
        None => defense,
    }
}

/// Applies the soft-capped reduction ratio; never returns less than 1.
pub fn mitigate(damage: u32, effective_defense: f64, config: &CombatConfig) -> u32 {
    let denominator = effective_defense + config.defense_soft_cap;
    let ratio = if denominator > 0.0 {
        (effective_defense / denominator).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let reduced = (damage as f64 * (1.0 - ratio)).floor();
    (reduced as u32).max(1)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolves one auto-attack and applies it to both units.
///
/// `offense` is `Some` only when the attacker is the primary player; it
/// unlocks penetration and life steal. Shield absorption happens only when
/// the defender is primary. `crit_roll` is a uniform value in `[0, 1)`.
pub fn resolve_attack(
    attacker: &mut CombatUnit,
    defender: &mut CombatUnit,
    offense: Option<&OffenseTraits>,
    crit_roll: f64,
    config: &CombatConfig,
) -> AttackOutcome {
    let was_alive = defender.is_alive();

    // 1. Crit
    let is_crit = crit_roll < crit_chance(attacker.crit_rate, defender.guard, config);
    let raw = if is_crit {
        crit_damage(attacker.attack, attacker.crit_damage)
    } else {
        attacker.attack
    };

    // 2. Defense
    let damage = mitigate(raw, effective_defense(defender.defense, offense), config);

    // 3. Shield
    let shield_absorbed = if defender.is_primary {
        let absorbed = damage.min(defender.shield);
        defender.shield -= absorbed;
        absorbed
    } else {
        0
    };
    defender.hp = defender.hp.saturating_sub(damage - shield_absorbed);

    // 4. Life steal
    let (life_steal_healed, shield_gained) = match offense {
        Some(traits) if attacker.is_alive() => life_steal(attacker, damage, traits, config),
        _ => (0, 0),
    };

    AttackOutcome {
        damage,
        is_crit,
        shield_absorbed,
        life_steal_healed,
        shield_gained,
        // 5. Death
        killed: was_alive && !defender.is_alive(),
    }
}

/// Heals the attacker; overflow becomes shield when gear allows it.
fn life_steal(
    attacker: &mut CombatUnit,
    damage: u32,
    traits: &OffenseTraits,
    config: &CombatConfig,
) -> (u32, u32) {
    let amount = (damage as f64 * traits.life_steal_percent / 100.0).floor();
    if !amount.is_finite() || amount < 1.0 {
        return (0, 0);
    }
    let amount = amount.min(u32::MAX as f64) as u32;

    let healed = attacker.heal(amount);
    let overflow = amount - healed;
    if overflow == 0 || !traits.capabilities.contains(GearCapabilities::OVERFLOW_TO_SHIELD) {
        return (healed, 0);
    }

    let cap = (attacker.max_hp as f64 * config.shield_cap_ratio).floor().max(0.0) as u32;
    let gained = overflow.min(cap.saturating_sub(attacker.shield));
    attacker.shield += gained;
    (healed, gained)
}
