//! Conversion of collected hours into concrete rewards.
//!
//! # Formula
//!
//! ```text
//! gold/exp  = floor(rate * hours * stack(metric) * uniform(1 - v, 1 + v))
//! drops     = floor(expected) + (roll < frac(expected) ? 1 : 0)
//! expected  = rate * hours * stack(metric)
//! ```
//!
//! Whole-item drops use expected-value accumulation: every call yields the
//! integer part and a chance at one more item equal to the fractional part,
//! so many short settlements converge on the same long-run rate as one long
//! settlement. Rounding instead would bias short settlements.

use crate::env::{RewardRow, RngOracle, compute_seed};

use super::{MultiplierStack, Reward, RewardMetric};

/// Seed contexts for the individual rolls of one generation.
const CONTEXT_GOLD: u32 = 0;
const CONTEXT_EXP: u32 = 1;
const CONTEXT_SPECIAL: u32 = 2;
const CONTEXT_MATERIAL_BASE: u32 = 3;

/// Generates rewards for `hours` of collection at `row`'s rates.
///
/// Deterministic for a given `seed`: the same seed with more hours never
/// yields less of any metric. Negative or non-finite hours count as zero.
pub fn generate_rewards(
    row: &RewardRow,
    hours: f64,
    stack: &MultiplierStack,
    variance: f64,
    rng: &(impl RngOracle + ?Sized),
    seed: u64,
) -> Reward {
    let hours = sanitize(hours);
    let variance = sanitize(variance).min(1.0);
    let mut reward = Reward::new();

    if hours == 0.0 {
        return reward;
    }

    let roll_variance = |context: u32| {
        rng.uniform(
            compute_seed(seed, 0, 0, context),
            1.0 - variance,
            1.0 + variance,
        )
    };

    let gold = row.gold_per_hour * hours * stack.compose(RewardMetric::Gold);
    reward.gold = floor_u64(gold * roll_variance(CONTEXT_GOLD));

    let exp = row.exp_per_hour * hours * stack.compose(RewardMetric::Exp);
    reward.exp = floor_u64(exp * roll_variance(CONTEXT_EXP));

    let special =
        row.special_currency_per_hour * hours * stack.compose(RewardMetric::SpecialCurrency);
    reward.enhance_currency = fractional_drops(special, rng, compute_seed(seed, 0, 0, CONTEXT_SPECIAL));

    let material_multiplier = stack.compose(RewardMetric::Material);
    for (index, rate) in row.materials.iter().enumerate() {
        let expected = rate.per_hour * hours * material_multiplier;
        let context = CONTEXT_MATERIAL_BASE + index as u32;
        let drops = fractional_drops(expected, rng, compute_seed(seed, 0, 0, context));
        reward.add_material(&rate.item_id, drops);
    }

    reward
}

/// `floor(expected)` plus one extra with probability `frac(expected)`.
pub fn fractional_drops(expected: f64, rng: &(impl RngOracle + ?Sized), seed: u64) -> u64 {
    let expected = sanitize(expected);
    let whole = expected.floor();
    let fraction = expected - whole;
    let bump = if fraction > 0.0 && rng.unit_f64(seed) < fraction {
        1
    } else {
        0
    };
    floor_u64(whole) + bump
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn floor_u64(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}
