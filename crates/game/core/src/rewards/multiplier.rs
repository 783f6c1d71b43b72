//! Ordered multiplier stack for collection rewards.
//!
//! Every reward metric passes through the same chain:
//! Mode → Boss bonus → Equipment bonus → Variance
//!
//! The first three layers are deterministic and live in [`MultiplierStack`];
//! variance is a per-roll factor applied last by the generator. Keeping the
//! layers as separate entries means a UI (or a test) can show exactly which
//! contribution produced which part of the final number.

use bitflags::bitflags;

use super::{CollectMode, RewardMetric};

bitflags! {
    /// Set of reward metrics a contribution applies to.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MetricSet: u8 {
        const GOLD = 1 << 0;
        const EXP = 1 << 1;
        const SPECIAL_CURRENCY = 1 << 2;
        const MATERIAL = 1 << 3;
    }
}

impl MetricSet {
    pub const fn of(metric: RewardMetric) -> Self {
        match metric {
            RewardMetric::Gold => Self::GOLD,
            RewardMetric::Exp => Self::EXP,
            RewardMetric::SpecialCurrency => Self::SPECIAL_CURRENCY,
            RewardMetric::Material => Self::MATERIAL,
        }
    }

    pub fn covers(self, metric: RewardMetric) -> bool {
        self.contains(Self::of(metric))
    }
}

/// Where a multiplier came from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MultiplierSource {
    /// Focus bonus of the active collection mode.
    Mode(CollectMode),
    /// Permanent bonus from unique defeated bosses.
    BossBonus { defeated: usize },
    /// Caller-supplied percentage (gear, buffs).
    Equipment { bonus_percent: f64 },
}

/// One layer of the stack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Multiplier {
    pub source: MultiplierSource,
    pub metrics: MetricSet,
    pub factor: f64,
}

/// Layers applied in insertion order; [`MultiplierStack::for_collection`]
/// builds them in the canonical order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiplierStack {
    layers: Vec<Multiplier>,
}

impl MultiplierStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Builds the canonical Mode → Boss → Equipment stack.
    ///
    /// Layers with a factor of exactly 1.0 are still recorded so the audit
    /// trail always has three entries.
    pub fn for_collection(
        mode: CollectMode,
        mode_bonus: f64,
        defeated_bosses: usize,
        boss_bonus_per_kill: f64,
        bonus_percent: f64,
    ) -> Self {
        let favoured = [
            RewardMetric::Gold,
            RewardMetric::Exp,
            RewardMetric::SpecialCurrency,
            RewardMetric::Material,
        ]
        .into_iter()
        .filter(|&metric| mode.favours(metric))
        .fold(MetricSet::empty(), |set, metric| set | MetricSet::of(metric));

        Self::new()
            .mode(mode, favoured, if favoured.is_empty() { 1.0 } else { mode_bonus })
            .boss_bonus(defeated_bosses, boss_bonus_per_kill)
            .equipment(bonus_percent)
    }

    /// Add a mode layer (builder pattern)
    pub fn mode(mut self, mode: CollectMode, metrics: MetricSet, factor: f64) -> Self {
        self.layers.push(Multiplier {
            source: MultiplierSource::Mode(mode),
            metrics,
            factor,
        });
        self
    }

    /// Add the boss layer: `1 + per_kill * defeated` on every metric (builder pattern)
    pub fn boss_bonus(mut self, defeated: usize, per_kill: f64) -> Self {
        self.layers.push(Multiplier {
            source: MultiplierSource::BossBonus { defeated },
            metrics: MetricSet::all(),
            factor: 1.0 + per_kill * defeated as f64,
        });
        self
    }

    /// Add the equipment layer: `1 + bonus_percent / 100` on every metric (builder pattern)
    pub fn equipment(mut self, bonus_percent: f64) -> Self {
        self.layers.push(Multiplier {
            source: MultiplierSource::Equipment { bonus_percent },
            metrics: MetricSet::all(),
            factor: (1.0 + bonus_percent / 100.0).max(0.0),
        });
        self
    }

    /// Product of every layer that covers `metric`.
    pub fn compose(&self, metric: RewardMetric) -> f64 {
        self.layers
            .iter()
            .filter(|layer| layer.metrics.covers(metric))
            .fold(1.0, |acc, layer| acc * layer.factor)
    }

    pub fn contributions(&self) -> &[Multiplier] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_mode_boss_equipment() {
        let stack = MultiplierStack::for_collection(CollectMode::Gather, 1.5, 2, 0.2, 10.0);
        let sources: Vec<_> = stack.contributions().iter().map(|m| m.source).collect();
        assert_eq!(stack.len(), 3);
        assert!(matches!(sources[0], MultiplierSource::Mode(CollectMode::Gather)));
        assert!(matches!(sources[1], MultiplierSource::BossBonus { defeated: 2 }));
        assert!(matches!(sources[2], MultiplierSource::Equipment { .. }));
    }

    #[test]
    fn gather_stack_composes_per_metric() {
        let stack = MultiplierStack::for_collection(CollectMode::Gather, 1.5, 1, 0.2, 0.0);
        assert!((stack.compose(RewardMetric::Gold) - 1.5 * 1.2).abs() < 1e-12);
        assert!((stack.compose(RewardMetric::Material) - 1.5 * 1.2).abs() < 1e-12);
        assert!((stack.compose(RewardMetric::Exp) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn boss_layer_is_linear_in_kills() {
        for defeated in 0..10 {
            let stack = MultiplierStack::new().boss_bonus(defeated, 0.2);
            let expected = 1.0 + 0.2 * defeated as f64;
            assert!((stack.compose(RewardMetric::Exp) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn equipment_layer_never_goes_negative() {
        let stack = MultiplierStack::new().equipment(-250.0);
        assert_eq!(stack.compose(RewardMetric::Gold), 0.0);
    }

    #[test]
    fn balanced_mode_layer_is_identity() {
        let stack = MultiplierStack::for_collection(CollectMode::Balanced, 1.5, 0, 0.2, 0.0);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.contributions()[0].factor, 1.0);
        assert_eq!(stack.compose(RewardMetric::Gold), 1.0);
    }
}
