use std::collections::BTreeMap;

/// Reward categories a multiplier can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RewardMetric {
    Gold,
    Exp,
    /// Enhancement currency.
    SpecialCurrency,
    Material,
}

/// A bundle of collected rewards.
///
/// Materials are keyed by item id; merging sums repeated ids.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Reward {
    pub gold: u64,
    pub exp: u64,
    pub enhance_currency: u64,
    pub materials: BTreeMap<String, u64>,
}

impl Reward {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.gold == 0
            && self.exp == 0
            && self.enhance_currency == 0
            && self.materials.values().all(|&qty| qty == 0)
    }

    pub fn material(&self, item_id: &str) -> u64 {
        self.materials.get(item_id).copied().unwrap_or(0)
    }

    /// Adds a material drop; zero quantities are not recorded.
    pub fn add_material(&mut self, item_id: &str, quantity: u64) {
        if quantity == 0 {
            return;
        }
        *self.materials.entry(item_id.to_string()).or_insert(0) += quantity;
    }

    /// Folds `other` into `self`.
    pub fn merge(&mut self, other: &Reward) {
        self.gold = self.gold.saturating_add(other.gold);
        self.exp = self.exp.saturating_add(other.exp);
        self.enhance_currency = self.enhance_currency.saturating_add(other.enhance_currency);
        for (item_id, &quantity) in &other.materials {
            self.add_material(item_id, quantity);
        }
    }

    /// Moves everything out, leaving `self` empty.
    pub fn take(&mut self) -> Reward {
        std::mem::take(self)
    }
}
