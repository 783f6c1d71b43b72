use std::collections::BTreeMap;

/// Static base rates for one collection source ("robot").
///
/// All rates are per hour of collection. Pure data, no behavior.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RewardRow {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    pub gold_per_hour: f64,
    pub exp_per_hour: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub special_currency_per_hour: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub materials: Vec<MaterialRate>,
}

/// Expected drops of one material per hour.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialRate {
    pub item_id: String,
    pub per_hour: f64,
}

impl MaterialRate {
    pub fn new(item_id: impl Into<String>, per_hour: f64) -> Self {
        Self {
            item_id: item_id.into(),
            per_hour,
        }
    }
}

/// Lookup collaborator for reward rows.
///
/// Unknown ids return `None`; the accrual engine turns that into a
/// `NotFound` failure.
pub trait RewardOracle: Send + Sync {
    fn source(&self, source_id: &str) -> Option<RewardRow>;

    fn all_sources(&self) -> Vec<RewardRow>;
}

/// In-memory [`RewardOracle`].
#[derive(Clone, Debug, Default)]
pub struct RewardTable {
    rows: BTreeMap<String, RewardRow>,
}

impl RewardTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: RewardRow) {
        self.rows.insert(row.id.clone(), row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in id order.
    pub fn iter(&self) -> impl Iterator<Item = &RewardRow> {
        self.rows.values()
    }
}

impl FromIterator<RewardRow> for RewardTable {
    fn from_iter<I: IntoIterator<Item = RewardRow>>(iter: I) -> Self {
        let mut table = Self::new();
        for row in iter {
            table.insert(row);
        }
        table
    }
}

impl RewardOracle for RewardTable {
    fn source(&self, source_id: &str) -> Option<RewardRow> {
        self.rows.get(source_id).cloned()
    }

    fn all_sources(&self) -> Vec<RewardRow> {
        self.rows.values().cloned().collect()
    }
}
