use std::collections::BTreeSet;

/// Unique bosses defeated in this save.
///
/// Grows monotonically; nothing in the engine removes an entry.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BossBonusState {
    defeated: BTreeSet<String>,
}

impl BossBonusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a defeat; returns false if the boss was already counted.
    pub fn record_defeat(&mut self, boss_id: impl Into<String>) -> bool {
        self.defeated.insert(boss_id.into())
    }

    pub fn count(&self) -> usize {
        self.defeated.len()
    }

    /// `1 + per_kill * |defeated|`.
    pub fn multiplier(&self, per_kill: f64) -> f64 {
        1.0 + per_kill * self.defeated.len() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.defeated.iter().map(String::as_str)
    }
}

impl FromIterator<String> for BossBonusState {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            defeated: iter.into_iter().filter(|id| !id.is_empty()).collect(),
        }
    }
}
