use super::{CollectConfig, CollectionState};
use crate::time::Timestamp;

/// Persisted form of the accrual engine.
///
/// Field names follow the save contract (`lastSaveTime`, `dailyCollectHours`,
/// ...). Every field has a default so partial saves still load.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AccrualSave {
    pub state: CollectionState,
    pub config: CollectConfig,
    pub last_save_time: Timestamp,
    pub daily_collect_hours: f64,
    pub last_collect_date: String,
    pub defeated_bosses: Vec<String>,
}
