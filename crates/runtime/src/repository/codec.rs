//! Save document format and its lenient decoder.
//!
//! Saves are JSON. Decoding goes field by field: a field that is missing or
//! fails to parse takes its default value and the rest of the document is
//! kept, so one bad value never wipes a player's progress.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use game_core::{AccrualSave, CollectionState, PlayerState};

/// Current save layout version.
pub const SAVE_VERSION: u32 = 1;

/// Everything persisted for one profile.
///
/// Battles are never saved mid-fight; a reload starts any battle over.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSave {
    pub version: u32,
    pub accrual: AccrualSave,
    pub player: PlayerState,
}

impl GameSave {
    pub fn new(accrual: AccrualSave, player: PlayerState) -> Self {
        Self {
            version: SAVE_VERSION,
            accrual,
            player,
        }
    }
}

pub fn encode_save(save: &GameSave) -> serde_json::Result<String> {
    serde_json::to_string_pretty(save)
}

/// Decodes a save document, falling back to defaults per field.
pub fn decode_save(value: &Value) -> GameSave {
    let Some(root) = value.as_object() else {
        warn!("save document is not an object, starting fresh");
        return GameSave::default();
    };

    let accrual = match root.get("accrual") {
        Some(Value::Object(accrual)) => {
            let mut accrual = accrual.clone();
            if let Some(state) = accrual.get("state") {
                let state = lenient::<CollectionState>(state, "accrual.state");
                if let Ok(state) = serde_json::to_value(state) {
                    accrual.insert("state".to_string(), state);
                }
            }
            lenient::<AccrualSave>(&Value::Object(accrual), "accrual")
        }
        other => lenient::<AccrualSave>(other.unwrap_or(&Value::Null), "accrual"),
    };

    GameSave {
        version: lenient_field(root, "version"),
        accrual,
        player: lenient(root.get("player").unwrap_or(&Value::Null), "player"),
    }
}

fn lenient_field<T>(object: &Map<String, Value>, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match object.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!(field = key, error = %e, "malformed save field, using default");
            T::default()
        }),
    }
}

/// Overlays the fields of `value` onto `T::default()` one at a time,
/// keeping only those that still deserialize.
fn lenient<T>(value: &Value, section: &str) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let input = match value {
        Value::Object(input) => input,
        Value::Null => return T::default(),
        _ => {
            warn!(section, "save section is not an object, using defaults");
            return T::default();
        }
    };
    let Ok(Value::Object(mut merged)) = serde_json::to_value(T::default()) else {
        return T::default();
    };

    for (key, candidate) in input {
        let Some(previous) = merged.get(key).cloned() else {
            continue;
        };
        merged.insert(key.clone(), candidate.clone());
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            warn!(section, field = %key, "malformed save field, using default");
            merged.insert(key.clone(), previous);
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}
