use crate::rewards::{CollectMode, Reward};
use crate::time::Timestamp;

/// State of the background collection session.
///
/// Invariant: `last_settled_at >= started_at`. `accumulated` only grows
/// between settlements and is drained to zero by a stop or a claim.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollectionState {
    pub is_collecting: bool,
    pub started_at: Timestamp,
    pub last_settled_at: Timestamp,
    pub source_id: String,
    pub mode: CollectMode,
    pub accumulated: Reward,
}

impl CollectionState {
    /// Fresh active session starting at `now`.
    pub fn started(source_id: &str, mode: CollectMode, now: Timestamp) -> Self {
        Self {
            is_collecting: true,
            started_at: now,
            last_settled_at: now,
            source_id: source_id.to_string(),
            mode,
            accumulated: Reward::new(),
        }
    }

    /// Milliseconds of the session already converted into rewards.
    pub fn settled_ms(&self) -> i64 {
        self.last_settled_at.millis_since(self.started_at)
    }

    /// Restores the timing invariants on loaded data. Returns true if
    /// anything changed.
    ///
    /// A session stamped before the epoch, or after `saved_at` when the save
    /// time is known, cannot be settled and is closed. Rewards already
    /// settled stay in `accumulated`.
    pub fn repair(&mut self, saved_at: Timestamp) -> bool {
        let before_epoch = self.started_at < Timestamp::EPOCH || self.last_settled_at < Timestamp::EPOCH;
        let after_save = saved_at > Timestamp::EPOCH
            && (self.started_at > saved_at || self.last_settled_at > saved_at);
        if before_epoch || after_save {
            self.is_collecting = false;
            self.started_at = Timestamp::EPOCH;
            self.last_settled_at = Timestamp::EPOCH;
            return true;
        }
        if self.last_settled_at < self.started_at {
            self.last_settled_at = self.started_at;
            return true;
        }
        false
    }
}

/// The small config persisted so a reload resumes with the same choice.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollectConfig {
    pub source_id: Option<String>,
    pub mode: CollectMode,
}
