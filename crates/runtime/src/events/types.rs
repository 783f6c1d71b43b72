//! Event payloads published by the runtime workers.

use serde::{Deserialize, Serialize};

use game_core::{BattleEvent, BattleReport, CollectMode, Reward, Timestamp};

/// Changes to the collection session and its caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccrualEvent {
    Started {
        source_id: String,
        mode: CollectMode,
        at: Timestamp,
    },
    /// A settlement converted `hours` of elapsed time into `reward`.
    Settled { hours: f64, reward: Reward },
    /// The session reached its cap; accumulated rewards stay claimable.
    SessionEnded { at: Timestamp },
    Stopped { reward: Reward },
    Claimed { reward: Reward, session_ended: bool },
    DailyReset { date: String },
    BossRecorded { boss_id: String, multiplier: f64 },
}

/// Battle lifecycle plus every event the scheduler produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleNotice {
    Started { enemy_id: String, is_boss: bool },
    Combat(BattleEvent),
    Finished(BattleReport),
}
