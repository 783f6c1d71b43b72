use super::damage::AttackOutcome;
use super::skills::SkillOutcome;

/// Which team a unit belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Allies,
    Enemies,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Allies => Self::Enemies,
            Self::Enemies => Self::Allies,
        }
    }
}

/// Battle state machine: `Fighting` moves once to one of the terminal phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BattlePhase {
    #[default]
    Fighting,
    Victory,
    Defeat,
    Escaped,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Fighting)
    }
}

/// Observable things that happened during a battle, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattleEvent {
    Attack {
        side: Side,
        attacker_slot: usize,
        target_slot: usize,
        outcome: AttackOutcome,
    },
    SkillCast {
        outcome: SkillOutcome,
    },
    UnitDefeated {
        side: Side,
        slot: usize,
        unit_id: String,
    },
    Finished {
        phase: BattlePhase,
    },
}

/// Summary handed back when a battle ends.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleReport {
    pub phase: BattlePhase,
    pub elapsed_ms: u64,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub defeated_enemies: Vec<String>,
    /// Subset of `defeated_enemies` flagged as bosses.
    pub defeated_bosses: Vec<String>,
}

impl BattleReport {
    pub fn is_victory(&self) -> bool {
        self.phase == BattlePhase::Victory
    }
}
