/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub accrual: AccrualConfig,
    pub combat: CombatConfig,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Slots per team: front row 0..3, back row 3..6.
    pub const TEAM_SIZE: usize = 6;
    /// Slots per row.
    pub const ROW_SIZE: usize = 3;
    /// Maximum equipped active skills per player.
    pub const MAX_SKILLS: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }
}

/// Tunables for the offline accrual engine.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AccrualConfig {
    /// Longest continuous stretch a single session accrues for.
    pub session_cap_hours: f64,
    /// Cumulative hours per calendar day across all sessions.
    pub daily_cap_hours: f64,
    /// Reward bonus per unique defeated boss (0.2 = +20%).
    pub boss_bonus_per_kill: f64,
    /// Multiplier applied to the metrics a focused mode favours.
    pub mode_bonus: f64,
    /// Half-width of the gold/exp variance band (0.1 = ±10%).
    pub variance: f64,
    /// Offset from UTC used to decide where a calendar day starts.
    pub utc_offset_minutes: i32,
}

impl AccrualConfig {
    pub const DEFAULT_SESSION_CAP_HOURS: f64 = 8.0;
    pub const DEFAULT_DAILY_CAP_HOURS: f64 = 24.0;
    pub const DEFAULT_BOSS_BONUS_PER_KILL: f64 = 0.2;
    pub const DEFAULT_MODE_BONUS: f64 = 1.5;
    pub const DEFAULT_VARIANCE: f64 = 0.1;
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            session_cap_hours: Self::DEFAULT_SESSION_CAP_HOURS,
            daily_cap_hours: Self::DEFAULT_DAILY_CAP_HOURS,
            boss_bonus_per_kill: Self::DEFAULT_BOSS_BONUS_PER_KILL,
            mode_bonus: Self::DEFAULT_MODE_BONUS,
            variance: Self::DEFAULT_VARIANCE,
            utc_offset_minutes: 0,
        }
    }
}

/// Tunables for combat resolution and battle scheduling.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Denominator constant in `def / (def + soft_cap)`.
    pub defense_soft_cap: f64,
    /// Guard used when a defender has none (or zero).
    pub default_guard: u32,
    /// Scale applied to guard in the crit chance denominator.
    pub crit_guard_scale: f64,
    /// Fastest allowed side cadence.
    pub min_attack_interval_ms: u64,
    /// Cooldown decay cadence.
    pub cooldown_tick_ms: u64,
    /// Overflow shield ceiling as a fraction of max hp.
    pub shield_cap_ratio: f64,
    pub minions: MinionConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            defense_soft_cap: 600.0,
            default_guard: 5,
            crit_guard_scale: 1.5,
            min_attack_interval_ms: 200,
            cooldown_tick_ms: 1000,
            shield_cap_ratio: 0.5,
            minions: MinionConfig::default(),
        }
    }
}

/// Ranges used to derive minion stats from the primary enemy.
///
/// Percentages are whole numbers (`20` = 20%).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MinionConfig {
    pub min_count: u32,
    pub max_count: u32,
    pub hp_percent: (u32, u32),
    pub attack_percent: (u32, u32),
    pub defense_percent: u32,
    pub speed_percent: u32,
}

impl Default for MinionConfig {
    fn default() -> Self {
        Self {
            min_count: 2,
            max_count: 3,
            hp_percent: (20, 35),
            attack_percent: (30, 50),
            defense_percent: 40,
            speed_percent: 70,
        }
    }
}
