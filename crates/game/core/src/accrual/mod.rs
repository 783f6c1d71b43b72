//! Offline progress accrual.
//!
//! [`AccrualEngine`] owns the collection session and converts elapsed wall
//! time into rewards on demand. It has no timer of its own: every operation
//! receives `now` and settles lazily, so a host that was suspended for hours
//! simply sees a larger elapsed span on the next call.
//!
//! # Settlement
//!
//! ```text
//! elapsed  = now - last_settled_at
//! hours    = min(elapsed, session_cap - settled_so_far, daily_remaining)
//! reward   = generate_rewards(row, hours, Mode → Boss → Equipment → Variance)
//! ```
//!
//! `last_settled_at` advances by exactly `hours`, never to `now`, so time
//! that did not fit under a cap is not silently converted. Reaching the
//! session cap ends the session while leaving its rewards claimable.

mod bosses;
mod daily;
mod error;
mod save;
mod state;

pub use bosses::BossBonusState;
pub use daily::{DailyCapState, DailyCapTracker};
pub use error::{AccrualError, AccrualResult};
pub use save::AccrualSave;
pub use state::{CollectConfig, CollectionState};

use crate::config::AccrualConfig;
use crate::env::{Env, RewardRow, compute_seed};
use crate::rewards::{CollectMode, MultiplierStack, Reward, generate_rewards};
use crate::time::{Timestamp, hours_from_millis, millis_from_hours};

/// Seed context reserved for previews so they never collide with settlements.
const PREVIEW_CONTEXT: u32 = u32::MAX;

/// What one settlement produced.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SettleReport {
    /// Hours converted into rewards by this call.
    pub hours: f64,
    pub reward: Reward,
    /// True when this call ended the session at the session cap.
    pub session_ended: bool,
}

/// Result of a successful claim.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimReport {
    pub rewards: Reward,
    /// The session is over because it reached the session cap.
    pub session_ended: bool,
}

/// Offline accrual engine.
#[derive(Clone, Debug)]
pub struct AccrualEngine {
    config: AccrualConfig,
    state: CollectionState,
    daily: DailyCapTracker,
    bosses: BossBonusState,
    collect_config: CollectConfig,
    last_save_time: Timestamp,
    seed: u64,
    nonce: u64,
}

impl AccrualEngine {
    pub fn new(config: AccrualConfig, seed: u64) -> Self {
        Self {
            config,
            state: CollectionState::default(),
            daily: DailyCapTracker::new(),
            bosses: BossBonusState::new(),
            collect_config: CollectConfig::default(),
            last_save_time: Timestamp::EPOCH,
            seed,
            nonce: 0,
        }
    }

    pub fn config(&self) -> &AccrualConfig {
        &self.config
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn collect_config(&self) -> &CollectConfig {
        &self.collect_config
    }

    pub fn daily(&self) -> &DailyCapTracker {
        &self.daily
    }

    pub fn bosses(&self) -> &BossBonusState {
        &self.bosses
    }

    pub fn last_save_time(&self) -> Timestamp {
        self.last_save_time
    }

    pub fn is_collecting(&self) -> bool {
        self.state.is_collecting
    }

    /// Calendar day key for `now` under the configured offset.
    pub fn today(&self, now: Timestamp) -> String {
        now.day_key(self.config.utc_offset_minutes)
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Starts a fresh session on `source_id`.
    ///
    /// Any previous session state, including unclaimed rewards, is replaced.
    pub fn start_collect(
        &mut self,
        env: Env<'_>,
        source_id: &str,
        mode: CollectMode,
        now: Timestamp,
    ) -> AccrualResult<()> {
        if env.rewards().source(source_id).is_none() {
            return Err(AccrualError::UnknownSource {
                source_id: source_id.to_string(),
            });
        }

        let today = self.today(now);
        if self.daily.remaining(&today, self.config.daily_cap_hours) <= 0.0 {
            return Err(AccrualError::DailyCapExhausted {
                cap_hours: self.config.daily_cap_hours,
            });
        }

        self.state = CollectionState::started(source_id, mode, now);
        self.collect_config = CollectConfig {
            source_id: Some(source_id.to_string()),
            mode,
        };
        Ok(())
    }

    /// Converts time elapsed since the last settlement into accumulated rewards.
    ///
    /// No-op when inactive. When no time fits under the caps the settlement
    /// point stays where it is.
    pub fn settle(
        &mut self,
        env: Env<'_>,
        bonus_percent: f64,
        now: Timestamp,
    ) -> AccrualResult<SettleReport> {
        if !self.state.is_collecting {
            return Ok(SettleReport::default());
        }

        let today = self.today(now);
        let session_cap_ms = self.session_cap_ms();
        let session_left_ms = (session_cap_ms - self.state.settled_ms()).max(0);
        let daily_left_ms =
            millis_from_hours(self.daily.remaining(&today, self.config.daily_cap_hours)).max(0);
        let elapsed_ms = now.millis_since(self.state.last_settled_at);

        let capped_ms = elapsed_ms.min(session_left_ms).min(daily_left_ms);
        if capped_ms <= 0 {
            let session_ended = session_left_ms == 0;
            if session_ended {
                self.state.is_collecting = false;
            }
            return Ok(SettleReport {
                session_ended,
                ..SettleReport::default()
            });
        }

        let row = self.lookup(env, &self.state.source_id)?;
        let hours = hours_from_millis(capped_ms);
        let seed = self.next_seed();
        let reward =
            self.generate_rewards(env, &row, self.state.mode, hours, bonus_percent, seed);

        self.state.accumulated.merge(&reward);
        self.daily.consume(&today, hours);
        self.state.last_settled_at = self.state.last_settled_at.add_millis(capped_ms);

        let session_ended = self.state.settled_ms() >= session_cap_ms;
        if session_ended {
            self.state.is_collecting = false;
        }

        Ok(SettleReport {
            hours,
            reward,
            session_ended,
        })
    }

    /// Settles, then ends the session and hands over everything accumulated.
    pub fn stop_collect(
        &mut self,
        env: Env<'_>,
        bonus_percent: f64,
        now: Timestamp,
    ) -> AccrualResult<Reward> {
        if !self.state.is_collecting && self.state.accumulated.is_empty() {
            return Err(AccrualError::NotCollecting);
        }

        let settled = self.settle(env, bonus_percent, now);
        self.state.is_collecting = false;
        settled?;

        Ok(self.state.accumulated.take())
    }

    /// Settles and hands over everything accumulated, keeping the session alive.
    ///
    /// `session_ended` in the report tells the caller the session cap stopped
    /// collection, either during this claim or earlier.
    pub fn claim_rewards(
        &mut self,
        env: Env<'_>,
        bonus_percent: f64,
        now: Timestamp,
    ) -> AccrualResult<ClaimReport> {
        self.settle(env, bonus_percent, now)?;

        if self.state.accumulated.is_empty() {
            return Err(AccrualError::NothingToClaim);
        }

        Ok(ClaimReport {
            rewards: self.state.accumulated.take(),
            session_ended: !self.state.is_collecting,
        })
    }

    /// Ends a session that has run past the session cap.
    ///
    /// Settles first so the capped span is still rewarded. Returns true if
    /// this call ended the session. The duration getters never do this.
    pub fn enforce_session_cap(
        &mut self,
        env: Env<'_>,
        bonus_percent: f64,
        now: Timestamp,
    ) -> AccrualResult<bool> {
        if !self.state.is_collecting {
            return Ok(false);
        }
        if now.millis_since(self.state.started_at) < self.session_cap_ms() {
            return Ok(false);
        }

        let settled = self.settle(env, bonus_percent, now);
        self.state.is_collecting = false;
        settled.map(|_| true)
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    /// Canonical Mode → Boss → Equipment stack for `mode`.
    pub fn multiplier_stack(&self, mode: CollectMode, bonus_percent: f64) -> MultiplierStack {
        MultiplierStack::for_collection(
            mode,
            self.config.mode_bonus,
            self.bosses.count(),
            self.config.boss_bonus_per_kill,
            bonus_percent,
        )
    }

    /// Rewards for `hours` on `row`; pure for a given `seed`.
    pub fn generate_rewards(
        &self,
        env: Env<'_>,
        row: &RewardRow,
        mode: CollectMode,
        hours: f64,
        bonus_percent: f64,
        seed: u64,
    ) -> Reward {
        let stack = self.multiplier_stack(mode, bonus_percent);
        generate_rewards(row, hours, &stack, self.config.variance, env.rng(), seed)
    }

    /// One-hour preview for the selected source and mode. Does not mutate.
    pub fn estimated_hourly_rewards(
        &self,
        env: Env<'_>,
        bonus_percent: f64,
    ) -> AccrualResult<Reward> {
        let source_id = self
            .collect_config
            .source_id
            .as_deref()
            .or_else(|| (!self.state.source_id.is_empty()).then_some(self.state.source_id.as_str()))
            .ok_or(AccrualError::NoSourceSelected)?;
        let row = self.lookup(env, source_id)?;
        let seed = compute_seed(self.seed, self.nonce, 0, PREVIEW_CONTEXT);
        Ok(self.generate_rewards(env, &row, self.collect_config.mode, 1.0, bonus_percent, seed))
    }

    pub fn record_boss_defeat(&mut self, boss_id: &str) -> bool {
        self.bosses.record_defeat(boss_id)
    }

    pub fn boss_multiplier(&self) -> f64 {
        self.bosses.multiplier(self.config.boss_bonus_per_kill)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn remaining_daily_hours(&self, now: Timestamp) -> f64 {
        self.daily
            .peek_remaining(&self.today(now), self.config.daily_cap_hours)
    }

    /// Resets today's consumption if the calendar day changed.
    pub fn check_daily_reset(&mut self, now: Timestamp) -> bool {
        let today = self.today(now);
        self.daily.check_daily_reset(&today)
    }

    /// Session length so far, clamped at the session cap; 0 when inactive.
    pub fn collecting_duration_ms(&self, now: Timestamp) -> i64 {
        if !self.state.is_collecting {
            return 0;
        }
        now.millis_since(self.state.started_at)
            .min(self.session_cap_ms())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn serialize(&mut self, now: Timestamp) -> AccrualSave {
        self.last_save_time = now;
        AccrualSave {
            state: self.state.clone(),
            config: self.collect_config.clone(),
            last_save_time: now,
            daily_collect_hours: self.daily.hours_consumed_today(),
            last_collect_date: self.daily.state().date_key.clone(),
            defeated_bosses: self.bosses.iter().map(str::to_string).collect(),
        }
    }

    /// Replaces all persistent state with `save`, repairing broken invariants.
    pub fn load(&mut self, save: AccrualSave) {
        let AccrualSave {
            mut state,
            config,
            last_save_time,
            daily_collect_hours,
            last_collect_date,
            defeated_bosses,
        } = save;

        state.repair(last_save_time);
        if state.source_id.is_empty() {
            state.is_collecting = false;
        }
        let hours = if daily_collect_hours.is_finite() && daily_collect_hours > 0.0 {
            daily_collect_hours
        } else {
            0.0
        };

        self.state = state;
        self.collect_config = config;
        self.last_save_time = last_save_time;
        self.daily = DailyCapTracker::from_state(DailyCapState {
            date_key: last_collect_date,
            hours_consumed_today: hours,
        });
        self.bosses = defeated_bosses.into_iter().collect();
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn session_cap_ms(&self) -> i64 {
        millis_from_hours(self.config.session_cap_hours).max(0)
    }

    fn lookup(&self, env: Env<'_>, source_id: &str) -> AccrualResult<RewardRow> {
        env.rewards()
            .source(source_id)
            .ok_or_else(|| AccrualError::UnknownSource {
                source_id: source_id.to_string(),
            })
    }

    fn next_seed(&mut self) -> u64 {
        let seed = compute_seed(self.seed, self.nonce, 0, 0);
        self.nonce += 1;
        seed
    }
}

#[cfg(test)]
mod tests {
    use crate::env::{FixedRng, MaterialRate, RewardTable};
    use crate::time::MS_PER_HOUR;

    use super::*;

    const T0: Timestamp = Timestamp(1_714_521_600_000); // 2024-05-01T00:00:00Z

    fn table() -> RewardTable {
        [RewardRow {
            id: "robot_a".into(),
            name: "Robot A".into(),
            gold_per_hour: 100.0,
            exp_per_hour: 40.0,
            special_currency_per_hour: 1.0,
            materials: vec![MaterialRate::new("bolt", 3.0)],
        }]
        .into_iter()
        .collect()
    }

    fn at(hours: f64) -> Timestamp {
        T0.add_hours(hours)
    }

    #[test]
    fn start_rejects_unknown_source() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);

        let err = engine
            .start_collect(env, "robot_z", CollectMode::Gather, T0)
            .unwrap_err();
        assert!(matches!(err, AccrualError::UnknownSource { .. }));
        assert!(!engine.is_collecting());
    }

    #[test]
    fn start_rejects_exhausted_daily_cap() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine.load(AccrualSave {
            daily_collect_hours: 24.0,
            last_collect_date: "2024-05-01".into(),
            ..AccrualSave::default()
        });

        let err = engine
            .start_collect(env, "robot_a", CollectMode::Gather, at(5.0))
            .unwrap_err();
        assert!(matches!(err, AccrualError::DailyCapExhausted { .. }));

        // next day the cap is back
        engine
            .start_collect(env, "robot_a", CollectMode::Gather, at(25.0))
            .unwrap();
        assert!(engine.is_collecting());
    }

    #[test]
    fn start_records_resume_config() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Combat, T0)
            .unwrap();

        assert_eq!(engine.collect_config().source_id.as_deref(), Some("robot_a"));
        assert_eq!(engine.collect_config().mode, CollectMode::Combat);
        assert_eq!(engine.state().started_at, engine.state().last_settled_at);
    }

    #[test]
    fn zero_elapsed_settle_is_idempotent() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();
        engine.settle(env, 0.0, at(1.0)).unwrap();
        let after_first = engine.state().clone();

        for _ in 0..3 {
            let report = engine.settle(env, 0.0, at(1.0)).unwrap();
            assert!(report.reward.is_empty());
            assert_eq!(report.hours, 0.0);
        }
        assert_eq!(engine.state(), &after_first);
    }

    #[test]
    fn settle_advances_by_capped_hours_only() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        let report = engine.settle(env, 0.0, at(10.0)).unwrap();

        assert_eq!(report.hours, 8.0);
        assert!(report.session_ended);
        assert!(!engine.is_collecting());
        assert_eq!(engine.state().last_settled_at, at(8.0));
        assert_eq!(engine.state().accumulated.gold, 800);
    }

    #[test]
    fn claim_keeps_session_running() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        let claim = engine.claim_rewards(env, 0.0, at(1.0)).unwrap();
        assert_eq!(claim.rewards.gold, 100);
        assert!(!claim.session_ended);
        assert!(engine.is_collecting());
        assert_eq!(engine.state().last_settled_at, at(1.0));
        assert!(engine.state().accumulated.is_empty());

        let err = engine.claim_rewards(env, 0.0, at(1.0)).unwrap_err();
        assert_eq!(err, AccrualError::NothingToClaim);
    }

    #[test]
    fn claim_after_session_cap_reports_end() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        let claim = engine.claim_rewards(env, 0.0, at(9.0)).unwrap();
        assert!(claim.session_ended);
        assert_eq!(claim.rewards.gold, 800);
    }

    #[test]
    fn stop_drains_and_deactivates() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        let reward = engine.stop_collect(env, 0.0, at(0.5)).unwrap();
        assert_eq!(reward.gold, 50);
        assert!(!engine.is_collecting());
        assert!(engine.state().accumulated.is_empty());
        assert_eq!(
            engine.stop_collect(env, 0.0, at(1.0)).unwrap_err(),
            AccrualError::NotCollecting
        );
    }

    #[test]
    fn duration_getter_is_pure() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        assert_eq!(engine.collecting_duration_ms(at(12.0)), 8 * MS_PER_HOUR);
        assert!(engine.is_collecting());

        assert!(engine.enforce_session_cap(env, 0.0, at(12.0)).unwrap());
        assert!(!engine.is_collecting());
        assert_eq!(engine.state().accumulated.gold, 800);
        assert!(!engine.enforce_session_cap(env, 0.0, at(13.0)).unwrap());
    }

    #[test]
    fn enforce_before_cap_does_nothing() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Balanced, T0)
            .unwrap();

        assert!(!engine.enforce_session_cap(env, 0.0, at(7.5)).unwrap());
        assert!(engine.is_collecting());
        assert!(engine.state().accumulated.is_empty());
    }

    #[test]
    fn preview_does_not_mutate() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        assert_eq!(
            engine.estimated_hourly_rewards(env, 0.0).unwrap_err(),
            AccrualError::NoSourceSelected
        );

        engine
            .start_collect(env, "robot_a", CollectMode::Gather, T0)
            .unwrap();
        let before = engine.state().clone();
        let preview = engine.estimated_hourly_rewards(env, 0.0).unwrap();

        assert_eq!(preview.gold, 150);
        assert_eq!(preview.exp, 40);
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn load_repairs_inverted_timestamps() {
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine.load(AccrualSave {
            state: CollectionState {
                is_collecting: true,
                started_at: at(2.0),
                last_settled_at: at(1.0),
                source_id: "robot_a".into(),
                ..CollectionState::default()
            },
            daily_collect_hours: f64::NAN,
            ..AccrualSave::default()
        });

        assert_eq!(engine.state().last_settled_at, at(2.0));
        assert_eq!(engine.daily().hours_consumed_today(), 0.0);
    }

    #[test]
    fn load_closes_session_stamped_before_epoch() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine.load(AccrualSave {
            state: CollectionState {
                is_collecting: true,
                started_at: Timestamp(i64::MIN),
                last_settled_at: Timestamp(i64::MIN),
                source_id: "robot_a".into(),
                ..CollectionState::default()
            },
            ..AccrualSave::default()
        });

        assert!(!engine.state().is_collecting);
        assert_eq!(engine.state().started_at, Timestamp::EPOCH);
        let report = engine.settle(env, 0.0, at(1.0)).unwrap();
        assert_eq!(report, SettleReport::default());
        assert_eq!(engine.collecting_duration_ms(Timestamp(i64::MAX)), 0);
    }

    #[test]
    fn load_closes_session_started_after_save() {
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        let accumulated = Reward {
            gold: 40,
            ..Reward::default()
        };
        engine.load(AccrualSave {
            state: CollectionState {
                is_collecting: true,
                started_at: at(5.0),
                last_settled_at: at(5.0),
                source_id: "robot_a".into(),
                accumulated: accumulated.clone(),
                ..CollectionState::default()
            },
            last_save_time: at(1.0),
            ..AccrualSave::default()
        });

        assert!(!engine.state().is_collecting);
        assert_eq!(engine.state().accumulated, accumulated);
        assert_eq!(engine.collecting_duration_ms(at(6.0)), 0);
    }

    #[test]
    fn load_keeps_session_consistent_with_save() {
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine.load(AccrualSave {
            state: CollectionState::started("robot_a", CollectMode::Gather, at(1.0)),
            last_save_time: at(2.0),
            ..AccrualSave::default()
        });

        assert!(engine.state().is_collecting);
        assert_eq!(engine.state().started_at, at(1.0));
    }

    #[test]
    fn serialize_then_load_restores_everything() {
        let table = table();
        let rng = FixedRng(0.5);
        let env = Env::new(&table, &rng);
        let mut engine = AccrualEngine::new(AccrualConfig::default(), 1);
        engine
            .start_collect(env, "robot_a", CollectMode::Gather, T0)
            .unwrap();
        engine.settle(env, 0.0, at(2.0)).unwrap();
        engine.record_boss_defeat("golem");

        let save = engine.serialize(at(2.0));
        let mut restored = AccrualEngine::new(AccrualConfig::default(), 2);
        restored.load(save.clone());

        assert_eq!(restored.state(), engine.state());
        assert_eq!(restored.daily(), engine.daily());
        assert_eq!(restored.bosses(), engine.bosses());
        assert_eq!(restored.last_save_time(), at(2.0));
        assert_eq!(save.defeated_bosses, vec!["golem".to_string()]);
    }
}
