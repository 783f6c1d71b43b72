//! Session worker that owns the [`AccrualEngine`] and the [`PlayerState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs the
//! periodic accrual tick and persists the save document after every change
//! a player would not want to lose.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use game_content::ContentBundle;
use game_core::{
    AccrualEngine, BattleReport, ClaimReport, CollectMode, Env, PcgRng, PlayerState, Reward,
    SettleReport, Timestamp, UnitTemplate, compute_seed,
};

use crate::api::{AccrualStatus, Result, RuntimeError};
use crate::clock::Clock;
use crate::events::{AccrualEvent, EventBus};
use crate::repository::{GameSave, SaveRepository};

/// Seed context for battle seeds derived from the session seed.
const BATTLE_CONTEXT: u32 = 0xBA77;

/// Commands that can be sent to the session worker
pub(crate) enum Command {
    StartCollect {
        source_id: String,
        mode: CollectMode,
        reply: oneshot::Sender<Result<()>>,
    },
    StopCollect {
        reply: oneshot::Sender<Result<Reward>>,
    },
    ClaimRewards {
        reply: oneshot::Sender<Result<ClaimReport>>,
    },
    Settle {
        reply: oneshot::Sender<Result<SettleReport>>,
    },
    EstimateHourly {
        reply: oneshot::Sender<Result<Reward>>,
    },
    Status {
        reply: oneshot::Sender<AccrualStatus>,
    },
    SetBonusPercent {
        bonus_percent: f64,
    },
    /// Snapshot of the player; `None` while a battle holds it.
    QueryPlayer {
        reply: oneshot::Sender<Option<PlayerState>>,
    },
    /// Restores the player to full hp outside of battle.
    Rest {
        reply: oneshot::Sender<Result<PlayerState>>,
    },
    /// Hands the player to a battle together with that battle's seed.
    CheckoutPlayer {
        reply: oneshot::Sender<Result<(PlayerState, u64)>>,
    },
    BattleFinished {
        player: PlayerState,
        enemy: UnitTemplate,
        report: BattleReport,
    },
    Save {
        reply: oneshot::Sender<Result<()>>,
    },
    Shutdown {
        reply: oneshot::Sender<Result<()>>,
    },
}

pub(crate) struct SessionWorker {
    engine: AccrualEngine,
    /// Last committed player. While a battle runs this is the pre-battle
    /// snapshot that saves fall back to.
    player: PlayerState,
    battle_active: bool,
    content: Arc<ContentBundle>,
    rng: PcgRng,
    clock: Arc<dyn Clock>,
    repository: Arc<dyn SaveRepository>,
    profile: String,
    bonus_percent: f64,
    seed: u64,
    battles: u64,
    tick_interval: Duration,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl SessionWorker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        engine: AccrualEngine,
        player: PlayerState,
        content: Arc<ContentBundle>,
        clock: Arc<dyn Clock>,
        repository: Arc<dyn SaveRepository>,
        profile: String,
        bonus_percent: f64,
        seed: u64,
        tick_interval: Duration,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
    ) -> Self {
        info!(
            "SessionWorker initialized for profile {}: collecting={}, bosses={}",
            profile,
            engine.is_collecting(),
            engine.bosses().count()
        );

        Self {
            engine,
            player,
            battle_active: false,
            content,
            rng: PcgRng,
            clock,
            repository,
            profile,
            bonus_percent,
            seed,
            battles: 0,
            tick_interval,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or when every sender
    /// is gone.
    pub(crate) async fn run(mut self) {
        let period = self.tick_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command) {
                            break;
                        }
                    }
                    None => {
                        if let Err(e) = self.persist() {
                            warn!("Final save failed: {}", e);
                        }
                        break;
                    }
                },
                _ = ticker.tick() => self.on_tick(),
            }
        }

        info!("SessionWorker stopped");
    }

    /// Returns false once the worker should stop.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::StartCollect {
                source_id,
                mode,
                reply,
            } => {
                let result = self.start_collect(&source_id, mode);
                send(reply, result, "StartCollect");
            }
            Command::StopCollect { reply } => {
                let result = self.stop_collect();
                send(reply, result, "StopCollect");
            }
            Command::ClaimRewards { reply } => {
                let result = self.claim_rewards();
                send(reply, result, "ClaimRewards");
            }
            Command::Settle { reply } => {
                let now = self.clock.now();
                let result = self.settle(now);
                send(reply, result, "Settle");
            }
            Command::EstimateHourly { reply } => {
                let env = Env::new(&self.content.rewards, &self.rng);
                let result = self
                    .engine
                    .estimated_hourly_rewards(env, self.bonus_percent)
                    .map_err(RuntimeError::from);
                send(reply, result, "EstimateHourly");
            }
            Command::Status { reply } => {
                let status = self.status();
                send(reply, status, "Status");
            }
            Command::SetBonusPercent { bonus_percent } => {
                debug!("Equipment bonus set to {}%", bonus_percent);
                self.bonus_percent = bonus_percent;
            }
            Command::QueryPlayer { reply } => {
                let player = (!self.battle_active).then(|| self.player.clone());
                send(reply, player, "QueryPlayer");
            }
            Command::Rest { reply } => {
                let result = self.rest();
                send(reply, result, "Rest");
            }
            Command::CheckoutPlayer { reply } => {
                let result = self.checkout_player();
                send(reply, result, "CheckoutPlayer");
            }
            Command::BattleFinished {
                player,
                enemy,
                report,
            } => self.battle_finished(player, &enemy, &report),
            Command::Save { reply } => {
                let result = self.persist();
                send(reply, result, "Save");
            }
            Command::Shutdown { reply } => {
                let result = self.persist();
                send(reply, result, "Shutdown");
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Accrual
    // ========================================================================

    fn start_collect(&mut self, source_id: &str, mode: CollectMode) -> Result<()> {
        let now = self.clock.now();
        self.engine.check_daily_reset(now);

        let env = Env::new(&self.content.rewards, &self.rng);
        self.engine.start_collect(env, source_id, mode, now)?;

        info!("Collection started on {} ({})", source_id, mode);
        self.event_bus.publish(AccrualEvent::Started {
            source_id: source_id.to_string(),
            mode,
            at: now,
        });
        self.persist()
    }

    fn stop_collect(&mut self) -> Result<Reward> {
        let now = self.clock.now();
        let env = Env::new(&self.content.rewards, &self.rng);
        let reward = self.engine.stop_collect(env, self.bonus_percent, now)?;

        info!(
            "Collection stopped: gold={}, exp={}, materials={}",
            reward.gold,
            reward.exp,
            reward.materials.len()
        );
        self.event_bus.publish(AccrualEvent::Stopped {
            reward: reward.clone(),
        });
        self.persist()?;
        Ok(reward)
    }

    fn claim_rewards(&mut self) -> Result<ClaimReport> {
        let now = self.clock.now();
        let env = Env::new(&self.content.rewards, &self.rng);
        let report = self.engine.claim_rewards(env, self.bonus_percent, now)?;

        info!(
            "Rewards claimed: gold={}, exp={}, session_ended={}",
            report.rewards.gold, report.rewards.exp, report.session_ended
        );
        self.event_bus.publish(AccrualEvent::Claimed {
            reward: report.rewards.clone(),
            session_ended: report.session_ended,
        });
        self.persist()?;
        Ok(report)
    }

    fn settle(&mut self, now: Timestamp) -> Result<SettleReport> {
        let env = Env::new(&self.content.rewards, &self.rng);
        let report = self.engine.settle(env, self.bonus_percent, now)?;

        if report.hours > 0.0 {
            debug!(
                "Settled {:.4}h: gold={}, exp={}",
                report.hours, report.reward.gold, report.reward.exp
            );
            self.event_bus.publish(AccrualEvent::Settled {
                hours: report.hours,
                reward: report.reward.clone(),
            });
        }
        if report.session_ended {
            self.session_ended(now);
        }
        Ok(report)
    }

    /// Periodic tick: daily rollover, lazy settlement, then the session cap.
    ///
    /// Tick settlements are not saved on their own: the save keeps the older
    /// settlement point, and settling again after a reload covers the same
    /// span exactly once.
    fn on_tick(&mut self) {
        let now = self.clock.now();

        if self.engine.check_daily_reset(now) {
            let date = self.engine.today(now);
            info!("Daily collection cap reset for {}", date);
            self.event_bus.publish(AccrualEvent::DailyReset { date });
        }

        if !self.engine.is_collecting() {
            return;
        }
        if let Err(e) = self.settle(now) {
            warn!("Tick settlement failed: {}", e);
        }

        let env = Env::new(&self.content.rewards, &self.rng);
        match self.engine.enforce_session_cap(env, self.bonus_percent, now) {
            Ok(true) => self.session_ended(now),
            Ok(false) => {}
            Err(e) => warn!("Session cap enforcement failed: {}", e),
        }
    }

    fn session_ended(&mut self, now: Timestamp) {
        info!("Collection session reached its cap");
        self.event_bus.publish(AccrualEvent::SessionEnded { at: now });
        if let Err(e) = self.persist() {
            warn!("Save after session end failed: {}", e);
        }
    }

    fn status(&self) -> AccrualStatus {
        let now = self.clock.now();
        let state = self.engine.state();
        AccrualStatus {
            is_collecting: state.is_collecting,
            source_id: (!state.source_id.is_empty()).then(|| state.source_id.clone()),
            mode: state.mode,
            collecting_duration_ms: self.engine.collecting_duration_ms(now),
            remaining_daily_hours: self.engine.remaining_daily_hours(now),
            boss_multiplier: self.engine.boss_multiplier(),
            bonus_percent: self.bonus_percent,
            accumulated: state.accumulated.clone(),
        }
    }

    // ========================================================================
    // Battles
    // ========================================================================

    fn checkout_player(&mut self) -> Result<(PlayerState, u64)> {
        if self.battle_active {
            return Err(RuntimeError::BattleInProgress);
        }
        if !self.player.is_alive() {
            return Err(RuntimeError::PlayerDown);
        }
        let seed = compute_seed(self.seed, self.battles, 0, BATTLE_CONTEXT);
        self.battles += 1;
        self.battle_active = true;
        Ok((self.player.clone(), seed))
    }

    fn rest(&mut self) -> Result<PlayerState> {
        if self.battle_active {
            return Err(RuntimeError::BattleInProgress);
        }
        self.player.rest();
        info!("Player rested to {}/{} hp", self.player.hp, self.player.max_hp);
        self.persist()?;
        Ok(self.player.clone())
    }

    fn battle_finished(&mut self, player: PlayerState, enemy: &UnitTemplate, report: &BattleReport) {
        info!(
            "Battle against {} ended: {} after {}ms (hp {}/{})",
            enemy.id, report.phase, report.elapsed_ms, player.hp, player.max_hp
        );
        self.player = player;
        self.battle_active = false;

        if report.is_victory() {
            for boss_id in &report.defeated_bosses {
                if self.engine.record_boss_defeat(boss_id) {
                    let multiplier = self.engine.boss_multiplier();
                    info!("Boss {} defeated, reward multiplier now {:.2}", boss_id, multiplier);
                    self.event_bus.publish(AccrualEvent::BossRecorded {
                        boss_id: boss_id.clone(),
                        multiplier,
                    });
                }
            }
        }

        if let Err(e) = self.persist() {
            warn!("Save after battle failed: {}", e);
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    fn persist(&mut self) -> Result<()> {
        if self.battle_active {
            debug!("Saving pre-battle player snapshot while a battle runs");
        }
        let now = self.clock.now();
        let save = GameSave::new(self.engine.serialize(now), self.player.clone());
        self.repository.save(&self.profile, &save)?;
        Ok(())
    }
}

fn send<T>(reply: oneshot::Sender<T>, value: T, command: &str) {
    if reply.send(value).is_err() {
        debug!("{} reply channel closed (caller dropped)", command);
    }
}
