//! Tokio driver for one battle.
//!
//! The scheduler's three cadences become three [`tokio::time::Interval`]s
//! raced in a `select!`. Which timer wins a simultaneous deadline is up to
//! tokio; the scheduler does not depend on the order.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use game_core::{
    BattleReport, CombatConfig, CombatScheduler, PcgRng, PlayerState, SkillError, SkillOutcome,
    TimerKind, UnitTemplate,
};

use super::session::Command;
use crate::events::{BattleNotice, EventBus};

/// Player input delivered to a running battle.
pub(crate) enum BattleCommand {
    Escape,
    CastSkill {
        skill_id: String,
        reply: oneshot::Sender<Result<SkillOutcome, SkillError>>,
    },
}

pub(crate) struct BattleTask {
    pub(crate) player: PlayerState,
    pub(crate) crew: Vec<UnitTemplate>,
    pub(crate) enemy: UnitTemplate,
    pub(crate) config: CombatConfig,
    pub(crate) seed: u64,
    pub(crate) commands: mpsc::Receiver<BattleCommand>,
    pub(crate) session_tx: mpsc::Sender<Command>,
    pub(crate) event_bus: EventBus,
}

impl BattleTask {
    /// Runs the battle to a terminal phase, then hands the player back to
    /// the session worker.
    ///
    /// A closed command channel counts as leaving the battle screen and
    /// escapes.
    pub(crate) async fn run(self) -> BattleReport {
        let BattleTask {
            mut player,
            crew,
            enemy,
            config,
            seed,
            mut commands,
            session_tx,
            event_bus,
        } = self;

        info!("Battle started against {} (boss={})", enemy.id, enemy.is_boss);
        event_bus.publish(BattleNotice::Started {
            enemy_id: enemy.id.clone(),
            is_boss: enemy.is_boss,
        });

        let rng = PcgRng;
        let report = {
            let scheduler = CombatScheduler::start(&mut player, &crew, &enemy, &config, &rng, seed);
            drive(scheduler, &mut commands, &event_bus).await
        };

        event_bus.publish(BattleNotice::Finished(report.clone()));

        let handoff = Command::BattleFinished {
            player,
            enemy,
            report: report.clone(),
        };
        if session_tx.send(handoff).await.is_err() {
            warn!("Session worker stopped before the battle ended; battle hp changes are lost");
        }
        report
    }
}

async fn drive(
    mut scheduler: CombatScheduler<'_>,
    commands: &mut mpsc::Receiver<BattleCommand>,
    event_bus: &EventBus,
) -> BattleReport {
    let cadence = scheduler.cadence();
    let started = Instant::now();
    let mut player_timer = repeating(started, cadence.player_ms);
    let mut enemy_timer = repeating(started, cadence.enemy_ms);
    let mut cooldown_timer = repeating(started, cadence.cooldown_ms);

    loop {
        publish_events(&mut scheduler, event_bus);
        if scheduler.is_over() {
            break;
        }

        tokio::select! {
            _ = player_timer.tick() => {
                scheduler.fire(TimerKind::Player);
            }
            _ = enemy_timer.tick() => {
                scheduler.fire(TimerKind::Enemy);
            }
            _ = cooldown_timer.tick() => {
                scheduler.fire(TimerKind::Cooldown);
            }
            command = commands.recv() => match command {
                Some(BattleCommand::CastSkill { skill_id, reply }) => {
                    let result = scheduler.cast_skill(&skill_id);
                    if reply.send(result).is_err() {
                        debug!("CastSkill reply channel closed (caller dropped)");
                    }
                }
                Some(BattleCommand::Escape) | None => {
                    scheduler.escape();
                }
            },
        }

        scheduler.set_elapsed(started.elapsed().as_millis() as u64);
    }

    // Terminal transitions already disarm; this covers any other exit path.
    scheduler.teardown();
    publish_events(&mut scheduler, event_bus);
    scheduler.report()
}

fn repeating(start: Instant, period_ms: u64) -> Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let mut interval = tokio::time::interval_at(start + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn publish_events(scheduler: &mut CombatScheduler<'_>, event_bus: &EventBus) {
    for event in scheduler.drain_events() {
        event_bus.publish(BattleNotice::Combat(event));
    }
}
