//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for the
//! collection session, battles, and event streams.
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use game_content::ContentBundle;
use game_core::{
    BattleReport, ClaimReport, CollectMode, PlayerState, Reward, SettleReport, SkillOutcome,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{BattleCommand, BattleTask, Command};

/// Capacity of a battle's command channel.
const BATTLE_COMMAND_BUFFER: usize = 8;

/// Read-only view of the collection session for UIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccrualStatus {
    pub is_collecting: bool,
    pub source_id: Option<String>,
    pub mode: CollectMode,
    /// Session length so far, clamped at the session cap.
    pub collecting_duration_ms: i64,
    pub remaining_daily_hours: f64,
    pub boss_multiplier: f64,
    pub bonus_percent: f64,
    /// Settled but not yet claimed.
    pub accumulated: Reward,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
    content: Arc<ContentBundle>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_bus: EventBus,
        content: Arc<ContentBundle>,
    ) -> Self {
        Self {
            command_tx,
            event_bus,
            content,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    // ========================================================================
    // Collection
    // ========================================================================

    pub async fn start_collect(&self, source_id: &str, mode: CollectMode) -> Result<()> {
        let source_id = source_id.to_string();
        self.request(|reply| Command::StartCollect {
            source_id,
            mode,
            reply,
        })
        .await?
    }

    pub async fn stop_collect(&self) -> Result<Reward> {
        self.request(|reply| Command::StopCollect { reply }).await?
    }

    pub async fn claim_rewards(&self) -> Result<ClaimReport> {
        self.request(|reply| Command::ClaimRewards { reply }).await?
    }

    /// Settles elapsed time now instead of waiting for the next tick.
    pub async fn settle(&self) -> Result<SettleReport> {
        self.request(|reply| Command::Settle { reply }).await?
    }

    /// One-hour reward preview for the selected source.
    pub async fn estimated_hourly_rewards(&self) -> Result<Reward> {
        self.request(|reply| Command::EstimateHourly { reply }).await?
    }

    pub async fn status(&self) -> Result<AccrualStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Sets the external equipment bonus applied to future settlements.
    pub async fn set_bonus_percent(&self, bonus_percent: f64) -> Result<()> {
        self.command_tx
            .send(Command::SetBonusPercent { bonus_percent })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Writes the save document now.
    pub async fn save(&self) -> Result<()> {
        self.request(|reply| Command::Save { reply }).await?
    }

    pub(crate) async fn shutdown_worker(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await?
    }

    // ========================================================================
    // Battles
    // ========================================================================

    /// Current player stats, or `None` while a battle is running.
    pub async fn player(&self) -> Result<Option<PlayerState>> {
        self.request(|reply| Command::QueryPlayer { reply }).await
    }

    /// Restores the player to full hp. Rejected while a battle runs.
    pub async fn rest(&self) -> Result<PlayerState> {
        self.request(|reply| Command::Rest { reply }).await?
    }

    /// Starts a battle against `enemy_id` with the configured crew.
    ///
    /// Only one battle runs at a time; the player is handed to the battle
    /// and returned when it ends. A player left at 0 hp by a defeat gets
    /// [`RuntimeError::PlayerDown`] until [`rest`](Self::rest) runs.
    pub async fn start_battle(&self, enemy_id: &str) -> Result<BattleHandle> {
        let enemy = self
            .content
            .enemy(enemy_id)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownEnemy {
                enemy_id: enemy_id.to_string(),
            })?;

        let (player, seed) = self
            .request(|reply| Command::CheckoutPlayer { reply })
            .await??;

        let (commands_tx, commands_rx) = mpsc::channel(BATTLE_COMMAND_BUFFER);
        let task = BattleTask {
            player,
            crew: self.content.crew.clone(),
            enemy,
            config: self.content.config.combat.clone(),
            seed,
            commands: commands_rx,
            session_tx: self.command_tx.clone(),
            event_bus: self.event_bus.clone(),
        };

        Ok(BattleHandle {
            enemy_id: enemy_id.to_string(),
            commands: commands_tx,
            task: tokio::spawn(task.run()),
        })
    }

    // ========================================================================
    // Events & content
    // ========================================================================

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Accrual` - Session starts, settlements, claims, caps, bosses
    /// - `Topic::Battle` - Battle start, every combat event, final report
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Static content the runtime was built with.
    pub fn content(&self) -> &ContentBundle {
        &self.content
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

/// Control over one running battle.
///
/// Dropping the handle escapes the battle.
#[derive(Debug)]
pub struct BattleHandle {
    enemy_id: String,
    commands: mpsc::Sender<BattleCommand>,
    task: JoinHandle<BattleReport>,
}

impl BattleHandle {
    pub fn enemy_id(&self) -> &str {
        &self.enemy_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Leaves the battle. The player keeps the hp it has now.
    pub async fn escape(&self) -> Result<()> {
        self.commands
            .send(BattleCommand::Escape)
            .await
            .map_err(|_| RuntimeError::BattleEnded)
    }

    /// Casts an equipped skill right away, for play with auto-combat off.
    pub async fn cast_skill(&self, skill_id: &str) -> Result<SkillOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(BattleCommand::CastSkill {
                skill_id: skill_id.to_string(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| RuntimeError::BattleEnded)?;

        let outcome = reply_rx.await.map_err(|_| RuntimeError::BattleEnded)??;
        Ok(outcome)
    }

    /// Waits for the battle to end and returns its report.
    pub async fn join(self) -> Result<BattleReport> {
        // Keep the command sender alive so waiting does not count as leaving.
        let BattleHandle {
            commands: _commands,
            task,
            ..
        } = self;
        task.await.map_err(RuntimeError::WorkerJoin)
    }
}
