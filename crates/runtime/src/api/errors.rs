//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the engines, worker coordination and repositories so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{AccrualError, ErrorKind, GameError, SkillError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Accrual(#[from] AccrualError),

    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error("unknown enemy '{enemy_id}'")]
    UnknownEnemy { enemy_id: String },

    #[error("a battle is already in progress")]
    BattleInProgress,

    #[error("the player is down; rest before the next battle")]
    PlayerDown,

    #[error("the battle has already ended")]
    BattleEnded,

    #[error("session worker command channel closed")]
    CommandChannelClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("failed to load content: {0}")]
    Content(String),
}

impl RuntimeError {
    /// Business-level classification, when the error came from an engine.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            RuntimeError::Accrual(e) => Some(e.kind()),
            RuntimeError::Skill(e) => Some(e.kind()),
            RuntimeError::UnknownEnemy { .. } => Some(ErrorKind::NotFound),
            RuntimeError::BattleInProgress | RuntimeError::PlayerDown => {
                Some(ErrorKind::PreconditionFailed)
            }
            RuntimeError::BattleEnded => Some(ErrorKind::NoOp),
            _ => None,
        }
    }
}
