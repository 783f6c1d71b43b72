//! Background tasks owned by the runtime.
//!
//! - [`SessionWorker`] owns the accrual engine and the persistent player
//! - [`BattleTask`] drives one battle on three tokio intervals

mod battle;
mod session;

pub(crate) use battle::{BattleCommand, BattleTask};
pub(crate) use session::{Command, SessionWorker};
