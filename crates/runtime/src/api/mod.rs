//! Public runtime API surface.
//!
//! Re-exports the error types and the handles that front-ends use to drive
//! collection sessions and battles.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::{AccrualStatus, BattleHandle, RuntimeHandle};
