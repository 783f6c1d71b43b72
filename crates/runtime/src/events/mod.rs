//! Topic-based event bus for runtime events.
//!
//! Accrual and battle notifications go to separate topics so a consumer can
//! follow one without draining the other.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AccrualEvent, BattleNotice};
