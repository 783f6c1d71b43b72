//! Runtime orchestration for the idle game.
//!
//! This crate wires the pure engines from `game-core` to a clock, a save
//! repository, tokio timers and an event bus. Consumers build a [`Runtime`]
//! and drive it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`repository`] persists the save document
//! - [`clock`] supplies `now` to the accrual engine
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod clock;
pub mod config;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{AccrualStatus, BattleHandle, Result, RuntimeError, RuntimeHandle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use events::{AccrualEvent, BattleNotice, Event, EventBus, Topic};
pub use repository::{
    FileSaveRepository, GameSave, InMemorySaveRepo, RepositoryError, SaveRepository,
    decode_save, encode_save,
};
pub use runtime::{Runtime, RuntimeBuilder};
