//! High-level runtime orchestrator.
//!
//! The runtime loads content and the save, owns the session worker, and
//! exposes a builder-based API for clients.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use game_content::{ContentBundle, ContentFactory, default_data_dir};
use game_core::AccrualEngine;

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::clock::{Clock, SystemClock};
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, Topic};
use crate::repository::{FileSaveRepository, InMemorySaveRepo, SaveRepository};
use crate::workers::{Command, SessionWorker};

/// Main runtime that owns the session worker.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Subscribe to events from one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Saves and stops the session worker.
    pub async fn shutdown(self) -> Result<()> {
        let saved = self.handle.shutdown_worker().await;
        drop(self.handle);

        self.worker_handle.await.map_err(RuntimeError::WorkerJoin)?;
        saved
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    content: Option<ContentBundle>,
    repository: Option<Arc<dyn SaveRepository>>,
    clock: Option<Arc<dyn Clock>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            content: None,
            repository: None,
            clock: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use already loaded content instead of reading the content directory
    pub fn content(mut self, content: ContentBundle) -> Self {
        self.content = Some(content);
        self
    }

    /// Set a custom save repository
    pub fn repository(mut self, repository: impl SaveRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Set a custom clock (tests use [`ManualClock`](crate::ManualClock))
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the runtime and start the session worker
    pub async fn build(self) -> Result<Runtime> {
        let config = self.config;

        let content = match self.content {
            Some(content) => content,
            None => {
                let dir = config.content_dir.clone().unwrap_or_else(default_data_dir);
                ContentFactory::new(dir)
                    .load_all()
                    .map_err(|e| RuntimeError::Content(format!("{:#}", e)))?
            }
        };

        let repository: Arc<dyn SaveRepository> = match self.repository {
            Some(repository) => repository,
            None if config.enable_persistence => {
                Arc::new(FileSaveRepository::new(config.resolved_save_dir())?)
            }
            None => Arc::new(InMemorySaveRepo::new()),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let seed = config.seed.unwrap_or_else(rand::random);

        let mut engine = AccrualEngine::new(content.config.accrual.clone(), seed);
        let mut player = match repository.load(&config.profile) {
            Ok(Some(save)) => {
                info!("Loaded save for profile {}", config.profile);
                engine.load(save.accrual);
                save.player
            }
            Ok(None) => {
                info!("No save for profile {}, starting fresh", config.profile);
                content.player.clone()
            }
            Err(e) => {
                warn!(
                    "Failed to load save for profile {}: {}; starting fresh",
                    config.profile, e
                );
                content.player.clone()
            }
        };
        // Gear capabilities come from content, never from the save.
        player.capabilities = content.player.capabilities;
        engine.check_daily_reset(clock.now());

        let content = Arc::new(content);
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size.max(1));

        let worker = SessionWorker::new(
            engine,
            player,
            Arc::clone(&content),
            clock,
            repository,
            config.profile.clone(),
            config.bonus_percent,
            seed,
            Duration::from_millis(config.tick_interval_ms),
            command_rx,
            event_bus.clone(),
        );
        let worker_handle = tokio::spawn(worker.run());

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus, content),
            worker_handle,
        })
    }
}
