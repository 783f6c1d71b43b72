//! Runtime configuration and its environment loader.
use std::env;
use std::path::PathBuf;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Save slot name; becomes `{profile}.json` in the save directory.
    pub profile: String,
    /// Save directory override; platform data dir when unset.
    pub save_dir: Option<PathBuf>,
    /// Content directory override; the bundled data set when unset.
    pub content_dir: Option<PathBuf>,
    /// Fixed session seed for reproducible runs; random when unset.
    pub seed: Option<u64>,
    /// External equipment bonus applied to accrual rewards.
    pub bonus_percent: f64,
    pub enable_persistence: bool,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Period of the accrual tick.
    pub tick_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            save_dir: None,
            content_dir: None,
            seed: None,
            bonus_percent: 0.0,
            enable_persistence: false,
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_interval_ms: 1_000,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `IDLE_PROFILE` - Save slot name (default: `default`)
    /// - `IDLE_SAVE_DIR` - Directory for save files; also enables persistence
    /// - `IDLE_PERSIST` - Enable persistence in the platform data dir (default: false)
    /// - `IDLE_CONTENT_DIR` - Directory with content data files
    /// - `IDLE_SEED` - Fixed seed for reproducible sessions
    /// - `IDLE_BONUS_PERCENT` - Equipment bonus percent (default: 0)
    /// - `IDLE_EVENT_CAPACITY` - Event bus capacity per topic (default: 100)
    /// - `IDLE_TICK_MS` - Accrual tick period (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(profile) = env::var("IDLE_PROFILE")
            && !profile.is_empty()
        {
            config.profile = profile;
        }

        if let Some(enable) = read_env_bool("IDLE_PERSIST") {
            config.enable_persistence = enable;
        }
        if let Ok(dir) = env::var("IDLE_SAVE_DIR") {
            config.save_dir = Some(PathBuf::from(dir));
            config.enable_persistence = true;
        }

        config.content_dir = env::var("IDLE_CONTENT_DIR").ok().map(PathBuf::from);
        config.seed = read_env::<u64>("IDLE_SEED");

        if let Some(bonus) = read_env::<f64>("IDLE_BONUS_PERCENT")
            && bonus.is_finite()
        {
            config.bonus_percent = bonus;
        }
        if let Some(capacity) = read_env::<usize>("IDLE_EVENT_CAPACITY") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(tick) = read_env::<u64>("IDLE_TICK_MS") {
            config.tick_interval_ms = tick.max(1);
        }

        config
    }

    /// Save directory, falling back to the platform data directory.
    ///
    /// - macOS: `~/Library/Application Support/idle-rpg/saves`
    /// - Linux: `~/.local/share/idle-rpg/saves` (or `$XDG_DATA_HOME`)
    /// - Windows: `%APPDATA%\idle-rpg\saves`
    /// - Fallback: `./save_data`
    pub fn resolved_save_dir(&self) -> PathBuf {
        if let Some(dir) = &self.save_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("", "", "idle-rpg")
            .map(|dirs| dirs.data_dir().join("saves"))
            .unwrap_or_else(|| PathBuf::from("./save_data"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
