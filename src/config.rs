//! Application-level configuration loading, including room expiry tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_LIVE_BACK_CONFIG_PATH";

/// Default cap on questions pulled into a multiplayer room.
const DEFAULT_QUESTIONS_PER_ROOM: usize = 10;
/// Default room lifetime before the expiry sweep collects it.
const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Default interval between expiry sweeps.
const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Maximum number of questions selected into a room at creation.
    pub questions_per_room: usize,
    /// How long a room record lives before the sweep removes it.
    pub room_ttl: Duration,
    /// How often the expiry sweep runs.
    pub reap_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the
    /// built-in defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        questions_per_room = app_config.questions_per_room,
                        room_ttl_seconds = app_config.room_ttl.as_secs(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            questions_per_room: DEFAULT_QUESTIONS_PER_ROOM,
            room_ttl: DEFAULT_ROOM_TTL,
            reap_interval: DEFAULT_REAP_INTERVAL,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    questions_per_room: Option<usize>,
    room_ttl_seconds: Option<u64>,
    reap_interval_seconds: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            questions_per_room: value
                .questions_per_room
                .unwrap_or(defaults.questions_per_room),
            room_ttl: value
                .room_ttl_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.room_ttl),
            reap_interval: value
                .reap_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.reap_interval),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
