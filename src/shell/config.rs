// Runtime configuration read from the environment (after `.env` is loaded).

use crate::modules::time_tracking::core::settings::TrackerSettings;
use anyhow::bail;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageMode,
    pub data_dir: PathBuf,
    pub tracker: TrackerSettings,
    pub search_debounce: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageMode::File,
            data_dir: PathBuf::from("./data"),
            tracker: TrackerSettings::default(),
            search_debounce: Duration::from_millis(150),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Unparsable numbers fall back to their defaults; an unknown storage mode is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let number = |name: &str, default: i64| {
            lookup(name)
                .and_then(|value| value.trim().parse::<i64>().ok())
                .filter(|value| *value > 0)
                .unwrap_or(default)
        };

        let storage = match lookup("TICKET_TIME_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("file") => StorageMode::File,
            Some("memory") => StorageMode::Memory,
            Some(other) => bail!("TICKET_TIME_STORAGE must be `file` or `memory`, got `{other}`"),
        };

        Ok(Self {
            host: lookup("TICKET_TIME_HOST").unwrap_or(defaults.host),
            port: lookup("TICKET_TIME_PORT")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.port),
            storage,
            data_dir: lookup("TICKET_TIME_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            tracker: TrackerSettings {
                snap_threshold_minutes: number(
                    "TICKET_TIME_SNAP_THRESHOLD_MINUTES",
                    defaults.tracker.snap_threshold_minutes,
                ),
                default_block_minutes: number(
                    "TICKET_TIME_DEFAULT_BLOCK_MINUTES",
                    defaults.tracker.default_block_minutes,
                ),
                now_snap_minutes: defaults.tracker.now_snap_minutes,
            },
            search_debounce: Duration::from_millis(
                number("TICKET_TIME_SEARCH_DEBOUNCE_MS", defaults.search_debounce.as_millis() as i64) as u64,
            ),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
