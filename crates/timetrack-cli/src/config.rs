//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use timetrack_core::{DEFAULT_LIMIT, EngineConfig};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
    /// Result cap for period queries without a usable limit.
    pub default_limit: u32,
    /// Bound on each background reconciliation call, in milliseconds.
    pub reconcile_timeout_ms: u64,
    /// Bound on each command's engine call, in milliseconds.
    pub request_timeout_ms: u64,
    /// Insert the default categories into an empty database.
    pub seed_categories: bool,
    /// Fixed offset such as `+02:00` for period boundaries and display.
    /// Unset means the system's local time zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("default_limit", &self.default_limit)
            .field("reconcile_timeout_ms", &self.reconcile_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("seed_categories", &self.seed_categories)
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("timetrack.db"),
            default_limit: DEFAULT_LIMIT,
            reconcile_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            seed_categories: true,
            utc_offset: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TIMETRACK_DATABASE_PATH, TIMETRACK_DEFAULT_LIMIT, ...
        figment = figment.merge(Env::prefixed("TIMETRACK_"));

        figment.extract()
    }

    /// Parses `utc_offset`, if set.
    pub fn offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset
            .as_deref()
            .map(|raw| {
                raw.parse::<FixedOffset>()
                    .with_context(|| format!("invalid utc_offset {raw:?} (expected e.g. +02:00)"))
            })
            .transpose()
    }

    /// Engine tunables derived from this configuration.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            default_limit: self.default_limit,
            reconcile_timeout: Duration::from_millis(self.reconcile_timeout_ms),
            utc_offset: self.offset()?,
        })
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Returns the platform-specific config directory for timetrack.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timetrack"))
}

/// Returns the platform-specific data directory for timetrack.
///
/// On Linux: `~/.local/share/timetrack`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("timetrack"))
}
