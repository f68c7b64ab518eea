//! Server settings loaded from TOML
//!
//! Every key is optional. A missing file section falls back to defaults,
//! unknown keys are rejected so typos do not go unnoticed.
//!
//! ```toml
//! local-cluster-consistency = true
//!
//! [event-queue]
//! kind = "pooled"
//! pool-name = "remote_cache_event_queue"
//! max-failure = 3
//! wait-before-retry-ms = 500
//!
//! [thread-pool.default]
//! max-workers = 150
//! min-workers = 4
//! idle-timeout-ms = 300000
//!
//! [thread-pool.pools.remote_cache_event_queue]
//! max-workers = 20
//! boundary-size = 10000
//! when-blocked = "wait"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use crate::events::api::EventQueueSettings;
use crate::pool::api::PoolSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];
const LOG_FORMATS: &[&str] = &["text", "ext", "extended", "json"];

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid settings: {message}")]
    Invalid { message: String },

    #[error("Could not parse settings from {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("Could not read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl crate::core::error_handling::ContextualError for SettingsError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            SettingsError::Invalid { message } | SettingsError::Parse { message, .. } => {
                Some(message)
            }
            SettingsError::Io { .. } => Some("settings file could not be read"),
        }
    }
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServerSettings {
    /// Forward cluster-originated mutations to local listeners
    pub local_cluster_consistency: bool,
    pub event_queue: EventQueueSettings,
    pub thread_pool: PoolSettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn with_local_cluster_consistency(mut self, enabled: bool) -> Self {
        self.local_cluster_consistency = enabled;
        self
    }

    pub fn with_event_queue(mut self, event_queue: EventQueueSettings) -> Self {
        self.event_queue = event_queue;
        self
    }

    pub fn with_thread_pool(mut self, thread_pool: PoolSettings) -> Self {
        self.thread_pool = thread_pool;
        self
    }

    pub fn from_toml_str(text: &str) -> SettingsResult<Self> {
        Self::parse(text, "<string>")
    }

    fn parse(text: &str, origin: &str) -> SettingsResult<Self> {
        let settings: ServerSettings = toml::from_str(text).map_err(|e| SettingsError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate a settings file
    pub async fn load(path: &Path) -> SettingsResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let settings = Self::parse(&text, &path.display().to_string())?;
        log::info!("Loaded server settings from {}", path.display());
        Ok(settings)
    }

    /// `<config dir>/Remcache/remcache.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("Remcache").join("remcache.toml"))
    }

    /// Load the explicitly requested file, else the default file if it
    /// exists, else built-in defaults
    ///
    /// An explicit path that does not exist is an error.
    pub async fn discover(explicit: Option<&Path>) -> SettingsResult<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.exists()),
        };

        match path {
            Some(path) => Ok((Self::load(&path).await?, Some(path))),
            None => {
                log::debug!("No settings file found, using defaults");
                Ok((Self::default(), None))
            }
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        let invalid = |message: String| SettingsError::Invalid { message };

        self.thread_pool
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        self.event_queue
            .validate()
            .map_err(|e| invalid(e.to_string()))?;

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(invalid(format!(
                    "unknown log level '{}' (expected one of {})",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }
        if let Some(format) = &self.logging.format {
            if !LOG_FORMATS.contains(&format.to_ascii_lowercase().as_str()) {
                return Err(invalid(format!(
                    "unknown log format '{}' (expected one of {})",
                    format,
                    LOG_FORMATS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
