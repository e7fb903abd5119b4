//! Configuration loading.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag; must exist)
//! 2. `~/.trivia-supply/config.toml` (user)
//! 3. built-in defaults
//!
//! Only wiring is configurable (where to store, which generator). Cache
//! policies are fixed constants of the [`cache`](crate::cache) and
//! [`prefetch`](crate::prefetch) modules.
//!
//! The Gemini API key is never read from the config file; it comes from
//! the `GEMINI_API_KEY` environment variable.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::generator::{RetryConfig, endpoint, gemini};
use crate::store::FileStore;
use crate::supply::SupplyBuilder;
use crate::{Result, SupplyError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Where persistent state lives.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Store directory (default: `<data dir>/trivia-supply`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Keep everything in memory instead (default: false).
    #[serde(default)]
    pub in_memory: bool,
}

/// Which backend generates questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    /// The game server's `/api/generate_question` route.
    #[default]
    Endpoint,
    /// Gemini, called directly.
    Gemini,
}

/// Generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub kind: GeneratorKind,
    /// Game server base URL (default: http://127.0.0.1:5000).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Gemini model (default: gemini-2.5-flash).
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kind: GeneratorKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    endpoint::DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    gemini::DEFAULT_MODEL.to_string()
}

fn default_timeout() -> u64 {
    endpoint::DEFAULT_TIMEOUT.as_secs()
}

/// Transport-level retry of generator calls.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySettings {
    /// Attempts including the first (default: 1, i.e. no retry).
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Base backoff in milliseconds (default: 500).
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_attempts(),
            initial_delay_ms: default_initial_delay(),
        }
    }
}

fn default_attempts() -> u32 {
    1
}

fn default_initial_delay() -> u64 {
    500
}

impl From<&RetrySettings> for RetryConfig {
    fn from(settings: &RetrySettings) -> Self {
        RetryConfig::new()
            .max_attempts(settings.max_attempts)
            .initial_delay(std::time::Duration::from_millis(settings.initial_delay_ms))
    }
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| SupplyError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SupplyError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SupplyError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SupplyError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".trivia-supply").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }

    /// Effective store directory.
    pub fn store_dir(&self) -> PathBuf {
        self.store.dir.clone().unwrap_or_else(FileStore::default_dir)
    }

    /// Translate into a builder. Reads `GEMINI_API_KEY` for the Gemini backend.
    pub fn builder(&self) -> Result<SupplyBuilder> {
        self.builder_with_key(std::env::var(gemini::API_KEY_ENV).ok())
    }

    fn builder_with_key(&self, gemini_key: Option<String>) -> Result<SupplyBuilder> {
        let mut builder = SupplyBuilder::new()
            .timeout(self.generator.timeout_secs)
            .retry((&self.retry).into());

        builder = if self.store.in_memory {
            builder.memory_store()
        } else {
            builder.file_store(self.store_dir())
        };

        builder = match self.generator.kind {
            GeneratorKind::Endpoint => builder.endpoint(self.generator.endpoint.clone()),
            GeneratorKind::Gemini => {
                let key = gemini_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    SupplyError::Configuration(format!(
                        "{} is not set; required for the gemini generator",
                        gemini::API_KEY_ENV
                    ))
                })?;
                builder.gemini(key).gemini_model(self.generator.model.clone())
            }
        };
        Ok(builder)
    }
}
