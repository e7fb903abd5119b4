//! Builder for configuring supply instances

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::QuestionSupply;
use crate::generator::{EndpointGenerator, GeminiGenerator, RetryConfig, RetryingGenerator};
use crate::store::{DurableStore, FileStore, MemoryStore};
use crate::traits::QuestionGenerator;
use crate::{Result, SupplyError};

enum StoreChoice {
    Custom(Arc<dyn DurableStore>),
    Memory,
    Directory(PathBuf),
}

enum GeneratorChoice {
    Custom(Arc<dyn QuestionGenerator>),
    Endpoint(String),
    Gemini { api_key: String, model: Option<String> },
}

/// Builder for configuring supply instances.
///
/// ```rust,no_run
/// # fn main() -> trivia_supply::Result<()> {
/// use trivia_supply::QuestionSupply;
///
/// let supply = QuestionSupply::builder()
///     .file_store("/tmp/trivia")
///     .endpoint("http://127.0.0.1:5000")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SupplyBuilder {
    store: Option<StoreChoice>,
    generator: Option<GeneratorChoice>,
    timeout: Option<Duration>,
    retry: RetryConfig,
}

impl SupplyBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            generator: None,
            timeout: None,
            retry: RetryConfig::disabled(),
        }
    }

    /// Use an existing store.
    pub fn store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(StoreChoice::Custom(store));
        self
    }

    /// Keep everything in memory.
    pub fn memory_store(mut self) -> Self {
        self.store = Some(StoreChoice::Memory);
        self
    }

    /// Persist to JSON files in `dir`.
    pub fn file_store(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store = Some(StoreChoice::Directory(dir.into()));
        self
    }

    /// Use an existing generator.
    pub fn generator(mut self, generator: Arc<dyn QuestionGenerator>) -> Self {
        self.generator = Some(GeneratorChoice::Custom(generator));
        self
    }

    /// Generate through the game server at `base_url`.
    pub fn endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.generator = Some(GeneratorChoice::Endpoint(base_url.into()));
        self
    }

    /// Generate directly through Gemini.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.generator = Some(GeneratorChoice::Gemini {
            api_key: api_key.into(),
            model: None,
        });
        self
    }

    /// Override the Gemini model. Ignored for other generators.
    pub fn gemini_model(mut self, model: impl Into<String>) -> Self {
        if let Some(GeneratorChoice::Gemini { model: slot, .. }) = self.generator.as_mut() {
            *slot = Some(model.into());
        }
        self
    }

    /// Set the request timeout for built-in HTTP generators (seconds).
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Retry transient generator failures. Default: no retry.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Build the supply.
    pub fn build(self) -> Result<QuestionSupply> {
        let store: Arc<dyn DurableStore> = match self.store {
            Some(StoreChoice::Custom(store)) => store,
            Some(StoreChoice::Memory) => Arc::new(MemoryStore::new()),
            Some(StoreChoice::Directory(dir)) => Arc::new(FileStore::open(dir)?),
            None => {
                return Err(SupplyError::Configuration("no store configured".into()));
            }
        };

        let timeout = self.timeout.unwrap_or(crate::generator::endpoint::DEFAULT_TIMEOUT);
        let generator: Arc<dyn QuestionGenerator> = match self.generator {
            Some(GeneratorChoice::Custom(generator)) => generator,
            Some(GeneratorChoice::Endpoint(url)) => {
                Arc::new(EndpointGenerator::with_timeout(url, timeout)?)
            }
            Some(GeneratorChoice::Gemini { api_key, model }) => {
                let http = reqwest::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| {
                        SupplyError::Configuration(format!("failed to build HTTP client: {e}"))
                    })?;
                let mut gemini = GeminiGenerator::new(api_key)?.http_client(http);
                if let Some(model) = model {
                    gemini = gemini.model(model);
                }
                Arc::new(gemini)
            }
            None => {
                return Err(SupplyError::Configuration(
                    "no question generator configured".into(),
                ));
            }
        };

        let generator: Arc<dyn QuestionGenerator> = if self.retry.max_attempts > 1 {
            Arc::new(RetryingGenerator::new(generator, self.retry))
        } else {
            generator
        };

        Ok(QuestionSupply::new(store, generator))
    }
}

impl Default for SupplyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
