//! Question acquisition orchestration.
//!
//! [`QuestionSupply`] hands a new game exactly the questions it needs,
//! trying the cheapest source first:
//!
//! 1. **Pool**: draw from the persistent pool, excluding seen ids.
//! 2. **Prefetch**: the background batch for these settings, if fresh and
//!    large enough. It is also merged into the pool in the background.
//! 3. **Remote**: a direct generator call. Its result is merged into the
//!    pool. Any error here aborts the game start; there is no fourth tier.
//!
//! Whichever tier wins, the set is marked seen and written to the per-game
//! rounds store as rounds `1..=N`.

mod builder;

pub use builder::SupplyBuilder;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::cache::{PoolCache, SeenTracker};
use crate::prefetch::{PrefetchController, PrefetchOutcome};
use crate::rounds::GameRounds;
use crate::store::DurableStore;
use crate::telemetry;
use crate::traits::QuestionGenerator;
use crate::types::{GameSettings, GenerateRequest, Question};
use crate::{Result, SupplyError};

/// Questions in one game, one per round.
pub const QUESTIONS_PER_GAME: usize = 10;

/// The source a game set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Pool,
    Prefetch,
    Remote,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Pool => "pool",
            Tier::Prefetch => "prefetch",
            Tier::Remote => "remote",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A game set and where it came from.
#[derive(Debug, Clone)]
pub struct Acquisition {
    /// In round order.
    pub questions: Vec<Question>,
    pub tier: Tier,
}

/// Orchestrates pool, prefetch and remote generation for game setup.
pub struct QuestionSupply {
    store: Arc<dyn DurableStore>,
    pool: PoolCache,
    seen: SeenTracker,
    rounds: GameRounds,
    prefetch: PrefetchController,
    generator: Arc<dyn QuestionGenerator>,
}

impl QuestionSupply {
    /// Create a builder for configuring the supply.
    pub fn builder() -> SupplyBuilder {
        SupplyBuilder::new()
    }

    /// Assemble a supply from a store and a (possibly decorated) generator.
    pub fn new(store: Arc<dyn DurableStore>, generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            pool: PoolCache::new(Arc::clone(&store)),
            seen: SeenTracker::new(Arc::clone(&store)),
            rounds: GameRounds::new(Arc::clone(&store)),
            prefetch: PrefetchController::new(Arc::clone(&generator)),
            store,
            generator,
        }
    }

    pub fn store(&self) -> &Arc<dyn DurableStore> {
        &self.store
    }

    pub fn pool(&self) -> &PoolCache {
        &self.pool
    }

    pub fn seen(&self) -> &SeenTracker {
        &self.seen
    }

    pub fn rounds(&self) -> &GameRounds {
        &self.rounds
    }

    pub fn prefetcher(&self) -> &PrefetchController {
        &self.prefetch
    }

    /// Speculatively fetch a game's worth of questions for `settings`.
    ///
    /// Call on configuration-screen load and whenever the category or
    /// difficulty changes. Returns immediately; the fetch runs in the
    /// background.
    pub async fn prefetch(&self, settings: &GameSettings) -> Result<PrefetchOutcome> {
        let seen = self.seen.seen_ids().await?;
        let request = GenerateRequest::new(settings, QUESTIONS_PER_GAME).exclude(seen);
        Ok(self.prefetch.request(request))
    }

    /// Produce the question set for a new game with `settings`.
    pub async fn acquire(&self, settings: &GameSettings) -> Result<Acquisition> {
        self.acquire_count(settings, QUESTIONS_PER_GAME).await
    }

    /// Produce `count` questions for a new game with `settings`.
    ///
    /// Clears the previous game's rounds first. On success the set is
    /// marked seen and stored as rounds `1..=len`. The remote tier may
    /// return fewer than `count`; no other tier is accepted short.
    pub async fn acquire_count(&self, settings: &GameSettings, count: usize) -> Result<Acquisition> {
        if count == 0 {
            return Err(SupplyError::InvalidInput(
                "question count must be positive".into(),
            ));
        }
        info!(%settings, count, "acquiring questions");

        self.rounds.clear().await?;
        let seen = self.seen.seen_ids().await?;

        let (questions, tier) = if let Some(questions) = self.from_pool(settings, count, &seen).await? {
            (questions, Tier::Pool)
        } else if let Some(questions) = self.from_prefetch(settings, count).await {
            (questions, Tier::Prefetch)
        } else {
            (self.from_remote(settings, count, seen).await?, Tier::Remote)
        };

        self.seen.mark_seen(&questions).await?;
        self.rounds.write(&questions).await?;

        metrics::counter!(telemetry::TIER_TOTAL, "tier" => tier.as_str()).increment(1);
        info!(%settings, %tier, count = questions.len(), "game questions ready");
        Ok(Acquisition { questions, tier })
    }

    async fn from_pool(
        &self,
        settings: &GameSettings,
        count: usize,
        seen: &[String],
    ) -> Result<Option<Vec<Question>>> {
        let drawn = self.pool.draw(settings, count, seen).await?;
        if drawn.len() < count {
            metrics::counter!(telemetry::POOL_DRAWS_TOTAL, "outcome" => "miss").increment(1);
            debug!(%settings, available = drawn.len(), count, "pool cannot serve game");
            return Ok(None);
        }
        metrics::counter!(telemetry::POOL_DRAWS_TOTAL, "outcome" => "hit").increment(1);

        if self.pool.needs_refresh(settings).await? {
            debug!(%settings, "pool below refresh threshold");
        }
        Ok(Some(drawn))
    }

    async fn from_prefetch(&self, settings: &GameSettings, count: usize) -> Option<Vec<Question>> {
        let batch = self.prefetch.take(settings, count).await?;
        let game: Vec<Question> = batch.iter().take(count).cloned().collect();

        let pool = self.pool.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            if let Err(e) = pool.add(&settings, &batch).await {
                warn!(%settings, error = %e, "failed to merge prefetched batch into pool");
            }
        });
        Some(game)
    }

    async fn from_remote(
        &self,
        settings: &GameSettings,
        count: usize,
        seen: Vec<String>,
    ) -> Result<Vec<Question>> {
        let request = GenerateRequest::new(settings, count).exclude(seen);
        let started = Instant::now();
        let result = self.generator.generate(&request).await;
        metrics::histogram!(telemetry::REMOTE_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());

        let mut questions = match result {
            Ok(questions) => {
                metrics::counter!(telemetry::REMOTE_REQUESTS_TOTAL, "status" => "ok").increment(1);
                questions
            }
            Err(e) => {
                metrics::counter!(telemetry::REMOTE_REQUESTS_TOTAL, "status" => "error")
                    .increment(1);
                warn!(%settings, generator = self.generator.name(), error = %e, "remote generation failed");
                return Err(e);
            }
        };

        if questions.is_empty() {
            return Err(SupplyError::InsufficientQuestions {
                wanted: count,
                got: 0,
            });
        }
        if questions.len() < count {
            debug!(%settings, got = questions.len(), count, "generator returned a short batch");
        }

        self.pool.add(settings, &questions).await?;
        questions.truncate(count);
        Ok(questions)
    }
}
