//! Persistent per-(category, difficulty) question pools.
//!
//! A pool is a reusable knowledge base: repeat games in the same category
//! and difficulty draw from it instead of calling the generator. Drawing
//! does not remove questions; the [`SeenTracker`](super::SeenTracker) is
//! what keeps a player from seeing the same question twice.
//!
//! Each pool is one record in [`Table::QuestionPool`] keyed by
//! [`GameSettings::pool_key`]. Questions are kept in insertion order, so
//! eviction simply drops from the front.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{is_older_than, unix_millis};
use crate::Result;
use crate::store::{self, DurableStore, Table};
use crate::types::{GameSettings, Question};

/// Maximum questions kept per pool.
pub const MAX_POOL_SIZE: usize = 100;

/// Below this many stored questions a pool should be topped up.
pub const REFRESH_THRESHOLD: usize = 5;

/// A pool not written for this long is treated as a miss.
pub const POOL_EXPIRY: Duration = Duration::from_secs(7 * 86_400);

/// Stored form of one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Oldest first.
    pub questions: Vec<Question>,
    /// Unix millis of the last successful [`PoolCache::add`].
    pub last_updated: u64,
}

impl PoolEntry {
    pub fn is_expired(&self, now: u64) -> bool {
        is_older_than(self.last_updated, now, POOL_EXPIRY)
    }

    /// Append questions whose id is not present yet, then evict the oldest
    /// beyond [`MAX_POOL_SIZE`]. Returns how many were appended.
    fn merge(&mut self, incoming: &[Question]) -> usize {
        let mut ids: HashSet<String> = self.questions.iter().map(|q| q.id.clone()).collect();
        let mut appended = 0;
        for question in incoming {
            if ids.insert(question.id.clone()) {
                self.questions.push(question.clone());
                appended += 1;
            }
        }
        if self.questions.len() > MAX_POOL_SIZE {
            let overflow = self.questions.len() - MAX_POOL_SIZE;
            self.questions.drain(..overflow);
        }
        appended
    }
}

/// Bounded, expiring question pools over a [`DurableStore`].
#[derive(Clone)]
pub struct PoolCache {
    store: Arc<dyn DurableStore>,
}

impl PoolCache {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// The stored pool for `settings`, expired or not.
    pub async fn entry(&self, settings: &GameSettings) -> Result<Option<PoolEntry>> {
        store::load(self.store.as_ref(), Table::QuestionPool, &settings.pool_key()).await
    }

    /// Number of stored questions. Counts expired pools too.
    pub async fn size(&self, settings: &GameSettings) -> Result<usize> {
        Ok(self
            .entry(settings)
            .await?
            .map_or(0, |entry| entry.questions.len()))
    }

    /// Whether the pool has fewer than [`REFRESH_THRESHOLD`] questions.
    ///
    /// A signal only; nothing is fetched here.
    pub async fn needs_refresh(&self, settings: &GameSettings) -> Result<bool> {
        Ok(self.size(settings).await? < REFRESH_THRESHOLD)
    }

    /// Up to `count` questions not in `exclude_ids`, uniformly shuffled.
    ///
    /// Returns an empty list when the pool is missing, empty or expired.
    /// Returns fewer than `count` when not enough remain after exclusion;
    /// callers check the length.
    pub async fn draw(
        &self,
        settings: &GameSettings,
        count: usize,
        exclude_ids: &[String],
    ) -> Result<Vec<Question>> {
        let Some(entry) = self.entry(settings).await? else {
            return Ok(Vec::new());
        };
        if entry.is_expired(unix_millis()) {
            debug!(pool = %settings, "pool expired, treating as miss");
            return Ok(Vec::new());
        }

        let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();
        let mut candidates: Vec<Question> = entry
            .questions
            .into_iter()
            .filter(|q| !excluded.contains(q.id.as_str()))
            .collect();
        candidates.shuffle(&mut rand::thread_rng());
        candidates.truncate(count);
        Ok(candidates)
    }

    /// Merge `questions` into the pool, skipping known ids, and stamp it.
    ///
    /// Always refreshes `last_updated`, which revives an expired pool.
    /// Returns how many questions were new.
    pub async fn add(&self, settings: &GameSettings, questions: &[Question]) -> Result<usize> {
        let mut entry = self.entry(settings).await?.unwrap_or_default();
        let appended = entry.merge(questions);
        entry.last_updated = unix_millis();
        store::save(
            self.store.as_ref(),
            Table::QuestionPool,
            &settings.pool_key(),
            &entry,
        )
        .await?;
        debug!(
            pool = %settings,
            appended,
            size = entry.questions.len(),
            "merged questions into pool"
        );
        Ok(appended)
    }
}
