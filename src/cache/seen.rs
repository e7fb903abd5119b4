//! Cross-session record of questions already shown.
//!
//! One record for the whole player, independent of category and difficulty.
//! The window is "time since the last game", not "time since first seen":
//! every [`SeenTracker::mark_seen`] restamps the record.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{is_older_than, unix_millis};
use crate::Result;
use crate::store::{self, DurableStore, Table};
use crate::types::Question;

/// Most recent ids kept.
pub const MAX_SEEN_IDS: usize = 200;

/// Inactivity after which the whole record resets.
pub const SEEN_TTL: Duration = Duration::from_secs(24 * 3600);

/// Key of the single record in [`Table::SeenQuestions`].
const SEEN_KEY: &str = "seen";

/// Stored form of the seen set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeenRecord {
    /// Oldest first.
    pub ids: Vec<String>,
    /// Unix millis of the last write.
    pub timestamp: u64,
}

/// Time- and size-bounded set of ids shown to the player.
#[derive(Clone)]
pub struct SeenTracker {
    store: Arc<dyn DurableStore>,
}

impl SeenTracker {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Ids seen within the window, oldest first.
    ///
    /// A stale record is deleted as part of the read.
    pub async fn seen_ids(&self) -> Result<Vec<String>> {
        let Some(record) =
            store::load::<SeenRecord>(self.store.as_ref(), Table::SeenQuestions, SEEN_KEY).await?
        else {
            return Ok(Vec::new());
        };
        if is_older_than(record.timestamp, unix_millis(), SEEN_TTL) {
            debug!(count = record.ids.len(), "seen record expired, resetting");
            self.store.delete(Table::SeenQuestions, SEEN_KEY).await?;
            return Ok(Vec::new());
        }
        Ok(record.ids)
    }

    /// Record the ids of `questions` as seen.
    pub async fn mark_seen(&self, questions: &[Question]) -> Result<()> {
        let ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        self.mark_seen_ids(&ids).await
    }

    /// Union `ids` into the record, keeping the newest [`MAX_SEEN_IDS`].
    ///
    /// Re-marking an id moves it to the newest position. Empty ids are
    /// skipped. Always restamps the record.
    pub async fn mark_seen_ids(&self, ids: &[String]) -> Result<()> {
        let mut merged = self.seen_ids().await?;
        for id in ids.iter().filter(|id| !id.is_empty()) {
            merged.retain(|existing| existing != id);
            merged.push(id.clone());
        }
        if merged.len() > MAX_SEEN_IDS {
            let overflow = merged.len() - MAX_SEEN_IDS;
            merged.drain(..overflow);
        }
        let record = SeenRecord {
            ids: merged,
            timestamp: unix_millis(),
        };
        store::save(self.store.as_ref(), Table::SeenQuestions, SEEN_KEY, &record).await
    }

    /// Forget everything seen.
    pub async fn reset(&self) -> Result<()> {
        self.store.delete(Table::SeenQuestions, SEEN_KEY).await?;
        Ok(())
    }

    /// Overwrite the stored record as-is.
    pub async fn restore(&self, record: &SeenRecord) -> Result<()> {
        store::save(self.store.as_ref(), Table::SeenQuestions, SEEN_KEY, record).await
    }
}
