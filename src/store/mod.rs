//! Durable key-value storage.
//!
//! Everything the question supply persists goes through [`DurableStore`]:
//! a namespaced key-value interface with three logical tables. Values are
//! JSON documents; typed access goes through [`load`] and [`save`].
//!
//! Two backends ship with the crate:
//!
//! - [`MemoryStore`]: process-local, used by tests and throwaway sessions.
//! - [`FileStore`]: one JSON document per table in a directory, written
//!   atomically (tmp + rename).
//!
//! Operations are atomic per call. There are no cross-table transactions.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::Result;

/// Logical tables of the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Ephemeral per-game question set, keyed by round number.
    GameQuestions,
    /// Long-lived question pools, keyed by `category||difficulty`.
    QuestionPool,
    /// The single seen-ids record.
    SeenQuestions,
}

impl Table {
    pub const ALL: [Table; 3] = [
        Table::GameQuestions,
        Table::QuestionPool,
        Table::SeenQuestions,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::GameQuestions => "game_questions",
            Table::QuestionPool => "question_pool",
            Table::SeenQuestions => "seen_questions",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Persistent key-value storage with namespaced tables.
///
/// Any I/O failure surfaces as
/// [`SupplyError::StorageUnavailable`](crate::SupplyError::StorageUnavailable);
/// callers must not assume a failed write was partially applied.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<()>;

    /// Fetch the value under `key`, if any.
    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>>;

    /// Remove the value under `key`. Returns whether it existed.
    async fn delete(&self, table: Table, key: &str) -> Result<bool>;

    /// Remove every value in `table`.
    async fn clear(&self, table: Table) -> Result<()>;

    /// All keys currently present in `table`, in no particular order.
    async fn keys(&self, table: Table) -> Result<Vec<String>>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Load and decode a typed record.
///
/// Returns `Ok(None)` on a missing record. A record that no longer decodes
/// is logged and treated as missing, so one corrupt entry never blocks a game.
pub async fn load<T: DeserializeOwned>(
    store: &dyn DurableStore,
    table: Table,
    key: &str,
) -> Result<Option<T>> {
    let Some(value) = store.get(table, key).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(record) => Ok(Some(record)),
        Err(e) => {
            warn!(table = %table, key, error = %e, "corrupt record in durable store");
            Ok(None)
        }
    }
}

/// Encode and store a typed record.
pub async fn save<T: Serialize>(
    store: &dyn DurableStore,
    table: Table,
    key: &str,
    record: &T,
) -> Result<()> {
    let value = serde_json::to_value(record)?;
    store.put(table, key, value).await
}
