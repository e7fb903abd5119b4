//! Directory-backed store: one JSON document per table.
//!
//! Layout: `<dir>/<table>.json`, each holding a `{ key: value }` object.
//! Every mutation is a read-modify-write of the whole table file, serialized
//! through one async mutex and committed with tmp + rename so a crash never
//! leaves a half-written table behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::{DurableStore, Table};
use crate::{Result, SupplyError};

type TableMap = BTreeMap<String, Value>;

/// Persistent [`DurableStore`] rooted at a directory.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            SupplyError::StorageUnavailable(format!(
                "failed to create store dir {}: {e}",
                dir.display()
            ))
        })?;
        debug!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Default location: `<data dir>/trivia-supply`.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join("trivia-supply")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn table_path(&self, table: Table) -> PathBuf {
        self.dir.join(format!("{}.json", table.name()))
    }

    async fn read_table(&self, table: Table) -> Result<TableMap> {
        let path = self.table_path(table);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TableMap::new()),
            Err(e) => {
                return Err(SupplyError::StorageUnavailable(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        serde_json::from_str(&content).map_err(|e| {
            SupplyError::StorageUnavailable(format!("corrupt table file {}: {e}", path.display()))
        })
    }

    async fn write_table(&self, table: Table, map: &TableMap) -> Result<()> {
        let path = self.table_path(table);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string(map)?;
        tokio::fs::write(&tmp_path, json).await.map_err(|e| {
            SupplyError::StorageUnavailable(format!(
                "failed to write {}: {e}",
                tmp_path.display()
            ))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            SupplyError::StorageUnavailable(format!(
                "failed to rename {} → {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn put(&self, table: Table, key: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_table(table).await?;
        map.insert(key.to_string(), value);
        self.write_table(table, &map).await
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>> {
        let mut map = self.read_table(table).await?;
        Ok(map.remove(key))
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_table(table).await?;
        let existed = map.remove(key).is_some();
        if existed {
            self.write_table(table, &map).await?;
        }
        Ok(existed)
    }

    async fn clear(&self, table: Table) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.table_path(table)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SupplyError::StorageUnavailable(format!(
                "failed to clear {table}: {e}"
            ))),
        }
    }

    async fn keys(&self, table: Table) -> Result<Vec<String>> {
        Ok(self.read_table(table).await?.into_keys().collect())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
