//! JSON file persistence shared by the record stores
//!
//! Records live in an in-memory map keyed by id and are written to disk as
//! one pretty-printed JSON array. Writes are applied to a copy of the map;
//! the cache only takes the copy once it is on disk.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::Result;

/// A record that can be kept in a [`JsonFileStore`]
pub(crate) trait Record: Clone + Serialize + DeserializeOwned + Send + Sync {
    fn id(&self) -> Uuid;
}

pub(crate) struct JsonFileStore<T> {
    path: PathBuf,
    cache: RwLock<HashMap<Uuid, T>>,
}

impl<T: Record> JsonFileStore<T> {
    /// Load the file at `path`; a missing file is an empty store and is
    /// created on first write.
    pub(crate) async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let records: Vec<T> = serde_json::from_str(&content)?;
            records.into_iter().map(|r| (r.id(), r)).collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub(crate) async fn get(&self, id: Uuid) -> Option<T> {
        self.cache.read().await.get(&id).cloned()
    }

    pub(crate) async fn values(&self) -> Vec<T> {
        self.cache.read().await.values().cloned().collect()
    }

    /// Apply `change` and persist the result.
    ///
    /// If `change` fails or the file cannot be written, the cache is left as
    /// it was.
    pub(crate) async fn modify<R, F>(&self, change: F) -> Result<R>
    where
        F: FnOnce(&mut HashMap<Uuid, T>) -> Result<R>,
    {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        let out = change(&mut next)?;
        self.write_file(&next).await?;
        *cache = next;
        Ok(out)
    }

    async fn write_file(&self, records: &HashMap<Uuid, T>) -> Result<()> {
        let records: Vec<&T> = records.values().collect();
        let content = serde_json::to_string_pretty(&records)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        debug!("Persisted {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
