//! Key-value storage
//!
//! A small string-to-string store, optionally backed by a JSON file that is
//! rewritten on every mutation. Used for the timer snapshot and the ledger of
//! scheduled notifications.

use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

/// Errors raised while reading or writing the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug)]
struct StoreInner {
    path: Option<PathBuf>,
    items: BTreeMap<String, String>,
}

/// Cloneable handle to a shared key-value store
#[derive(Debug, Clone)]
pub struct KvStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl KvStore {
    /// Open a store, loading `path` if it exists. `None` keeps everything in memory.
    pub async fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
        let items = match &path {
            Some(p) => match fs::read_to_string(p).await {
                Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
                Ok(contents) => {
                    let items: BTreeMap<String, String> = serde_json::from_str(&contents)?;
                    info!("Loaded {} stored items from {}", items.len(), p.display());
                    items
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Store file {} does not exist yet", p.display());
                    BTreeMap::new()
                }
                Err(source) => {
                    return Err(StoreError::Io { path: p.clone(), source });
                }
            },
            None => BTreeMap::new(),
        };

        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner { path, items })),
        })
    }

    /// Create a store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                path: None,
                items: BTreeMap::new(),
            })),
        }
    }

    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.inner.lock().await.items.get(key).cloned()
    }

    /// Store `value` under `key`. The change is only kept once it reached disk.
    pub async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let mut items = inner.items.clone();
        items.insert(key.to_string(), value);

        flush(inner.path.as_ref(), &items).await?;
        inner.items = items;
        Ok(())
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.items.contains_key(key) {
            return Ok(());
        }

        let mut items = inner.items.clone();
        items.remove(key);
        flush(inner.path.as_ref(), &items).await?;
        inner.items = items;
        Ok(())
    }

    /// Read and decode a JSON value stored under `key`
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_item(key).await {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it under `key`
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, raw).await
    }
}

async fn flush(path: Option<&PathBuf>, items: &BTreeMap<String, String>) -> Result<(), StoreError> {
    let Some(path) = path else {
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io { path: parent.to_path_buf(), source })?;
    }

    let contents = serde_json::to_string_pretty(items)?;
    fs::write(path, contents)
        .await
        .map_err(|source| StoreError::Io { path: path.clone(), source })
}
