//! Local key-value storage and the cached profile kept in it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use medicitas_integrity::{ProfilePatch, UserProfile};
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::error::CacheError;

/// Key holding the serialized profile
pub const PROFILE_CACHE_KEY: &str = "userData";

/// Device-local string storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: TokioMutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FileKeyValueStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Locally cached copy of the signed-in user's profile
#[derive(Clone)]
pub struct ProfileCache {
    store: Arc<dyn KeyValueStore>,
}

impl ProfileCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        ProfileCache { store }
    }

    pub async fn load(&self) -> Result<Option<UserProfile>, CacheError> {
        match self.store.get(PROFILE_CACHE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrite the cached profile
    pub async fn store(&self, profile: &UserProfile) -> Result<(), CacheError> {
        let raw = serde_json::to_string(profile)?;
        self.store.set(PROFILE_CACHE_KEY, &raw).await?;
        debug!("Cached profile for {:?}", profile.email);
        Ok(())
    }

    /// Merge a persisted patch into the cached profile, if one is cached
    pub async fn merge(&self, patch: &ProfilePatch) -> Result<(), CacheError> {
        if let Some(mut profile) = self.load().await? {
            profile.apply(patch);
            self.store(&profile).await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), CacheError> {
        self.store.remove(PROFILE_CACHE_KEY).await
    }
}
