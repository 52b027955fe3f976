//! Blob storage seam for profile photos.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex as TokioMutex;
use tracing::debug;

use crate::error::BlobError;

/// Object storage addressed by path
#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobError>;

    /// Public URL of an uploaded object
    async fn download_url(&self, path: &str) -> Result<String, BlobError>;
}

/// Path of a user's profile photo
pub fn profile_photo_path(uid: &str) -> String {
    format!("usuarios/{}/profile-pic.jpg", uid)
}

/// In-process blob storage serving `{base_url}/{path}` URLs
pub struct MemoryBlobStorage {
    base_url: String,
    objects: TokioMutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStorage {
    pub fn new(base_url: &str) -> Self {
        Self::with_objects(base_url, HashMap::new())
    }

    pub fn with_objects(base_url: &str, objects: HashMap<String, Vec<u8>>) -> Self {
        MemoryBlobStorage {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: TokioMutex::new(objects),
        }
    }

    pub async fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(path).cloned()
    }

    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().await.clone()
    }

    pub async fn restore(&self, objects: HashMap<String, Vec<u8>>) {
        *self.objects.lock().await = objects;
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Rejected(format!("{} is empty", path)));
        }
        debug!("Uploading {} bytes to {}", bytes.len(), path);
        self.objects.lock().await.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BlobError> {
        if !self.objects.lock().await.contains_key(path) {
            return Err(BlobError::NotFound(path.to_string()));
        }
        Ok(format!("{}/{}", self.base_url, path))
    }
}
