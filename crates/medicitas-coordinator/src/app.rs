//! Wiring of the services over the in-memory backend, with the backend
//! state persisted between runs as a JSON snapshot.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{AuthService, AuthSnapshot, MemoryAuthProvider};
use crate::blob::MemoryBlobStorage;
use crate::cache::{FileKeyValueStore, KeyValueStore, ProfileCache};
use crate::clock::Clock;
use crate::config::MediCitasConfig;
use crate::directory::DoctorDirectory;
use crate::error::CacheError;
use crate::lifecycle::AppointmentLifecycleManager;
use crate::profile::ProfileService;
use crate::repository::{DocumentAppointmentRepository, DocumentProfileRepository};
use crate::session::{Session, SessionAccessor};
use crate::store::{MemoryDocumentStore, StoreSnapshot};

/// Snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "backend.json";

/// Local cache directory inside the data directory
pub const CACHE_DIR: &str = "cache";

/// Everything the in-memory backend holds
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BackendSnapshot {
    pub documents: StoreSnapshot,
    pub auth: AuthSnapshot,
    pub blobs: HashMap<String, Vec<u8>>,
}

impl BackendSnapshot {
    /// Read a snapshot; a missing file is an empty backend
    pub async fn load(path: &Path) -> Result<Self, CacheError> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot at {}; starting empty", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(self)?).await?;
        Ok(())
    }
}

/// Services assembled over one in-memory backend
pub struct MediCitas {
    pub config: MediCitasConfig,
    pub store: Arc<MemoryDocumentStore>,
    pub auth_provider: Arc<MemoryAuthProvider>,
    pub blobs: Arc<MemoryBlobStorage>,
    pub lifecycle: AppointmentLifecycleManager,
    pub auth: AuthService,
    pub profiles: ProfileService,
}

impl MediCitas {
    pub fn new(
        config: MediCitasConfig,
        clock: Arc<dyn Clock>,
        local: Arc<dyn KeyValueStore>,
        snapshot: BackendSnapshot,
    ) -> Self {
        let store = Arc::new(MemoryDocumentStore::with_snapshot(
            clock.clone(),
            snapshot.documents,
        ));
        let auth_provider = Arc::new(MemoryAuthProvider::with_snapshot(
            config.max_failed_sign_ins,
            snapshot.auth,
        ));
        let blobs = Arc::new(MemoryBlobStorage::with_objects(
            &config.storage_base_url,
            snapshot.blobs,
        ));
        let directory = Arc::new(
            DoctorDirectory::seeded().with_reviews_preview(config.reviews_preview_limit),
        );

        let appointments = Arc::new(DocumentAppointmentRepository::new(store.clone()));
        let profile_repo = Arc::new(DocumentProfileRepository::new(store.clone()));
        let cache = ProfileCache::new(local);

        let lifecycle = AppointmentLifecycleManager::new(appointments, directory, clock.clone());
        let auth = AuthService::new(
            auth_provider.clone(),
            profile_repo.clone(),
            cache.clone(),
            clock.clone(),
            config.min_password_length,
        );
        let profiles = ProfileService::new(profile_repo, blobs.clone(), cache, clock);

        MediCitas {
            config,
            store,
            auth_provider,
            blobs,
            lifecycle,
            auth,
            profiles,
        }
    }

    fn snapshot_path(config: &MediCitasConfig) -> PathBuf {
        config.data_dir.join(SNAPSHOT_FILE)
    }

    /// Open the backend persisted in the config's data directory
    pub async fn open(config: MediCitasConfig, clock: Arc<dyn Clock>) -> Result<Self, CacheError> {
        let snapshot = BackendSnapshot::load(&Self::snapshot_path(&config)).await?;
        let local = Arc::new(FileKeyValueStore::new(config.data_dir.join(CACHE_DIR)));
        info!("Opened backend in {}", config.data_dir.display());
        Ok(Self::new(config, clock, local, snapshot))
    }

    pub async fn snapshot(&self) -> BackendSnapshot {
        BackendSnapshot {
            documents: self.store.snapshot().await,
            auth: self.auth_provider.snapshot(),
            blobs: self.blobs.snapshot().await,
        }
    }

    /// Write the backend state back to the data directory
    pub async fn persist(&self) -> Result<(), CacheError> {
        let path = Self::snapshot_path(&self.config);
        self.snapshot().await.save(&path).await?;
        debug!("Persisted backend to {}", path.display());
        Ok(())
    }

    pub fn session(&self) -> Session {
        self.auth_provider.session()
    }
}
