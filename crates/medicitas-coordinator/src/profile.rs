//! Profile Service
//!
//! Reads and edits the signed-in user's profile document, keeps the local
//! cached copy in step, and uploads the profile photo.

use std::sync::Arc;

use medicitas_integrity::{ProfilePatch, ProfileUpdate, UserProfile, DEFAULT_USER_NAME};
use tracing::{debug, info, warn};

use crate::blob::{profile_photo_path, BlobStorage};
use crate::cache::ProfileCache;
use crate::clock::Clock;
use crate::error::ProfileError;
use crate::repository::ProfileRepository;
use crate::session::{Session, SessionUser};

pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    blobs: Arc<dyn BlobStorage>,
    cache: ProfileCache,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        blobs: Arc<dyn BlobStorage>,
        cache: ProfileCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ProfileService {
            profiles,
            blobs,
            cache,
            clock,
        }
    }

    /// Fetch the stored profile and refresh the cache with it. Without a
    /// stored document a basic profile is built from the session and
    /// neither persisted nor cached.
    pub async fn load(&self, session: &Session) -> Result<UserProfile, ProfileError> {
        let user = session.require_user()?;

        match self.profiles.get(&user.id).await? {
            Some(profile) => {
                self.cache.store(&profile).await?;
                debug!("Loaded profile for {}", user.id);
                Ok(profile)
            }
            None => {
                debug!("No profile document for {}; using session data", user.id);
                Ok(Self::session_profile(user))
            }
        }
    }

    fn session_profile(user: &SessionUser) -> UserProfile {
        UserProfile {
            email: Some(user.email.clone()),
            nombre: Some(
                user.display_name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
            ),
            ..Default::default()
        }
    }

    /// Validate and persist the settings form. The cached profile is
    /// merged only after the write succeeds.
    pub async fn update(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<ProfilePatch, ProfileError> {
        let user = session.require_user()?;
        update.validate().into_result()?;

        let patch = update.to_patch(self.clock.now_utc());
        self.profiles.update(&user.id, &patch).await?;
        info!("Updated profile for {}", user.id);

        if let Err(e) = self.cache.merge(&patch).await {
            warn!("Profile saved but cache merge failed: {}", e);
        }
        Ok(patch)
    }

    /// Upload a new profile photo, record its URL and reload the profile.
    /// Failing to refresh the cached copy is logged, not returned.
    pub async fn upload_photo(
        &self,
        session: &Session,
        bytes: Vec<u8>,
    ) -> Result<UserProfile, ProfileError> {
        let user = session.require_user()?;
        let path = profile_photo_path(user.id.as_str());

        self.blobs.upload(&path, bytes).await?;
        let url = self.blobs.download_url(&path).await?;
        self.profiles.set_photo_url(&user.id, &url).await?;
        info!("Updated profile photo for {}", user.id);

        let Some(profile) = self.profiles.get(&user.id).await? else {
            return Ok(Self::session_profile(user));
        };
        if let Err(e) = self.cache.store(&profile).await {
            warn!("Profile photo saved but cache refresh failed: {}", e);
        }
        Ok(profile)
    }

    /// Locally cached profile, for display without a backend round trip
    pub async fn cached(&self) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.cache.load().await?)
    }
}
