//! Account flows: sign in, sign up, password recovery and sign out.
//!
//! Provides:
//! - `AuthProvider`: the managed identity provider seam
//! - `MemoryAuthProvider`: in-process provider with hashed passwords and
//!   failed-attempt rate limiting
//! - `AuthService`: form validation, provider calls and profile bootstrap

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use medicitas_integrity::{
    validate_reset_email, SignInForm, SignUpForm, UserId, UserProfile, UserRole,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::cache::ProfileCache;
use crate::clock::Clock;
use crate::error::AuthError;
use crate::repository::ProfileRepository;
use crate::session::{Session, SessionAccessor, SessionUser};

/// Length of generated user ids
pub const USER_ID_LEN: usize = 28;

/// Shortest password the provider itself accepts
pub const PROVIDER_MIN_PASSWORD_LENGTH: usize = 6;

/// Managed identity provider
#[async_trait]
pub trait AuthProvider: SessionAccessor {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;

    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, AuthError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

// ============================================================================
// In-memory provider
// ============================================================================

/// SHA-256 of the user id and password
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordDigest(pub [u8; 32]);

impl PasswordDigest {
    pub fn compute(uid: &UserId, password: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(uid.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        let result = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&result);
        PasswordDigest(digest)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub password: PasswordDigest,
}

/// Serializable provider state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// Keyed by normalized email
    pub accounts: HashMap<String, Account>,
    pub failed_attempts: HashMap<String, u32>,
    pub current_user: Option<SessionUser>,
    /// Addresses a reset message was sent to, oldest first
    pub reset_outbox: Vec<String>,
}

pub struct MemoryAuthProvider {
    state: Mutex<AuthSnapshot>,
    max_failed_sign_ins: u32,
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn generate_uid() -> UserId {
    UserId(
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(USER_ID_LEN)
            .map(char::from)
            .collect(),
    )
}

impl MemoryAuthProvider {
    pub fn new(max_failed_sign_ins: u32) -> Self {
        Self::with_snapshot(max_failed_sign_ins, AuthSnapshot::default())
    }

    pub fn with_snapshot(max_failed_sign_ins: u32, snapshot: AuthSnapshot) -> Self {
        MemoryAuthProvider {
            state: Mutex::new(snapshot),
            max_failed_sign_ins,
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut AuthSnapshot) -> T) -> Result<T, AuthError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| AuthError::Provider("auth/internal-error".to_string()))?;
        Ok(f(&mut state))
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Addresses that were sent a password-reset message
    pub fn reset_outbox(&self) -> Vec<String> {
        self.snapshot().reset_outbox
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        if !medicitas_integrity::is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let key = normalize(email);
        let max_failed = self.max_failed_sign_ins;

        self.with_state(|state| {
            let failures = state.failed_attempts.get(&key).copied().unwrap_or(0);
            if failures >= max_failed {
                return Err(AuthError::TooManyRequests);
            }
            let account = state.accounts.get(&key).cloned().ok_or(AuthError::UserNotFound)?;
            if PasswordDigest::compute(&account.uid, password) != account.password {
                state.failed_attempts.insert(key.clone(), failures + 1);
                return Err(AuthError::WrongPassword);
            }
            state.failed_attempts.remove(&key);
            let user = SessionUser {
                id: account.uid,
                email: account.email,
                display_name: account.display_name,
            };
            state.current_user = Some(user.clone());
            Ok(user)
        })?
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser, AuthError> {
        if !medicitas_integrity::is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < PROVIDER_MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        let key = normalize(email);

        self.with_state(|state| {
            if state.accounts.contains_key(&key) {
                return Err(AuthError::EmailAlreadyInUse);
            }
            let uid = generate_uid();
            let account = Account {
                password: PasswordDigest::compute(&uid, password),
                uid: uid.clone(),
                email: email.trim().to_string(),
                display_name: None,
            };
            let user = SessionUser {
                id: uid,
                email: account.email.clone(),
                display_name: None,
            };
            state.accounts.insert(key, account);
            state.current_user = Some(user.clone());
            Ok(user)
        })?
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !medicitas_integrity::is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        let key = normalize(email);
        self.with_state(|state| {
            if !state.accounts.contains_key(&key) {
                return Err(AuthError::UserNotFound);
            }
            state.reset_outbox.push(key);
            Ok(())
        })?
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.with_state(|state| state.current_user = None)
    }
}

impl SessionAccessor for MemoryAuthProvider {
    fn current_user(&self) -> Option<SessionUser> {
        self.snapshot().current_user
    }
}

// ============================================================================
// Service
// ============================================================================

/// Account flows on top of a provider, the profile collection and the
/// local profile cache
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileRepository>,
    cache: ProfileCache,
    clock: Arc<dyn Clock>,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileRepository>,
        cache: ProfileCache,
        clock: Arc<dyn Clock>,
        min_password_length: usize,
    ) -> Self {
        AuthService {
            provider,
            profiles,
            cache,
            clock,
            min_password_length,
        }
    }

    pub fn session(&self) -> Session {
        self.provider.session()
    }

    /// Sign in, create the profile document on first sign-in, and cache
    /// the profile locally.
    pub async fn sign_in(&self, form: &SignInForm) -> Result<SessionUser, AuthError> {
        form.validate().into_result()?;

        let user = self.provider.sign_in(&form.email, &form.password).await?;
        info!("Signed in {}", user.id);

        let cached = match self.profiles.get(&user.id).await? {
            Some(profile) => profile,
            None => {
                let initial = UserProfile::initial(&form.email, None, self.clock.now_utc());
                if let Err(e) = self.profiles.set(&user.id, &initial).await {
                    error!("Failed to create profile for {}: {}", user.id, e);
                }
                UserProfile {
                    email: Some(form.email.clone()),
                    rol: Some(UserRole::Patient),
                    ..Default::default()
                }
            }
        };

        if let Err(e) = self.cache.store(&cached).await {
            warn!("Failed to cache profile for {}: {}", user.id, e);
        }
        Ok(user)
    }

    /// Register a new patient account and write its profile document
    pub async fn sign_up(&self, form: &SignUpForm) -> Result<SessionUser, AuthError> {
        form.validate(self.min_password_length).into_result()?;

        let user = self.provider.sign_up(&form.email, &form.password).await?;
        let profile = UserProfile::initial(&form.email, Some(&form.nombre), self.clock.now_utc());
        self.profiles.set(&user.id, &profile).await?;
        info!("Registered {}", user.id);
        Ok(user)
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        validate_reset_email(email).into_result()?;
        self.provider.send_password_reset(email).await?;
        debug!("Password reset sent");
        Ok(())
    }

    /// Sign out and drop the cached profile
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.provider.sign_out().await?;
        if let Err(e) = self.cache.clear().await {
            warn!("Failed to clear cached profile: {}", e);
        }
        info!("Signed out");
        Ok(())
    }
}
