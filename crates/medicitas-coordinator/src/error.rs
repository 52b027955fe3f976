//! Error types for coordinator operations.
//!
//! User-facing failures (`ValidationError`, `SessionError`, the auth
//! messages) carry the client's Spanish wording; storage and config
//! failures are technical and stay in English.

use medicitas_integrity::{AppointmentId, TransitionError, ValidationError};
use thiserror::Error;

/// Document store failure
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("malformed document {id}: {reason}")]
    Malformed { id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// No authenticated user for an operation that requires one
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("Debes iniciar sesión para continuar")]
pub struct SessionError;

/// Appointment lifecycle failure
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("appointment {0} not found")]
    NotFound(AppointmentId),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LifecycleError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id, .. } => LifecycleError::NotFound(AppointmentId(id)),
            other => LifecycleError::Repository(other),
        }
    }
}

/// Screen an auth failure is reported on; selects the fallback message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    SignUp,
    ResetPassword,
}

/// Authentication failure, subdivided by provider cause
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no account for this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("malformed email")]
    InvalidEmail,

    #[error("too many failed attempts")]
    TooManyRequests,

    #[error("email already in use")]
    EmailAlreadyInUse,

    #[error("password rejected as weak")]
    WeakPassword,

    #[error("auth provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// Map a provider error code such as `auth/user-not-found`
    pub fn from_code(code: &str) -> Self {
        match code {
            "auth/user-not-found" => AuthError::UserNotFound,
            "auth/wrong-password" => AuthError::WrongPassword,
            "auth/invalid-email" => AuthError::InvalidEmail,
            "auth/too-many-requests" => AuthError::TooManyRequests,
            "auth/email-already-in-use" => AuthError::EmailAlreadyInUse,
            "auth/weak-password" => AuthError::WeakPassword,
            other => AuthError::Provider(other.to_string()),
        }
    }

    /// Provider error code, when the failure came from the provider
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::UserNotFound => Some("auth/user-not-found"),
            AuthError::WrongPassword => Some("auth/wrong-password"),
            AuthError::InvalidEmail => Some("auth/invalid-email"),
            AuthError::TooManyRequests => Some("auth/too-many-requests"),
            AuthError::EmailAlreadyInUse => Some("auth/email-already-in-use"),
            AuthError::WeakPassword => Some("auth/weak-password"),
            AuthError::Provider(code) => Some(code),
            AuthError::Validation(_) | AuthError::Repository(_) => None,
        }
    }

    /// Message shown to the user on the given screen.
    ///
    /// Each screen only recognises the causes it can produce; anything
    /// else falls back to the screen's generic message.
    pub fn user_message(&self, action: AuthAction) -> String {
        use AuthAction::*;

        let message = match (self, action) {
            (AuthError::Validation(err), _) => return err.message.clone(),
            (AuthError::UserNotFound, SignIn | ResetPassword) => {
                "No existe una cuenta con este correo electrónico"
            }
            (AuthError::WrongPassword, SignIn) => "Contraseña incorrecta",
            (AuthError::InvalidEmail, _) => "Formato de correo electrónico inválido",
            (AuthError::TooManyRequests, SignIn) => {
                "Demasiados intentos fallidos. Intenta más tarde"
            }
            (AuthError::TooManyRequests, ResetPassword) => {
                "Demasiados intentos. Intenta más tarde"
            }
            (AuthError::EmailAlreadyInUse, SignUp) => {
                "Este correo electrónico ya está registrado"
            }
            (AuthError::WeakPassword, SignUp) => "La contraseña es muy débil",
            (_, SignIn) => "No se pudo iniciar sesión",
            (_, SignUp) => "No se pudo crear la cuenta",
            (_, ResetPassword) => "No se pudo enviar el correo de recuperación",
        };
        message.to_string()
    }
}

/// Profile operation failure
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Blob(#[from] BlobError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Local key-value store failure
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Blob storage failure
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob {0} not found")]
    NotFound(String),

    #[error("upload rejected: {0}")]
    Rejected(String),
}

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
