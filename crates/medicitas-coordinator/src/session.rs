//! Authenticated identity passed explicitly into every operation.

use medicitas_integrity::{UserId, DEFAULT_PATIENT_NAME};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Identity of the signed-in subject
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

impl SessionUser {
    pub fn new(id: &str, email: &str, display_name: Option<&str>) -> Self {
        SessionUser {
            id: UserId(id.to_string()),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        }
    }

    /// Name recorded on appointments booked by this user
    pub fn patient_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_PATIENT_NAME)
    }
}

/// Snapshot of the authentication state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Session { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Session { user: Some(user) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&SessionUser, SessionError> {
        self.user.as_ref().ok_or(SessionError)
    }
}

/// Source of the current session
pub trait SessionAccessor: Send + Sync {
    fn current_user(&self) -> Option<SessionUser>;

    fn session(&self) -> Session {
        Session {
            user: self.current_user(),
        }
    }
}
