//! Typed repositories over the document store.
//!
//! - `AppointmentRepository` over the `citas` collection
//! - `ProfileRepository` over the `usuarios` collection

use std::sync::Arc;

use async_trait::async_trait;
use medicitas_integrity::{
    Appointment, AppointmentDocument, AppointmentDraft, AppointmentId, AppointmentStatus,
    ProfilePatch, UserId, UserProfile,
};
use serde_json::Value;
use tracing::debug;

use crate::error::RepositoryError;
use crate::store::{
    server_timestamp, to_fields, Direction, Document, DocumentStore, Fields, Query,
};

/// Appointment collection name
pub const APPOINTMENTS: &str = "citas";

/// Profile collection name
pub const PROFILES: &str = "usuarios";

// ============================================================================
// Appointments
// ============================================================================

/// Persistence for appointments. Each call is one remote round trip that
/// may fail; nothing is retried.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Persist a draft as a pending appointment with a server-assigned
    /// creation time. The result comes from the write itself, so a
    /// successful write is never reported as a failure.
    async fn create(&self, draft: AppointmentDraft) -> Result<Appointment, RepositoryError>;

    /// Overwrite the status field only, returning the merged document
    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError>;

    async fn get_by_id(&self, id: &AppointmentId) -> Result<Appointment, RepositoryError>;

    /// Appointments booked by the patient, newest `scheduled_at` first
    async fn list_by_patient(&self, patient_id: &UserId)
        -> Result<Vec<Appointment>, RepositoryError>;
}

/// `AppointmentRepository` backed by a `DocumentStore`
pub struct DocumentAppointmentRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentAppointmentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocumentAppointmentRepository { store }
    }

    fn decode(doc: &Document) -> Result<Appointment, RepositoryError> {
        let body: AppointmentDocument = doc.decode()?;
        Ok(Appointment::from_document(AppointmentId(doc.id.clone()), body))
    }

    async fn fetch(&self, id: &AppointmentId) -> Result<Appointment, RepositoryError> {
        let doc = self
            .store
            .get(APPOINTMENTS, id.as_str())
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                collection: APPOINTMENTS.to_string(),
                id: id.to_string(),
            })?;
        Self::decode(&doc)
    }
}

#[async_trait]
impl AppointmentRepository for DocumentAppointmentRepository {
    async fn create(&self, draft: AppointmentDraft) -> Result<Appointment, RepositoryError> {
        let mut fields = to_fields(&draft.into_document())?;
        fields.insert("createdAt".to_string(), server_timestamp());

        let written = self.store.add(APPOINTMENTS, fields).await?;
        debug!("Created appointment {}", written.id);
        Self::decode(&written)
    }

    async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment, RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("estado".to_string(), Value::String(status.as_str().to_string()));
        let merged = self.store.update(APPOINTMENTS, id.as_str(), fields).await?;
        Self::decode(&merged)
    }

    async fn get_by_id(&self, id: &AppointmentId) -> Result<Appointment, RepositoryError> {
        self.fetch(id).await
    }

    async fn list_by_patient(
        &self,
        patient_id: &UserId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let query = Query::collection(APPOINTMENTS)
            .where_eq("idPaciente", patient_id.as_str())
            .order_by("fecha", Direction::Descending);

        self.store
            .query(&query)
            .await?
            .iter()
            .map(Self::decode)
            .collect()
    }
}

// ============================================================================
// Profiles
// ============================================================================

/// Persistence for user profiles keyed by user id
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Create or overwrite the whole profile
    async fn set(&self, uid: &UserId, profile: &UserProfile) -> Result<(), RepositoryError>;

    /// Merge the patch fields into an existing profile
    async fn update(&self, uid: &UserId, patch: &ProfilePatch) -> Result<(), RepositoryError>;

    async fn set_photo_url(&self, uid: &UserId, url: &str) -> Result<(), RepositoryError>;
}

/// `ProfileRepository` backed by a `DocumentStore`
pub struct DocumentProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl DocumentProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        DocumentProfileRepository { store }
    }
}

#[async_trait]
impl ProfileRepository for DocumentProfileRepository {
    async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        match self.store.get(PROFILES, uid.as_str()).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    async fn set(&self, uid: &UserId, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.store
            .set(PROFILES, uid.as_str(), to_fields(profile)?)
            .await
    }

    async fn update(&self, uid: &UserId, patch: &ProfilePatch) -> Result<(), RepositoryError> {
        self.store
            .update(PROFILES, uid.as_str(), to_fields(patch)?)
            .await?;
        Ok(())
    }

    async fn set_photo_url(&self, uid: &UserId, url: &str) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("photoURL".to_string(), Value::String(url.to_string()));
        self.store.update(PROFILES, uid.as_str(), fields).await?;
        Ok(())
    }
}
