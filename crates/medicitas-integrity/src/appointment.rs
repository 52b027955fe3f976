//! Appointment entry types and the status state machine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::doctor::Doctor;
use crate::validation::{ValidationError, ValidationErrorCode};

/// Name stored when an appointment is booked without a doctor
pub const UNASSIGNED_DOCTOR_NAME: &str = "Doctor por asignar";

/// Name stored when the session carries no display name
pub const DEFAULT_PATIENT_NAME: &str = "Paciente";

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque document identifier assigned by the repository
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

/// Authenticated subject identifier
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct UserId(pub String);

/// Doctor identifier within the directory
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
pub struct DoctorId(pub String);

impl AppointmentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DoctorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Specialty
// ============================================================================

/// Medical specialty from the fixed list offered by the booking form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    #[serde(rename = "Medicina General")]
    MedicinaGeneral,
    #[serde(rename = "Cardiología")]
    Cardiologia,
    #[serde(rename = "Dermatología")]
    Dermatologia,
    #[serde(rename = "Ginecología")]
    Ginecologia,
    #[serde(rename = "Pediatría")]
    Pediatria,
    #[serde(rename = "Oftalmología")]
    Oftalmologia,
    #[serde(rename = "Odontología")]
    Odontologia,
    #[serde(rename = "Traumatología")]
    Traumatologia,
    #[serde(rename = "Neurología")]
    Neurologia,
    #[serde(rename = "Psiquiatría")]
    Psiquiatria,
}

impl Specialty {
    /// All specialties in the order the booking form lists them
    pub const ALL: [Specialty; 10] = [
        Specialty::MedicinaGeneral,
        Specialty::Cardiologia,
        Specialty::Dermatologia,
        Specialty::Ginecologia,
        Specialty::Pediatria,
        Specialty::Oftalmologia,
        Specialty::Odontologia,
        Specialty::Traumatologia,
        Specialty::Neurologia,
        Specialty::Psiquiatria,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Specialty::MedicinaGeneral => "Medicina General",
            Specialty::Cardiologia => "Cardiología",
            Specialty::Dermatologia => "Dermatología",
            Specialty::Ginecologia => "Ginecología",
            Specialty::Pediatria => "Pediatría",
            Specialty::Oftalmologia => "Oftalmología",
            Specialty::Odontologia => "Odontología",
            Specialty::Traumatologia => "Traumatología",
            Specialty::Neurologia => "Neurología",
            Specialty::Psiquiatria => "Psiquiatría",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Specialty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::new(
                "especialidad",
                "Selecciona una especialidad",
                ValidationErrorCode::Required,
            ));
        }
        Specialty::ALL
            .iter()
            .copied()
            .find(|sp| sp.name() == s)
            .ok_or_else(|| {
                ValidationError::new(
                    "especialidad",
                    format!("Especialidad no válida: {}", s),
                    ValidationErrorCode::InvalidReference,
                )
            })
    }
}

// ============================================================================
// Status state machine
// ============================================================================

/// Appointment status as persisted in the `estado` field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Booked by the patient, awaiting the doctor
    #[serde(rename = "pendiente")]
    Pending,
    /// Accepted by the doctor
    #[serde(rename = "confirmada")]
    Confirmed,
    /// Cancelled by the patient; terminal
    #[serde(rename = "cancelada")]
    Cancelled,
}

/// Rejected status change
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("invalid status transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: AppointmentStatus,
    pub to: AppointmentStatus,
}

impl AppointmentStatus {
    /// Persisted value
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pendiente",
            AppointmentStatus::Confirmed => "confirmada",
            AppointmentStatus::Cancelled => "cancelada",
        }
    }

    /// User-facing label (persisted value with its first letter capitalised)
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pendiente",
            AppointmentStatus::Confirmed => "Confirmada",
            AppointmentStatus::Cancelled => "Cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pending, AppointmentStatus::Confirmed)
                | (AppointmentStatus::Pending, AppointmentStatus::Cancelled)
                | (AppointmentStatus::Confirmed, AppointmentStatus::Cancelled)
        )
    }

    /// Apply a transition, returning the new status
    pub fn transition(self, next: AppointmentStatus) -> Result<AppointmentStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError { from: self, to: next })
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(AppointmentStatus::Pending),
            "confirmada" => Ok(AppointmentStatus::Confirmed),
            "cancelada" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

// ============================================================================
// Appointment records
// ============================================================================

/// Appointment document as stored in the `citas` collection.
///
/// The document id is not part of the body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDocument {
    #[serde(rename = "idPaciente")]
    pub patient_id: UserId,
    #[serde(rename = "emailPaciente")]
    pub patient_email: String,
    #[serde(rename = "nombrePaciente")]
    pub patient_name: String,
    #[serde(rename = "idDoctor")]
    pub doctor_id: DoctorId,
    #[serde(rename = "nombreDoctor")]
    pub doctor_name: String,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
    #[serde(rename = "fecha")]
    pub scheduled_at: NaiveDateTime,
    #[serde(rename = "notas", default)]
    pub notes: String,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
    /// Server-assigned; absent until the store resolves it
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A persisted appointment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub patient_email: String,
    pub patient_name: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialty: Specialty,
    pub scheduled_at: NaiveDateTime,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn from_document(id: AppointmentId, doc: AppointmentDocument) -> Self {
        Appointment {
            id,
            patient_id: doc.patient_id,
            patient_email: doc.patient_email,
            patient_name: doc.patient_name,
            doctor_id: doc.doctor_id,
            doctor_name: doc.doctor_name,
            specialty: doc.specialty,
            scheduled_at: doc.scheduled_at,
            notes: if doc.notes.is_empty() { None } else { Some(doc.notes) },
            status: doc.status,
            created_at: doc.created_at,
        }
    }

    pub fn to_document(&self) -> AppointmentDocument {
        AppointmentDocument {
            patient_id: self.patient_id.clone(),
            patient_email: self.patient_email.clone(),
            patient_name: self.patient_name.clone(),
            doctor_id: self.doctor_id.clone(),
            doctor_name: self.doctor_name.clone(),
            specialty: self.specialty,
            scheduled_at: self.scheduled_at,
            notes: self.notes.clone().unwrap_or_default(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    pub fn has_doctor(&self) -> bool {
        !self.doctor_id.is_empty()
    }

    /// Upcoming means strictly in the future and not cancelled
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.scheduled_at > now && self.status != AppointmentStatus::Cancelled
    }
}

/// Everything needed to persist a new appointment; status is always pending
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub patient_id: UserId,
    pub patient_email: String,
    pub patient_name: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub specialty: Specialty,
    pub scheduled_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    pub fn into_document(self) -> AppointmentDocument {
        AppointmentDocument {
            patient_id: self.patient_id,
            patient_email: self.patient_email,
            patient_name: self.patient_name,
            doctor_id: self.doctor_id,
            doctor_name: self.doctor_name,
            specialty: self.specialty,
            scheduled_at: self.scheduled_at,
            notes: self.notes.unwrap_or_default(),
            status: AppointmentStatus::Pending,
            created_at: None,
        }
    }
}

// ============================================================================
// Booking validation
// ============================================================================

/// Combine the picked date and time, keeping hours and minutes only
pub fn combine_date_time(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
    date.and_time(time)
}

/// Outcome of a valid booking request
#[derive(Clone, Debug, PartialEq)]
pub struct BookingSelection<'a> {
    pub specialty: Specialty,
    pub doctor: Option<&'a Doctor>,
    pub scheduled_at: NaiveDateTime,
}

/// Validate the booking form against the doctors offered for the chosen
/// specialty.
///
/// Checks run in the form's order: specialty, doctor selection, date.
/// A doctor is required only when the specialty has at least one doctor.
pub fn validate_booking<'a>(
    specialty: &str,
    doctor_id: Option<&str>,
    doctors_for_specialty: &'a [Doctor],
    scheduled_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Result<BookingSelection<'a>, ValidationError> {
    let specialty: Specialty = specialty.parse()?;

    let doctor_id = doctor_id.filter(|id| !id.is_empty());
    let doctor = match doctor_id {
        None if !doctors_for_specialty.is_empty() => {
            return Err(ValidationError::new(
                "idDoctor",
                "Selecciona un doctor",
                ValidationErrorCode::Required,
            ));
        }
        None => None,
        Some(id) => {
            let found = doctors_for_specialty
                .iter()
                .find(|d| d.id.as_str() == id && d.specialty == specialty)
                .ok_or_else(|| {
                    ValidationError::new(
                        "idDoctor",
                        format!("El doctor seleccionado no atiende {}", specialty),
                        ValidationErrorCode::InvalidReference,
                    )
                })?;
            Some(found)
        }
    };

    if scheduled_at < now {
        return Err(ValidationError::new(
            "fecha",
            "No puedes agendar citas en el pasado",
            ValidationErrorCode::InPast,
        ));
    }

    Ok(BookingSelection {
        specialty,
        doctor,
        scheduled_at,
    })
}
