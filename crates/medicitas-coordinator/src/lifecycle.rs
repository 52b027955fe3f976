//! Appointment Lifecycle Manager
//!
//! Orchestrates booking, cancellation and confirmation:
//! - Booking validation against the doctor directory and the clock
//! - Status transitions through the integrity state machine
//! - Ownership checks against the caller's session
//!
//! No overlap detection is performed; two appointments may share a slot.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use medicitas_integrity::{
    combine_date_time, validate_booking, Appointment, AppointmentDraft, AppointmentId,
    AppointmentStatus, Doctor, DoctorId, UNASSIGNED_DOCTOR_NAME,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::directory::DoctorDirectory;
use crate::error::LifecycleError;
use crate::repository::AppointmentRepository;
use crate::session::Session;

/// Booking form values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub specialty: String,
    pub doctor_id: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

/// A patient's appointments split for display
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AppointmentBuckets {
    /// Strictly after now and not cancelled
    pub upcoming: Vec<Appointment>,
    /// At or before now, or cancelled
    pub past: Vec<Appointment>,
}

/// Split appointments into upcoming and past, preserving order
pub fn partition(appointments: Vec<Appointment>, now: NaiveDateTime) -> AppointmentBuckets {
    let (upcoming, past) = appointments.into_iter().partition(|a| a.is_upcoming(now));
    AppointmentBuckets { upcoming, past }
}

pub struct AppointmentLifecycleManager {
    repository: Arc<dyn AppointmentRepository>,
    directory: Arc<DoctorDirectory>,
    clock: Arc<dyn Clock>,
}

impl AppointmentLifecycleManager {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        directory: Arc<DoctorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        AppointmentLifecycleManager {
            repository,
            directory,
            clock,
        }
    }

    pub fn directory(&self) -> &DoctorDirectory {
        &self.directory
    }

    /// Book a new pending appointment for the session's user.
    ///
    /// Form checks run before the session check, and nothing is written
    /// unless every check passes.
    pub async fn create(
        &self,
        session: &Session,
        request: BookingRequest,
    ) -> Result<Appointment, LifecycleError> {
        let doctors = self.directory.filter_by_specialty(&request.specialty);
        let scheduled_at = combine_date_time(request.date, request.time);
        let selection = validate_booking(
            &request.specialty,
            request.doctor_id.as_deref(),
            &doctors,
            scheduled_at,
            self.clock.now_local(),
        )?;

        let user = session.require_user()?;

        let (doctor_id, doctor_name) = match selection.doctor {
            Some(doctor) => (doctor.id.clone(), doctor.name.clone()),
            None => (DoctorId(String::new()), UNASSIGNED_DOCTOR_NAME.to_string()),
        };

        let draft = AppointmentDraft {
            patient_id: user.id.clone(),
            patient_email: user.email.clone(),
            patient_name: user.patient_name().to_string(),
            doctor_id,
            doctor_name,
            specialty: selection.specialty,
            scheduled_at: selection.scheduled_at,
            notes: request.notes.filter(|n| !n.is_empty()),
        };

        let appointment = self.repository.create(draft).await?;
        info!(
            "Booked appointment {} for {} ({}, {})",
            appointment.id, user.id, appointment.specialty, appointment.scheduled_at
        );
        Ok(appointment)
    }

    /// Cancel one of the caller's appointments. Cancelling twice is an
    /// invalid transition and writes nothing.
    pub async fn cancel(
        &self,
        session: &Session,
        id: &AppointmentId,
    ) -> Result<Appointment, LifecycleError> {
        let appointment = self.get(session, id).await?;
        let next = appointment.status.transition(AppointmentStatus::Cancelled)?;

        let updated = self.repository.update_status(id, next).await?;
        info!("Cancelled appointment {}", id);
        Ok(updated)
    }

    /// Doctor-side acceptance of a pending appointment
    pub async fn confirm(
        &self,
        doctor_id: &DoctorId,
        id: &AppointmentId,
    ) -> Result<Appointment, LifecycleError> {
        let appointment = self.repository.get_by_id(id).await?;
        if &appointment.doctor_id != doctor_id {
            warn!("Doctor {} cannot confirm appointment {}", doctor_id, id);
            return Err(LifecycleError::NotFound(id.clone()));
        }
        let next = appointment.status.transition(AppointmentStatus::Confirmed)?;

        let updated = self.repository.update_status(id, next).await?;
        info!("Doctor {} confirmed appointment {}", doctor_id, id);
        Ok(updated)
    }

    /// Fresh read of one of the caller's appointments. Another patient's
    /// appointment is reported as not found.
    pub async fn get(
        &self,
        session: &Session,
        id: &AppointmentId,
    ) -> Result<Appointment, LifecycleError> {
        let user = session.require_user()?;
        let appointment = self.repository.get_by_id(id).await?;
        if appointment.patient_id != user.id {
            warn!("User {} requested appointment {} owned by another patient", user.id, id);
            return Err(LifecycleError::NotFound(id.clone()));
        }
        Ok(appointment)
    }

    /// The caller's appointments, newest first
    pub async fn list(&self, session: &Session) -> Result<Vec<Appointment>, LifecycleError> {
        let user = session.require_user()?;
        let appointments = self.repository.list_by_patient(&user.id).await?;
        debug!("Loaded {} appointments for {}", appointments.len(), user.id);
        Ok(appointments)
    }

    /// The caller's appointments split around the current time
    pub async fn list_partitioned(
        &self,
        session: &Session,
    ) -> Result<AppointmentBuckets, LifecycleError> {
        let appointments = self.list(session).await?;
        Ok(partition(appointments, self.clock.now_local()))
    }

    /// Doctors for a specialty; an unknown or empty specialty yields none
    pub fn filter_doctors(&self, specialty: &str) -> Vec<Doctor> {
        self.directory.filter_by_specialty(specialty)
    }
}
