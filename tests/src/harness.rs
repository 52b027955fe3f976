//! Shared fixtures: a fixed clock, an in-memory store and the lifecycle
//! manager wired over them.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use medicitas_coordinator::{
    AppointmentLifecycleManager, BookingRequest, Clock, DocumentAppointmentRepository,
    DoctorDirectory, FixedClock, MemoryDocumentStore, Session, SessionUser,
};

/// "Now" for every scenario: 2025-05-01 09:00 local time
pub fn now() -> NaiveDateTime {
    date(2025, 5, 1).and_time(time(9, 0))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

pub fn patient(uid: &str, email: &str, name: &str) -> Session {
    Session::authenticated(SessionUser::new(uid, email, Some(name)))
}

pub fn ana() -> Session {
    patient("patient-ana", "ana@example.com", "Ana Torres")
}

pub fn luis() -> Session {
    patient("patient-luis", "luis@example.com", "Luis Pardo")
}

pub fn booking(
    specialty: &str,
    doctor: Option<&str>,
    date: NaiveDate,
    time: NaiveTime,
) -> BookingRequest {
    BookingRequest {
        specialty: specialty.to_string(),
        doctor_id: doctor.map(str::to_string),
        date,
        time,
        notes: None,
    }
}

/// A future Cardiología booking with the seeded cardiologist
pub fn cardiology() -> BookingRequest {
    booking("Cardiología", Some("1"), date(2025, 6, 1), time(14, 30))
}

pub struct Harness {
    pub clock: Arc<FixedClock>,
    pub store: Arc<MemoryDocumentStore>,
    pub manager: AppointmentLifecycleManager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_directory(DoctorDirectory::seeded())
    }

    pub fn with_directory(directory: DoctorDirectory) -> Self {
        let clock = Arc::new(FixedClock::new(now()));
        let shared: Arc<dyn Clock> = clock.clone();
        let store = Arc::new(MemoryDocumentStore::new(shared.clone()));
        let repository = Arc::new(DocumentAppointmentRepository::new(store.clone()));
        let manager = AppointmentLifecycleManager::new(repository, Arc::new(directory), shared);
        Harness {
            clock,
            store,
            manager,
        }
    }

    /// Stored fields of one appointment document
    pub async fn stored(&self, id: &str) -> serde_json::Map<String, serde_json::Value> {
        self.store
            .snapshot()
            .await
            .get("citas")
            .and_then(|docs| docs.get(id))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
