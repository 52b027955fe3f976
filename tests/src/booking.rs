//! Booking Tests
//!
//! Appointment creation: validation order, session requirement and the
//! persisted document shape.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration;
    use medicitas_coordinator::{DoctorDirectory, LifecycleError, Session};
    use medicitas_integrity::{AppointmentStatus, ValidationErrorCode};
    use serde_json::json;

    use crate::harness::*;

    #[tokio::test]
    async fn test_valid_booking_is_pending_with_fresh_id() {
        let h = Harness::new();
        let mut ids = HashSet::new();

        for day in 1..=5 {
            let appt = h
                .manager
                .create(&ana(), booking("Cardiología", Some("1"), date(2025, 6, day), time(10, 0)))
                .await
                .unwrap();
            assert_eq!(appt.status, AppointmentStatus::Pending);
            assert!(appt.created_at.is_some());
            assert!(ids.insert(appt.id.clone()), "duplicate id {}", appt.id);
        }
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_stored_document_shape() {
        let h = Harness::new();
        let mut request = cardiology();
        request.notes = Some("chest pain".to_string());

        let appt = h.manager.create(&ana(), request).await.unwrap();
        let fields = h.stored(appt.id.as_str()).await;

        assert_eq!(fields["especialidad"], json!("Cardiología"));
        assert_eq!(fields["estado"], json!("pendiente"));
        assert_eq!(fields["notas"], json!("chest pain"));
        assert_eq!(fields["fecha"], json!("2025-06-01T14:30:00"));
        assert_eq!(fields["idPaciente"], json!("patient-ana"));
        assert_eq!(fields["emailPaciente"], json!("ana@example.com"));
        assert_eq!(fields["nombrePaciente"], json!("Ana Torres"));
        assert_eq!(fields["idDoctor"], json!("1"));
        assert_eq!(fields["nombreDoctor"], json!("Dra. Ana García"));
        assert!(fields.contains_key("createdAt"));
    }

    #[tokio::test]
    async fn test_past_booking_writes_nothing() {
        let h = Harness::new();
        let err = h
            .manager
            .create(&ana(), booking("Cardiología", Some("1"), date(2025, 4, 30), time(9, 0)))
            .await
            .unwrap_err();

        match err {
            LifecycleError::Validation(e) => assert_eq!(e.code, ValidationErrorCode::InPast),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(h.store.call_count(), 0);
        assert_eq!(h.store.len("citas").await, 0);
    }

    #[tokio::test]
    async fn test_booking_exactly_now_is_allowed() {
        let h = Harness::new();
        let appt = h
            .manager
            .create(&ana(), booking("Pediatría", Some("4"), date(2025, 5, 1), time(9, 0)))
            .await
            .unwrap();
        assert_eq!(appt.scheduled_at, now());
    }

    #[tokio::test]
    async fn test_clock_moves_past_booking() {
        let h = Harness::new();
        h.clock.advance(Duration::days(60));
        let err = h.manager.create(&ana(), cardiology()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unauthenticated_booking_never_reaches_store() {
        let h = Harness::new();
        let err = h
            .manager
            .create(&Session::anonymous(), cardiology())
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Session(_)));
        assert_eq!(h.store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_form_errors_win_over_missing_session() {
        let h = Harness::new();
        let err = h
            .manager
            .create(&Session::anonymous(), booking("", None, date(2025, 6, 1), time(9, 0)))
            .await
            .unwrap_err();
        match err {
            LifecycleError::Validation(e) => assert_eq!(e.code, ValidationErrorCode::Required),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_doctor_required_when_specialty_has_doctors() {
        let h = Harness::new();
        let err = h
            .manager
            .create(&ana(), booking("Neurología", None, date(2025, 6, 1), time(9, 0)))
            .await
            .unwrap_err();
        match err {
            LifecycleError::Validation(e) => {
                assert_eq!(e.field, "idDoctor");
                assert_eq!(e.message, "Selecciona un doctor");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_doctor_from_other_specialty_rejected() {
        let h = Harness::new();
        let err = h
            .manager
            .create(&ana(), booking("Cardiología", Some("2"), date(2025, 6, 1), time(9, 0)))
            .await
            .unwrap_err();
        match err {
            LifecycleError::Validation(e) => {
                assert_eq!(e.code, ValidationErrorCode::InvalidReference)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(h.store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_specialty_without_doctors_books_unassigned() {
        let h = Harness::with_directory(DoctorDirectory::new(Vec::new(), Vec::new()));
        let appt = h
            .manager
            .create(&ana(), booking("Dermatología", None, date(2025, 6, 2), time(11, 0)))
            .await
            .unwrap();
        assert!(!appt.has_doctor());
        assert_eq!(appt.doctor_name, "Doctor por asignar");
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_and_leaves_nothing() {
        let h = Harness::new();
        h.store.fail_next("network unreachable").await;

        let err = h.manager.create(&ana(), cardiology()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Repository(_)));
        assert_eq!(h.store.len("citas").await, 0);

        h.manager.create(&ana(), cardiology()).await.unwrap();
        assert_eq!(h.store.len("citas").await, 1);
    }
}
