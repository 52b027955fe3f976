//! Cancellation and Confirmation Tests
//!
//! Status transitions driven through the lifecycle manager against the
//! stored documents.

#[cfg(test)]
mod tests {
    use medicitas_coordinator::{LifecycleError, Session};
    use medicitas_integrity::{AppointmentId, AppointmentStatus, DoctorId};
    use serde_json::json;

    use crate::harness::*;

    #[tokio::test]
    async fn test_cancel_pending_changes_only_status() {
        let h = Harness::new();
        let mut request = cardiology();
        request.notes = Some("control anual".to_string());
        let booked = h.manager.create(&ana(), request).await.unwrap();
        let before = h.stored(booked.id.as_str()).await;

        let cancelled = h.manager.cancel(&ana(), &booked.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let after = h.stored(booked.id.as_str()).await;
        assert_eq!(after["estado"], json!("cancelada"));
        for (key, value) in &before {
            if key != "estado" {
                assert_eq!(after.get(key), Some(value), "field {} changed", key);
            }
        }
        assert_eq!(after.len(), before.len());
    }

    #[tokio::test]
    async fn test_cancel_twice_is_invalid_and_writes_nothing() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();
        h.manager.cancel(&ana(), &booked.id).await.unwrap();
        let writes = h.store.write_count();

        let err = h.manager.cancel(&ana(), &booked.id).await.unwrap_err();
        match err {
            LifecycleError::InvalidTransition(e) => {
                assert_eq!(e.from, AppointmentStatus::Cancelled);
                assert_eq!(e.to, AppointmentStatus::Cancelled);
            }
            other => panic!("expected invalid transition, got {:?}", other),
        }
        assert_eq!(h.store.write_count(), writes);
    }

    #[tokio::test]
    async fn test_confirmed_can_still_be_cancelled() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();

        let confirmed = h
            .manager
            .confirm(&DoctorId("1".to_string()), &booked.id)
            .await
            .unwrap();
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        let cancelled = h.manager.cancel(&ana(), &booked.id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        let err = h
            .manager
            .confirm(&DoctorId("1".to_string()), &booked.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn test_confirm_by_other_doctor_is_not_found() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();

        let err = h
            .manager
            .confirm(&DoctorId("3".to_string()), &booked.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
        assert_eq!(h.stored(booked.id.as_str()).await["estado"], json!("pendiente"));
    }

    #[tokio::test]
    async fn test_cancel_other_patients_appointment_is_not_found() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();

        let err = h.manager.cancel(&luis(), &booked.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
        assert_eq!(h.stored(booked.id.as_str()).await["estado"], json!("pendiente"));
    }

    #[tokio::test]
    async fn test_cancel_unknown_id_is_not_found() {
        let h = Harness::new();
        let err = h
            .manager
            .cancel(&ana(), &AppointmentId("doesNotExist00000000".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_requires_session() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();
        let calls = h.store.call_count();

        let err = h
            .manager
            .cancel(&Session::anonymous(), &booked.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Session(_)));
        assert_eq!(h.store.call_count(), calls);
    }

    #[tokio::test]
    async fn test_failed_cancel_keeps_status() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();
        h.store.fail_next("timeout").await;

        let err = h.manager.cancel(&ana(), &booked.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Repository(_)));

        let reread = h.manager.get(&ana(), &booked.id).await.unwrap();
        assert_eq!(reread.status, AppointmentStatus::Pending);
    }
}
