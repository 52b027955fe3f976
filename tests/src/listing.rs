//! Listing Tests
//!
//! Appointment lists are scoped to the caller and ordered by date; the
//! doctor filter never fails.

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use medicitas_coordinator::{LifecycleError, Session};

    use crate::harness::*;

    #[tokio::test]
    async fn test_list_only_returns_callers_appointments() {
        let h = Harness::new();
        for day in [3, 1, 2] {
            h.manager
                .create(&ana(), booking("Cardiología", Some("1"), date(2025, 6, day), time(9, 0)))
                .await
                .unwrap();
        }
        h.manager
            .create(&luis(), booking("Pediatría", Some("4"), date(2025, 6, 5), time(9, 0)))
            .await
            .unwrap();

        let mine = h.manager.list(&ana()).await.unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.iter().all(|a| a.patient_id.as_str() == "patient-ana"));

        let dates: Vec<_> = mine.iter().map(|a| a.scheduled_at.date()).collect();
        assert_eq!(dates, vec![date(2025, 6, 3), date(2025, 6, 2), date(2025, 6, 1)]);

        let theirs = h.manager.list(&luis()).await.unwrap();
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].patient_name, "Luis Pardo");
    }

    #[tokio::test]
    async fn test_list_for_new_patient_is_empty() {
        let h = Harness::new();
        h.manager.create(&ana(), cardiology()).await.unwrap();
        let session = patient("patient-new", "new@example.com", "Nuevo");
        assert!(h.manager.list(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_requires_session() {
        let h = Harness::new();
        let err = h.manager.list(&Session::anonymous()).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Session(_)));
    }

    #[tokio::test]
    async fn test_get_other_patients_appointment_is_not_found() {
        let h = Harness::new();
        let booked = h.manager.create(&ana(), cardiology()).await.unwrap();
        let err = h.manager.get(&luis(), &booked.id).await.unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_partition_follows_clock() {
        let h = Harness::new();
        let soon = h
            .manager
            .create(&ana(), booking("Cardiología", Some("1"), date(2025, 5, 2), time(9, 0)))
            .await
            .unwrap();
        let later = h.manager.create(&ana(), cardiology()).await.unwrap();
        let cancelled = h
            .manager
            .create(&ana(), booking("Cardiología", Some("1"), date(2025, 7, 1), time(9, 0)))
            .await
            .unwrap();
        h.manager.cancel(&ana(), &cancelled.id).await.unwrap();

        let buckets = h.manager.list_partitioned(&ana()).await.unwrap();
        let upcoming: Vec<_> = buckets.upcoming.iter().map(|a| a.id.clone()).collect();
        assert_eq!(upcoming, vec![later.id.clone(), soon.id.clone()]);
        assert_eq!(buckets.past.len(), 1);
        assert_eq!(buckets.past[0].id, cancelled.id);

        h.clock.advance(Duration::days(2));
        let buckets = h.manager.list_partitioned(&ana()).await.unwrap();
        assert_eq!(buckets.upcoming.len(), 1);
        assert_eq!(buckets.upcoming[0].id, later.id);
        assert_eq!(buckets.past.len(), 2);
    }

    #[test]
    fn test_filter_unknown_specialty_is_empty() {
        let h = Harness::new();
        assert!(h.manager.filter_doctors("Urología").is_empty());
        assert!(h.manager.filter_doctors("").is_empty());
        assert!(h.manager.filter_doctors("cardiología").is_empty());
    }

    #[test]
    fn test_filter_known_specialty_is_exact() {
        let h = Harness::new();
        let doctors = h.manager.filter_doctors("Cardiología");
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].name, "Dra. Ana García");
    }
}
