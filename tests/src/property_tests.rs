//! Property-Based Tests
//!
//! These tests check invariants that must hold for any input:
//! - The status machine never leaves `cancelada`
//! - Transitions succeed exactly when the machine allows them
//! - Comma-separated list parsing never yields blank items
//! - Email acceptance matches the `\S+@\S+\.\S+` shape
//! - Partitioning keeps every appointment exactly once, in order
//!
//! Uses proptest for randomized property testing with shrinking.

#[cfg(test)]
mod status_machine {
    use medicitas_integrity::AppointmentStatus;
    use proptest::prelude::*;

    fn status() -> impl Strategy<Value = AppointmentStatus> {
        prop_oneof![
            Just(AppointmentStatus::Pending),
            Just(AppointmentStatus::Confirmed),
            Just(AppointmentStatus::Cancelled),
        ]
    }

    proptest! {
        #[test]
        fn cancelled_is_absorbing(steps in prop::collection::vec(status(), 0..20)) {
            let mut current = AppointmentStatus::Cancelled;
            for next in steps {
                prop_assert!(current.transition(next).is_err());
                current = current.transition(next).unwrap_or(current);
            }
            prop_assert_eq!(current, AppointmentStatus::Cancelled);
        }

        #[test]
        fn transition_agrees_with_table(from in status(), to in status()) {
            let result = from.transition(to);
            prop_assert_eq!(result.is_ok(), from.can_transition_to(to));
            if let Err(e) = result {
                prop_assert_eq!(e.from, from);
                prop_assert_eq!(e.to, to);
            }
        }

        #[test]
        fn walks_reach_cancelled_in_at_most_two_steps(
            steps in prop::collection::vec(status(), 0..20),
        ) {
            let mut current = AppointmentStatus::Pending;
            let mut applied = 0;
            for next in steps {
                if let Ok(moved) = current.transition(next) {
                    current = moved;
                    applied += 1;
                }
            }
            prop_assert!(applied <= 2);
        }

        #[test]
        fn wire_value_round_trips(s in status()) {
            prop_assert_eq!(s.as_str().parse::<AppointmentStatus>(), Ok(s));
        }
    }
}

#[cfg(test)]
mod form_helpers {
    use medicitas_integrity::{is_valid_email, split_list};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn split_list_items_are_trimmed_and_non_empty(raw in "[a-zA-Z ,]{0,60}") {
            for item in split_list(&raw) {
                prop_assert!(!item.is_empty());
                prop_assert_eq!(item.trim(), item.as_str());
                prop_assert!(!item.contains(','));
            }
        }

        #[test]
        fn split_list_keeps_words(words in prop::collection::vec("[a-z]{1,8}", 0..6)) {
            let raw = words.join(" , ");
            prop_assert_eq!(split_list(&raw), words);
        }

        #[test]
        fn well_formed_emails_accepted(
            user in "[a-z0-9._]{1,12}",
            domain in "[a-z0-9]{1,10}",
            tld in "[a-z]{2,4}",
        ) {
            let email = format!("{}@{}.{}", user, domain, tld);
            prop_assert!(is_valid_email(&email));
        }

        #[test]
        fn emails_without_at_rejected(raw in "[a-z0-9. ]{0,30}") {
            prop_assert!(!is_valid_email(&raw));
        }

        #[test]
        fn emails_without_dot_in_domain_rejected(
            user in "[a-z0-9]{1,12}",
            domain in "[a-z0-9]{1,12}",
        ) {
            let email = format!("{}@{}", user, domain);
            prop_assert!(!is_valid_email(&email));
        }
    }
}

#[cfg(test)]
mod partitioning {
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use medicitas_coordinator::partition;
    use medicitas_integrity::{
        Appointment, AppointmentId, AppointmentStatus, DoctorId, Specialty, UserId,
    };
    use proptest::prelude::*;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn appointment(index: usize, offset_hours: i64, cancelled: bool) -> Appointment {
        Appointment {
            id: AppointmentId(format!("appt{}", index)),
            patient_id: UserId("patient".to_string()),
            patient_email: "p@example.com".to_string(),
            patient_name: "Paciente".to_string(),
            doctor_id: DoctorId("1".to_string()),
            doctor_name: "Dra. Ana García".to_string(),
            specialty: Specialty::Cardiologia,
            scheduled_at: base() + Duration::hours(offset_hours),
            notes: None,
            status: if cancelled {
                AppointmentStatus::Cancelled
            } else {
                AppointmentStatus::Pending
            },
            created_at: None,
        }
    }

    proptest! {
        #[test]
        fn partition_is_lossless_and_ordered(
            entries in prop::collection::vec((-500i64..500, any::<bool>()), 0..30),
        ) {
            let appointments: Vec<Appointment> = entries
                .iter()
                .enumerate()
                .map(|(i, (offset, cancelled))| appointment(i, *offset, *cancelled))
                .collect();
            let buckets = partition(appointments.clone(), base());

            prop_assert_eq!(buckets.upcoming.len() + buckets.past.len(), appointments.len());
            for appt in &buckets.upcoming {
                prop_assert!(appt.scheduled_at > base());
                prop_assert_ne!(appt.status, AppointmentStatus::Cancelled);
            }
            for appt in &buckets.past {
                prop_assert!(
                    appt.scheduled_at <= base() || appt.status == AppointmentStatus::Cancelled
                );
            }

            let position = |id: &AppointmentId| appointments.iter().position(|a| &a.id == id);
            let upcoming: Vec<_> = buckets.upcoming.iter().map(|a| position(&a.id)).collect();
            let past: Vec<_> = buckets.past.iter().map(|a| position(&a.id)).collect();
            prop_assert!(upcoming.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(past.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
