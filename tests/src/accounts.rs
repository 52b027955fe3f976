//! Account and Profile Tests
//!
//! Registration, sign-in, booking and profile editing through the fully
//! assembled services.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use medicitas_coordinator::{
        AuthAction, AuthError, BackendSnapshot, Clock, FixedClock, MediCitas, MediCitasConfig,
        MemoryKeyValueStore,
    };
    use medicitas_integrity::{ProfileUpdate, SignInForm, SignUpForm, UserRole};

    use crate::harness::*;

    fn app() -> MediCitas {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now()));
        MediCitas::new(
            MediCitasConfig::default(),
            clock,
            Arc::new(MemoryKeyValueStore::new()),
            BackendSnapshot::default(),
        )
    }

    fn sign_up_form(email: &str) -> SignUpForm {
        SignUpForm {
            nombre: "Ana Torres".to_string(),
            email: email.to_string(),
            password: "secreto1".to_string(),
            confirmar_password: "secreto1".to_string(),
        }
    }

    fn sign_in_form(email: &str, password: &str) -> SignInForm {
        SignInForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_book_and_cancel() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        assert!(app.session().is_authenticated());

        let booked = app.lifecycle.create(&app.session(), cardiology()).await.unwrap();
        assert_eq!(booked.patient_email, "ana@example.com");
        assert_eq!(booked.patient_name, "Paciente");

        app.lifecycle.cancel(&app.session(), &booked.id).await.unwrap();
        let buckets = app.lifecycle.list_partitioned(&app.session()).await.unwrap();
        assert!(buckets.upcoming.is_empty());
        assert_eq!(buckets.past.len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out_then_sign_in_restores_profile() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        app.auth.sign_out().await.unwrap();
        assert!(!app.session().is_authenticated());
        assert!(app.profiles.cached().await.unwrap().is_none());

        app.auth
            .sign_in(&sign_in_form("ana@example.com", "secreto1"))
            .await
            .unwrap();
        let cached = app.profiles.cached().await.unwrap().unwrap();
        assert_eq!(cached.nombre.as_deref(), Some("Ana Torres"));
        assert_eq!(cached.rol, Some(UserRole::Patient));
    }

    #[tokio::test]
    async fn test_duplicate_registration_message() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        let err = app
            .auth
            .sign_up(&sign_up_form("ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyInUse));
        assert_eq!(
            err.user_message(AuthAction::SignUp),
            "Este correo electrónico ya está registrado"
        );
    }

    #[tokio::test]
    async fn test_repeated_wrong_password_is_rate_limited() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        app.auth.sign_out().await.unwrap();

        let max = app.config.max_failed_sign_ins;
        for _ in 0..max {
            let err = app
                .auth
                .sign_in(&sign_in_form("ana@example.com", "incorrecta"))
                .await
                .unwrap_err();
            assert_eq!(err.user_message(AuthAction::SignIn), "Contraseña incorrecta");
        }

        let err = app
            .auth
            .sign_in(&sign_in_form("ana@example.com", "secreto1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TooManyRequests));
        assert_eq!(
            err.user_message(AuthAction::SignIn),
            "Demasiados intentos fallidos. Intenta más tarde"
        );
        assert!(!app.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_reset_password_messages() {
        let app = app();
        let err = app.auth.reset_password("nadie@example.com").await.unwrap_err();
        assert_eq!(
            err.user_message(AuthAction::ResetPassword),
            "No existe una cuenta con este correo electrónico"
        );

        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        app.auth.reset_password("ana@example.com").await.unwrap();
        assert_eq!(app.auth_provider.reset_outbox(), vec!["ana@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_profile_edit_round() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        let session = app.session();

        let current = app.profiles.load(&session).await.unwrap();
        let mut update = ProfileUpdate::from_profile(&current);
        update.telefono = " 555-0101 ".to_string();
        update.alergias = "Penicilina,  ,Polen ".to_string();
        app.profiles.update(&session, &update).await.unwrap();

        let reloaded = app.profiles.load(&session).await.unwrap();
        assert_eq!(reloaded.nombre.as_deref(), Some("Ana Torres"));
        assert_eq!(reloaded.telefono.as_deref(), Some("555-0101"));
        assert_eq!(reloaded.alergias, vec!["Penicilina", "Polen"]);
        assert!(reloaded.updated_at.is_some());

        let photo = app
            .profiles
            .upload_photo(&session, vec![0xFF, 0xD8, 0xFF, 0xE0])
            .await
            .unwrap();
        let url = photo.photo_url.unwrap();
        assert!(url.ends_with("/profile-pic.jpg"));
        assert_eq!(
            app.profiles.cached().await.unwrap().unwrap().photo_url.as_deref(),
            Some(url.as_str())
        );
    }

    #[tokio::test]
    async fn test_snapshot_carries_state_to_new_instance() {
        let app = app();
        app.auth.sign_up(&sign_up_form("ana@example.com")).await.unwrap();
        let booked = app.lifecycle.create(&app.session(), cardiology()).await.unwrap();
        let snapshot = app.snapshot().await;

        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now()));
        let restored = MediCitas::new(
            MediCitasConfig::default(),
            clock,
            Arc::new(MemoryKeyValueStore::new()),
            snapshot,
        );
        let loaded = restored
            .lifecycle
            .get(&restored.session(), &booked.id)
            .await
            .unwrap();
        assert_eq!(loaded, booked);
    }
}
