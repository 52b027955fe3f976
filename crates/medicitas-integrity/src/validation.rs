//! Input validation shared by the booking, account and profile forms.
//!
//! Messages are the user-facing strings shown by the client, so a
//! `ValidationError` can be surfaced as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation error with detailed context
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ValidationErrorCode,
}

/// Specific validation error codes for programmatic handling
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidationErrorCode {
    Required,
    InvalidFormat,
    TooShort,
    Mismatch,
    InvalidReference,
    InPast,
}

impl ValidationError {
    pub fn new(field: &str, message: impl Into<String>, code: ValidationErrorCode) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
            code,
        }
    }
}

/// Validation result that can accumulate multiple errors
#[derive(Clone, Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, field: &str, message: &str, code: ValidationErrorCode) {
        self.errors.push(ValidationError::new(field, message, code));
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collapse into the first error, which is the one the form reports.
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            None => Ok(()),
            Some(err) => Err(err),
        }
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("e-mail pattern is a valid regex"));

/// Loose e-mail shape check: `\S+@\S+\.\S+` anywhere in the input.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Credentials typed into the sign-in form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.email.is_empty() || self.password.is_empty() {
            result.add_error(
                "form",
                "Por favor completa todos los campos",
                ValidationErrorCode::Required,
            );
        }
        result
    }
}

/// Registration form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignUpForm {
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub confirmar_password: String,
}

impl SignUpForm {
    /// Checks run in the order the registration screen reports them and
    /// stop at the first failure.
    pub fn validate(&self, min_password_length: usize) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.nombre.is_empty()
            || self.email.is_empty()
            || self.password.is_empty()
            || self.confirmar_password.is_empty()
        {
            result.add_error(
                "form",
                "Por favor completa todos los campos",
                ValidationErrorCode::Required,
            );
            return result;
        }

        if !is_valid_email(&self.email) {
            result.add_error(
                "email",
                "Por favor ingresa un email válido",
                ValidationErrorCode::InvalidFormat,
            );
            return result;
        }

        if self.password != self.confirmar_password {
            result.add_error(
                "confirmar_password",
                "Las contraseñas no coinciden",
                ValidationErrorCode::Mismatch,
            );
            return result;
        }

        if self.password.chars().count() < min_password_length {
            result.add_error(
                "password",
                &format!(
                    "La contraseña debe tener al menos {} caracteres",
                    min_password_length
                ),
                ValidationErrorCode::TooShort,
            );
        }

        result
    }
}

/// Validate the address typed into the password-recovery form
pub fn validate_reset_email(email: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if email.is_empty() {
        result.add_error(
            "email",
            "Por favor ingresa tu correo electrónico",
            ValidationErrorCode::Required,
        );
        return result;
    }

    if !is_valid_email(email) {
        result.add_error(
            "email",
            "Por favor ingresa un email válido",
            ValidationErrorCode::InvalidFormat,
        );
    }

    result
}
