//! User profile document stored in the `usuarios` collection.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationErrorCode, ValidationResult};

/// Name shown when a profile has none
pub const DEFAULT_USER_NAME: &str = "Usuario";

/// Role recorded on the profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    Patient,
    Doctor,
    Other(String),
}

impl From<String> for UserRole {
    fn from(value: String) -> Self {
        match value.as_str() {
            "paciente" => UserRole::Patient,
            "doctor" => UserRole::Doctor,
            _ => UserRole::Other(value),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Patient => "paciente".to_string(),
            UserRole::Doctor => "doctor".to_string(),
            UserRole::Other(raw) => raw,
        }
    }
}

impl UserRole {
    pub fn label(&self) -> &str {
        match self {
            UserRole::Patient => "Paciente",
            UserRole::Doctor => "Doctor",
            UserRole::Other(raw) => raw,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// User profile with identity, medical and demographic fields.
///
/// Documents written at sign-in carry only `email`, `rol` and
/// `createdAt`, so every other field is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(rename = "fechaNacimiento", skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    pub alergias: Vec<String>,
    #[serde(rename = "enfermedadesCronicas")]
    pub enfermedades_cronicas: Vec<String>,
    #[serde(rename = "tipoSangre", skip_serializing_if = "Option::is_none")]
    pub tipo_sangre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biografia: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Profile written the first time a subject signs in
    pub fn initial(email: &str, nombre: Option<&str>, now: DateTime<Utc>) -> Self {
        UserProfile {
            nombre: nombre.map(str::to_string),
            email: Some(email.to_string()),
            rol: Some(UserRole::Patient),
            created_at: Some(now),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.nombre
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_USER_NAME)
    }

    /// First letter of the name, for avatar placeholders
    pub fn initial_letter(&self) -> char {
        self.display_name().chars().next().unwrap_or('U')
    }

    /// Overlay the fields carried by a patch
    pub fn apply(&mut self, patch: &ProfilePatch) {
        self.nombre = Some(patch.nombre.clone());
        self.telefono = Some(patch.telefono.clone());
        self.fecha_nacimiento = Some(patch.fecha_nacimiento.clone());
        self.direccion = Some(patch.direccion.clone());
        self.biografia = Some(patch.biografia.clone());
        self.tipo_sangre = Some(patch.tipo_sangre.clone());
        self.alergias = patch.alergias.clone();
        self.enfermedades_cronicas = patch.enfermedades_cronicas.clone();
        self.updated_at = Some(patch.updated_at);
    }
}

/// Raw values from the profile settings form
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub nombre: String,
    pub telefono: String,
    pub fecha_nacimiento: String,
    pub direccion: String,
    pub biografia: String,
    pub tipo_sangre: String,
    /// Comma-separated
    pub alergias: String,
    /// Comma-separated
    pub enfermedades_cronicas: String,
}

/// Field patch written to the profile document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    pub nombre: String,
    pub telefono: String,
    #[serde(rename = "fechaNacimiento")]
    pub fecha_nacimiento: String,
    pub direccion: String,
    pub biografia: String,
    #[serde(rename = "tipoSangre")]
    pub tipo_sangre: String,
    pub alergias: Vec<String>,
    #[serde(rename = "enfermedadesCronicas")]
    pub enfermedades_cronicas: Vec<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Split a comma-separated form value, trimming items and dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl ProfileUpdate {
    /// Form prefilled from a stored profile, lists joined with ", "
    pub fn from_profile(profile: &UserProfile) -> Self {
        ProfileUpdate {
            nombre: profile.nombre.clone().unwrap_or_default(),
            telefono: profile.telefono.clone().unwrap_or_default(),
            fecha_nacimiento: profile.fecha_nacimiento.clone().unwrap_or_default(),
            direccion: profile.direccion.clone().unwrap_or_default(),
            biografia: profile.biografia.clone().unwrap_or_default(),
            tipo_sangre: profile.tipo_sangre.clone().unwrap_or_default(),
            alergias: profile.alergias.join(", "),
            enfermedades_cronicas: profile.enfermedades_cronicas.join(", "),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if self.nombre.trim().is_empty() {
            result.add_error(
                "nombre",
                "Por favor ingresa tu nombre completo",
                ValidationErrorCode::Required,
            );
        }
        result
    }

    pub fn to_patch(&self, now: DateTime<Utc>) -> ProfilePatch {
        ProfilePatch {
            nombre: self.nombre.trim().to_string(),
            telefono: self.telefono.trim().to_string(),
            fecha_nacimiento: self.fecha_nacimiento.trim().to_string(),
            direccion: self.direccion.trim().to_string(),
            biografia: self.biografia.trim().to_string(),
            tipo_sangre: self.tipo_sangre.clone(),
            alergias: split_list(&self.alergias),
            enfermedades_cronicas: split_list(&self.enfermedades_cronicas),
            updated_at: now,
        }
    }
}
