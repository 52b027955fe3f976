//! Doctor reference data.
//!
//! Doctors are seeded, never created or mutated by the application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::appointment::{DoctorId, Specialty};

/// A doctor listed in the directory
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
    /// Average rating, 0.0 - 5.0
    #[serde(rename = "valoracion")]
    pub rating: f32,
    #[serde(rename = "numValoraciones")]
    pub review_count: u32,
    #[serde(rename = "destacado")]
    pub featured: bool,
    #[serde(rename = "disponible")]
    pub available: bool,
    #[serde(rename = "servicios")]
    pub services: Vec<String>,
    /// Free-text label such as "Hoy, 14:30"
    #[serde(rename = "proximasCitas")]
    pub next_availability: String,
    #[serde(rename = "detalle", default, skip_serializing_if = "Option::is_none")]
    pub details: Option<DoctorDetails>,
}

/// Extended profile shown on the doctor's page
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoctorDetails {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "formacion")]
    pub education: String,
    #[serde(rename = "experiencia")]
    pub experience: String,
    #[serde(rename = "licencia")]
    pub license: String,
    #[serde(rename = "sobreMi")]
    pub about: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "horarios")]
    pub schedule: Vec<OfficeHours>,
}

/// Opening hours for one weekday
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfficeHours {
    #[serde(rename = "dia")]
    pub day: String,
    /// Hours label, or "No disponible"
    #[serde(rename = "horario")]
    pub hours: String,
}

impl OfficeHours {
    pub fn is_closed(&self) -> bool {
        self.hours.contains("No disponible")
    }
}

impl Doctor {
    /// Minimal doctor with no ratings or services
    pub fn new(id: &str, name: &str, specialty: Specialty) -> Self {
        Doctor {
            id: DoctorId(id.to_string()),
            name: name.to_string(),
            specialty,
            rating: 0.0,
            review_count: 0,
            featured: false,
            available: true,
            services: Vec::new(),
            next_availability: String::new(),
            details: None,
        }
    }

    /// Case-insensitive substring match over name or specialty
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.specialty.name().to_lowercase().contains(&needle)
    }

    /// Whole stars to draw for the rating, rounding halves up
    pub fn star_count(&self) -> u8 {
        self.rating.clamp(0.0, 5.0).round() as u8
    }
}

/// Patient review of a doctor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoctorReview {
    pub id: String,
    #[serde(rename = "doctorId")]
    pub doctor_id: DoctorId,
    #[serde(rename = "nombrePaciente")]
    pub patient_name: String,
    /// 1 - 5
    #[serde(rename = "valoracion")]
    pub rating: u8,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
}
