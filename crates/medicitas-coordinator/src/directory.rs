//! Read-only doctor directory backed by a seeded sample list.

use chrono::NaiveDate;
use medicitas_integrity::{Doctor, DoctorDetails, DoctorId, DoctorReview, OfficeHours, Specialty};

/// Specialty filter value meaning "no filter"
pub const ALL_SPECIALTIES: &str = "Todas";

/// How many featured doctors to show when none are flagged
pub const FEATURED_FALLBACK: usize = 5;

/// Reviews shown before the user asks for all of them
pub const DEFAULT_REVIEWS_PREVIEW: usize = 3;

/// Doctor lookup by id, specialty and free text
#[derive(Clone, Debug)]
pub struct DoctorDirectory {
    doctors: Vec<Doctor>,
    reviews: Vec<DoctorReview>,
    reviews_preview: usize,
}

impl Default for DoctorDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

impl DoctorDirectory {
    pub fn new(doctors: Vec<Doctor>, reviews: Vec<DoctorReview>) -> Self {
        DoctorDirectory {
            doctors,
            reviews,
            reviews_preview: DEFAULT_REVIEWS_PREVIEW,
        }
    }

    /// Directory with the sample doctors and reviews
    pub fn seeded() -> Self {
        Self::new(seed_doctors(), seed_reviews())
    }

    pub fn with_reviews_preview(mut self, limit: usize) -> Self {
        self.reviews_preview = limit;
        self
    }

    pub fn all(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn get(&self, id: &DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| &d.id == id)
    }

    /// Exact match on the specialty name; unknown names give an empty list
    pub fn filter_by_specialty(&self, specialty: &str) -> Vec<Doctor> {
        self.doctors
            .iter()
            .filter(|d| d.specialty.name() == specialty)
            .cloned()
            .collect()
    }

    pub fn search(&self, text: &str) -> Vec<&Doctor> {
        self.doctors.iter().filter(|d| d.matches_text(text)).collect()
    }

    /// Flagged doctors, or the first few when none are flagged
    pub fn featured(&self) -> Vec<&Doctor> {
        let flagged: Vec<&Doctor> = self.doctors.iter().filter(|d| d.featured).collect();
        if flagged.is_empty() {
            self.doctors.iter().take(FEATURED_FALLBACK).collect()
        } else {
            flagged
        }
    }

    /// Text search followed by a specialty filter. Empty text and an
    /// empty or `"Todas"` specialty leave the list unfiltered.
    pub fn apply_filters(&self, text: &str, specialty: &str) -> Vec<&Doctor> {
        self.doctors
            .iter()
            .filter(|d| text.is_empty() || d.matches_text(text))
            .filter(|d| {
                specialty.is_empty()
                    || specialty == ALL_SPECIALTIES
                    || d.specialty.name() == specialty
            })
            .collect()
    }

    /// Reviews for one doctor, truncated to the preview size unless `all`
    pub fn reviews(&self, doctor_id: &DoctorId, all: bool) -> Vec<&DoctorReview> {
        let matching = self.reviews.iter().filter(|r| &r.doctor_id == doctor_id);
        if all {
            matching.collect()
        } else {
            matching.take(self.reviews_preview).collect()
        }
    }
}

// ============================================================================
// Seed data
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn doctor(
    id: &str,
    name: &str,
    specialty: Specialty,
    rating: f32,
    review_count: u32,
    featured: bool,
    available: bool,
    services: [&str; 3],
    next_availability: &str,
) -> Doctor {
    Doctor {
        rating,
        review_count,
        featured,
        available,
        services: services.iter().map(|s| s.to_string()).collect(),
        next_availability: next_availability.to_string(),
        ..Doctor::new(id, name, specialty)
    }
}

fn week(hours: [&str; 7]) -> Vec<OfficeHours> {
    const DAYS: [&str; 7] = [
        "Lunes",
        "Martes",
        "Miércoles",
        "Jueves",
        "Viernes",
        "Sábado",
        "Domingo",
    ];
    DAYS.iter()
        .zip(hours)
        .map(|(day, hours)| OfficeHours {
            day: day.to_string(),
            hours: hours.to_string(),
        })
        .collect()
}

fn seed_doctors() -> Vec<Doctor> {
    use Specialty::*;

    #[rustfmt::skip]
    let mut doctors = vec![
        doctor("1", "Dra. Ana García", Cardiologia, 4.8, 124, true, true,
            ["Ecocardiograma", "Holter", "Consulta general"], "Hoy, 14:30"),
        doctor("2", "Dr. Martín López", Dermatologia, 4.5, 98, true, false,
            ["Biopsias", "Tratamientos láser", "Cirugía dermatológica"], "Mañana, 10:00"),
        doctor("3", "Dr. Roberto Sánchez", MedicinaGeneral, 4.9, 213, true, true,
            ["Consulta general", "Certificados médicos", "Vacunación"], "Hoy, 16:00"),
        doctor("4", "Dra. Carolina Martínez", Pediatria, 4.7, 156, false, true,
            ["Control de niño sano", "Vacunación", "Urgencias pediátricas"], "Hoy, 15:30"),
        doctor("5", "Dr. Juan Ramírez", Traumatologia, 4.6, 78, false, false,
            ["Fracturas", "Rehabilitación", "Cirugía ortopédica"], "Viernes, 09:00"),
        doctor("6", "Dra. Lucía Hernández", Ginecologia, 4.9, 187, true, true,
            ["Control prenatal", "Papanicolaou", "Colposcopía"], "Mañana, 11:30"),
        doctor("7", "Dr. Eduardo Flores", Oftalmologia, 4.4, 91, false, true,
            ["Examen visual", "Cirugía refractiva", "Tratamiento de glaucoma"], "Jueves, 10:00"),
        doctor("8", "Dra. Sofía Vargas", Neurologia, 4.8, 65, false, false,
            ["Electroencefalograma", "Tratamiento de migrañas", "Estudios del sueño"],
            "Lunes próximo"),
        doctor("9", "Dr. Miguel Ángel Rivas", Psiquiatria, 4.7, 113, false, true,
            ["Terapia", "Diagnóstico", "Tratamiento farmacológico"], "Hoy, 18:00"),
        doctor("10", "Dra. Patricia González", Odontologia, 4.6, 142, true, true,
            ["Limpieza dental", "Endodoncia", "Ortodoncia"], "Mañana, 09:30"),
    ];

    doctors[0].details = Some(DoctorDetails {
        title: "Dra.".to_string(),
        education: "Universidad Nacional de Medicina (2008-2014)".to_string(),
        experience: "8+ años en cardiología intervencionista y diagnóstica".to_string(),
        license: "No. CMN-12345 - Colegio Médico Nacional".to_string(),
        about: "Especialista en diagnóstico y tratamiento de enfermedades cardiovasculares. \
                Mi enfoque es preventivo y educativo, brindando atención personalizada a cada \
                paciente."
            .to_string(),
        address: "Centro Médico Especialistas - Av. Principal #123, Ciudad".to_string(),
        schedule: week([
            "9:00 AM - 5:00 PM",
            "9:00 AM - 5:00 PM",
            "9:00 AM - 5:00 PM",
            "9:00 AM - 5:00 PM",
            "9:00 AM - 3:00 PM",
            "9:00 AM - 12:00 PM",
            "No disponible",
        ]),
    });

    doctors[1].details = Some(DoctorDetails {
        title: "Dr.".to_string(),
        education: "Universidad Autónoma de Medicina (2005-2011)".to_string(),
        experience: "10+ años en dermatología clínica y estética".to_string(),
        license: "No. CMD-54321 - Colegio Médico Nacional".to_string(),
        about: "Dermatólogo especializado en tratamientos contra el acné, dermatitis y \
                procedimientos estéticos mínimamente invasivos. Mi objetivo es ayudar a mis \
                pacientes a tener una piel saludable y radiante."
            .to_string(),
        address: "Instituto Dermatológico - Calle Central #45, Ciudad".to_string(),
        schedule: week([
            "8:00 AM - 4:00 PM",
            "8:00 AM - 4:00 PM",
            "No disponible",
            "8:00 AM - 4:00 PM",
            "8:00 AM - 2:00 PM",
            "8:00 AM - 12:00 PM",
            "No disponible",
        ]),
    });

    doctors
}

fn review(
    id: &str,
    doctor_id: &str,
    patient: &str,
    rating: u8,
    comment: &str,
    date: (i32, u32, u32),
) -> DoctorReview {
    DoctorReview {
        id: id.to_string(),
        doctor_id: DoctorId(doctor_id.to_string()),
        patient_name: patient.to_string(),
        rating,
        comment: comment.to_string(),
        date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
    }
}

fn seed_reviews() -> Vec<DoctorReview> {
    vec![
        review(
            "r1",
            "1",
            "Laura Morales",
            5,
            "Excelente atención, muy profesional y amable. Me explicó detalladamente mi \
             condición y las opciones de tratamiento.",
            (2024, 3, 15),
        ),
        review(
            "r2",
            "1",
            "Carlos Ruiz",
            4,
            "Buen médico, aunque tuve que esperar un poco más de lo esperado. El diagnóstico \
             fue acertado.",
            (2024, 2, 28),
        ),
        review(
            "r3",
            "2",
            "María Jiménez",
            5,
            "El mejor dermatólogo que he visitado. Resolvió mi problema en la primera \
             consulta después de varios intentos fallidos con otros médicos.",
            (2024, 3, 10),
        ),
    ]
}
