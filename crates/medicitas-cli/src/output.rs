//! Terminal rendering for appointments, doctors and profiles.

use colored::*;
use medicitas_coordinator::AppointmentBuckets;
use medicitas_integrity::{Appointment, AppointmentStatus, Doctor, DoctorReview, UserProfile};

const NOT_SPECIFIED: &str = "No especificado";

pub fn status_label(status: AppointmentStatus) -> ColoredString {
    match status {
        AppointmentStatus::Pending => status.label().yellow(),
        AppointmentStatus::Confirmed => status.label().green(),
        AppointmentStatus::Cancelled => status.label().red(),
    }
}

pub fn heading(text: &str) {
    println!("{}", text.blue().bold());
    println!("{}", "═".repeat(50).blue());
}

pub fn success(text: &str) {
    println!("{}", success_text(text));
}

pub fn success_text(text: &str) -> String {
    format!("{} {}", "✓".green(), text)
}

pub fn appointment_line(appt: &Appointment) -> String {
    format!(
        "{}  {}  {:<18} {:<26} {}",
        appt.id.as_str().dimmed(),
        appt.scheduled_at.format("%Y-%m-%d %H:%M"),
        appt.specialty.name(),
        appt.doctor_name,
        status_label(appt.status)
    )
}

pub fn appointment_detail(appt: &Appointment) {
    heading("Detalle de la cita");
    println!("{:<14} {}", "Estado:".bold(), status_label(appt.status));
    println!("{:<14} {}", "Fecha:".bold(), appt.scheduled_at.format("%Y-%m-%d"));
    println!("{:<14} {}", "Hora:".bold(), appt.scheduled_at.format("%H:%M"));
    println!("{:<14} {}", "Especialidad:".bold(), appt.specialty);
    println!("{:<14} {}", "Doctor:".bold(), appt.doctor_name);
    println!("{:<14} {}", "Paciente:".bold(), appt.patient_name);
    if let Some(notes) = &appt.notes {
        println!("{:<14} {}", "Notas:".bold(), notes);
    }
    println!("{:<14} {}", "ID:".bold(), appt.id.as_str().dimmed());
}

pub fn appointment_buckets(buckets: &AppointmentBuckets) {
    heading("Próximas citas");
    if buckets.upcoming.is_empty() {
        println!("  {}", "No tienes citas próximas".dimmed());
    }
    for appt in &buckets.upcoming {
        println!("  {}", appointment_line(appt));
    }
    println!();
    heading("Historial");
    if buckets.past.is_empty() {
        println!("  {}", "No tienes citas pasadas".dimmed());
    }
    for appt in &buckets.past {
        println!("  {}", appointment_line(appt));
    }
}

fn stars(doctor: &Doctor) -> String {
    let full = doctor.star_count() as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full.min(5)))
}

pub fn doctor_line(doctor: &Doctor) -> String {
    let availability = if doctor.available {
        "Disponible".green()
    } else {
        "No disponible".red()
    };
    format!(
        "{:>3}  {:<26} {:<18} {} {:.1} ({})  {}",
        doctor.id.as_str(),
        doctor.name,
        doctor.specialty.name(),
        stars(doctor).yellow(),
        doctor.rating,
        doctor.review_count,
        availability
    )
}

pub fn doctor_detail(doctor: &Doctor, reviews: &[&DoctorReview]) {
    heading(&doctor.name);
    println!("{:<16} {}", "Especialidad:".bold(), doctor.specialty);
    println!(
        "{:<16} {} {:.1} ({} valoraciones)",
        "Valoración:".bold(),
        stars(doctor).yellow(),
        doctor.rating,
        doctor.review_count
    );
    println!("{:<16} {}", "Próxima cita:".bold(), doctor.next_availability);
    println!("{:<16} {}", "Servicios:".bold(), doctor.services.join(", "));

    if let Some(details) = &doctor.details {
        println!("{:<16} {}", "Formación:".bold(), details.education);
        println!("{:<16} {}", "Experiencia:".bold(), details.experience);
        println!("{:<16} {}", "Licencia:".bold(), details.license);
        println!("{:<16} {}", "Dirección:".bold(), details.address);
        println!();
        println!("{}", details.about);
        println!();
        println!("{}", "Horarios".bold());
        for day in &details.schedule {
            let hours = if day.is_closed() {
                day.hours.as_str().dimmed()
            } else {
                day.hours.as_str().normal()
            };
            println!("  {:<10} {}", day.day, hours);
        }
    }

    println!();
    println!("{}", "Reseñas".bold());
    if reviews.is_empty() {
        println!("  {}", "Sin reseñas".dimmed());
    }
    for review in reviews {
        println!(
            "  {} {}  {}",
            "★".repeat(review.rating as usize).yellow(),
            review.patient_name.bold(),
            review.date.format("%Y-%m-%d").to_string().dimmed()
        );
        println!("    {}", review.comment);
    }
}

fn or_default<'a>(value: &'a Option<String>, fallback: &'a str) -> &'a str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(fallback)
}

pub fn profile(profile: &UserProfile) {
    heading(profile.display_name());
    println!("{:<22} {}", "Email:".bold(), or_default(&profile.email, NOT_SPECIFIED));
    if let Some(role) = &profile.rol {
        println!("{:<22} {}", "Rol:".bold(), role.label().cyan());
    }
    println!("{:<22} {}", "Teléfono:".bold(), or_default(&profile.telefono, NOT_SPECIFIED));
    println!(
        "{:<22} {}",
        "Fecha de nacimiento:".bold(),
        or_default(&profile.fecha_nacimiento, "No especificada")
    );
    println!(
        "{:<22} {}",
        "Dirección:".bold(),
        or_default(&profile.direccion, "No especificada")
    );
    println!(
        "{:<22} {}",
        "Tipo de sangre:".bold(),
        or_default(&profile.tipo_sangre, NOT_SPECIFIED)
    );
    let allergies = if profile.alergias.is_empty() {
        "Ninguna registrada".to_string()
    } else {
        profile.alergias.join(", ")
    };
    println!("{:<22} {}", "Alergias:".bold(), allergies);
    let conditions = if profile.enfermedades_cronicas.is_empty() {
        "Ninguna registrada".to_string()
    } else {
        profile.enfermedades_cronicas.join(", ")
    };
    println!("{:<22} {}", "Enfermedades crónicas:".bold(), conditions);
    if let Some(bio) = profile.biografia.as_deref().filter(|b| !b.is_empty()) {
        println!();
        println!("{}", bio);
    }
    if let Some(url) = &profile.photo_url {
        println!("{:<22} {}", "Foto:".bold(), url.dimmed());
    }
}
