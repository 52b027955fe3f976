//! MediCitas Integrity
//!
//! Entry types and validation rules for the appointment client:
//! - Appointments, their persisted document shape and the status state machine
//! - The fixed specialty list
//! - Doctor reference data and reviews
//! - User profiles and the profile settings form
//! - Sign-in, registration and password-recovery form validation
//!
//! Nothing in this crate performs I/O; the coordinator crate applies these
//! rules before talking to the backend.

pub mod appointment;
pub mod doctor;
pub mod profile;
pub mod validation;

pub use appointment::{
    combine_date_time, validate_booking, Appointment, AppointmentDocument, AppointmentDraft,
    AppointmentId, AppointmentStatus, BookingSelection, DoctorId, Specialty, TransitionError,
    UserId, DEFAULT_PATIENT_NAME, UNASSIGNED_DOCTOR_NAME,
};
pub use doctor::{Doctor, DoctorDetails, DoctorReview, OfficeHours};
pub use profile::{
    split_list, ProfilePatch, ProfileUpdate, UserProfile, UserRole, DEFAULT_USER_NAME,
};
pub use validation::{
    is_valid_email, validate_reset_email, SignInForm, SignUpForm, ValidationError,
    ValidationErrorCode, ValidationResult,
};
