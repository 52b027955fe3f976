//! MediCitas Coordinator
//!
//! Operations of the appointment client over pluggable backend seams:
//! - Appointment lifecycle (book, cancel, confirm, list)
//! - Doctor directory lookups
//! - Account flows and profile management
//! - Document store, blob storage and local cache traits with in-memory
//!   implementations
//! - YAML configuration
//!
//! Every operation takes the caller's `Session` explicitly.

pub mod app;
pub mod auth;
pub mod blob;
pub mod cache;
pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod profile;
pub mod repository;
pub mod session;
pub mod store;

pub use app::{BackendSnapshot, MediCitas};
pub use auth::{AuthProvider, AuthService, AuthSnapshot, MemoryAuthProvider};
pub use blob::{profile_photo_path, BlobStorage, MemoryBlobStorage};
pub use cache::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, ProfileCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::MediCitasConfig;
pub use directory::{DoctorDirectory, ALL_SPECIALTIES};
pub use error::{
    AuthAction, AuthError, BlobError, CacheError, ConfigError, LifecycleError, ProfileError,
    RepositoryError, SessionError,
};
pub use lifecycle::{partition, AppointmentBuckets, AppointmentLifecycleManager, BookingRequest};
pub use profile::ProfileService;
pub use repository::{
    AppointmentRepository, DocumentAppointmentRepository, DocumentProfileRepository,
    ProfileRepository, APPOINTMENTS, PROFILES,
};
pub use session::{Session, SessionAccessor, SessionUser};
pub use store::{Direction, Document, DocumentStore, MemoryDocumentStore, Query};
