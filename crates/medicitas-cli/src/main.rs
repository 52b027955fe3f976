//! MediCitas command-line client
//!
//! Browse the doctor directory, manage an account and book, list and
//! cancel appointments against the locally persisted backend.
//!
//! Usage:
//!   medicitas doctors --specialty Cardiología
//!   medicitas register --name "Ana" --email ana@example.com --password secret1 --confirm secret1
//!   medicitas book --specialty Pediatría --doctor 4 --date 2025-06-01 --time 09:30
//!   medicitas appointments

mod output;

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use colored::*;
use medicitas_coordinator::config::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_LEVEL};
use medicitas_coordinator::{
    AuthAction, AuthError, BookingRequest, MediCitas, MediCitasConfig, SystemClock,
    ALL_SPECIALTIES,
};
use medicitas_integrity::{
    Appointment, AppointmentId, DoctorId, ProfileUpdate, SignInForm, SignUpForm, Specialty,
};
use serde::Serialize;
use tracing::{debug, warn, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "medicitas")]
#[command(author = "MediCitas")]
#[command(version)]
#[command(about = "Book and manage medical appointments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory from the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration file with the default settings
    InitConfig {
        /// Destination path
        #[arg(default_value = DEFAULT_CONFIG_PATH)]
        path: PathBuf,
    },

    /// List the specialties offered by the booking form
    Specialties,

    /// Browse the doctor directory
    Doctors {
        /// Only doctors of this specialty ("Todas" for every specialty)
        #[arg(short, long, default_value = ALL_SPECIALTIES)]
        specialty: String,

        /// Match against name or specialty
        #[arg(short = 'q', long, default_value = "")]
        search: String,

        /// Only featured doctors
        #[arg(short, long)]
        featured: bool,
    },

    /// Show a doctor's details and reviews
    Doctor {
        id: String,

        /// Show every review instead of the preview
        #[arg(long)]
        all_reviews: bool,
    },

    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },

    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// Sign out and clear the cached profile
    Logout,

    /// Send a password recovery email
    ResetPassword { email: String },

    /// Book an appointment
    Book {
        #[arg(short, long)]
        specialty: String,

        /// Doctor id; leave out to have one assigned later
        #[arg(short, long)]
        doctor: Option<String>,

        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// Time as HH:MM
        #[arg(long)]
        time: String,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List your upcoming and past appointments
    Appointments,

    /// Show one appointment
    Show { id: String },

    /// Cancel a pending or confirmed appointment
    Cancel { id: String },

    /// Confirm a pending appointment as its doctor
    Confirm {
        id: String,

        #[arg(short, long)]
        doctor: String,
    },

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the stored profile
    Show {
        /// Show the locally cached copy without contacting the backend
        #[arg(long)]
        cached: bool,
    },

    /// Edit profile fields; omitted fields keep their current value
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        birth_date: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        blood_type: Option<String>,
        /// Comma-separated list
        #[arg(long)]
        allergies: Option<String>,
        /// Comma-separated list
        #[arg(long)]
        conditions: Option<String>,
    },

    /// Upload a profile photo
    Photo { path: PathBuf },
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Handle on the installed log filter, so the configured level can take
/// over once the configuration has been read.
struct LogLevel {
    handle: FilterHandle,
    from_env: bool,
}

impl LogLevel {
    /// Switch to `level` unless `RUST_LOG` already chose the filter.
    fn apply(&self, level: &str) {
        if self.from_env {
            return;
        }
        if let Err(e) = self.handle.reload(EnvFilter::new(level)) {
            warn!("Could not apply log level {}: {}", level, e);
        }
    }
}

fn log_subscriber<W>(
    env_filter: Option<EnvFilter>,
    writer: W,
) -> (impl Subscriber + Send + Sync + 'static, LogLevel)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let from_env = env_filter.is_some();
    let filter = env_filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    (subscriber, LogLevel { handle, from_env })
}

fn init_tracing() -> LogLevel {
    let (subscriber, level) =
        log_subscriber(EnvFilter::try_from_default_env().ok(), std::io::stderr);
    subscriber.init();
    level
}

fn failure_line(err: &dyn Error) -> String {
    format!("{} {}", "Error:".red().bold(), err)
}

fn auth_failure(err: AuthError, action: AuthAction) -> Box<dyn Error> {
    err.user_message(action).into()
}

fn parse_date(raw: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("Fecha no válida: {} (usa AAAA-MM-DD)", raw).into())
}

fn parse_time(raw: &str) -> Result<NaiveTime, Box<dyn Error>> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| format!("Hora no válida: {} (usa HH:MM)", raw).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Result of a booking or status change, as JSON or as a summary line
fn appointment_outcome(
    appointment: &Appointment,
    json: bool,
    message: &str,
) -> Result<String, Box<dyn Error>> {
    if json {
        return Ok(serde_json::to_string_pretty(appointment)?);
    }
    Ok(format!(
        "{}\n  {}",
        output::success_text(message),
        output::appointment_line(appointment)
    ))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_level = init_tracing();

    match execute(cli, &log_level).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!("Command failed: {:?}", err);
            eprintln!("{}", failure_line(&*err));
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli, log_level: &LogLevel) -> Result<(), Box<dyn Error>> {
    let mut config = MediCitasConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    log_level.apply(&config.log_level);

    if let Commands::InitConfig { path } = &cli.command {
        config.save(path)?;
        output::success(&format!("Configuración escrita en {}", path.display()));
        return Ok(());
    }

    let app = MediCitas::open(config, Arc::new(SystemClock)).await?;
    let result = run(&app, cli.command, cli.json).await;
    app.persist().await?;
    result
}

async fn run(app: &MediCitas, command: Commands, json: bool) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::InitConfig { .. } => {}

        Commands::Specialties => {
            if json {
                let names: Vec<&str> = Specialty::ALL.iter().map(|s| s.name()).collect();
                return print_json(&names);
            }
            output::heading("Especialidades");
            for specialty in Specialty::ALL.iter() {
                println!("  {}", specialty);
            }
        }

        Commands::Doctors {
            specialty,
            search,
            featured,
        } => {
            let directory = app.lifecycle.directory();
            let doctors = if featured {
                directory.featured()
            } else {
                directory.apply_filters(&search, &specialty)
            };
            if json {
                return print_json(&doctors);
            }
            output::heading(&format!("Doctores ({})", doctors.len()));
            if doctors.is_empty() {
                println!("  {}", "No se encontraron doctores".dimmed());
            }
            for doctor in doctors {
                println!("  {}", output::doctor_line(doctor));
            }
        }

        Commands::Doctor { id, all_reviews } => {
            let directory = app.lifecycle.directory();
            let id = DoctorId(id);
            let doctor = directory
                .get(&id)
                .ok_or_else(|| format!("No existe el doctor {}", id))?;
            let reviews = directory.reviews(&id, all_reviews);
            if json {
                return print_json(&(doctor, reviews));
            }
            output::doctor_detail(doctor, &reviews);
        }

        Commands::Register {
            name,
            email,
            password,
            confirm,
        } => {
            let form = SignUpForm {
                nombre: name,
                email,
                password,
                confirmar_password: confirm,
            };
            let user = app
                .auth
                .sign_up(&form)
                .await
                .map_err(|e| auth_failure(e, AuthAction::SignUp))?;
            output::success(&format!("Cuenta creada para {}", user.email.bold()));
        }

        Commands::Login { email, password } => {
            let user = app
                .auth
                .sign_in(&SignInForm { email, password })
                .await
                .map_err(|e| auth_failure(e, AuthAction::SignIn))?;
            output::success(&format!("Sesión iniciada como {}", user.email.bold()));
        }

        Commands::Logout => {
            app.auth.sign_out().await?;
            output::success("Sesión cerrada");
        }

        Commands::ResetPassword { email } => {
            app.auth
                .reset_password(&email)
                .await
                .map_err(|e| auth_failure(e, AuthAction::ResetPassword))?;
            output::success(&format!(
                "Se ha enviado un correo a {} con instrucciones para restablecer tu contraseña",
                email
            ));
        }

        Commands::Book {
            specialty,
            doctor,
            date,
            time,
            notes,
        } => {
            let request = BookingRequest {
                specialty,
                doctor_id: doctor,
                date: parse_date(&date)?,
                time: parse_time(&time)?,
                notes,
            };
            let appointment = app.lifecycle.create(&app.session(), request).await?;
            let outcome = appointment_outcome(&appointment, json, "Cita agendada correctamente")?;
            println!("{}", outcome);
        }

        Commands::Appointments => {
            let buckets = app.lifecycle.list_partitioned(&app.session()).await?;
            if json {
                return print_json(&buckets);
            }
            output::appointment_buckets(&buckets);
        }

        Commands::Show { id } => {
            let appointment = app
                .lifecycle
                .get(&app.session(), &AppointmentId(id))
                .await?;
            if json {
                return print_json(&appointment);
            }
            output::appointment_detail(&appointment);
        }

        Commands::Cancel { id } => {
            let appointment = app
                .lifecycle
                .cancel(&app.session(), &AppointmentId(id))
                .await?;
            let outcome = appointment_outcome(&appointment, json, "Cita cancelada correctamente")?;
            println!("{}", outcome);
        }

        Commands::Confirm { id, doctor } => {
            let appointment = app
                .lifecycle
                .confirm(&DoctorId(doctor), &AppointmentId(id))
                .await?;
            let outcome = appointment_outcome(&appointment, json, "Cita confirmada")?;
            println!("{}", outcome);
        }

        Commands::Profile { action } => run_profile(app, action, json).await?,
    }
    Ok(())
}

async fn run_profile(
    app: &MediCitas,
    action: ProfileCommands,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let session = app.session();
    match action {
        ProfileCommands::Show { cached } => {
            let profile = if cached {
                app.profiles
                    .cached()
                    .await?
                    .ok_or("No hay un perfil guardado localmente")?
            } else {
                app.profiles.load(&session).await?
            };
            if json {
                return print_json(&profile);
            }
            output::profile(&profile);
        }

        ProfileCommands::Update {
            name,
            phone,
            birth_date,
            address,
            bio,
            blood_type,
            allergies,
            conditions,
        } => {
            let current = app.profiles.load(&session).await?;
            let mut update = ProfileUpdate::from_profile(&current);
            let edits = [
                (&mut update.nombre, name),
                (&mut update.telefono, phone),
                (&mut update.fecha_nacimiento, birth_date),
                (&mut update.direccion, address),
                (&mut update.biografia, bio),
                (&mut update.tipo_sangre, blood_type),
                (&mut update.alergias, allergies),
                (&mut update.enfermedades_cronicas, conditions),
            ];
            for (field, value) in edits {
                if let Some(value) = value {
                    *field = value;
                }
            }

            let patch = app.profiles.update(&session, &update).await?;
            if json {
                return print_json(&patch);
            }
            output::success("Perfil actualizado correctamente");
        }

        ProfileCommands::Photo { path } => {
            let bytes = tokio::fs::read(&path).await?;
            let profile = app.profiles.upload_photo(&session, bytes).await?;
            if json {
                return print_json(&profile);
            }
            output::success("Foto de perfil actualizada");
            if let Some(url) = &profile.photo_url {
                println!("  {}", url.dimmed());
            }
        }
    }
    Ok(())
}
