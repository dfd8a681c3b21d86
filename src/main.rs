use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use contact_agenda::config::{AppConfig, DatabaseConfig};
use contact_agenda::db::Database;
use contact_agenda::file_writer::write_contacts;
use contact_agenda::logging::init_logging;
use contact_agenda::metrics::MetricsCollector;
use contact_agenda::models::{Contact, ContactDraft, NewUser, OutputFormat};
use contact_agenda::service::{self, AgendaSession};
use contact_agenda::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (overrides config and DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Credentials {
    /// Account email
    #[arg(short, long, env = "AGENDA_EMAIL")]
    email: String,

    /// Account password
    #[arg(short, long, env = "AGENDA_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args)]
struct ContactFields {
    /// Phone number
    #[arg(long)]
    phone: Option<String>,

    /// Email address
    #[arg(long = "contact-email")]
    contact_email: Option<String>,

    /// Social network handle
    #[arg(long)]
    social: Option<String>,

    /// Free-text notes
    #[arg(long)]
    notes: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    birth_date: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    Init,
    /// Register a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Contact phone
        #[arg(long)]
        phone: Option<String>,

        /// Password
        #[arg(short, long, env = "AGENDA_PASSWORD", hide_env_values = true)]
        password: String,

        /// Profile photo (png, jpg or jpeg)
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Check credentials and show the agenda summary
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// List contacts
    List {
        #[command(flatten)]
        credentials: Credentials,

        /// Only show contacts whose "name - phone" line contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show every field of one contact
    Show {
        #[command(flatten)]
        credentials: Credentials,

        /// Contact id
        id: i64,
    },
    /// Add a contact
    Add {
        #[command(flatten)]
        credentials: Credentials,

        /// Contact name
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        fields: ContactFields,
    },
    /// Edit a contact; fields left out keep their current value
    Edit {
        #[command(flatten)]
        credentials: Credentials,

        /// Contact id
        id: i64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ContactFields,
    },
    /// Delete a contact
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        /// Contact id
        id: i64,
    },
    /// Manage the profile photo
    Photo {
        #[command(flatten)]
        credentials: Credentials,

        #[command(subcommand)]
        action: PhotoAction,
    },
    /// Export contacts to a file
    Export {
        #[command(flatten)]
        credentials: Credentials,

        /// Output format (txt, csv or json)
        #[arg(short, long)]
        format: Option<String>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<String>,
    },
    /// List today's birthdays
    Birthdays {
        #[command(flatten)]
        credentials: Credentials,

        /// Check this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum PhotoAction {
    /// Replace the profile photo
    Set {
        /// Image file (png, jpg or jpeg)
        path: PathBuf,
    },
    /// Save the profile photo to a file
    Get {
        /// Destination file
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.file_path.as_deref().map(Path::new),
        config.logging.format == "json",
    )?;

    let database_config = DatabaseConfig {
        url: cli.database.clone().unwrap_or_else(|| config.get_database_url()),
        ..config.database.clone()
    };
    info!("Using database at: {}", database_config.url);
    let db = Database::with_config(&database_config).context("Failed to open database")?;

    match cli.command {
        Commands::Init => {
            db.run_migrations().context("Failed to create tables")?;
            println!("Database ready.");
        },
        Commands::Register {
            name,
            email,
            phone,
            password,
            photo,
        } => register(&config, &db, name, email, phone, password, photo.as_deref())?,
        Commands::Login { credentials } => {
            let session = open_session(&db, &credentials)?;
            println!(
                "Welcome, {}! You have {} contact(s).",
                session.user_name(),
                session.contacts().len()
            );
        },
        Commands::List { credentials, search } => {
            let session = open_session(&db, &credentials)?;
            let hits = session.search(search.as_deref().unwrap_or_default());
            if hits.is_empty() {
                println!("No contacts.");
            }
            for contact in hits {
                println!("[{}] {}", contact.id, contact);
            }
        },
        Commands::Show { credentials, id } => {
            let session = open_session(&db, &credentials)?;
            print_contact(session.contact(id)?);
        },
        Commands::Add {
            credentials,
            name,
            fields,
        } => {
            let mut session = open_session(&db, &credentials)?;
            let draft = fields.into_draft(ContactDraft::named(InputValidator::sanitize_text(&name)));
            if !session.add_contact(&draft) {
                bail!("Failed to save contact {}", draft.name);
            }
            println!("Contact {} saved.", draft.name);
        },
        Commands::Edit {
            credentials,
            id,
            name,
            fields,
        } => {
            let mut session = open_session(&db, &credentials)?;
            let mut current = session.contact(id)?.to_draft();
            if let Some(name) = name {
                current.name = InputValidator::sanitize_text(&name);
            }
            let draft = fields.into_draft(current);
            if !session.edit_contact(id, &draft) {
                bail!("Failed to update contact {id}");
            }
            println!("Contact {id} updated.");
        },
        Commands::Delete { credentials, id } => {
            let mut session = open_session(&db, &credentials)?;
            if !session.delete_contact(id) {
                bail!("Failed to delete contact {id}");
            }
            println!("Contact {id} deleted.");
        },
        Commands::Photo { credentials, action } => {
            let mut session = open_session(&db, &credentials)?;
            match action {
                PhotoAction::Set { path } => {
                    if !session.change_photo(&path, config.photo.max_bytes) {
                        bail!("Failed to update the photo. Try again.");
                    }
                    println!("Photo updated.");
                },
                PhotoAction::Get { output } => match session.photo() {
                    Some(photo) => {
                        std::fs::write(&output, photo)
                            .with_context(|| format!("Failed to write {}", output.display()))?;
                        println!("Photo saved to {}", output.display());
                    },
                    None => println!("No photo."),
                },
            }
        },
        Commands::Export {
            credentials,
            format,
            output_dir,
        } => {
            let session = open_session(&db, &credentials)?;
            let format: OutputFormat = format
                .as_deref()
                .unwrap_or(config.export.default_format.as_str())
                .parse::<OutputFormat>()
                .map_err(anyhow::Error::msg)?;
            let output_dir = output_dir.unwrap_or_else(|| config.export.output_directory.clone());

            let path = write_contacts(
                session.contacts(),
                format,
                Path::new(&output_dir),
                &format!("contacts_{}", session.user_id()),
            )?;
            MetricsCollector.record_export(session.contacts().len(), format.extension());
            println!("Exported {} contact(s) to {}", session.contacts().len(), path.display());
        },
        Commands::Birthdays { credentials, date } => {
            let mut session = login(&db, &credentials)?;
            if let Some(date) = date {
                session.set_today(InputValidator::parse_birth_date(&date)?);
            }
            session.refresh();
            match session.take_birthday_notice() {
                Some(notice) => println!("{notice}"),
                None => println!("No birthdays today."),
            }
        },
    }

    Ok(())
}

impl ContactFields {
    /// Overlay the given fields on `base`.
    fn into_draft(self, base: ContactDraft) -> ContactDraft {
        ContactDraft {
            name: base.name,
            phone: self.phone.map(|p| InputValidator::sanitize_text(&p)).or(base.phone),
            email: self
                .contact_email
                .map(|e| InputValidator::sanitize_text(&e))
                .or(base.email),
            social_profile: self.social.map(|s| InputValidator::sanitize_text(&s)).or(base.social_profile),
            notes: self.notes.map(|n| InputValidator::sanitize_text(&n)).or(base.notes),
            birth_date: self.birth_date.or(base.birth_date),
        }
    }
}

fn register(
    config: &AppConfig, db: &Database, name: String, email: String, phone: Option<String>, password: String,
    photo: Option<&Path>,
) -> Result<()> {
    let photo = match photo {
        Some(path) => {
            InputValidator::validate_photo_path(path)?;
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            InputValidator::validate_photo_size(&bytes, config.photo.max_bytes)?;
            Some(bytes)
        },
        None => None,
    };

    let new_user = NewUser {
        name: InputValidator::sanitize_text(&name),
        email: email.trim().to_string(),
        contact: InputValidator::sanitize_optional(phone.as_deref()),
        password,
        photo,
    };

    if !service::register(db, &new_user) {
        bail!("Registration failed for {}", new_user.email);
    }
    println!("User {} registered.", new_user.name);
    Ok(())
}

fn login(db: &Database, credentials: &Credentials) -> Result<AgendaSession> {
    AgendaSession::login(Box::new(db.clone()), &credentials.email, &credentials.password)
        .context("Invalid email or password")
}

/// Log in, load the agenda and show the birthday reminder if one is due.
fn open_session(db: &Database, credentials: &Credentials) -> Result<AgendaSession> {
    let mut session = login(db, credentials)?;
    session.refresh();
    debug!(
        user_id = session.user_id(),
        contacts = session.contacts().len(),
        "Session opened"
    );

    if let Some(notice) = session.take_birthday_notice() {
        println!("{notice}");
        println!();
    }
    Ok(session)
}

fn print_contact(contact: &Contact) {
    let or_dash = |value: Option<&str>| value.filter(|v| !v.is_empty()).unwrap_or("-").to_string();

    println!("Id:        {}", contact.id);
    println!("Name:      {}", contact.name);
    println!("Phone:     {}", or_dash(Some(contact.phone.as_str())));
    println!("Email:     {}", or_dash(contact.email.as_deref()));
    println!("Social:    {}", or_dash(contact.social_profile.as_deref()));
    println!(
        "Birthday:  {}",
        contact
            .birth_date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
    );
    println!("Notes:     {}", or_dash(contact.notes.as_deref()));
}
