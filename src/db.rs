use std::fs;
use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::config::DatabaseConfig;
use crate::error::{AgendaError, Result};
use crate::logging::OperationTimer;
use crate::metrics::MetricsCollector;
use crate::models::{AuthenticatedUser, Contact, ContactDraft, DbUser, NewUser};
use crate::schema::{contacts, users, PASSWORD_HASH_BITS, SHA2_FUNCTION};
use crate::validation::InputValidator;

// Type alias for the database connection pool
pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Database manager for handling connections and operations
///
/// Every operation takes its own connection from the pool and hands it back
/// when it returns, whether it succeeded or not. Statements run in autocommit
/// mode, so each one is committed on its own.
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    metrics: MetricsCollector,
}

impl Database {
    /// Open (creating if needed) the database at `database_url` with default pool settings.
    ///
    /// Accepts `sqlite://path`, `sqlite:path`, a plain path, or `:memory:`.
    pub fn new(database_url: &str) -> Result<Self> {
        Self::with_config(&DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 4,
            connection_timeout_secs: 30,
        })
    }

    /// Open the database described by `config`.
    pub fn with_config(config: &DatabaseConfig) -> Result<Self> {
        InputValidator::validate_database_url(&config.url)?;
        let path = strip_sqlite_scheme(&config.url);

        if path == ":memory:" {
            return Self::open_in_memory();
        }

        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path).with_init(init_connection);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .build(manager)?;

        Self::from_pool(pool)
    }

    /// A private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since every
    /// SQLite memory connection is its own database.
    pub fn open_in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory().with_init(init_connection);
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        Self::from_pool(pool)
    }

    fn from_pool(pool: DbPool) -> Result<Self> {
        let database = Self {
            pool,
            metrics: MetricsCollector,
        };
        database.run_migrations()?;
        Ok(database)
    }

    /// Create both tables if they don't exist yet
    pub fn run_migrations(&self) -> Result<()> {
        self.create_users_table()?;
        self.create_contacts_table()
    }

    /// Create the users table
    pub fn create_users_table(&self) -> Result<()> {
        self.run("create_users_table", |conn| {
            conn.execute_batch(include_str!("../migrations/2025-06-01-000000_create_users/up.sql"))?;
            tracing::debug!("Table 'users' created or already exists");
            Ok(())
        })
    }

    /// Create the contacts table
    pub fn create_contacts_table(&self) -> Result<()> {
        self.run("create_contacts_table", |conn| {
            conn.execute_batch(include_str!("../migrations/2025-06-01-000001_create_contacts/up.sql"))?;
            tracing::debug!("Table 'contacts' created or already exists");
            Ok(())
        })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Run one operation on a fresh pooled connection, recording its timing.
    fn run<T>(&self, operation: &'static str, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let timer = OperationTimer::new(operation);
        let result = self.get_connection().and_then(|conn| f(&conn));

        self.metrics
            .record_db_operation(operation, timer.elapsed(), result.is_ok());
        timer.finish();
        result
    }

    /// Register a new user.
    ///
    /// The password is hashed inside the database with `SHA2(?, 256)`.
    /// Returns the new user's id.
    pub fn save_user(&self, new_user: &NewUser) -> Result<i64> {
        self.run("save_user", |conn| {
            let existing: Option<i64> = conn
                .query_row(
                    &format!("SELECT {} FROM {} WHERE {} = ?1", users::ID, users::TABLE, users::EMAIL),
                    params![new_user.email],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Err(AgendaError::DuplicateEmail(new_user.email.clone()));
            }

            conn.execute(
                &format!(
                    "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, {SHA2_FUNCTION}(?4, {PASSWORD_HASH_BITS}), ?5)",
                    users::TABLE,
                    users::NAME,
                    users::EMAIL,
                    users::CONTACT,
                    users::PASSWORD_HASH,
                    users::PHOTO
                ),
                params![
                    new_user.name,
                    new_user.email,
                    new_user.contact,
                    new_user.password,
                    new_user.photo
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref failure, _) if failure.code == ErrorCode::ConstraintViolation => {
                    AgendaError::DuplicateEmail(new_user.email.clone())
                },
                other => AgendaError::Database(other),
            })?;

            let id = conn.last_insert_rowid();
            tracing::info!(user_id = id, name = %new_user.name, "User saved");
            Ok(id)
        })
    }

    /// Check an email/password pair. `None` when no user matches both.
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<Option<AuthenticatedUser>> {
        self.run("authenticate_user", |conn| {
            let user = conn
                .query_row(
                    &format!(
                        "SELECT {}, {}, {} FROM {} WHERE {} = ?1 AND {} = {SHA2_FUNCTION}(?2, {PASSWORD_HASH_BITS})",
                        users::ID,
                        users::NAME,
                        users::PHOTO,
                        users::TABLE,
                        users::EMAIL,
                        users::PASSWORD_HASH
                    ),
                    params![email, password],
                    |row| {
                        Ok(AuthenticatedUser {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            photo: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
    }

    /// Get a user by id
    pub fn get_user(&self, user_id: i64) -> Result<Option<DbUser>> {
        self.run("get_user", |conn| {
            let user = conn
                .query_row(
                    &format!("SELECT * FROM {} WHERE {} = ?1", users::TABLE, users::ID),
                    params![user_id],
                    map_db_user,
                )
                .optional()?;
            Ok(user)
        })
    }

    /// The user's profile photo, if one is stored
    pub fn get_user_photo(&self, user_id: i64) -> Result<Option<Vec<u8>>> {
        self.run("get_user_photo", |conn| {
            let photo: Option<Option<Vec<u8>>> = conn
                .query_row(
                    &format!("SELECT {} FROM {} WHERE {} = ?1", users::PHOTO, users::TABLE, users::ID),
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(photo.flatten())
        })
    }

    /// Whether a user with this id exists
    pub fn user_exists(&self, user_id: i64) -> Result<bool> {
        self.run("user_exists", |conn| user_exists_on(conn, user_id))
    }

    /// Replace the user's profile photo
    pub fn update_user_photo(&self, user_id: i64, photo: &[u8]) -> Result<()> {
        self.run("update_user_photo", |conn| {
            let updated = conn.execute(
                &format!("UPDATE {} SET {} = ?1 WHERE {} = ?2", users::TABLE, users::PHOTO, users::ID),
                params![photo, user_id],
            )?;

            if updated == 0 {
                return Err(AgendaError::UserNotFound(user_id));
            }

            tracing::info!(user_id, bytes = photo.len(), "User photo updated");
            Ok(())
        })
    }

    /// Add a contact for `user_id`. Returns the new contact's id.
    ///
    /// Fails with [`AgendaError::UserNotFound`] when the owner doesn't exist.
    /// An unparsable birth date is dropped rather than rejected.
    pub fn save_contact(&self, user_id: i64, draft: &ContactDraft) -> Result<i64> {
        self.run("save_contact", |conn| {
            if !user_exists_on(conn, user_id)? {
                return Err(AgendaError::UserNotFound(user_id));
            }

            let birth_date = InputValidator::validate_birth_date(draft.birth_date.as_deref());
            tracing::debug!(user_id, name = %draft.name, ?birth_date, "Saving contact");

            conn.execute(
                &format!(
                    "INSERT INTO {} ({}, {}, {}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    contacts::TABLE,
                    contacts::NAME,
                    contacts::EMAIL,
                    contacts::PHONE,
                    contacts::BIRTH_DATE,
                    contacts::SOCIAL_PROFILE,
                    contacts::NOTES,
                    contacts::USER_ID
                ),
                params![
                    draft.name,
                    draft.email,
                    draft.phone,
                    birth_date,
                    draft.social_profile,
                    draft.notes,
                    user_id
                ],
            )?;

            let id = conn.last_insert_rowid();
            tracing::info!(contact_id = id, name = %draft.name, "Contact saved");
            Ok(id)
        })
    }

    /// All contacts of a user, in insertion order
    pub fn get_contacts(&self, user_id: i64) -> Result<Vec<Contact>> {
        self.run("get_contacts", |conn| {
            let mut stmt = conn.prepare(&format!(
                "{} WHERE {} = ?1 ORDER BY {}",
                contact_select(),
                contacts::USER_ID,
                contacts::ID
            ))?;

            let rows = stmt.query_map(params![user_id], map_contact)?;
            let contacts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            tracing::debug!(user_id, count = contacts.len(), "Contacts loaded");
            Ok(contacts)
        })
    }

    /// Get a contact by id
    pub fn get_contact(&self, contact_id: i64) -> Result<Option<Contact>> {
        self.run("get_contact", |conn| {
            let contact = conn
                .query_row(
                    &format!("{} WHERE {} = ?1", contact_select(), contacts::ID),
                    params![contact_id],
                    map_contact,
                )
                .optional()?;
            Ok(contact)
        })
    }

    /// Number of contacts a user has
    pub fn count_contacts(&self, user_id: i64) -> Result<usize> {
        self.run("count_contacts", |conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1", contacts::TABLE, contacts::USER_ID),
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
    }

    /// Overwrite every editable field of a contact.
    ///
    /// Returns the number of rows changed; an unknown id changes nothing and
    /// is not an error.
    pub fn update_contact(&self, contact_id: i64, draft: &ContactDraft) -> Result<usize> {
        self.run("update_contact", |conn| {
            let birth_date = InputValidator::validate_birth_date(draft.birth_date.as_deref());

            let updated = conn.execute(
                &format!(
                    "UPDATE {} SET {} = ?1, {} = ?2, {} = ?3, {} = ?4, {} = ?5, {} = ?6 WHERE {} = ?7",
                    contacts::TABLE,
                    contacts::NAME,
                    contacts::EMAIL,
                    contacts::PHONE,
                    contacts::BIRTH_DATE,
                    contacts::SOCIAL_PROFILE,
                    contacts::NOTES,
                    contacts::ID
                ),
                params![
                    draft.name,
                    draft.email,
                    draft.phone,
                    birth_date,
                    draft.social_profile,
                    draft.notes,
                    contact_id
                ],
            )?;

            tracing::info!(contact_id, rows = updated, "Contact updated");
            Ok(updated)
        })
    }

    /// Delete a contact. Returns the number of rows removed.
    pub fn delete_contact(&self, contact_id: i64) -> Result<usize> {
        self.run("delete_contact", |conn| {
            let deleted = conn.execute(
                &format!("DELETE FROM {} WHERE {} = ?1", contacts::TABLE, contacts::ID),
                params![contact_id],
            )?;

            tracing::info!(contact_id, rows = deleted, "Contact deleted");
            Ok(deleted)
        })
    }
}

/// Per-connection setup: enforce foreign keys and provide `SHA2()`.
fn init_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.create_scalar_function(
        SHA2_FUNCTION,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let input: Option<String> = ctx.get(0)?;
            let bits: i64 = ctx.get(1)?;
            Ok(input.and_then(|text| sha2_hex(text.as_bytes(), bits)))
        },
    )
}

/// Lowercase hex SHA-2 digest of `input`.
///
/// `bits` selects the variant: 224, 256 (also 0), 384 or 512. Any other value
/// yields `None`, which the SQL function returns as `NULL`.
#[must_use]
pub fn sha2_hex(input: &[u8], bits: i64) -> Option<String> {
    let digest = match bits {
        0 | 256 => hex::encode(Sha256::digest(input)),
        224 => hex::encode(Sha224::digest(input)),
        384 => hex::encode(Sha384::digest(input)),
        512 => hex::encode(Sha512::digest(input)),
        _ => return None,
    };
    Some(digest)
}

fn strip_sqlite_scheme(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

fn user_exists_on(conn: &Connection, user_id: i64) -> Result<bool> {
    let exists: bool = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)", users::TABLE, users::ID),
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn contact_select() -> String {
    format!(
        "SELECT {}, {}, {}, IFNULL({}, '') AS {}, {}, {}, {}, {} FROM {}",
        contacts::ID,
        contacts::USER_ID,
        contacts::NAME,
        contacts::PHONE,
        contacts::PHONE,
        contacts::EMAIL,
        contacts::SOCIAL_PROFILE,
        contacts::NOTES,
        contacts::BIRTH_DATE,
        contacts::TABLE
    )
}

/// Map a database row to a DbUser
fn map_db_user(row: &Row) -> rusqlite::Result<DbUser> {
    Ok(DbUser {
        id: row.get(users::ID)?,
        name: row.get(users::NAME)?,
        email: row.get(users::EMAIL)?,
        contact: row.get(users::CONTACT)?,
        password_hash: row.get(users::PASSWORD_HASH)?,
        photo: row.get(users::PHOTO)?,
    })
}

/// Map a database row to a Contact
fn map_contact(row: &Row) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(contacts::ID)?,
        user_id: row.get(contacts::USER_ID)?,
        name: row.get::<_, Option<String>>(contacts::NAME)?.unwrap_or_default(),
        phone: row.get(contacts::PHONE)?,
        email: row.get(contacts::EMAIL)?,
        social_profile: row.get(contacts::SOCIAL_PROFILE)?,
        notes: row.get(contacts::NOTES)?,
        birth_date: row.get(contacts::BIRTH_DATE)?,
    })
}
