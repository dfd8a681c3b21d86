//! Data models for users and contacts
//!
//! Rows read from the database, the inputs used to create or change them, and
//! the small value types the CLI and export code share.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Database representation of a registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbUser {
    /// Database primary key
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    pub email: String,
    /// Contact phone of the user
    pub contact: Option<String>,
    /// Hex SHA-256 digest of the password, computed by the database
    pub password_hash: String,
    /// Profile photo bytes
    pub photo: Option<Vec<u8>>,
}

/// Registration input
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Contact phone
    pub contact: Option<String>,
    /// Plaintext password; hashed by the database on insert
    pub password: String,
    /// Optional profile photo
    pub photo: Option<Vec<u8>>,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// User id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Profile photo at login time
    pub photo: Option<Vec<u8>>,
}

/// A contact owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Database primary key
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Contact name
    pub name: String,
    /// Phone number; empty when none was stored
    pub phone: String,
    /// Email address
    pub email: Option<String>,
    /// Social network handle
    pub social_profile: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
}

impl Contact {
    /// Whether this contact's birthday falls on the day and month of `date`.
    #[must_use]
    pub fn has_birthday_on(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;

        self.birth_date
            .is_some_and(|birth| birth.day() == date.day() && birth.month() == date.month())
    }

    /// Convert back into a draft, e.g. to merge a partial edit.
    #[must_use]
    pub fn to_draft(&self) -> ContactDraft {
        ContactDraft {
            name: self.name.clone(),
            phone: Some(self.phone.clone()).filter(|p| !p.is_empty()),
            email: self.email.clone(),
            social_profile: self.social_profile.clone(),
            notes: self.notes.clone(),
            birth_date: self.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// The list line shown for a contact, also used for searching.
impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.phone)
    }
}

/// Fields entered when creating or editing a contact.
///
/// `birth_date` is kept as entered; it is parsed with
/// [`crate::validation::InputValidator::validate_birth_date`] right before the
/// statement runs, and an unparsable value is stored as no date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    /// Contact name
    pub name: String,
    /// Phone number
    pub phone: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Social network handle
    pub social_profile: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Birth date as entered (`YYYY-MM-DD`)
    pub birth_date: Option<String>,
}

impl ContactDraft {
    /// Draft with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Output format for exported contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("Unknown output format: {other}. Use txt, csv or json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
