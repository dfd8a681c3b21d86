use std::path::Path;

use chrono::NaiveDate;

use crate::error::{AgendaError, Result};

/// Date format accepted for birth dates.
pub const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Image extensions accepted as profile photos.
pub const PHOTO_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Parse a birth date, failing on anything that is not `YYYY-MM-DD`.
    pub fn parse_birth_date(input: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(input, BIRTH_DATE_FORMAT)
            .map_err(|e| AgendaError::InvalidDate(format!("{input:?}: {e}")))
    }

    /// Lenient birth date handling used when saving contacts.
    ///
    /// Missing or blank input means no date. Unparsable input is logged and
    /// also treated as no date; the contact is still saved.
    #[must_use]
    pub fn validate_birth_date(input: Option<&str>) -> Option<NaiveDate> {
        let raw = input?;
        if raw.trim().is_empty() {
            return None;
        }

        match Self::parse_birth_date(raw) {
            Ok(date) => Some(date),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding invalid birth date");
                None
            },
        }
    }

    /// Validate the path of an image chosen as profile photo
    pub fn validate_photo_path(path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(AgendaError::InvalidPhoto("Photo path cannot be empty".to_string()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !PHOTO_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AgendaError::InvalidPhoto(format!(
                "Unsupported image type {:?}. Must be one of: {PHOTO_EXTENSIONS:?}",
                path.display().to_string()
            )));
        }

        Ok(())
    }

    /// Validate photo size against the configured limit
    pub fn validate_photo_size(photo: &[u8], max_bytes: usize) -> Result<()> {
        if photo.is_empty() {
            return Err(AgendaError::InvalidPhoto("Photo file is empty".to_string()));
        }

        if photo.len() > max_bytes {
            return Err(AgendaError::InvalidPhoto(format!(
                "Photo too large ({} bytes, max {max_bytes})",
                photo.len()
            )));
        }

        Ok(())
    }

    /// Validate export file path
    pub fn validate_export_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.is_empty() {
            return Err(AgendaError::Other("File path cannot be empty".to_string()));
        }

        // Check for path traversal attempts
        if path_str.contains("..") {
            return Err(AgendaError::Other(
                "File path contains potentially dangerous characters".to_string(),
            ));
        }

        if path_str.len() > 4096 {
            return Err(AgendaError::Other("File path too long (max 4096 characters)".to_string()));
        }

        Ok(())
    }

    /// Validate database URL
    pub fn validate_database_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(AgendaError::InvalidConfig("Database URL cannot be empty".to_string()));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            if scheme != "sqlite" {
                return Err(AgendaError::InvalidConfig(
                    "Only SQLite databases are supported".to_string(),
                ));
            }
        }

        if url.len() > 1000 {
            return Err(AgendaError::InvalidConfig("Database URL too long".to_string()));
        }

        Ok(())
    }

    /// Sanitize text input
    #[must_use]
    pub fn sanitize_text(text: &str) -> String {
        text.chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Sanitize an optional field; blank input becomes `None`
    #[must_use]
    pub fn sanitize_optional(text: Option<&str>) -> Option<String> {
        text.map(Self::sanitize_text).filter(|t| !t.is_empty())
    }
}
