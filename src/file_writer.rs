//! File writing utilities for contact export.
//!
//! Writes a contact list as plain text, CSV or JSON.

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{Contact, OutputFormat};
use crate::validation::{InputValidator, BIRTH_DATE_FORMAT};

const CSV_HEADER: [&str; 6] = ["Name", "Phone", "Email", "Social Profile", "Notes", "Birth Date"];

/// Write `contacts` to `output_dir/<file_stem>.<ext>`.
///
/// Returns the path of the written file.
pub fn write_contacts(
    contacts: &[Contact],
    format: OutputFormat,
    output_dir: &Path,
    file_stem: &str,
) -> Result<PathBuf> {
    InputValidator::validate_export_path(output_dir)?;
    create_dir_all(output_dir)?;

    let file_path = output_dir.join(format!("{file_stem}.{}", format.extension()));
    match format {
        OutputFormat::Txt => write_txt_file(contacts, &file_path)?,
        OutputFormat::Csv => write_csv_file(contacts, &file_path)?,
        OutputFormat::Json => write_json_file(contacts, &file_path)?,
    }

    tracing::info!(count = contacts.len(), path = %file_path.display(), "Contacts exported");
    Ok(file_path)
}

fn birth_date_text(contact: &Contact) -> String {
    contact
        .birth_date
        .map(|d| d.format(BIRTH_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

/// Write contacts to a text file, one block per contact
pub fn write_txt_file(contacts: &[Contact], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    for contact in contacts {
        writeln!(writer, "{contact}")?;
        if let Some(email) = &contact.email {
            writeln!(writer, "  email: {email}")?;
        }
        if let Some(profile) = &contact.social_profile {
            writeln!(writer, "  social: {profile}")?;
        }
        if contact.birth_date.is_some() {
            writeln!(writer, "  birthday: {}", birth_date_text(contact))?;
        }
        if let Some(notes) = &contact.notes {
            writeln!(writer, "  notes: {notes}")?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write contacts to a CSV file
pub fn write_csv_file(contacts: &[Contact], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    writer.write_record(CSV_HEADER)?;

    for contact in contacts {
        writer.write_record([
            contact.name.as_str(),
            contact.phone.as_str(),
            contact.email.as_deref().unwrap_or_default(),
            contact.social_profile.as_deref().unwrap_or_default(),
            contact.notes.as_deref().unwrap_or_default(),
            birth_date_text(contact).as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write contacts to a JSON file
pub fn write_json_file(contacts: &[Contact], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, contacts)?;
    writer.flush()?;
    Ok(())
}
