//! Unit tests for validation.rs module

use std::path::Path;

use chrono::NaiveDate;
use contact_agenda::error::AgendaError;
use contact_agenda::validation::InputValidator;

#[test]
fn test_parse_birth_date_valid() {
    assert_eq!(
        InputValidator::parse_birth_date("1990-03-14").unwrap(),
        NaiveDate::from_ymd_opt(1990, 3, 14).unwrap()
    );
}

#[test]
fn test_birth_date_with_surrounding_whitespace_is_rejected() {
    assert!(InputValidator::parse_birth_date(" 1990-03-14 ").is_err());
    assert_eq!(InputValidator::validate_birth_date(Some(" 1990-03-14 ")), None);
}

#[test]
fn test_parse_birth_date_wrong_format() {
    assert!(matches!(
        InputValidator::parse_birth_date("14/03/1990"),
        Err(AgendaError::InvalidDate(_))
    ));
}

#[test]
fn test_parse_birth_date_impossible_day() {
    assert!(InputValidator::parse_birth_date("2023-02-29").is_err());
}

#[test]
fn test_validate_birth_date_lenient() {
    assert_eq!(InputValidator::validate_birth_date(None), None);
    assert_eq!(InputValidator::validate_birth_date(Some("")), None);
    assert_eq!(InputValidator::validate_birth_date(Some("not a date")), None);
    assert_eq!(
        InputValidator::validate_birth_date(Some("2024-02-29")),
        NaiveDate::from_ymd_opt(2024, 2, 29)
    );
}

#[test]
fn test_validate_photo_path_accepts_images() {
    for name in ["me.png", "me.jpg", "me.jpeg", "ME.JPG"] {
        assert!(InputValidator::validate_photo_path(Path::new(name)).is_ok(), "{name}");
    }
}

#[test]
fn test_validate_photo_path_rejects_others() {
    for name in ["", "me.gif", "me", "notes.txt"] {
        assert!(InputValidator::validate_photo_path(Path::new(name)).is_err(), "{name}");
    }
}

#[test]
fn test_validate_photo_size() {
    assert!(InputValidator::validate_photo_size(&[1, 2, 3], 3).is_ok());
    assert!(InputValidator::validate_photo_size(&[1, 2, 3, 4], 3).is_err());
    assert!(InputValidator::validate_photo_size(&[], 3).is_err());
}

#[test]
fn test_validate_export_path() {
    assert!(InputValidator::validate_export_path(Path::new("./output")).is_ok());
    assert!(InputValidator::validate_export_path(Path::new("")).is_err());
    assert!(InputValidator::validate_export_path(Path::new("../../etc")).is_err());
}

#[test]
fn test_validate_database_url() {
    assert!(InputValidator::validate_database_url("sqlite:data/agenda.db").is_ok());
    assert!(InputValidator::validate_database_url("sqlite://data/agenda.db").is_ok());
    assert!(InputValidator::validate_database_url("data/agenda.db").is_ok());
    assert!(InputValidator::validate_database_url("").is_err());
    assert!(InputValidator::validate_database_url("mysql://localhost/agenda").is_err());
}

#[test]
fn test_sanitize_text() {
    assert_eq!(InputValidator::sanitize_text("  Ana\0 Souza \u{7}"), "Ana Souza");
    assert_eq!(InputValidator::sanitize_text("line one\nline two"), "line one\nline two");
}

#[test]
fn test_sanitize_optional() {
    assert_eq!(InputValidator::sanitize_optional(None), None);
    assert_eq!(InputValidator::sanitize_optional(Some("   ")), None);
    assert_eq!(InputValidator::sanitize_optional(Some(" 555 ")), Some("555".to_string()));
}
