//! Contact Agenda - personal contacts with user accounts
//!
//! A Rust library for keeping a personal list of contacts in SQLite, behind a
//! per-user login.
//!
//! # Features
//!
//! - User registration and login (password hashed by the database)
//! - Profile photo storage
//! - Contact CRUD with search
//! - Birthday reminder, once per session
//! - Export to TXT, CSV and JSON

/// Birthday matching and the once-per-session reminder
pub mod birthday;
/// Configuration management
pub mod config;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Contact export
pub mod file_writer;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repository trait for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// The logged-in session
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{AgendaError, Result};
pub use models::{Contact, ContactDraft, NewUser, OutputFormat};
pub use service::AgendaSession;
