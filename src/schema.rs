//! Database schema definitions
//!
//! Constants for table and column names used with rusqlite. The DDL lives in
//! `migrations/` and is applied by [`crate::db::Database::new`].

/// Users table schema
pub mod users {
    /// Table name
    pub const TABLE: &str = "users";
    /// Primary key column
    pub const ID: &str = "id";
    /// Display name column
    pub const NAME: &str = "name";
    /// Login email column (unique)
    pub const EMAIL: &str = "email";
    /// Contact phone column
    pub const CONTACT: &str = "contact";
    /// SHA-256 hex digest of the password
    pub const PASSWORD_HASH: &str = "password_hash";
    /// Profile photo blob column
    pub const PHOTO: &str = "photo";
}

/// Contacts table schema
pub mod contacts {
    /// Table name
    pub const TABLE: &str = "contacts";
    /// Primary key column
    pub const ID: &str = "id";
    /// Foreign key to users table
    pub const USER_ID: &str = "user_id";
    /// Contact name column
    pub const NAME: &str = "name";
    /// Phone number column
    pub const PHONE: &str = "phone";
    /// Email address column
    pub const EMAIL: &str = "email";
    /// Social network handle column
    pub const SOCIAL_PROFILE: &str = "social_profile";
    /// Free-text notes column
    pub const NOTES: &str = "notes";
    /// Birth date column (`YYYY-MM-DD`)
    pub const BIRTH_DATE: &str = "birth_date";
}

/// Name of the SQL function that hashes passwords inside the database.
pub const SHA2_FUNCTION: &str = "SHA2";

/// Digest length passed to [`SHA2_FUNCTION`] for password hashes.
pub const PASSWORD_HASH_BITS: i64 = 256;
