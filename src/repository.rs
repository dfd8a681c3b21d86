//! Repository trait between the session layer and storage.
//!
//! [`Database`] is the production implementation; tests substitute a mock.

use crate::db::Database;
use crate::error::Result;
use crate::models::{AuthenticatedUser, Contact, ContactDraft, NewUser};

#[cfg_attr(test, mockall::automock)]
pub trait AgendaRepository {
    fn save_user(&self, new_user: &NewUser) -> Result<i64>;
    fn authenticate_user(&self, email: &str, password: &str) -> Result<Option<AuthenticatedUser>>;
    fn get_user_photo(&self, user_id: i64) -> Result<Option<Vec<u8>>>;
    fn update_user_photo(&self, user_id: i64, photo: &[u8]) -> Result<()>;
    fn save_contact(&self, user_id: i64, draft: &ContactDraft) -> Result<i64>;
    fn get_contacts(&self, user_id: i64) -> Result<Vec<Contact>>;
    fn update_contact(&self, contact_id: i64, draft: &ContactDraft) -> Result<usize>;
    fn delete_contact(&self, contact_id: i64) -> Result<usize>;
}

impl AgendaRepository for Database {
    fn save_user(&self, new_user: &NewUser) -> Result<i64> {
        Database::save_user(self, new_user)
    }

    fn authenticate_user(&self, email: &str, password: &str) -> Result<Option<AuthenticatedUser>> {
        Database::authenticate_user(self, email, password)
    }

    fn get_user_photo(&self, user_id: i64) -> Result<Option<Vec<u8>>> {
        Database::get_user_photo(self, user_id)
    }

    fn update_user_photo(&self, user_id: i64, photo: &[u8]) -> Result<()> {
        Database::update_user_photo(self, user_id, photo)
    }

    fn save_contact(&self, user_id: i64, draft: &ContactDraft) -> Result<i64> {
        Database::save_contact(self, user_id, draft)
    }

    fn get_contacts(&self, user_id: i64) -> Result<Vec<Contact>> {
        Database::get_contacts(self, user_id)
    }

    fn update_contact(&self, contact_id: i64, draft: &ContactDraft) -> Result<usize> {
        Database::update_contact(self, contact_id, draft)
    }

    fn delete_contact(&self, contact_id: i64) -> Result<usize> {
        Database::delete_contact(self, contact_id)
    }
}
