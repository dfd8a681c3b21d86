//! The logged-in session.
//!
//! Mirrors what the agenda window holds: the user, their photo, the contact
//! list as last loaded, and whether today's birthday reminder was shown.
//! Storage errors stop here; they are logged and reported as `false`, `None`
//! or an empty list.

use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use crate::birthday::{BirthdayNotice, BirthdayReminder};
use crate::error::{AgendaError, Result};
use crate::models::{Contact, ContactDraft, NewUser};
use crate::repository::AgendaRepository;
use crate::validation::InputValidator;

/// Register a new account. `false` when the email is taken or storage fails.
pub fn register(repository: &dyn AgendaRepository, new_user: &NewUser) -> bool {
    match repository.save_user(new_user) {
        Ok(id) => {
            info!(user_id = id, "Registered user {}", new_user.name);
            true
        },
        Err(e) => {
            error!("Failed to save user: {}", e);
            false
        },
    }
}

pub struct AgendaSession {
    repository: Box<dyn AgendaRepository>,
    user_id: i64,
    user_name: String,
    photo: Option<Vec<u8>>,
    contacts: Vec<Contact>,
    reminder: BirthdayReminder,
    pending_notice: Option<BirthdayNotice>,
    today: Option<NaiveDate>,
}

impl AgendaSession {
    /// Log in. The contact list is empty until [`Self::refresh`] runs.
    pub fn login(repository: Box<dyn AgendaRepository>, email: &str, password: &str) -> Option<Self> {
        let user = match repository.authenticate_user(email, password) {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("Login rejected for {}", email);
                return None;
            },
            Err(e) => {
                error!("Failed to authenticate user: {}", e);
                return None;
            },
        };

        info!(user_id = user.id, "User {} logged in", user.name);
        Some(Self {
            repository,
            user_id: user.id,
            user_name: user.name,
            photo: user.photo,
            contacts: Vec::new(),
            reminder: BirthdayReminder::new(),
            pending_notice: None,
            today: None,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    #[must_use]
    pub fn photo(&self) -> Option<&[u8]> {
        self.photo.as_deref()
    }

    /// Contacts as of the last refresh.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Pin the date used for birthday checks instead of the local clock.
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = Some(today);
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Reload photo and contacts, then run the birthday check.
    pub fn refresh(&mut self) {
        self.photo = self.repository.get_user_photo(self.user_id).unwrap_or_else(|e| {
            error!("Failed to load photo: {}", e);
            None
        });

        self.contacts = self.repository.get_contacts(self.user_id).unwrap_or_else(|e| {
            error!("Failed to load contacts: {}", e);
            Vec::new()
        });

        tracing::debug!(count = self.contacts.len(), "Contacts loaded");

        let today = self.today();
        if let Some(notice) = self.reminder.check(&self.contacts, today) {
            self.pending_notice = Some(notice);
        }
    }

    /// The birthday reminder raised by the last refresh, if any. Taken once.
    pub fn take_birthday_notice(&mut self) -> Option<BirthdayNotice> {
        self.pending_notice.take()
    }

    /// Contacts whose list line contains `text`, ignoring case.
    #[must_use]
    pub fn search(&self, text: &str) -> Vec<&Contact> {
        let needle = text.to_lowercase();
        self.contacts
            .iter()
            .filter(|contact| contact.to_string().to_lowercase().contains(&needle))
            .collect()
    }

    /// A loaded contact by id.
    #[must_use]
    pub fn find(&self, contact_id: i64) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == contact_id)
    }

    /// Like [`Self::find`], failing with [`AgendaError::ContactNotFound`].
    pub fn contact(&self, contact_id: i64) -> Result<&Contact> {
        self.find(contact_id).ok_or(AgendaError::ContactNotFound(contact_id))
    }

    pub fn add_contact(&mut self, draft: &ContactDraft) -> bool {
        match self.repository.save_contact(self.user_id, draft) {
            Ok(_) => {
                self.refresh();
                true
            },
            Err(e) => {
                error!("Failed to save contact: {}", e);
                false
            },
        }
    }

    /// Replace the fields of one of this user's contacts.
    pub fn edit_contact(&mut self, contact_id: i64, draft: &ContactDraft) -> bool {
        if let Err(e) = self.contact(contact_id) {
            warn!("Refusing to change contact outside this agenda: {}", e);
            return false;
        }

        match self.repository.update_contact(contact_id, draft) {
            Ok(_) => {
                self.refresh();
                true
            },
            Err(e) => {
                error!("Failed to update contact: {}", e);
                false
            },
        }
    }

    pub fn delete_contact(&mut self, contact_id: i64) -> bool {
        if let Err(e) = self.contact(contact_id) {
            warn!("Refusing to change contact outside this agenda: {}", e);
            return false;
        }

        match self.repository.delete_contact(contact_id) {
            Ok(_) => {
                self.refresh();
                true
            },
            Err(e) => {
                error!("Failed to delete contact: {}", e);
                false
            },
        }
    }

    /// Store the image at `path` as the profile photo.
    pub fn change_photo(&mut self, path: &Path, max_bytes: usize) -> bool {
        let photo = match Self::read_photo(path, max_bytes) {
            Ok(photo) => photo,
            Err(e) => {
                error!("Failed to read photo: {}", e);
                return false;
            },
        };

        match self.repository.update_user_photo(self.user_id, &photo) {
            Ok(()) => {
                self.photo = Some(photo);
                true
            },
            Err(e) => {
                error!("Failed to update photo: {}", e);
                false
            },
        }
    }

    fn read_photo(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        InputValidator::validate_photo_path(path)?;
        let photo = std::fs::read(path)?;
        InputValidator::validate_photo_size(&photo, max_bytes)?;
        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthenticatedUser;
    use crate::repository::MockAgendaRepository;
    use mockall::predicate::eq;

    fn contact(id: i64, name: &str, phone: &str, birth: Option<&str>) -> Contact {
        Contact {
            id,
            user_id: 7,
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            social_profile: None,
            notes: None,
            birth_date: birth.map(|b| NaiveDate::parse_from_str(b, "%Y-%m-%d").unwrap()),
        }
    }

    fn logged_in(mut mock: MockAgendaRepository) -> AgendaSession {
        mock.expect_authenticate_user().returning(|_, _| {
            Ok(Some(AuthenticatedUser {
                id: 7,
                name: "Maria".to_string(),
                photo: None,
            }))
        });
        let mut session = AgendaSession::login(Box::new(mock), "maria@example.com", "secret").unwrap();
        session.set_today(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        session
    }

    #[test]
    fn test_register_reports_duplicate_as_false() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_save_user()
            .returning(|u| Err(AgendaError::DuplicateEmail(u.email.clone())));

        let user = NewUser {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            password: "secret".to_string(),
            ..NewUser::default()
        };
        assert!(!register(&mock, &user));
    }

    #[test]
    fn test_login_rejected() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_authenticate_user().returning(|_, _| Ok(None));
        assert!(AgendaSession::login(Box::new(mock), "x@example.com", "bad").is_none());
    }

    #[test]
    fn test_refresh_loads_contacts_and_raises_notice_once() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_get_user_photo().with(eq(7)).returning(|_| Ok(Some(vec![1, 2, 3])));
        mock.expect_get_contacts().with(eq(7)).returning(|_| {
            Ok(vec![
                contact(1, "Ana", "5551234", Some("1990-10-16")),
                contact(2, "Bruno", "", None),
            ])
        });

        let mut session = logged_in(mock);
        session.refresh();
        assert_eq!(session.contacts().len(), 2);
        assert_eq!(session.photo(), Some(&[1u8, 2, 3][..]));

        let notice = session.take_birthday_notice().unwrap();
        assert_eq!(notice.names, vec!["Ana".to_string()]);
        assert!(session.take_birthday_notice().is_none());

        session.refresh();
        assert!(session.take_birthday_notice().is_none());
    }

    #[test]
    fn test_refresh_failure_yields_empty_list() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_get_user_photo().returning(|_| Ok(None));
        mock.expect_get_contacts()
            .returning(|_| Err(AgendaError::Other("disk on fire".to_string())));

        let mut session = logged_in(mock);
        session.refresh();
        assert!(session.contacts().is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_phone() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_get_user_photo().returning(|_| Ok(None));
        mock.expect_get_contacts().returning(|_| {
            Ok(vec![
                contact(1, "Ana Souza", "5551234", None),
                contact(2, "Bruno", "99887766", None),
            ])
        });

        let mut session = logged_in(mock);
        session.refresh();

        let names = |hits: Vec<&Contact>| hits.iter().map(|c| c.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(session.search("ana")), vec!["Ana Souza"]);
        assert_eq!(names(session.search("8877")), vec!["Bruno"]);
        assert_eq!(session.search("").len(), 2);
        assert!(session.search("zzz").is_empty());
    }

    #[test]
    fn test_edit_refuses_contact_outside_agenda() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_get_user_photo().returning(|_| Ok(None));
        mock.expect_get_contacts().returning(|_| Ok(vec![contact(1, "Ana", "", None)]));
        mock.expect_update_contact().never();
        mock.expect_delete_contact().never();

        let mut session = logged_in(mock);
        session.refresh();
        assert!(!session.edit_contact(99, &ContactDraft::named("Intruder")));
        assert!(!session.delete_contact(99));
    }

    #[test]
    fn test_contact_lookup_reports_missing_id() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_get_user_photo().returning(|_| Ok(None));
        mock.expect_get_contacts().returning(|_| Ok(vec![contact(1, "Ana", "", None)]));

        let mut session = logged_in(mock);
        session.refresh();
        assert_eq!(session.contact(1).unwrap().name, "Ana");
        assert!(matches!(session.contact(99), Err(AgendaError::ContactNotFound(99))));
        assert_eq!(session.contact(99).unwrap_err().to_string(), "Contact with id 99 does not exist");
    }

    #[test]
    fn test_add_contact_refreshes_list() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_save_contact().times(1).returning(|_, _| Ok(1));
        mock.expect_get_user_photo().returning(|_| Ok(None));
        mock.expect_get_contacts().returning(|_| Ok(vec![contact(1, "Ana", "", None)]));

        let mut session = logged_in(mock);
        assert!(session.add_contact(&ContactDraft::named("Ana")));
        assert_eq!(session.contacts().len(), 1);
    }

    #[test]
    fn test_change_photo_rejects_unsupported_file() {
        let mut mock = MockAgendaRepository::new();
        mock.expect_update_user_photo().never();

        let mut session = logged_in(mock);
        assert!(!session.change_photo(Path::new("notes.txt"), 65_535));
    }
}
