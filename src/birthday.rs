//! Birthday reminder.
//!
//! A linear scan over the loaded contacts. The reminder is raised at most once
//! per session; a contact born on 29 February only matches in leap years.

use std::fmt;

use chrono::NaiveDate;

use crate::models::Contact;

/// Names of the contacts whose birthday is on `today` (day and month).
#[must_use]
pub fn birthdays_on(contacts: &[Contact], today: NaiveDate) -> Vec<String> {
    contacts
        .iter()
        .filter(|contact| contact.has_birthday_on(today))
        .map(|contact| contact.name.clone())
        .collect()
}

/// The reminder shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayNotice {
    /// People celebrating today, in list order
    pub names: Vec<String>,
}

impl fmt::Display for BirthdayNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Today is a special day!")?;
        writeln!(f)?;
        writeln!(f, "Happy birthday to:")?;
        for name in &self.names {
            writeln!(f, "  * {name}")?;
        }
        writeln!(f)?;
        write!(f, "Don't forget to congratulate them!")
    }
}

/// Tracks whether the reminder was already shown in this session.
#[derive(Debug, Default)]
pub struct BirthdayReminder {
    shown: bool,
}

impl BirthdayReminder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a notice has been produced in this session.
    #[must_use]
    pub fn was_shown(&self) -> bool {
        self.shown
    }

    /// Produce a notice for today's birthdays, unless one was already shown.
    ///
    /// Finding nobody leaves the flag untouched, so a contact added later in
    /// the same session can still trigger the reminder.
    pub fn check(&mut self, contacts: &[Contact], today: NaiveDate) -> Option<BirthdayNotice> {
        if self.shown {
            return None;
        }

        let names = birthdays_on(contacts, today);
        if names.is_empty() {
            return None;
        }

        self.shown = true;
        tracing::info!(count = names.len(), "Birthday reminder raised");
        Some(BirthdayNotice { names })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str, birth: Option<(i32, u32, u32)>) -> Contact {
        Contact {
            id: 0,
            user_id: 1,
            name: name.to_string(),
            phone: String::new(),
            email: None,
            social_profile: None,
            notes: None,
            birth_date: birth.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birthdays_on_matches_day_and_month() {
        let contacts = vec![
            contact("Ana", Some((1990, 5, 2))),
            contact("Bruno", Some((1985, 5, 3))),
            contact("Carla", None),
            contact("Davi", Some((2001, 5, 2))),
        ];
        assert_eq!(birthdays_on(&contacts, date(2026, 5, 2)), vec!["Ana", "Davi"]);
        assert!(birthdays_on(&contacts, date(2026, 6, 2)).is_empty());
    }

    #[test]
    fn test_leap_day_birthday_only_in_leap_years() {
        let contacts = vec![contact("Leo", Some((2000, 2, 29)))];
        assert!(birthdays_on(&contacts, date(2026, 2, 28)).is_empty());
        assert!(birthdays_on(&contacts, date(2026, 3, 1)).is_empty());
        assert_eq!(birthdays_on(&contacts, date(2028, 2, 29)), vec!["Leo"]);
    }

    #[test]
    fn test_reminder_shown_once_per_session() {
        let contacts = vec![contact("Ana", Some((1990, 5, 2)))];
        let mut reminder = BirthdayReminder::new();

        let notice = reminder.check(&contacts, date(2026, 5, 2));
        assert_eq!(notice.map(|n| n.names), Some(vec!["Ana".to_string()]));
        assert!(reminder.was_shown());
        assert!(reminder.check(&contacts, date(2026, 5, 2)).is_none());
    }

    #[test]
    fn test_no_match_keeps_reminder_armed() {
        let mut reminder = BirthdayReminder::new();
        assert!(reminder.check(&[contact("Ana", None)], date(2026, 5, 2)).is_none());
        assert!(!reminder.was_shown());

        let later = vec![contact("Ana", Some((1990, 5, 2)))];
        assert!(reminder.check(&later, date(2026, 5, 2)).is_some());
    }

    #[test]
    fn test_notice_text_lists_names() {
        let notice = BirthdayNotice {
            names: vec!["Ana".to_string(), "Davi".to_string()],
        };
        let text = notice.to_string();
        assert!(text.contains("Happy birthday to:"));
        assert!(text.contains("* Ana"));
        assert!(text.contains("* Davi"));
    }
}
