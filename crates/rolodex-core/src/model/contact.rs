//! The contact aggregate.

use chrono::{DateTime, Utc};

use super::fields::{Address, Email, Event, InstantMessage, PhoneNumber, Website};
use super::group::Group;
use crate::constants::UNNAMED_CONTACT;
use crate::error::{CoreError, CoreResult};

/// A person in the address book.
///
/// `id` is `None` until the store has assigned one. Child collections are
/// exclusively owned: they live and die with the contact.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub id: Option<i64>,
    pub prefix: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub suffix: Option<String>,
    pub nickname: Option<String>,
    /// Reference to an externally stored photo. The model never holds
    /// image bytes.
    pub photo_uri: Option<String>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub emails: Vec<Email>,
    pub addresses: Vec<Address>,
    pub websites: Vec<Website>,
    pub instant_messages: Vec<InstantMessage>,
    pub organization: Option<String>,
    pub title: Option<String>,
    pub notes: Option<String>,
    /// ISO `YYYY-MM-DD`.
    pub birthday: Option<String>,
    pub events: Vec<Event>,
    pub ringtone: Option<String>,
    pub is_favorite: bool,
    pub groups: Vec<Group>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Creates an empty, unpersisted contact stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            prefix: None,
            first_name: String::new(),
            middle_name: None,
            last_name: String::new(),
            suffix: None,
            nickname: None,
            photo_uri: None,
            phone_numbers: Vec::new(),
            emails: Vec::new(),
            addresses: Vec::new(),
            websites: Vec::new(),
            instant_messages: Vec::new(),
            organization: None,
            title: None,
            notes: None,
            birthday: None,
            events: Vec::new(),
            ringtone: None,
            is_favorite: false,
            groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A contact must carry at least a first or a last name before it can
    /// be saved.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ValidationError`] when both are blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.first_name.trim().is_empty() && self.last_name.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "contact needs a first or last name".to_string(),
            ));
        }
        Ok(())
    }

    /// Full display name assembled from the structured parts.
    ///
    /// Falls back to the nickname, then to a fixed placeholder, so the
    /// result is never empty.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [
            self.prefix.as_deref(),
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect();

        if parts.is_empty() {
            match self.nickname.as_deref() {
                Some(nick) if !nick.trim().is_empty() => nick.to_string(),
                _ => UNNAMED_CONTACT.to_string(),
            }
        } else {
            parts.join(" ")
        }
    }

    /// Up to two uppercase initials for list avatars, `"?"` when there
    /// are none.
    #[must_use]
    pub fn initials(&self) -> String {
        let mut initials = String::new();
        if let Some(c) = self.first_name.chars().next() {
            initials.extend(c.to_uppercase());
        }
        if let Some(c) = self.last_name.chars().next() {
            initials.extend(c.to_uppercase());
        }
        if initials.is_empty() {
            initials.push('?');
        }
        initials
    }

    #[must_use]
    pub fn primary_phone(&self) -> Option<&PhoneNumber> {
        self.phone_numbers.first()
    }

    #[must_use]
    pub fn primary_email(&self) -> Option<&Email> {
        self.emails.first()
    }
}

impl Default for Contact {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Email, EmailType, PhoneType};

    fn named(first: &str, last: &str) -> Contact {
        Contact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            ..Contact::new()
        }
    }

    #[test]
    fn validate_requires_some_name() {
        assert!(named("Jane", "").validate().is_ok());
        assert!(named("", "Doe").validate().is_ok());
        assert!(matches!(
            named("  ", "  ").validate(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn display_name_joins_all_parts() {
        let contact = Contact {
            prefix: Some("Dr.".to_string()),
            middle_name: Some("Quincy".to_string()),
            suffix: Some("Jr.".to_string()),
            ..named("Jane", "Doe")
        };
        assert_eq!(contact.display_name(), "Dr. Jane Quincy Doe Jr.");
    }

    #[test]
    fn display_name_falls_back_to_nickname() {
        let contact = Contact {
            nickname: Some("JD".to_string()),
            ..Contact::new()
        };
        assert_eq!(contact.display_name(), "JD");
    }

    #[test]
    fn display_name_is_never_empty() {
        let contact = Contact::new();
        assert_eq!(contact.display_name(), "Unnamed Contact");
    }

    #[test]
    fn display_name_skips_blank_parts() {
        let contact = Contact {
            prefix: Some("  ".to_string()),
            ..named("Jane", "")
        };
        assert_eq!(contact.display_name(), "Jane");
    }

    #[test]
    fn initials_uppercase_first_and_last() {
        assert_eq!(named("jane", "doe").initials(), "JD");
    }

    #[test]
    fn initials_placeholder_when_nameless() {
        assert_eq!(Contact::new().initials(), "?");
    }

    #[test]
    fn primary_phone_is_first() {
        let contact = Contact {
            phone_numbers: vec![
                PhoneNumber::new("111", PhoneType::Mobile),
                PhoneNumber::new("222", PhoneType::Home),
            ],
            ..Contact::new()
        };
        assert_eq!(contact.primary_phone().map(|p| p.number.as_str()), Some("111"));
    }

    #[test]
    fn primary_email_is_first() {
        let contact = Contact {
            emails: vec![
                Email::new("ada@example.com", EmailType::Home),
                Email::new("ada@work.example.com", EmailType::Work),
            ],
            ..Contact::new()
        };
        assert_eq!(
            contact.primary_email().map(|e| e.address.as_str()),
            Some("ada@example.com")
        );
        assert!(Contact::new().primary_email().is_none());
    }
}
