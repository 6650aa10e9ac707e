//! Person field validation
//!
//! Every writer input goes through these constructors, so the repository
//! layer only ever sees values that satisfy the column constraints.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length for `name` and `surname`
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length for `email`
pub const MAX_EMAIL_LEN: usize = 255;

/// Maximum length for `phone`
pub const MAX_PHONE_LEN: usize = 32;

/// Loose address check: something@something.tld, no whitespace
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

/// Non-empty, length-bounded name component (`name` or `surname`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    /// Validate a name component. `field` is used in error messages.
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Syntactically valid email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Validate an email address.
    ///
    /// # Example
    /// ```
    /// use rolodex_server::models::Email;
    ///
    /// assert!(Email::new("ada@example.com").is_ok());
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }

        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "invalid email",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Person gender. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(ValidationError::InvalidVariant {
                field: "gender",
                value: other.to_owned(),
            }),
        }
    }
}

/// Age must be a non-negative integer.
pub fn validate_age(age: i32) -> Result<i32, ValidationError> {
    if age < 0 {
        return Err(ValidationError::OutOfRange { field: "age", min: 0 });
    }
    Ok(age)
}

/// Parse an ISO `YYYY-MM-DD` birthday.
pub fn parse_birthday(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: "birthday",
        reason: "expected ISO date (YYYY-MM-DD)",
    })
}

/// Phone numbers are free text, bounded by the column width.
pub fn validate_phone(s: String) -> Result<String, ValidationError> {
    if s.chars().count() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone",
            max: MAX_PHONE_LEN,
        });
    }
    Ok(s)
}

/// Contact ids referenced by a person. Order and duplicates are preserved;
/// the link table collapses duplicates on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactIds(Vec<i64>);

impl ContactIds {
    /// Every id must be a positive integer.
    pub fn new(ids: Vec<i64>) -> Result<Self, ValidationError> {
        if ids.iter().any(|id| *id <= 0) {
            return Err(ValidationError::OutOfRange {
                field: "contacts",
                min: 1,
            });
        }
        Ok(Self(ids))
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validated input for creating a person.
#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: PersonName,
    pub surname: PersonName,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Email,
    pub contacts: ContactIds,
}

/// Validated partial update.
///
/// Each scalar is either present (`Some`) and written, or absent (`None`)
/// and left unchanged. `contacts: None` leaves the contact-set untouched,
/// `Some` replaces it, including with the empty set.
#[derive(Debug, Clone, Default)]
pub struct PersonPatch {
    pub name: Option<PersonName>,
    pub surname: Option<PersonName>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub contacts: Option<ContactIds>,
}

impl PersonPatch {
    /// True when at least one scalar column will be written.
    pub fn has_scalar_changes(&self) -> bool {
        self.name.is_some()
            || self.surname.is_some()
            || self.age.is_some()
            || self.gender.is_some()
            || self.birthday.is_some()
            || self.phone.is_some()
            || self.email.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(PersonName::new("name", "Ada").is_ok());

        let err = PersonName::new("surname", "").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "surname" });

        let long = "a".repeat(MAX_NAME_LEN + 1);
        let err = PersonName::new("name", &long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 100, .. }));
    }

    #[test]
    fn email_rules() {
        assert!(Email::new("ada@example.com").is_ok());
        assert!(Email::new("a.b+tag@sub.example.org").is_ok());

        for bad in ["", "ada", "ada@", "ada@example", "a da@example.com", "@example.com"] {
            assert!(Email::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn gender_parses_known_values_only() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);

        let err = "Male".parse::<Gender>().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidVariant { field: "gender", .. }));
    }

    #[test]
    fn gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
    }

    #[test]
    fn age_must_be_non_negative() {
        assert_eq!(validate_age(0).unwrap(), 0);
        assert_eq!(validate_age(42).unwrap(), 42);
        assert!(validate_age(-1).is_err());
    }

    #[test]
    fn birthday_is_iso_date() {
        let date = parse_birthday("1990-02-28").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 2, 28).unwrap());

        assert!(parse_birthday("28/02/1990").is_err());
        assert!(parse_birthday("1990-02-30").is_err());
    }

    #[test]
    fn phone_length_bounded() {
        assert!(validate_phone("+44 20 7946 0000".into()).is_ok());
        assert!(validate_phone("9".repeat(MAX_PHONE_LEN + 1)).is_err());
    }

    #[test]
    fn contact_ids_must_be_positive() {
        let ids = ContactIds::new(vec![3, 1, 3]).unwrap();
        assert_eq!(ids.as_slice(), &[3, 1, 3]);

        assert!(ContactIds::new(vec![]).unwrap().is_empty());
        assert!(ContactIds::new(vec![1, 0]).is_err());
        assert!(ContactIds::new(vec![-5]).is_err());
    }

    #[test]
    fn patch_scalar_detection() {
        let patch = PersonPatch::default();
        assert!(!patch.has_scalar_changes());

        let patch = PersonPatch {
            contacts: Some(ContactIds::default()),
            ..Default::default()
        };
        assert!(!patch.has_scalar_changes());

        let patch = PersonPatch {
            age: Some(30),
            ..Default::default()
        };
        assert!(patch.has_scalar_changes());
    }
}
