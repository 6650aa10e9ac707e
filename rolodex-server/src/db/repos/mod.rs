//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Handles conflicts via constraints and ON CONFLICT (no check-then-insert)
//! - Uses transactions for multi-step operations
//! - Maps constraint violations to typed errors at the statement that hit them

pub mod contacts;
pub mod persons;

pub use contacts::resolve_contacts;
pub use persons::{Person, PersonRepo, PersonWithContacts};

/// SQLSTATE `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("email already exists: '{email}'")]
    DuplicateEmail { email: String },

    #[error("contact {id} does not refer to an existing person")]
    UnknownContact { id: i64 },
}

impl DbError {
    pub(crate) fn person_not_found(id: i64) -> Self {
        Self::NotFound {
            resource: "person",
            id: id.to_string(),
        }
    }

    /// True when Postgres aborted the transaction to break a deadlock.
    pub(crate) fn is_deadlock(&self) -> bool {
        match self {
            Self::Sqlx(sqlx::Error::Database(db)) => {
                db.code().as_deref() == Some(DEADLOCK_DETECTED)
            }
            _ => false,
        }
    }
}

/// True when `err` is a violation of the named constraint.
pub(crate) fn violates(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}
