//! Person repository
//!
//! Handles person CRUD with:
//! - Atomic create/update of the person row and its contact-set (transaction)
//! - Read-your-writes: contacts resolved on the writing transaction
//! - Paginated listing ordered by email

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, QueryBuilder, Row};

use super::contacts::{insert_contacts, replace_contacts, resolve_contacts};
use super::{violates, DbError};
use crate::models::{Gender, NewPerson, Paginated, Pagination, PersonPatch};

const EMAIL_UNIQUE: &str = "persons_email_key";

/// Attempts of one update before a deadlock is reported to the caller
const UPDATE_ATTEMPTS: u32 = 3;

/// Person record from database
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Person {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let gender = row
            .try_get::<Option<String>, _>("gender")?
            .map(|g| g.parse::<Gender>())
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            surname: row.try_get("surname")?,
            age: row.try_get("age")?,
            gender,
            birthday: row.try_get("birthday")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            created: row.try_get("created")?,
            modified: row.try_get("modified")?,
        })
    }
}

/// Person together with its resolved contacts
#[derive(Debug, Clone)]
pub struct PersonWithContacts {
    pub person: Person,
    pub contacts: Vec<Person>,
}

/// Map a write error, turning the email unique violation into `DuplicateEmail`.
fn email_conflict(err: sqlx::Error, email: Option<&str>) -> DbError {
    match email {
        Some(email) if violates(&err, EMAIL_UNIQUE) => DbError::DuplicateEmail {
            email: email.to_owned(),
        },
        _ => DbError::Sqlx(err),
    }
}

async fn fetch_person<'e, E>(executor: E, id: i64) -> Result<Option<Person>, DbError>
where
    E: PgExecutor<'e>,
{
    let person = sqlx::query_as::<_, Person>(
        r#"
        SELECT id, name, surname, age, gender, birthday, phone, email, created, modified
        FROM persons
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(person)
}

/// Person repository
pub struct PersonRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PersonRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a person and its contact links (atomic).
    ///
    /// The transaction is rolled back when it is dropped before `commit`, so
    /// any failing step leaves neither the person nor any of its links.
    pub async fn create(&self, new: NewPerson) -> Result<PersonWithContacts, DbError> {
        let mut tx = self.pool.begin().await?;

        let person: Person = sqlx::query_as(
            r#"
            INSERT INTO persons (name, surname, age, gender, birthday, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, surname, age, gender, birthday, phone, email, created, modified
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.surname.as_str())
        .bind(new.age)
        .bind(new.gender.map(|g| g.as_str()))
        .bind(new.birthday)
        .bind(new.phone.as_deref())
        .bind(new.email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| email_conflict(e, Some(new.email.as_str())))?;

        insert_contacts(&mut *tx, person.id, &new.contacts).await?;
        let contacts = resolve_contacts(&mut *tx, person.id).await?;

        tx.commit().await?;

        tracing::info!(person_id = person.id, contacts = contacts.len(), "person created");
        Ok(PersonWithContacts { person, contacts })
    }

    /// Apply a partial update and, when given, replace the contact-set (atomic).
    ///
    /// The target row is locked for the rest of the transaction, either by
    /// the `UPDATE` itself or by `SELECT ... FOR NO KEY UPDATE` when only
    /// contacts change, so concurrent replacements of the same contact-set
    /// serialise. That lock does not block the `FOR KEY SHARE` taken by other
    /// transactions linking to this person.
    ///
    /// Changing `email` upgrades the row lock to `FOR UPDATE` (unique column),
    /// which can still deadlock against a transaction linking to this person
    /// while holding a link from us. Postgres aborts one side; that side is
    /// retried from scratch up to `UPDATE_ATTEMPTS` times.
    pub async fn update(&self, id: i64, patch: PersonPatch) -> Result<PersonWithContacts, DbError> {
        let mut attempt = 1;
        loop {
            match self.try_update(id, &patch).await {
                Err(err) if err.is_deadlock() && attempt < UPDATE_ATTEMPTS => {
                    tracing::warn!(person_id = id, attempt, "update deadlocked, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_update(&self, id: i64, patch: &PersonPatch) -> Result<PersonWithContacts, DbError> {
        let mut tx = self.pool.begin().await?;

        if patch.has_scalar_changes() {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE persons SET ");
            let mut sets = qb.separated(", ");

            if let Some(name) = &patch.name {
                sets.push("name = ").push_bind_unseparated(name.as_str());
            }
            if let Some(surname) = &patch.surname {
                sets.push("surname = ").push_bind_unseparated(surname.as_str());
            }
            if let Some(age) = patch.age {
                sets.push("age = ").push_bind_unseparated(age);
            }
            if let Some(gender) = patch.gender {
                sets.push("gender = ").push_bind_unseparated(gender.as_str());
            }
            if let Some(birthday) = patch.birthday {
                sets.push("birthday = ").push_bind_unseparated(birthday);
            }
            if let Some(phone) = &patch.phone {
                sets.push("phone = ").push_bind_unseparated(phone.as_str());
            }
            if let Some(email) = &patch.email {
                sets.push("email = ").push_bind_unseparated(email.as_str());
            }
            sets.push("modified = NOW()");

            qb.push(" WHERE id = ").push_bind(id);

            let email = patch.email.as_ref().map(|email| email.as_str());
            let result = qb
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|err| email_conflict(err, email))?;

            if result.rows_affected() == 0 {
                return Err(DbError::person_not_found(id));
            }
        } else {
            let locked: Option<i64> =
                sqlx::query_scalar("SELECT id FROM persons WHERE id = $1 FOR NO KEY UPDATE")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?;

            if locked.is_none() {
                return Err(DbError::person_not_found(id));
            }
        }

        if let Some(contacts) = &patch.contacts {
            replace_contacts(&mut *tx, id, contacts).await?;
        }

        let person = fetch_person(&mut *tx, id)
            .await?
            .ok_or_else(|| DbError::person_not_found(id))?;
        let contacts = resolve_contacts(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!(person_id = id, contacts = contacts.len(), "person updated");
        Ok(PersonWithContacts { person, contacts })
    }

    /// Get a single person by ID with resolved contacts.
    pub async fn get(&self, id: i64) -> Result<PersonWithContacts, DbError> {
        let person = fetch_person(self.pool, id)
            .await?
            .ok_or_else(|| DbError::person_not_found(id))?;
        let contacts = resolve_contacts(self.pool, id).await?;

        Ok(PersonWithContacts { person, contacts })
    }

    /// Delete a person. Links in both directions go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::person_not_found(id));
        }

        tracing::info!(person_id = id, "person deleted");
        Ok(())
    }

    /// List persons ordered by email. Contacts are not resolved per row.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<Person>, DbError> {
        let data = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, name, surname, age, gender, birthday, phone, email, created, modified
            FROM persons
            ORDER BY email
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        // Counted separately so pages past the end still report the total
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM persons")
            .fetch_one(self.pool)
            .await?;

        Ok(Paginated {
            page: page.page,
            limit: page.limit,
            total,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrelated_errors_stay_generic() {
        let err = email_conflict(sqlx::Error::RowNotFound, Some("ada@example.com"));
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));

        let err = email_conflict(sqlx::Error::PoolTimedOut, None);
        assert!(matches!(err, DbError::Sqlx(sqlx::Error::PoolTimedOut)));
    }

    #[test]
    fn only_database_deadlocks_are_retried() {
        assert!(!DbError::person_not_found(1).is_deadlock());
        assert!(!DbError::UnknownContact { id: 2 }.is_deadlock());
        assert!(!DbError::Sqlx(sqlx::Error::PoolTimedOut).is_deadlock());
    }
}
