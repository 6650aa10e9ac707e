//! Contact links between persons
//!
//! The resolver is generic over the executor: point reads run on the pool,
//! while writers call it on their open transaction so the response reflects
//! the links they just wrote.

use sqlx::{PgConnection, PgExecutor};

use super::persons::Person;
use super::{violates, DbError};
use crate::models::ContactIds;

const CONTACT_FK: &str = "person_contacts_contact_id_fkey";

/// Resolve the contacts of `person_id`, ordered by email.
///
/// Returns an empty list when the person has no links (or does not exist).
pub async fn resolve_contacts<'e, E>(executor: E, person_id: i64) -> Result<Vec<Person>, DbError>
where
    E: PgExecutor<'e>,
{
    let contacts = sqlx::query_as::<_, Person>(
        r#"
        SELECT c.id, c.name, c.surname, c.age, c.gender, c.birthday,
               c.phone, c.email, c.created, c.modified
        FROM persons c
        JOIN person_contacts pc ON pc.contact_id = c.id
        WHERE pc.person_id = $1
        ORDER BY c.email
        "#,
    )
    .bind(person_id)
    .fetch_all(executor)
    .await?;

    Ok(contacts)
}

/// Insert links from `person_id` to every id in `contacts`.
///
/// Repeated ids are absorbed by the primary key. An id with no matching
/// person fails with `UnknownContact`, which aborts the caller's
/// transaction.
pub(crate) async fn insert_contacts(
    conn: &mut PgConnection,
    person_id: i64,
    contacts: &ContactIds,
) -> Result<(), DbError> {
    for &contact_id in contacts.as_slice() {
        sqlx::query(
            r#"
            INSERT INTO person_contacts (person_id, contact_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(person_id)
        .bind(contact_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if violates(&e, CONTACT_FK) {
                DbError::UnknownContact { id: contact_id }
            } else {
                DbError::Sqlx(e)
            }
        })?;
    }

    Ok(())
}

/// Replace the whole outgoing contact-set of `person_id`.
pub(crate) async fn replace_contacts(
    conn: &mut PgConnection,
    person_id: i64,
    contacts: &ContactIds,
) -> Result<(), DbError> {
    let removed = sqlx::query("DELETE FROM person_contacts WHERE person_id = $1")
        .bind(person_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    tracing::debug!(person_id, removed, added = contacts.as_slice().len(), "replacing contacts");

    insert_contacts(conn, person_id, contacts).await
}
