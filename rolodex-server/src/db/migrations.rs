//! Schema migrations for persons and their contact links
//!
//! Every statement is idempotent, so this runs on each startup.

use sqlx::PgPool;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running schema migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS persons (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(100) NOT NULL CHECK (name <> ''),
            surname VARCHAR(100) NOT NULL CHECK (surname <> ''),
            age INTEGER CHECK (age >= 0),
            gender TEXT CHECK (gender IN ('male', 'female')),
            birthday DATE,
            phone VARCHAR(32),
            email VARCHAR(255) NOT NULL,
            created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            modified TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT persons_email_key UNIQUE (email)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Both sides cascade: deleting a person drops its own contact list and
    // removes it from everyone else's.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS person_contacts (
            person_id BIGINT NOT NULL,
            contact_id BIGINT NOT NULL,
            PRIMARY KEY (person_id, contact_id),
            CONSTRAINT person_contacts_person_id_fkey
                FOREIGN KEY (person_id) REFERENCES persons(id) ON DELETE CASCADE,
            CONSTRAINT person_contacts_contact_id_fkey
                FOREIGN KEY (contact_id) REFERENCES persons(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS person_contacts_contact_id_idx ON person_contacts (contact_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Schema migrations complete");
    Ok(())
}
