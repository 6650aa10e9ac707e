//! Shared fixtures for database-backed tests
//!
//! Each `TestDb` gets its own schema so tests can run in parallel against
//! one database and still see exact row counts.

#![allow(dead_code)]

use rolodex_server::db::migrations;
use rolodex_server::models::{ContactIds, Email, NewPerson, PersonName};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

pub struct TestDb {
    pub pool: PgPool,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    pub async fn new() -> Self {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let admin = PgPool::connect(&url).await.expect("admin connection failed");

        let schema = format!("rolodex_test_{}", Uuid::new_v4().simple());
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .expect("create schema failed");

        let search_path = format!("SET search_path TO {}", schema);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .after_connect(move |conn, _meta| {
                let search_path = search_path.clone();
                Box::pin(async move {
                    conn.execute(search_path.as_str()).await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await
            .expect("pool creation failed");

        migrations::run(&pool).await.expect("migrations failed");

        Self {
            pool,
            admin,
            schema,
        }
    }

    pub async fn teardown(self) {
        self.pool.close().await;
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.admin)
            .await
            .expect("drop schema failed");
        self.admin.close().await;
    }

    pub async fn count(&self, sql: &str) -> i64 {
        sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .expect("count query failed")
    }
}

pub fn new_person(name: &str, email: &str, contacts: Vec<i64>) -> NewPerson {
    NewPerson {
        name: PersonName::new("name", name).unwrap(),
        surname: PersonName::new("surname", "Tester").unwrap(),
        age: None,
        gender: None,
        birthday: None,
        phone: None,
        email: Email::new(email).unwrap(),
        contacts: ContactIds::new(contacts).unwrap(),
    }
}
