//! Person endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::repos::{Person, PersonRepo, PersonWithContacts};
use crate::http::error::ApiError;
use crate::http::extractors::{PersonId, ValidJson};
use crate::http::server::AppState;
use crate::models::person::{parse_birthday, validate_age, validate_phone};
use crate::models::{
    ContactIds, Email, Gender, NewPerson, Paginated, Pagination, PaginationParams, PersonName,
    PersonPatch, ValidationError,
};

/// Create/update request body. Every field is optional at the wire level;
/// `NewPerson` and `PersonPatch` decide which ones are required.
#[derive(Debug, Default, Deserialize)]
pub struct PersonRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub birthday: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub contacts: Option<Vec<i64>>,
}

impl TryFrom<PersonRequest> for NewPerson {
    type Error = ValidationError;

    fn try_from(req: PersonRequest) -> Result<Self, Self::Error> {
        let name = req.name.ok_or(ValidationError::Missing { field: "name" })?;
        let surname = req.surname.ok_or(ValidationError::Missing { field: "surname" })?;
        let email = req.email.ok_or(ValidationError::Missing { field: "email" })?;

        Ok(Self {
            name: PersonName::new("name", &name)?,
            surname: PersonName::new("surname", &surname)?,
            age: req.age.map(validate_age).transpose()?,
            gender: req.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            birthday: req.birthday.as_deref().map(parse_birthday).transpose()?,
            phone: req.phone.map(validate_phone).transpose()?,
            email: Email::new(&email)?,
            contacts: ContactIds::new(req.contacts.unwrap_or_default())?,
        })
    }
}

impl TryFrom<PersonRequest> for PersonPatch {
    type Error = ValidationError;

    fn try_from(req: PersonRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name.as_deref().map(|s| PersonName::new("name", s)).transpose()?,
            surname: req
                .surname
                .as_deref()
                .map(|s| PersonName::new("surname", s))
                .transpose()?,
            age: req.age.map(validate_age).transpose()?,
            gender: req.gender.as_deref().map(str::parse::<Gender>).transpose()?,
            birthday: req.birthday.as_deref().map(parse_birthday).transpose()?,
            phone: req.phone.map(validate_phone).transpose()?,
            email: req.email.as_deref().map(Email::new).transpose()?,
            contacts: req.contacts.map(ContactIds::new).transpose()?,
        })
    }
}

/// Person response
#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub email: String,
    pub created: String,
    pub modified: String,
}

impl From<Person> for PersonResponse {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            name: p.name,
            surname: p.surname,
            age: p.age,
            gender: p.gender,
            birthday: p.birthday,
            phone: p.phone,
            email: p.email,
            created: p.created.to_rfc3339(),
            modified: p.modified.to_rfc3339(),
        }
    }
}

/// Person response with resolved contacts
#[derive(Debug, Serialize)]
pub struct PersonDetailResponse {
    #[serde(flatten)]
    pub person: PersonResponse,
    pub contacts: Vec<PersonResponse>,
}

impl From<PersonWithContacts> for PersonDetailResponse {
    fn from(p: PersonWithContacts) -> Self {
        Self {
            person: PersonResponse::from(p.person),
            contacts: p.contacts.into_iter().map(PersonResponse::from).collect(),
        }
    }
}

/// Delete acknowledgement
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

/// GET /persons - list persons ordered by email
async fn list_persons(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<PersonResponse>>, ApiError> {
    let page = Pagination::from(params);
    let result = PersonRepo::new(&state.pool).list(page).await?;

    Ok(Json(result.map(PersonResponse::from)))
}

/// POST /persons - create a person with its contacts
async fn create_person(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<PersonRequest>,
) -> Result<(StatusCode, Json<PersonDetailResponse>), ApiError> {
    let new = NewPerson::try_from(req)?;
    let person = PersonRepo::new(&state.pool).create(new).await?;

    Ok((StatusCode::CREATED, Json(PersonDetailResponse::from(person))))
}

/// GET /persons/{id} - get a single person with contacts
async fn get_person(
    State(state): State<Arc<AppState>>,
    PersonId(id): PersonId,
) -> Result<Json<PersonDetailResponse>, ApiError> {
    let person = PersonRepo::new(&state.pool).get(id).await?;
    Ok(Json(PersonDetailResponse::from(person)))
}

/// PUT /persons/{id} - partial update, optional contact-set replacement
async fn update_person(
    State(state): State<Arc<AppState>>,
    PersonId(id): PersonId,
    ValidJson(req): ValidJson<PersonRequest>,
) -> Result<Json<PersonDetailResponse>, ApiError> {
    let patch = PersonPatch::try_from(req)?;
    let person = PersonRepo::new(&state.pool).update(id, patch).await?;

    Ok(Json(PersonDetailResponse::from(person)))
}

/// DELETE /persons/{id}
async fn delete_person(
    State(state): State<Arc<AppState>>,
    PersonId(id): PersonId,
) -> Result<Json<DeletedResponse>, ApiError> {
    PersonRepo::new(&state.pool).delete(id).await?;
    Ok(Json(DeletedResponse { message: "Deleted" }))
}

/// Person routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/persons", get(list_persons).post(create_person))
        .route(
            "/persons/{id}",
            get(get_person).put(update_person).delete(delete_person),
        )
}
