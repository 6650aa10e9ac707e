//! Custom Axum extractors
//!
//! Both reject with `ApiError::Validation`, so malformed input is answered
//! with 400 before a handler runs.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::models::ValidationError;

/// Extract and validate a person id from path
pub struct PersonId(pub i64);

impl<S> FromRequestParts<S> for PersonId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be a positive integer",
            })
        };

        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;

        match id.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(invalid()),
        }
    }
}

/// JSON body whose decode failures map to 400 instead of axum's 422
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Body {
                reason: rejection.body_text(),
            })
        })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn unmatched_path_is_invalid_format() {
        // No route matched, so there are no path params to extract.
        let (mut parts, _) = Request::builder()
            .uri("/persons/7")
            .body(())
            .unwrap()
            .into_parts();

        let err = match PersonId::from_request_parts(&mut parts, &()).await {
            Ok(_) => panic!("expected rejection"),
            Err(err) => err,
        };
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidFormat { field: "id", .. })
        ));
    }
}
