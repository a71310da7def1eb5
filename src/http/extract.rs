//! Extractors whose rejections use the API error format.

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::error::ApiError;

/// `axum::Json` with malformed bodies reported as `ValidationError`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Record id from the path. Ids that are not UUIDs cannot exist, so they
/// are reported as not found with the given message.
pub struct RecordId(pub Option<Uuid>);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(raw) = axum::extract::Path::<String>::from_request_parts(parts, state).await?;
        Ok(RecordId(Uuid::parse_str(&raw).ok()))
    }
}

impl RecordId {
    pub fn or_not_found(self, what: &'static str) -> Result<Uuid, ApiError> {
        self.0.ok_or(ApiError::NotFound(what))
    }
}
