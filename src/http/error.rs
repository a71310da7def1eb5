//! API error taxonomy and its HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::bookings::BookingError;
use crate::issues::IssueError;
use crate::policy::PolicyError;
use crate::rules::Rejection;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidConfig(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Request body is too large")]
    PayloadTooLarge,

    #[error("{}", .0.message())]
    PolicyViolation(Rejection),

    #[error("Room is already booked for that time")]
    SlotUnavailable,

    #[error("Config was modified concurrently (expected version {expected}, current {current})")]
    VersionConflict { expected: u64, current: u64 },

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::PolicyViolation(_)
            | ApiError::SlotUnavailable
            | ApiError::VersionConflict { .. }
            | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::InvalidConfig(_) => "InvalidConfig",
            ApiError::NotFound(_) => "NotFound",
            ApiError::PayloadTooLarge => "PayloadTooLarge",
            ApiError::PolicyViolation(rejection) => rejection.as_str(),
            ApiError::SlotUnavailable => "SlotUnavailable",
            ApiError::VersionConflict { .. } => "VersionConflict",
            ApiError::Conflict(_) => "Conflict",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal error");
        }

        let body = json!({
            "msg": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::InvalidConfig(_) => ApiError::InvalidConfig(err.to_string()),
            PolicyError::VersionConflict { expected, current } => ApiError::VersionConflict { expected, current },
            PolicyError::Storage(_) | PolicyError::Malformed(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingField { .. } | BookingError::NotStarted => ApiError::Validation(err.to_string()),
            BookingError::Rejected(rejection) => ApiError::PolicyViolation(rejection),
            BookingError::SlotUnavailable => ApiError::SlotUnavailable,
            BookingError::NotFound => ApiError::NotFound("Booking not found"),
            BookingError::NotActive => ApiError::Conflict("Booking is no longer active".to_string()),
        }
    }
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::NotFound => ApiError::NotFound("Issue not found"),
            IssueError::MissingField(_) | IssueError::InvalidType | IssueError::InvalidStatus => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(IssueError::InvalidStatus).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(IssueError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(BookingError::Rejected(Rejection::TooSoon)).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::from(BookingError::SlotUnavailable).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(PolicyError::VersionConflict { expected: 1, current: 2 }).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_policy_violation_kind_is_rule_name() {
        let err = ApiError::from(BookingError::Rejected(Rejection::WeeklyLimitExceeded));
        assert_eq!(err.kind(), "WeeklyLimitExceeded");
        assert_eq!(err.to_string(), "Weekly booking limit reached");
    }

    #[test]
    fn test_internal_details_are_masked() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/etc/secret denied");
        let err = ApiError::from(PolicyError::Storage(io));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn test_internal_response_body_is_masked() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "/var/lib/labbooker missing");
        let response = ApiError::from(PolicyError::Storage(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["msg"], "Internal server error");
        assert_eq!(body["kind"], "InternalError");
        assert!(!String::from_utf8_lossy(&bytes).contains("/var/lib"));
    }
}
