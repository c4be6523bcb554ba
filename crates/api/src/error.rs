use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidArgument(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Expired => ApiError::Unauthorized("Token expired".into()),
            DomainError::IpMismatch => ApiError::Unauthorized("Session not valid from this address".into()),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_api_error_statuses() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ServiceUnavailable("x".into()).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_from_domain_error() {
        assert_eq!(
            status_of(DomainError::InvalidArgument("bad status".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(DomainError::NotFound("token".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::Unauthorized("no player".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(DomainError::Expired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::IpMismatch), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(DomainError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::Internal("db down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
        assert_eq!(
            format!("{}", ApiError::Internal("test".to_string())),
            "Internal error: test"
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let response = ApiError::Internal("password=hunter2".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "An internal error occurred");
    }
}
