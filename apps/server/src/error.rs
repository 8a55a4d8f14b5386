//! HTTP error types.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use user_registry::RegistryError;

use crate::dto::ErrorResponse;

/// Error codes returned in the `error` field of failed responses
pub mod error_codes {
    pub const EMAIL_ALREADY_REGISTERED: &str = "session.errors.emailAlreadyRegistered";
    pub const LOGIN_FAILED: &str = "session.errors";
    pub const UNAUTHORIZED: &str = "session.errors.unauthorized";
    pub const REGISTRY_UNAVAILABLE: &str = "registry.errors.unavailable";
    pub const REGISTRY_INTERNAL: &str = "registry.errors.internal";
    pub const INVALID_BODY: &str = "request.errors.invalidBody";
}

/// Basic auth realm announced on 401 responses
pub const BASIC_REALM: &str = "Authenticated";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is not the expected JSON document.
    #[error("Invalid request body: {0}")]
    BadRequest(#[from] JsonRejection),

    /// Registration rejected because the email is taken.
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    /// Login rejected. Unknown email and wrong password look the same.
    #[error("Login failed")]
    LoginFailed,

    /// Missing or invalid Basic credentials.
    #[error("Authentication required")]
    Unauthorized,

    /// The registry did not answer in time or is refusing work.
    #[error("Registry unavailable: {0}")]
    Unavailable(RegistryError),

    /// The registry broke its reply contract.
    #[error("Internal error: {0}")]
    Internal(RegistryError),
}

impl From<RegistryError> for ApiError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::DuplicateEmail { .. } => ApiError::EmailAlreadyRegistered,
            RegistryError::AuthenticationFailed => ApiError::LoginFailed,
            RegistryError::RequestTimedOut { .. } | RegistryError::Unavailable => {
                ApiError::Unavailable(error)
            }
            RegistryError::ProcessorStopped | RegistryError::ReplyDropped => {
                ApiError::Internal(error)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                (StatusCode::BAD_REQUEST, error_codes::INVALID_BODY)
            }
            ApiError::EmailAlreadyRegistered => (
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::EMAIL_ALREADY_REGISTERED,
            ),
            ApiError::LoginFailed => (StatusCode::UNPROCESSABLE_ENTITY, error_codes::LOGIN_FAILED),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::UNAUTHORIZED),
            ApiError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::REGISTRY_UNAVAILABLE,
            ),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "Registry failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::REGISTRY_INTERNAL,
                )
            }
        };

        let mut response = (status, Json(ErrorResponse { error: code })).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Basic realm="Authenticated""#),
            );
        }

        response
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_registry_errors_map_to_statuses() {
        let cases = [
            (
                RegistryError::duplicate_email("a@x.com"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RegistryError::AuthenticationFailed,
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                RegistryError::RequestTimedOut {
                    timeout: Duration::from_secs(1),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RegistryError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                RegistryError::ProcessorStopped,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RegistryError::ReplyDropped,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(ApiError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_unauthorized_announces_basic_realm() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            format!("Basic realm=\"{}\"", BASIC_REALM)
        );
    }
}
