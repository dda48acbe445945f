//! Mapping from service errors to HTTP responses.

use crate::auth;
use axum::{
    BoxError, Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Error body returned by every endpoint.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    #[must_use]
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    #[must_use]
    pub const fn bad_request(message: &'static str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    #[must_use]
    pub const fn invalid_json() -> Self {
        Self::bad_request("invalid json")
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

impl From<auth::Error> for ApiError {
    fn from(err: auth::Error) -> Self {
        match err {
            auth::Error::InvalidCredentials => {
                Self::new(StatusCode::UNAUTHORIZED, "invalid email or password")
            }
            auth::Error::UserExists => Self::new(StatusCode::CONFLICT, "user already exists"),
            auth::Error::AppNotFound => Self::bad_request("invalid app_id"),
            auth::Error::UserNotFound => Self::new(StatusCode::NOT_FOUND, "user not found"),
            auth::Error::TokenInvalid => Self::new(StatusCode::UNAUTHORIZED, "invalid token"),
            auth::Error::TokenExpired => Self::new(StatusCode::UNAUTHORIZED, "token expired"),
            auth::Error::Internal(e) => {
                error!("internal error: {e:#}");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

/// Turns middleware failures (the request timeout) into the JSON error body.
pub async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::new(StatusCode::REQUEST_TIMEOUT, "request timeout")
    } else {
        error!("unhandled middleware error: {err}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn maps_service_errors_to_status_codes() {
        let cases = [
            (auth::Error::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (auth::Error::UserExists, StatusCode::CONFLICT),
            (auth::Error::AppNotFound, StatusCode::BAD_REQUEST),
            (auth::Error::UserNotFound, StatusCode::NOT_FOUND),
            (auth::Error::TokenInvalid, StatusCode::UNAUTHORIZED),
            (auth::Error::TokenExpired, StatusCode::UNAUTHORIZED),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = auth::Error::internal("failed to save user", anyhow!("duplicate key in pg_class"));
        let api = ApiError::from(err);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message(), "internal error");
    }

    #[tokio::test]
    async fn layer_errors_become_json_errors() {
        let elapsed = handle_layer_error(tower::timeout::error::Elapsed::new().into()).await;
        assert_eq!(elapsed.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(elapsed.message(), "request timeout");

        let other = handle_layer_error("connection reset".into()).await;
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.message(), "internal error");
    }
}
