use super::{ApiError, ErrorResponse};
use crate::auth::Auth;
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserLogin {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    app_id: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

fn validate(input: &UserLogin) -> Result<(), ApiError> {
    if input.email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if input.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    if input.app_id == 0 {
        return Err(ApiError::bad_request("app_id is required"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserLogin,
    responses (
        (status = 202, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Malformed request or unknown app", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<dyn Auth>>,
    payload: Result<Json<UserLogin>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        debug!("rejected login payload: {rejection}");
        ApiError::invalid_json()
    })?;

    validate(&input)?;

    let token = auth
        .login(&input.email, &input.password, input.app_id)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(LoginResponse { token })))
}
