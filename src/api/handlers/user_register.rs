use super::{ApiError, ErrorResponse, valid_email};
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
pub struct UserRegister {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub user_id: i64,
}

fn validate(input: &UserRegister) -> Result<(), ApiError> {
    if input.email.is_empty() {
        return Err(ApiError::bad_request("email is required"));
    }
    if input.password.is_empty() {
        return Err(ApiError::bad_request("password is required"));
    }
    if !valid_email(&input.email) {
        return Err(ApiError::bad_request("invalid email"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = UserRegister,
    responses (
        (status = 201, description = "Registration successful", body = RegisterResponse, content_type = "application/json"),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 409, description = "User with the specified email already exists", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn register(
    auth: Extension<Arc<dyn Auth>>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        debug!("rejected register payload: {rejection}");
        ApiError::invalid_json()
    })?;

    validate(&input)?;

    let user_id = auth
        .register_new_user(&input.email, &input.password)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}
