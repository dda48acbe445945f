use super::{ApiError, ErrorResponse};
use crate::auth::Auth;
use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsAdminRequest {
    #[serde(default)]
    user_id: i64,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IsAdminResponse {
    pub is_admin: bool,
}

#[utoipa::path(
    post,
    path= "/is_admin",
    request_body = IsAdminRequest,
    responses (
        (status = 200, description = "Admin flag of the user", body = IsAdminResponse, content_type = "application/json"),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn is_admin(
    auth: Extension<Arc<dyn Auth>>,
    payload: Result<Json<IsAdminRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        debug!("rejected is_admin payload: {rejection}");
        ApiError::invalid_json()
    })?;

    if input.user_id <= 0 {
        return Err(ApiError::bad_request("user_id is required"));
    }

    let is_admin = auth.is_admin(input.user_id).await?;

    Ok(Json(IsAdminResponse { is_admin }))
}
