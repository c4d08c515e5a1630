use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;
use validator::Validate;
use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{UpdateRoleRequest, RoleResponse};
use crate::state::AppState;
use crate::methods::routes::ROLES_BY_ID_PATH;

#[utoipa::path(
    put,
    path = ROLES_BY_ID_PATH,
    tag = "roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Role ID (UUID)")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated successfully", body = RoleResponse),
        (status = 400, description = "Invalid UUID, validation error or unknown permission ids"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing admin:write permission"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn update_role(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::State(state): axum::extract::State<AppState>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<RoleResponse>, ApiError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;
    let Json(payload) = payload?;
    payload.validate()?;

    state
        .roles_service
        .update(parsed_id, payload.into())
        .await
        .map(|role| Json(RoleResponse::from(role)))
        .map_err(|e| handle_service_error(e, &state.env, "update_role"))
}
