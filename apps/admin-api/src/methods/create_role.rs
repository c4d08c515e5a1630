use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use validator::Validate;
use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::{CreateRoleRequest, RoleResponse};
use crate::state::AppState;
use crate::methods::routes::ROLES_PATH;

#[utoipa::path(
    post,
    path = ROLES_PATH,
    tag = "roles",
    security(("bearer_auth" = [])),
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created successfully", body = RoleResponse),
        (status = 400, description = "Validation error or unknown permission ids"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing admin:write permission"),
        (status = 409, description = "Role name already exists"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn create_role(
    axum::extract::State(state): axum::extract::State<AppState>,
    payload: Result<Json<CreateRoleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RoleResponse>), ApiError> {
    let Json(payload) = payload?;
    payload.validate()?;

    state
        .roles_service
        .create(payload.into())
        .await
        .map(|role| (StatusCode::CREATED, Json(RoleResponse::from(role))))
        .map_err(|e| handle_service_error(e, &state.env, "create_role"))
}
