use axum::Json;
use uuid::Uuid;
use crate::error::{ApiError, handle_service_error};
use crate::methods::entities::RoleResponse;
use crate::state::AppState;
use crate::methods::routes::ROLES_BY_ID_PATH;

#[utoipa::path(
    get,
    path = ROLES_BY_ID_PATH,
    tag = "roles",
    security(("bearer_auth" = [])),
    params(
        ("id" = String, Path, description = "Role ID (UUID)")
    ),
    responses(
        (status = 200, description = "Role found", body = RoleResponse),
        (status = 400, description = "Invalid UUID"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing admin:read permission"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_role_by_id(
    axum::extract::Path(id): axum::extract::Path<String>,
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<RoleResponse>, ApiError> {
    let parsed_id = Uuid::parse_str(&id).map_err(|_| ApiError::invalid_uuid())?;

    state
        .roles_service
        .find_by_id(parsed_id)
        .await
        .map(|role| Json(RoleResponse::from(role)))
        .map_err(|e| handle_service_error(e, &state.env, "get_role_by_id"))
}
