use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::PermissionResponse;
use crate::methods::routes::PERMISSIONS_PATH;
use crate::state::AppState;
use axum::Json;

#[utoipa::path(
    get,
    path = PERMISSIONS_PATH,
    tag = "permissions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Permission catalog sorted by name", body = Vec<PermissionResponse>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing admin:read permission"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_permissions(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<Vec<PermissionResponse>>, ApiError> {
    state
        .roles_service
        .get_permissions()
        .await
        .map(|permissions| Json(permissions.into_iter().map(PermissionResponse::from).collect()))
        .map_err(|e| handle_service_error(e, &state.env, "get_permissions"))
}
