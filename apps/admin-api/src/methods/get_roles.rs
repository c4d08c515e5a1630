use crate::error::{handle_service_error, ApiError};
use crate::methods::entities::RoleResponse;
use crate::methods::routes::ROLES_PATH;
use crate::state::AppState;
use axum::Json;

#[utoipa::path(
    get,
    path = ROLES_PATH,
    tag = "roles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All roles, newest first", body = Vec<RoleResponse>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Missing admin:read permission"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_roles(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    state
        .roles_service
        .find_all()
        .await
        .map(|roles| Json(roles.into_iter().map(RoleResponse::from).collect()))
        .map_err(|e| handle_service_error(e, &state.env, "get_roles"))
}
