use axum::{extract::State, http::StatusCode};
use rbac_lib::util::ping;

use crate::methods::routes::SERVICE_HEALTH_PATH;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = SERVICE_HEALTH_PATH,
    responses(
        (status = 200, description = "Service and database are reachable", body = String),
        (status = 503, description = "Database unreachable", body = String),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match ping(&state.pool).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
