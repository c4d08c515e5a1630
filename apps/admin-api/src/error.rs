use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rbac_lib::errors_service::RbacServiceError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn invalid_uuid() -> Self {
        ApiError::BadRequest("invalid uuid".to_string())
    }

    pub fn role_not_found() -> Self {
        ApiError::NotFound("role not found".to_string())
    }

    pub fn missing_token() -> Self {
        ApiError::Unauthorized("missing bearer token".to_string())
    }

    pub fn invalid_token() -> Self {
        ApiError::Unauthorized("invalid bearer token".to_string())
    }

    pub fn missing_permission(permission: &str) -> Self {
        ApiError::Forbidden(format!("missing permission: {permission}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", Some(msg)),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", Some(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", Some(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", Some(msg)),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", Some(msg)),
        };

        let body = ErrorResponse {
            error: error.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RbacServiceError> for ApiError {
    fn from(err: RbacServiceError) -> Self {
        match err {
            RbacServiceError::Validation(msg) => ApiError::BadRequest(msg),
            RbacServiceError::NotFound => ApiError::role_not_found(),
            RbacServiceError::RoleNameAlreadyExists
            | RbacServiceError::PermissionNameAlreadyExists
            | RbacServiceError::EmailAlreadyExists
            | RbacServiceError::UserAlreadyHasRole => ApiError::Conflict(err.to_string()),
            RbacServiceError::InvalidPermissionIds(_) | RbacServiceError::RoleInUse(_) => {
                ApiError::BadRequest(err.to_string())
            }
            // Stored ids are produced by the service itself, so this is corrupt data.
            RbacServiceError::InvalidUuid(msg) => ApiError::Internal(format!("invalid stored uuid: {}", msg)),
            RbacServiceError::Internal(err) => ApiError::Internal(err.to_string()),
            _ => ApiError::Internal("unexpected error".to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

/// Check if environment is production-like (prod, prod01, prod02, etc.)
pub fn is_prod_like(env: &str) -> bool {
    env.to_lowercase().starts_with("prod")
}

/// Converts a service error to an ApiError, logging internal errors.
/// In production, internal error details are hidden.
pub fn handle_service_error(err: RbacServiceError, env: &str, operation: &str) -> ApiError {
    match &err {
        RbacServiceError::Internal(_) | RbacServiceError::InvalidUuid(_) => {
            tracing::error!(env = %env, error = ?err, operation = %operation, "service error");
            if is_prod_like(env) {
                ApiError::Internal("internal server error".to_string())
            } else {
                ApiError::from(err)
            }
        }
        _ => ApiError::from(err),
    }
}
