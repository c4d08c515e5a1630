use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use rbac_lib::authorization::Principal;

use crate::error::{handle_service_error, ApiError};
use crate::state::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Resolves the bearer token to a [`Principal`] and stores it in the request extensions.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or_else(ApiError::missing_token)?;

    let Some(user_id) = state.tokens.user_for(token) else {
        tracing::warn!(path = %request.uri().path(), "unknown bearer token");
        return Err(ApiError::invalid_token());
    };

    let principal = state
        .authz_service
        .resolve_principal(user_id)
        .await
        .map_err(|e| handle_service_error(e, &state.env, "authenticate"))?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "token refers to an unknown or inactive user");
            ApiError::invalid_token()
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

type GuardFuture = Pin<Box<dyn Future<Output = Result<Response, ApiError>> + Send>>;

/// Route guard that lets the request through only when the authenticated
/// principal holds `permission`.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> GuardFuture + Clone + Send + Sync + 'static {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let principal = request
                .extensions()
                .get::<Principal>()
                .ok_or_else(ApiError::missing_token)?;

            if !principal.has_permission(permission) {
                tracing::warn!(
                    user_id = %principal.user_id,
                    required_permission = permission,
                    path = %request.uri().path(),
                    "permission denied"
                );
                return Err(ApiError::missing_permission(permission));
            }

            Ok(next.run(request).await)
        })
    }
}
