use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Extension, Router,
};
use rbac_lib::seed::{ADMIN_READ, ADMIN_WRITE};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::MiddlewareConfig;
use crate::error::ErrorResponse;
use crate::methods::create_role::__path_create_role;
use crate::methods::create_role::create_role;
use crate::methods::delete_role::__path_delete_role;
use crate::methods::delete_role::delete_role;
use crate::methods::entities::{
    CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleRequest,
};
use crate::methods::get_permissions::__path_get_permissions;
use crate::methods::get_permissions::get_permissions;
use crate::methods::get_role_by_id::__path_get_role_by_id;
use crate::methods::get_role_by_id::get_role_by_id;
use crate::methods::get_roles::__path_get_roles;
use crate::methods::get_roles::get_roles;
use crate::methods::health_check::__path_health_check;
use crate::methods::health_check::health_check;
use crate::methods::update_role::__path_update_role;
use crate::methods::update_role::update_role;
use crate::methods::routes::{
    OPENAPI_JSON_PATH, PERMISSIONS_PATH, ROLES_BY_ID_PATH, ROLES_PATH, SERVICE_DOCS_PATH,
    SERVICE_HEALTH_PATH,
};
use crate::middleware::authorization::{authenticate, require_permission};
use crate::middleware::ip_filter::{ip_filter_middleware, IpFilterConfig};
use crate::state::AppState;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        get_roles, get_role_by_id, create_role, update_role, delete_role,
        get_permissions, health_check
    ),
    components(schemas(
        CreateRoleRequest, UpdateRoleRequest, RoleResponse, PermissionResponse, ErrorResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "roles", description = "Role management endpoints"),
        (name = "permissions", description = "Permission catalog")
    )
)]
pub struct ApiDoc;

/// Admin endpoints, health check and docs. Every `/api/admin` route requires a
/// bearer token; reads need `admin:read` and writes need `admin:write`.
pub fn routes(state: AppState) -> Router {
    let read = || from_fn(require_permission(ADMIN_READ));
    let write = || from_fn(require_permission(ADMIN_WRITE));

    let admin_routes = Router::new()
        .route(
            ROLES_PATH,
            get(get_roles)
                .route_layer(read())
                .merge(post(create_role).route_layer(write())),
        )
        .route(
            ROLES_BY_ID_PATH,
            get(get_role_by_id).route_layer(read()).merge(
                put(update_role)
                    .delete(delete_role)
                    .route_layer(write()),
            ),
        )
        .route(PERMISSIONS_PATH, get(get_permissions).route_layer(read()))
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    let root_routes = Router::new()
        .route(SERVICE_HEALTH_PATH, get(health_check))
        .merge(SwaggerUi::new(SERVICE_DOCS_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi()));

    Router::new()
        .merge(admin_routes)
        .merge(root_routes)
        .with_state(state)
}

// ============================================
// Middleware stack (applied inner to outer)
// Order: Request → Rate Limit → IP Filter → Timeout → CORS → Body Limit → Request ID → Trace → Handler
// ============================================
pub fn with_middleware(mut app: Router, config: &MiddlewareConfig) -> Result<Router, String> {
    // 1. Trace layer (innermost - closest to handler)
    app = app.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(tracing::Level::DEBUG))
            .on_response(DefaultOnResponse::new().level(tracing::Level::DEBUG)),
    );

    // 2. Request ID layers
    let x_request_id = HeaderName::from_static("x-request-id");
    app = app
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid));

    // 3. Body limit layer
    app = app.layer(RequestBodyLimitLayer::new(config.max_body_size));

    // 4. CORS layer
    let cors_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, x_request_id]);
    let cors_layer = if config.allows_any_origin() {
        cors_layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors_layer.allow_origin(origins)
    };
    app = app.layer(cors_layer);

    // 5. Timeout layer (returns 408 Request Timeout)
    app = app.layer(TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        config.request_timeout,
    ));

    // 6. IP filter middleware (only if configured)
    if config.has_ip_filter() {
        let ip_config = IpFilterConfig::new(config.ip_allowlist.clone(), config.ip_blocklist.clone());
        app = app
            .layer(from_fn(ip_filter_middleware))
            .layer(Extension(ip_config));
        tracing::info!("IP filter middleware enabled");
    }

    // 7. Rate limiting layer (outermost)
    // Milliseconds between replenished requests: 60000ms / requests_per_minute
    let replenish_interval_ms = (60_000 / u64::from(config.rate_limit_per_minute)).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms)
            .burst_size(config.rate_limit_burst)
            .finish()
            .ok_or_else(|| "failed to build rate limiter configuration".to_string())?,
    );
    app = app.layer(GovernorLayer {
        config: governor_conf,
    });

    Ok(app)
}
