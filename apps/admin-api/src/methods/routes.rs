// Admin API routes, every one behind a bearer token
pub const ROLES_PATH: &str = "/api/admin/roles";
pub const ROLES_BY_ID_PATH: &str = "/api/admin/roles/{id}";
pub const PERMISSIONS_PATH: &str = "/api/admin/permissions";

// Root-level service routes (not versioned)
pub const SERVICE_HEALTH_PATH: &str = "/health";
pub const SERVICE_DOCS_PATH: &str = "/docs";
pub const OPENAPI_JSON_PATH: &str = "/api-doc/openapi.json";
