pub const SERVICE: &str = "admin-api";
pub const ENV: &str = "ENV";

pub const LOCAL_ENV: &str = "local";

pub const DATABASE_URL: &str = "DATABASE_URL";

pub const ADMIN_API_PORT: &str = "ADMIN_API_PORT";
pub const DEFAULT_ADMIN_API_PORT: u16 = 3333;

// Bearer tokens, "token:user-uuid" pairs separated by commas
pub const API_TOKENS: &str = "API_TOKENS";

// Middleware configuration
pub const RATE_LIMIT_PER_MINUTE: &str = "RATE_LIMIT_PER_MINUTE";
pub const RATE_LIMIT_BURST: &str = "RATE_LIMIT_BURST";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
pub const MAX_BODY_SIZE_BYTES: &str = "MAX_BODY_SIZE_BYTES";
pub const IP_ALLOWLIST: &str = "IP_ALLOWLIST";
pub const IP_BLOCKLIST: &str = "IP_BLOCKLIST";
pub const SHUTDOWN_TIMEOUT_SECS: &str = "SHUTDOWN_TIMEOUT_SECS";
