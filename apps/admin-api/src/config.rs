use std::net::IpAddr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::constants::{
    API_TOKENS, CORS_ALLOWED_ORIGINS, IP_ALLOWLIST, IP_BLOCKLIST, MAX_BODY_SIZE_BYTES,
    RATE_LIMIT_BURST, RATE_LIMIT_PER_MINUTE, REQUEST_TIMEOUT_SECS, SHUTDOWN_TIMEOUT_SECS,
};

/// Parse IP addresses from a comma-separated string.
/// Returns only valid IP addresses and logs warnings for invalid ones.
fn parse_ip_list(env_var: &str, value: &str) -> Vec<IpAddr> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.parse::<IpAddr>() {
            Ok(ip) => Some(ip.to_canonical()),
            Err(_) => {
                tracing::warn!(
                    env_var = env_var,
                    invalid_ip = s,
                    "ignoring invalid IP address in configuration"
                );
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
    pub request_timeout: Duration,
    pub max_body_size: usize,
    pub shutdown_timeout: Duration,
    pub cors_allowed_origins: Vec<String>,
    pub ip_allowlist: Vec<IpAddr>,
    pub ip_blocklist: Vec<IpAddr>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            rate_limit_per_minute: 100,
            rate_limit_burst: 150,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1_048_576, // 1MB
            shutdown_timeout: Duration::from_secs(30),
            cors_allowed_origins: vec!["*".to_string()],
            ip_allowlist: vec![],
            ip_blocklist: vec![],
        }
    }
}

impl MiddlewareConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();

        let rate_limit_per_minute = lookup(RATE_LIMIT_PER_MINUTE)
            .and_then(|v| v.parse().ok())
            .filter(|v: &u32| *v > 0)
            .unwrap_or(default.rate_limit_per_minute);

        let rate_limit_burst = lookup(RATE_LIMIT_BURST)
            .and_then(|v| v.parse().ok())
            .filter(|v: &u32| *v > 0)
            .unwrap_or(default.rate_limit_burst);

        let request_timeout = lookup(REQUEST_TIMEOUT_SECS)
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(default.request_timeout);

        let max_body_size = lookup(MAX_BODY_SIZE_BYTES)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.max_body_size);

        let shutdown_timeout = lookup(SHUTDOWN_TIMEOUT_SECS)
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(default.shutdown_timeout);

        let cors_allowed_origins = lookup(CORS_ALLOWED_ORIGINS)
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(default.cors_allowed_origins);

        let ip_allowlist = lookup(IP_ALLOWLIST)
            .map(|v| parse_ip_list(IP_ALLOWLIST, &v))
            .unwrap_or(default.ip_allowlist);

        let ip_blocklist = lookup(IP_BLOCKLIST)
            .map(|v| parse_ip_list(IP_BLOCKLIST, &v))
            .unwrap_or(default.ip_blocklist);

        Self {
            rate_limit_per_minute,
            rate_limit_burst,
            request_timeout,
            max_body_size,
            shutdown_timeout,
            cors_allowed_origins,
            ip_allowlist,
            ip_blocklist,
        }
    }

    pub fn has_ip_filter(&self) -> bool {
        !self.ip_allowlist.is_empty() || !self.ip_blocklist.is_empty()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

/// Bearer tokens mapped to the user they authenticate as.
#[derive(Debug, Default)]
pub struct ApiTokens {
    entries: Vec<(SecretString, Uuid)>,
}

impl ApiTokens {
    pub fn from_env() -> Self {
        match std::env::var(API_TOKENS) {
            Ok(mut raw) => {
                let tokens = Self::parse(&raw);
                raw.zeroize();
                tokens
            }
            Err(_) => Self::default(),
        }
    }

    /// Parses `token:user-uuid` pairs. Malformed entries are skipped with a warning
    /// that never includes the token itself.
    pub fn parse(value: &str) -> Self {
        let entries = value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .enumerate()
            .filter_map(|(position, entry)| {
                let parsed = entry.rsplit_once(':').and_then(|(token, user_id)| {
                    let token = token.trim();
                    let user_id = Uuid::parse_str(user_id.trim()).ok()?;
                    (!token.is_empty()).then(|| (SecretString::new(token.to_string()), user_id))
                });
                if parsed.is_none() {
                    tracing::warn!(
                        env_var = API_TOKENS,
                        position = position,
                        "ignoring malformed API token entry"
                    );
                }
                parsed
            })
            .collect();

        Self { entries }
    }

    pub fn user_for(&self, token: &str) -> Option<Uuid> {
        self.entries
            .iter()
            .find(|(secret, _)| secret.expose_secret() == token)
            .map(|(_, user_id)| *user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_middleware_config_defaults() {
        let config = MiddlewareConfig::from_lookup(lookup(&[]));
        assert_eq!(config.rate_limit_per_minute, 100);
        assert_eq!(config.rate_limit_burst, 150);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, 1_048_576);
        assert!(config.allows_any_origin());
        assert!(!config.has_ip_filter());
    }

    #[test]
    fn test_middleware_config_overrides() {
        let config = MiddlewareConfig::from_lookup(lookup(&[
            (RATE_LIMIT_PER_MINUTE, "60"),
            (REQUEST_TIMEOUT_SECS, "5"),
            (CORS_ALLOWED_ORIGINS, "https://a.example, https://b.example"),
            (IP_BLOCKLIST, "10.0.0.1, not-an-ip"),
        ]));
        assert_eq!(config.rate_limit_per_minute, 60);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.allows_any_origin());
        assert_eq!(config.ip_blocklist, vec!["10.0.0.1".parse::<IpAddr>().unwrap()]);
        assert!(config.has_ip_filter());
    }

    #[test]
    fn test_middleware_config_rejects_zero_rate() {
        let config = MiddlewareConfig::from_lookup(lookup(&[(RATE_LIMIT_PER_MINUTE, "0")]));
        assert_eq!(config.rate_limit_per_minute, 100);
    }

    #[test]
    fn test_api_tokens_parse() {
        let admin = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        let tokens = ApiTokens::parse(&format!("admin-token:{admin}, viewer-token:{viewer}"));

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.user_for("admin-token"), Some(admin));
        assert_eq!(tokens.user_for("viewer-token"), Some(viewer));
        assert_eq!(tokens.user_for("unknown"), None);
    }

    #[test]
    fn test_api_tokens_skip_malformed_entries() {
        let user = Uuid::new_v4();
        let tokens = ApiTokens::parse(&format!("no-separator,:{user},bad:not-a-uuid,ok:{user},"));

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens.user_for("ok"), Some(user));
    }

    #[test]
    fn test_api_tokens_debug_is_redacted() {
        let tokens = ApiTokens::parse(&format!("super-secret:{}", Uuid::new_v4()));
        assert!(!format!("{tokens:?}").contains("super-secret"));
    }

    #[test]
    fn test_api_tokens_empty() {
        assert!(ApiTokens::parse("").is_empty());
    }
}
