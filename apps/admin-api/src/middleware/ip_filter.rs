use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::{IpAddr, SocketAddr};

use crate::error::ApiError;

#[derive(Clone, Debug, Default)]
pub struct IpFilterConfig {
    pub allowlist: Vec<IpAddr>,
    pub blocklist: Vec<IpAddr>,
}

impl IpFilterConfig {
    pub fn new(allowlist: Vec<IpAddr>, blocklist: Vec<IpAddr>) -> Self {
        Self {
            allowlist,
            blocklist,
        }
    }

    /// The blocklist wins over the allowlist; an empty allowlist admits everyone else.
    pub fn is_allowed(&self, ip: IpAddr) -> bool {
        let ip = ip.to_canonical();

        if self.blocklist.contains(&ip) {
            return false;
        }

        self.allowlist.is_empty() || self.allowlist.contains(&ip)
    }
}

pub async fn ip_filter_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(config) = request.extensions().get::<IpFilterConfig>() {
        let client_ip = addr.ip();

        if !config.is_allowed(client_ip) {
            tracing::warn!(client_ip = %client_ip, "IP address blocked by filter");
            return ApiError::Forbidden("IP address not allowed".to_string()).into_response();
        }
    }

    next.run(request).await
}
