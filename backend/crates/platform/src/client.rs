//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Request metadata captured for rate limiting and audit records.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Client IP address (from X-Forwarded-For or direct connection)
    pub ip: Option<IpAddr>,
    /// User-Agent string, if the client sent one
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn new(ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }

    /// Get IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }

    /// True when the request came from the local machine.
    pub fn is_loopback(&self) -> bool {
        self.ip.map(|ip| ip.is_loopback()).unwrap_or(false)
    }
}

/// Extract request metadata from headers.
///
/// Unlike session-bound systems we do not require a User-Agent; an absent
/// header is recorded as such in the audit trail.
pub fn extract_request_meta(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> RequestMeta {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    RequestMeta::new(extract_client_ip(headers, direct_ip), user_agent)
}

/// Extract client IP address from headers.
///
/// Checks X-Forwarded-For first (for reverse proxy setups), then falls back
/// to the direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_meta() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let meta = extract_request_meta(&headers, None);
        assert_eq!(meta.user_agent, Some("Mozilla/5.0 Test Browser".to_string()));
        assert!(meta.ip.is_none());
    }

    #[test]
    fn test_extract_meta_missing_ua() {
        let headers = HeaderMap::new();
        let meta = extract_request_meta(&headers, Some("10.0.0.7".parse().unwrap()));
        assert!(meta.user_agent.is_none());
        assert_eq!(meta.ip_string(), Some("10.0.0.7".to_string()));
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_is_loopback() {
        let local = RequestMeta::new(Some("127.0.0.1".parse().unwrap()), None);
        assert!(local.is_loopback());

        let local_v6 = RequestMeta::new(Some("::1".parse().unwrap()), None);
        assert!(local_v6.is_loopback());

        let remote = RequestMeta::new(Some("203.0.113.9".parse().unwrap()), None);
        assert!(!remote.is_loopback());

        let unknown = RequestMeta::new(None, None);
        assert!(!unknown.is_loopback());
    }
}
