//! The two-route IP lookup proxy. The server's only job is to resolve
//! the caller's IP (or validate a supplied one) and forward it to the
//! public geolocation service, shaped as `{source, ip, info}`.

use crate::errors::AppError;
use axum::http::HeaderMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::net::SocketAddr;

pub const DEFAULT_IPAPI_URL: &str = "http://ip-api.com/json";

static IPV4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(?:\.\d{1,3}){3}$").expect("ipv4 pattern"));

/// Dotted-quad shape check, same pattern the lookup form enforces.
pub fn is_ipv4(candidate: &str) -> bool {
    IPV4_RE.is_match(candidate)
}

/// Client IP from forwarding headers, falling back to the peer
/// address: first `x-forwarded-for` entry, then `x-real-ip`.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return Some(first.to_string());
            }
        }
    }
    if let Some(real) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real = real.trim();
        if !real.is_empty() {
            return Some(real.to_string());
        }
    }
    Some(peer.ip().to_string())
}

pub async fn lookup(
    client: &reqwest::Client,
    base_url: &str,
    ip: &str,
) -> Result<serde_json::Value, AppError> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), ip);
    let info = client.get(url).send().await?.json().await?;
    Ok(info)
}
