use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Headers set by the SSO proxy in front of the service.
pub const HEADER_SUBJECT: &str = "x-auth-request-user";
pub const HEADER_EMAIL: &str = "x-auth-request-email";
pub const HEADER_NAME: &str = "x-auth-request-preferred-username";
pub const HEADER_GROUPS: &str = "x-auth-request-groups";

/// An SSO-authenticated identity. Being logged in says nothing about being
/// allowed in; see [`super::access::authorize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub login_time: DateTime<Utc>,
    pub is_admin: bool,
}

impl User {
    /// `None` when the proxy did not forward an email, i.e. not logged in.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let email = header_str(headers, HEADER_EMAIL)?;
        let id = header_str(headers, HEADER_SUBJECT).unwrap_or_default();
        let name = header_str(headers, HEADER_NAME).unwrap_or_default();
        let roles = header_str(headers, HEADER_GROUPS)
            .map(|groups| parse_groups(&groups))
            .unwrap_or_default();

        Some(Self {
            id,
            email,
            name,
            roles,
            login_time: Utc::now(),
            is_admin: false,
        })
    }
}

/// Where a request came from, as recorded in the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub const UNKNOWN_IP: &'static str = "unknown";

    pub fn from_parts(parts: &Parts, trust_proxy: bool) -> Self {
        Self {
            ip_address: extract_ip(parts, trust_proxy).unwrap_or_else(|| Self::UNKNOWN_IP.into()),
            user_agent: header_str(&parts.headers, USER_AGENT.as_str()),
        }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_owned())
}

fn parse_groups(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn extract_ip(parts: &Parts, trust_proxy: bool) -> Option<String> {
    // Only trust X-Forwarded-For when behind a configured reverse proxy
    if trust_proxy
        && let Some(forwarded) = parts.headers.get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first_ip) = val.split(',').next()
    {
        return Some(first_ip.trim().to_owned());
    }
    parts
        .extensions
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
}
