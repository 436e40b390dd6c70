use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Security-relevant event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    LoginAttempt,
    LoginSuccess,
    LoginFailure,
    Logout,
    AccessDenied,
    SessionExpired,
    AdminAction,
}

impl AuditAction {
    pub const ALL: [Self; 7] = [
        Self::LoginAttempt,
        Self::LoginSuccess,
        Self::LoginFailure,
        Self::Logout,
        Self::AccessDenied,
        Self::SessionExpired,
        Self::AdminAction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoginAttempt => "login_attempt",
            Self::LoginSuccess => "login_success",
            Self::LoginFailure => "login_failure",
            Self::Logout => "logout",
            Self::AccessDenied => "access_denied",
            Self::SessionExpired => "session_expired",
            Self::AdminAction => "admin_action",
        }
    }

    /// Short label for audit viewers.
    pub fn label(self) -> &'static str {
        match self {
            Self::LoginSuccess => "LOGIN",
            Self::LoginFailure => "LOGIN FAILED",
            Self::Logout => "LOGOUT",
            Self::AccessDenied => "ACCESS DENIED",
            Self::AdminAction => "ADMIN",
            Self::LoginAttempt => "LOGIN_ATTEMPT",
            Self::SessionExpired => "SESSION_EXPIRED",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::LoginSuccess => "green",
            Self::LoginFailure => "red",
            Self::Logout => "blue",
            Self::AccessDenied => "orange",
            Self::AdminAction => "violet",
            Self::LoginAttempt | Self::SessionExpired => "gray",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown audit action: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    Success,
    Failure,
    Blocked,
}

impl AuditResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for AuditResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable audit record, stored as a single JSON line.
///
/// Absent optional fields serialize as `null`; no key is ever omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub result: AuditResult,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    #[serde(default)]
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub details: Option<BTreeMap<String, String>>,
}
