use std::collections::BTreeMap;

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::helpers::{ListResponse, blocking, record};
use crate::audit::{AuditAction, AuditLogEntry, AuditQuery};
use crate::auth::middleware::AdminUser;
use crate::error::ApiError;
use crate::store::AppState;
use crate::validation;
use crate::whitelist::WhitelistEntry;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddUserResponse {
    pub email: String,
    pub name: String,
    pub added_by: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(list_users).post(add_user))
        .route("/api/admin/users/{email}", delete(remove_user))
        .route("/api/admin/admins", get(list_admins))
        .route("/api/admin/audit", get(audit_log))
}

// ---------------------------------------------------------------------------
// Whitelist
// ---------------------------------------------------------------------------

async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<WhitelistEntry>>, ApiError> {
    let whitelist = state.whitelist.clone();
    let users = blocking(move || whitelist.list_users(params.include_inactive)).await?;
    Ok(Json(users.into()))
}

async fn list_admins(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<WhitelistEntry>>, ApiError> {
    let whitelist = state.whitelist.clone();
    let admins = blocking(move || whitelist.list_admins(params.include_inactive)).await?;
    Ok(Json(admins.into()))
}

#[tracing::instrument(skip(state, admin, body), fields(admin = %admin.user.email), err)]
async fn add_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<AddUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = body.email.trim().to_owned();
    let name = body.name.trim().to_owned();
    validation::check_email(&email)?;
    validation::check_display_name(&name)?;

    let added = {
        let whitelist = state.whitelist.clone();
        let (email, name, added_by) = (email.clone(), name.clone(), admin.user.email.clone());
        blocking(move || whitelist.add_user(&email, &name, &added_by)).await?
    };
    if !added {
        return Err(ApiError::Conflict(format!("user '{email}' is already whitelisted")));
    }

    let AdminUser { user, client } = admin;
    let response = AddUserResponse {
        email: email.clone(),
        name: name.clone(),
        added_by: user.email.clone(),
    };
    record(&state, move |audit| {
        let details = BTreeMap::from([("email".to_owned(), email), ("name".to_owned(), name)]);
        audit.log_admin_action(&user, &client, "add_user", details)
    })
    .await;

    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state, admin), fields(admin = %admin.user.email), err)]
async fn remove_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = {
        let whitelist = state.whitelist.clone();
        let (email, removed_by) = (email.clone(), admin.user.email.clone());
        blocking(move || whitelist.remove_user(&email, &removed_by)).await?
    };
    if !removed {
        return Err(ApiError::NotFound(format!("user '{email}'")));
    }

    let AdminUser { user, client } = admin;
    record(&state, move |audit| {
        let details = BTreeMap::from([("email".to_owned(), email)]);
        audit.log_admin_action(&user, &client, "remove_user", details)
    })
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

async fn audit_log(
    State(state): State<AppState>,
    _admin: AdminUser,
    RawQuery(raw): RawQuery,
) -> Result<Json<ListResponse<AuditLogEntry>>, ApiError> {
    let query = parse_audit_query(raw.as_deref().unwrap_or_default())?;
    let audit = state.audit.clone();
    let entries = blocking(move || audit.query(&query)).await?;
    Ok(Json(entries.into()))
}

/// `days`, `user`, and `action` (repeatable, or comma-separated).
fn parse_audit_query(raw: &str) -> Result<AuditQuery, ApiError> {
    let mut query = AuditQuery::default();
    for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            "days" => {
                let days = value
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ApiError::BadRequest(format!("invalid days: {value}")))?;
                validation::check_days(days)?;
                query.days = days;
            }
            "action" => {
                for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let action = name
                        .parse::<AuditAction>()
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                    if !query.actions.contains(&action) {
                        query.actions.push(action);
                    }
                }
            }
            "user" => {
                let user = value.trim();
                query.user_email = (!user.is_empty()).then(|| user.to_owned());
            }
            _ => {}
        }
    }
    Ok(query)
}
