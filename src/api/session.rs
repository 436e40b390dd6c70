use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;

use super::helpers::record;
use crate::auth::AccessDecision;
use crate::auth::User;
use crate::auth::middleware::{AuthUser, OptionalAuthUser, resolve_access};
use crate::error::ApiError;
use crate::store::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub is_admin: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/session", post(login).delete(logout))
}

/// Record a login from the SSO identity and report whether it may use the dashboard.
async fn login(
    State(state): State<AppState>,
    OptionalAuthUser { user, client }: OptionalAuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let Some(mut user) = user else {
        record(&state, move |audit| {
            let details = BTreeMap::from([(
                "reason".to_owned(),
                "no identity forwarded by SSO proxy".to_owned(),
            )]);
            audit.log_login_failure(&client, Some(details))
        })
        .await;
        return Err(ApiError::Unauthorized);
    };

    {
        let (user, client) = (user.clone(), client.clone());
        record(&state, move |audit| audit.log_login_success(&user, &client)).await;
    }

    match resolve_access(&state, &user.email).await? {
        AccessDecision::Granted { is_admin } => {
            user.is_admin = is_admin;
            tracing::info!(email = %user.email, is_admin, "session started");
            Ok(Json(SessionResponse { user, is_admin }))
        }
        AccessDecision::Denied => {
            tracing::info!(email = %user.email, "login from non-whitelisted user");
            record(&state, move |audit| audit.log_access_denied(&user, &client)).await;
            Err(ApiError::Forbidden)
        }
    }
}

async fn logout(
    State(state): State<AppState>,
    AuthUser { user, client }: AuthUser,
) -> impl IntoResponse {
    tracing::info!(email = %user.email, "session ended");
    record(&state, move |audit| audit.log_logout(&user, &client)).await;
    StatusCode::NO_CONTENT
}
