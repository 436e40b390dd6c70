use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::helpers::blocking;
use crate::auth::access::{self, AccessDecision};
use crate::auth::identity::{ClientInfo, User};
use crate::error::ApiError;
use crate::store::AppState;

/// SSO identity extracted from proxy headers. Not yet checked against the whitelist.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub client: ClientInfo,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let client = ClientInfo::from_parts(parts, state.config.trust_proxy_headers);
        let user = User::from_headers(&parts.headers).ok_or(ApiError::Unauthorized)?;
        Ok(Self { user, client })
    }
}

/// Optional identity: `user` is `None` for requests without SSO headers.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser {
    pub user: Option<User>,
    pub client: ClientInfo,
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            user: User::from_headers(&parts.headers),
            client: ClientInfo::from_parts(parts, state.config.trust_proxy_headers),
        })
    }
}

/// Whitelisted user. `user.is_admin` is resolved.
#[derive(Debug, Clone)]
pub struct AuthorizedUser {
    pub user: User,
    pub client: ClientInfo,
}

impl FromRequestParts<AppState> for AuthorizedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { mut user, client } = AuthUser::from_request_parts(parts, state).await?;
        match resolve_access(state, &user.email).await? {
            AccessDecision::Granted { is_admin } => {
                user.is_admin = is_admin;
                Ok(Self { user, client })
            }
            AccessDecision::Denied => Err(ApiError::Forbidden),
        }
    }
}

/// Whitelisted user who is also an active admin.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: User,
    pub client: ClientInfo,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthorizedUser { user, client } =
            AuthorizedUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden);
        }
        Ok(Self { user, client })
    }
}

/// Run the whitelist check off the async runtime.
pub async fn resolve_access(state: &AppState, email: &str) -> Result<AccessDecision, ApiError> {
    let whitelist = state.whitelist.clone();
    let email = email.to_owned();
    blocking(move || access::authorize(&whitelist, &email)).await
}
