use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::auth::middleware::AuthorizedUser;
use crate::dashboard::DashboardState;
use crate::error::ApiError;
use crate::jenkins::JenkinsJob;
use crate::store::AppState;
use crate::validation;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/dashboard/refresh", post(refresh))
        .route("/api/jobs/{name}", get(job_details))
}

async fn dashboard(
    State(state): State<AppState>,
    _auth: AuthorizedUser,
) -> Json<DashboardState> {
    Json(state.jobs.snapshot().await)
}

async fn refresh(
    State(state): State<AppState>,
    auth: AuthorizedUser,
) -> Json<DashboardState> {
    tracing::info!(email = %auth.user.email, "manual dashboard refresh");
    Json(state.jobs.refresh().await)
}

#[tracing::instrument(skip(state, _auth), err)]
async fn job_details(
    State(state): State<AppState>,
    _auth: AuthorizedUser,
    Path(name): Path<String>,
) -> Result<Json<JenkinsJob>, ApiError> {
    validation::check_job_name(&name)?;
    let job = state.jobs.source().job_details(&name).await?;
    Ok(Json(job))
}
