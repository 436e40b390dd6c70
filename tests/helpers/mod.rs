#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use jenkins_dashboard::auth::identity::{HEADER_EMAIL, HEADER_GROUPS, HEADER_NAME, HEADER_SUBJECT};
use jenkins_dashboard::config::Config;
use jenkins_dashboard::jenkins::{
    DemoJobSource, JenkinsError, JenkinsJob, JobCache, JobSource,
};
use jenkins_dashboard::store::AppState;
use jenkins_dashboard::whitelist::{Whitelist, WhitelistEntry};

pub const ADMIN: &str = "admin@company.com";
pub const USER: &str = "dev@company.com";
pub const OUTSIDER: &str = "stranger@elsewhere.com";

/// Job source whose every call fails as if Jenkins were down.
pub struct UnreachableSource;

#[async_trait]
impl JobSource for UnreachableSource {
    async fn fetch_all_jobs(&self) -> Result<Vec<JenkinsJob>, JenkinsError> {
        Err(JenkinsError::Connection("connection refused".into()))
    }

    async fn job_details(&self, _name: &str) -> Result<JenkinsJob, JenkinsError> {
        Err(JenkinsError::Connection("connection refused".into()))
    }
}

/// Build a test `AppState` backed by files in a fresh temp dir.
///
/// - Whitelist seeded with `ADMIN` as admin and `USER` as a regular user
/// - Jobs served by the non-random demo source
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn test_state() -> (AppState, TempDir) {
    test_state_with_source(Arc::new(DemoJobSource::new(false)))
}

pub fn test_state_with_source(source: Arc<dyn JobSource>) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let whitelist_path = dir.path().join("data").join("allowed_users.json");
    seed_whitelist(&whitelist_path);

    let config = Config {
        listen: "127.0.0.1:0".into(),
        jenkins_url: String::new(),
        jenkins_user: String::new(),
        jenkins_api_token: String::new(),
        whitelist_path,
        audit_log_path: dir.path().join("audit_logs").join("audit.log"),
        refresh_interval: Duration::from_secs(30),
        trust_proxy_headers: false,
        demo_mode: true,
    };
    let jobs = JobCache::new(source, config.refresh_interval);
    (AppState::new(config, jobs), dir)
}

fn seed_whitelist(path: &Path) {
    let mut doc = Whitelist::default();
    doc.admins.push(WhitelistEntry::new(ADMIN, "Admin", "system"));
    doc.users.push(WhitelistEntry::new(USER, "Dev", "system"));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
}

/// Build the full API router with the given state.
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .merge(jenkins_dashboard::api::router())
        .with_state(state)
}

/// Attach SSO proxy identity headers. An empty email sends none.
fn with_identity(
    mut builder: axum::http::request::Builder,
    email: &str,
) -> axum::http::request::Builder {
    builder = builder.header("User-Agent", "integration-test");
    if email.is_empty() {
        return builder;
    }
    let name = email.split('@').next().unwrap_or(email);
    builder
        .header(HEADER_SUBJECT, format!("sub-{name}"))
        .header(HEADER_EMAIL, email)
        .header(HEADER_NAME, name)
        .header(HEADER_GROUPS, "engineering,oncall")
}

/// Send a GET request as the given SSO identity.
pub async fn get_json(app: &Router, email: &str, path: &str) -> (StatusCode, Value) {
    let builder = with_identity(Request::builder().method("GET").uri(path), email);
    let req = builder.body(Body::empty()).unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = body_json(resp).await;
    (status, body)
}

/// Send a POST request with a JSON body as the given SSO identity.
pub async fn post_json(app: &Router, email: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let builder = with_identity(
        Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json"),
        email,
    );
    let req = builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = body_json(resp).await;
    (status, body)
}

/// Send a DELETE request as the given SSO identity.
pub async fn delete_json(app: &Router, email: &str, path: &str) -> (StatusCode, Value) {
    let builder = with_identity(Request::builder().method("DELETE").uri(path), email);
    let req = builder.body(Body::empty()).unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = body_json(resp).await;
    (status, body)
}

/// Read back every audit entry the app has written, newest first.
pub fn audit_entries(state: &AppState) -> Vec<jenkins_dashboard::audit::AuditLogEntry> {
    let query = jenkins_dashboard::audit::AuditQuery {
        days: 365,
        ..Default::default()
    };
    state.audit.query(&query).unwrap()
}

/// Extract JSON body from a response.
async fn body_json(resp: axum::http::Response<Body>) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
