use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use jenkins_dashboard::config::Config;
use jenkins_dashboard::jenkins::{DemoJobSource, JenkinsClient, JobCache, JobSource};
use jenkins_dashboard::{api, store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("DASHBOARD_LOG").unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().json())
        .init();

    let cfg = Config::load();

    let source: Arc<dyn JobSource> = if cfg.demo_mode {
        tracing::info!("demo mode enabled, serving canned jobs");
        Arc::new(DemoJobSource::new(true))
    } else {
        let client = JenkinsClient::new(&cfg.jenkins_url, &cfg.jenkins_user, &cfg.jenkins_api_token)?;
        tracing::info!(jenkins_url = %cfg.jenkins_url, "jenkins client created");
        Arc::new(client)
    };
    let jobs = JobCache::new(source, cfg.refresh_interval);

    let addr: SocketAddr = cfg.listen.parse()?;
    tracing::info!(
        whitelist = %cfg.whitelist_path.display(),
        audit_log = %cfg.audit_log_path.display(),
        refresh_secs = cfg.refresh_interval.as_secs(),
        "configuration loaded"
    );
    let state = store::AppState::new(cfg, jobs);

    // Create the whitelist document up front so a malformed file fails startup
    state.whitelist.read()?;

    let app = axum::Router::new()
        .route("/healthz", axum::routing::get(|| async { "ok" }))
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!(%addr, "starting dashboard");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
