use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    pub jenkins_url: String,
    pub jenkins_user: String,
    pub jenkins_api_token: String,
    pub whitelist_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub refresh_interval: Duration,
    pub trust_proxy_headers: bool,
    pub demo_mode: bool,
}

fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_refresh_secs(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

impl Config {
    pub fn load() -> Self {
        Self {
            listen: env::var("DASHBOARD_LISTEN").unwrap_or_else(|_| "0.0.0.0:8501".into()),
            jenkins_url: env::var("JENKINS_URL").unwrap_or_default(),
            jenkins_user: env::var("JENKINS_USER").unwrap_or_default(),
            jenkins_api_token: env::var("JENKINS_API_TOKEN").unwrap_or_default(),
            whitelist_path: env::var("DASHBOARD_WHITELIST_PATH")
                .map_or_else(|_| PathBuf::from("data/allowed_users.json"), PathBuf::from),
            audit_log_path: env::var("DASHBOARD_AUDIT_LOG_PATH")
                .map_or_else(|_| PathBuf::from("audit_logs/audit.log"), PathBuf::from),
            refresh_interval: env::var("DASHBOARD_REFRESH_SECS")
                .ok()
                .and_then(|v| parse_refresh_secs(&v))
                .unwrap_or(crate::jenkins::cache::DEFAULT_TTL),
            trust_proxy_headers: env::var("DASHBOARD_TRUST_PROXY")
                .ok()
                .is_some_and(|v| parse_flag(&v)),
            demo_mode: env::var("DEMO_MODE").ok().is_some_and(|v| parse_flag(&v)),
        }
    }
}
