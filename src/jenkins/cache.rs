use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::client::JobSource;
use super::job::JenkinsJob;
use crate::dashboard::DashboardState;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Default)]
struct CacheState {
    current: Option<(Instant, DashboardState)>,
    last_good: Vec<JenkinsJob>,
    /// When `last_good` was fetched. `None` until the first success.
    last_good_at: Option<DateTime<Utc>>,
}

/// Fixed-TTL memoization of job fetches.
///
/// A failed fetch still produces a state: it reports Jenkins as unavailable and
/// carries the last successful listing.
pub struct JobCache {
    source: Arc<dyn JobSource>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl JobCache {
    pub fn new(source: Arc<dyn JobSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn source(&self) -> &Arc<dyn JobSource> {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached state if younger than the TTL, otherwise a fresh fetch.
    pub async fn snapshot(&self) -> DashboardState {
        let mut state = self.state.lock().await;
        if let Some((fetched_at, cached)) = &state.current
            && fetched_at.elapsed() < self.ttl
        {
            return cached.clone();
        }

        let fresh = match self.source.fetch_all_jobs().await {
            Ok(jobs) => {
                state.last_good.clone_from(&jobs);
                let fresh = DashboardState::available(jobs);
                state.last_good_at = Some(fresh.last_refresh);
                fresh
            }
            Err(e) => {
                tracing::warn!(error = %e, "job fetch failed, serving last known jobs");
                DashboardState::unavailable(
                    state.last_good.clone(),
                    state.last_good_at.unwrap_or_else(Utc::now),
                    e.to_string(),
                )
            }
        };
        state.current = Some((Instant::now(), fresh.clone()));
        fresh
    }

    /// Drop the cached state so the next snapshot refetches.
    pub async fn invalidate(&self) {
        self.state.lock().await.current = None;
    }

    pub async fn refresh(&self) -> DashboardState {
        self.invalidate().await;
        self.snapshot().await
    }
}
