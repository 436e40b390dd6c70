use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::jenkins::{JenkinsJob, JobStatistics};

/// What a dashboard client renders: the job list plus derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardState {
    pub jobs: Vec<JenkinsJob>,
    pub last_refresh: DateTime<Utc>,
    pub is_jenkins_available: bool,
    pub error_message: Option<String>,
    pub statistics: JobStatistics,
}

impl DashboardState {
    pub fn available(jobs: Vec<JenkinsJob>) -> Self {
        Self::build(jobs, Utc::now(), None)
    }

    /// `jobs` are the last successfully fetched ones, shown while the server is
    /// down, and `last_refresh` is when they were fetched.
    pub fn unavailable(
        jobs: Vec<JenkinsJob>,
        last_refresh: DateTime<Utc>,
        error_message: String,
    ) -> Self {
        Self::build(jobs, last_refresh, Some(error_message))
    }

    fn build(
        jobs: Vec<JenkinsJob>,
        last_refresh: DateTime<Utc>,
        error_message: Option<String>,
    ) -> Self {
        let statistics = JobStatistics::compute(&jobs);
        Self {
            jobs,
            last_refresh,
            is_jenkins_available: error_message.is_none(),
            error_message,
            statistics,
        }
    }
}
