use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::client::JobSource;
use super::error::JenkinsError;
use super::job::JenkinsJob;
use super::status::JobStatus;

const DEMO_JOBS: &[(&str, JobStatus)] = &[
    ("frontend-build", JobStatus::Success),
    ("backend-api", JobStatus::Success),
    ("auth-service", JobStatus::Failure),
    ("payment-gateway", JobStatus::Building),
    ("user-service", JobStatus::Success),
    ("notification-service", JobStatus::Unstable),
    ("analytics-pipeline", JobStatus::Success),
    ("mobile-app-ios", JobStatus::Success),
    ("mobile-app-android", JobStatus::Failure),
    ("infrastructure-terraform", JobStatus::Success),
    ("database-migration", JobStatus::Disabled),
    ("e2e-tests", JobStatus::Success),
    ("performance-tests", JobStatus::Aborted),
    ("security-scan", JobStatus::Success),
    ("docker-registry-push", JobStatus::NotBuilt),
];

const DEMO_BASE_URL: &str = "https://jenkins.demo.company.com/job";
const BASE_BUILD: u64 = 100;

/// Canned job set for demos and local development. No network access.
#[derive(Debug, Clone, Default)]
pub struct DemoJobSource {
    randomize: bool,
}

impl DemoJobSource {
    /// With `randomize`, roughly one job in ten gets a random status per fetch.
    pub fn new(randomize: bool) -> Self {
        Self { randomize }
    }
}

fn result_for(status: JobStatus) -> Option<String> {
    match status {
        JobStatus::Success => Some("SUCCESS".into()),
        JobStatus::Failure => Some("FAILURE".into()),
        JobStatus::Unstable => Some("UNSTABLE".into()),
        JobStatus::Aborted => Some("ABORTED".into()),
        JobStatus::Building | JobStatus::Disabled | JobStatus::NotBuilt | JobStatus::Unknown => {
            None
        }
    }
}

fn demo_job(name: &str, status: JobStatus, base_build: u64) -> JenkinsJob {
    let never_built = status == JobStatus::NotBuilt;
    let ago =
        Duration::hours(rand::random_range(0..25)) + Duration::minutes(rand::random_range(0..60));
    let has_duration = !matches!(
        status,
        JobStatus::Building | JobStatus::NotBuilt | JobStatus::Disabled
    );

    JenkinsJob {
        name: name.to_owned(),
        url: format!("{DEMO_BASE_URL}/{name}/"),
        status,
        last_build_number: (!never_built).then(|| base_build + rand::random_range(0..=50)),
        last_build_result: result_for(status),
        last_build_timestamp: (!never_built).then(|| Utc::now() - ago),
        last_build_duration_ms: has_duration.then(|| rand::random_range(30_000..=600_000)),
        is_building: status == JobStatus::Building,
    }
}

#[async_trait]
impl JobSource for DemoJobSource {
    async fn fetch_all_jobs(&self) -> Result<Vec<JenkinsJob>, JenkinsError> {
        const FLIP: [JobStatus; 3] = [JobStatus::Success, JobStatus::Failure, JobStatus::Building];

        let jobs = DEMO_JOBS
            .iter()
            .zip(0u64..)
            .map(|(&(name, status), i)| {
                let status = if self.randomize && rand::random_range(0..10) == 0 {
                    FLIP[rand::random_range(0..FLIP.len())]
                } else {
                    status
                };
                demo_job(name, status, BASE_BUILD + i * 10)
            })
            .collect();
        Ok(jobs)
    }

    async fn job_details(&self, name: &str) -> Result<JenkinsJob, JenkinsError> {
        let status = DEMO_JOBS
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(JobStatus::Unknown, |(_, s)| *s);
        Ok(demo_job(name, status, BASE_BUILD))
    }
}
