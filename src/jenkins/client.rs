use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::JenkinsError;
use super::job::JenkinsJob;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const LIST_TREE: &str = "jobs[name,url,color]";
const JOB_TREE: &str = "name,url,color,lastBuild[number]";
const BUILD_TREE: &str = "number,result,timestamp,duration,building";

/// Where job data comes from.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Every job visible to the configured account. A job whose data cannot be
    /// decoded is left out rather than failing the whole listing.
    async fn fetch_all_jobs(&self) -> Result<Vec<JenkinsJob>, JenkinsError>;

    async fn job_details(&self, name: &str) -> Result<JenkinsJob, JenkinsError>;
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawJob {
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(rename = "lastBuild", default)]
    last_build: Option<RawBuildRef>,
}

impl RawJob {
    fn color(&self) -> &str {
        self.color.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct RawBuildRef {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RawBuild {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    building: bool,
}

/// Failure of a single GET, before it is attributed to a job.
enum RequestError {
    NotFound,
    Unauthorized(StatusCode),
    Other(String),
}

impl RequestError {
    fn into_jenkins(self, job: Option<&str>) -> JenkinsError {
        match (self, job) {
            (Self::NotFound, Some(name)) => JenkinsError::JobNotFound(name.to_owned()),
            (Self::NotFound, None) => JenkinsError::Connection("endpoint not found (404)".into()),
            (Self::Unauthorized(status), _) => JenkinsError::Auth(status.to_string()),
            (Self::Other(msg), _) => JenkinsError::Connection(msg),
        }
    }
}

/// Jenkins JSON REST API client authenticated with a user + API token.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    base: Url,
    user: String,
    token: String,
    http: reqwest::Client,
}

impl JenkinsClient {
    pub fn new(base_url: &str, user: &str, token: &str) -> Result<Self, JenkinsError> {
        let base = Url::parse(base_url).map_err(|e| JenkinsError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(JenkinsError::InvalidUrl(base_url.to_owned()));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| JenkinsError::Connection(e.to_string()))?;
        Ok(Self {
            base,
            user: user.to_owned(),
            token: token.to_owned(),
            http,
        })
    }

    fn endpoint(&self, segments: &[&str], tree: &str) -> Result<Url, JenkinsError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| JenkinsError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .extend(["api", "json"]);
        url.query_pairs_mut().append_pair("tree", tree);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RequestError> {
        let mut request = self.http.get(url);
        if !self.user.is_empty() {
            request = request.basic_auth(&self.user, Some(&self.token));
        }
        let resp = request
            .send()
            .await
            .map_err(|e| RequestError::Other(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => return Err(RequestError::NotFound),
            s @ (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                return Err(RequestError::Unauthorized(s));
            }
            s if !s.is_success() => return Err(RequestError::Other(format!("unexpected status {s}"))),
            _ => {}
        }

        resp.json::<T>()
            .await
            .map_err(|e| RequestError::Other(format!("invalid response body: {e}")))
    }

    async fn build_info(&self, name: &str, number: u64) -> Result<RawBuild, JenkinsError> {
        let number = number.to_string();
        let url = self.endpoint(&["job", name, number.as_str()], BUILD_TREE)?;
        self.get_json(url).await.map_err(|e| e.into_jenkins(Some(name)))
    }

    async fn job_from_raw(&self, raw: RawJob) -> JenkinsJob {
        let mut job = JenkinsJob::from_color(&raw.name, &raw.url, raw.color());
        let Some(last_build) = raw.last_build else {
            return job;
        };
        job.last_build_number = Some(last_build.number);

        match self.build_info(&raw.name, last_build.number).await {
            Ok(build) => {
                job.last_build_result = build.result;
                job.is_building = build.building;
                job.last_build_timestamp = build
                    .timestamp
                    .filter(|ms| *ms != 0)
                    .and_then(DateTime::from_timestamp_millis);
                job.last_build_duration_ms = build.duration;
            }
            Err(e) => {
                tracing::debug!(job = %raw.name, error = %e, "build info unavailable, keeping partial job");
            }
        }
        job
    }
}

#[async_trait]
impl JobSource for JenkinsClient {
    #[tracing::instrument(skip(self), fields(base = %self.base), err)]
    async fn fetch_all_jobs(&self) -> Result<Vec<JenkinsJob>, JenkinsError> {
        let url = self.endpoint(&[], LIST_TREE)?;
        let listing: JobList = self.get_json(url).await.map_err(|e| e.into_jenkins(None))?;

        let mut jobs = Vec::with_capacity(listing.jobs.len());
        for value in listing.jobs {
            let raw: RawJob = match serde_json::from_value(value) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable job");
                    continue;
                }
            };
            let job = match self.job_details(&raw.name).await {
                Ok(job) => job,
                Err(e) => {
                    tracing::debug!(job = %raw.name, error = %e, "job details unavailable, using listing data");
                    JenkinsJob::from_color(&raw.name, &raw.url, raw.color())
                }
            };
            jobs.push(job);
        }
        tracing::info!(count = jobs.len(), "fetched jobs");
        Ok(jobs)
    }

    #[tracing::instrument(skip(self), err)]
    async fn job_details(&self, name: &str) -> Result<JenkinsJob, JenkinsError> {
        let url = self.endpoint(&["job", name], JOB_TREE)?;
        let raw: RawJob = self.get_json(url).await.map_err(|e| e.into_jenkins(Some(name)))?;
        Ok(self.job_from_raw(raw).await)
    }
}
