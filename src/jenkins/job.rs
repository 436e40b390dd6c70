use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// A job as last seen on the build server. Rebuilt on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JenkinsJob {
    pub name: String,
    pub url: String,
    pub status: JobStatus,
    pub last_build_number: Option<u64>,
    pub last_build_result: Option<String>,
    pub last_build_timestamp: Option<DateTime<Utc>>,
    pub last_build_duration_ms: Option<u64>,
    pub is_building: bool,
}

impl JenkinsJob {
    /// A job carrying only what the color token says.
    pub fn from_color(name: &str, url: &str, color: &str) -> Self {
        Self {
            name: name.to_owned(),
            url: url.to_owned(),
            status: JobStatus::from_color(color),
            last_build_number: None,
            last_build_result: None,
            last_build_timestamp: None,
            last_build_duration_ms: None,
            is_building: color.ends_with("_anime"),
        }
    }
}
