//! Build-server job data: status normalization, statistics and job sources.

pub mod cache;
pub mod client;
pub mod demo;
pub mod error;
pub mod job;
pub mod stats;
pub mod status;

pub use cache::JobCache;
pub use client::{JenkinsClient, JobSource};
pub use demo::DemoJobSource;
pub use error::JenkinsError;
pub use job::JenkinsJob;
pub use stats::{Health, JobStatistics};
pub use status::JobStatus;
