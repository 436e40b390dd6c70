use std::fmt;

use serde::{Deserialize, Serialize};

use super::job::JenkinsJob;
use super::status::JobStatus;

/// Overall health, derived from the absolute failure count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Warning,
    Critical,
}

impl Health {
    pub fn from_failures(failures: u32) -> Self {
        match failures {
            0 => Self::Healthy,
            1..=2 => Self::Warning,
            _ => Self::Critical,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts over a job listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobStatistics {
    pub total: u32,
    pub success: u32,
    pub failure: u32,
    pub building: u32,
    pub disabled: u32,
    pub unstable: u32,
    pub not_built: u32,
    pub aborted: u32,
    pub unknown: u32,
    /// Percentage of countable jobs that succeeded, one decimal place.
    pub success_rate: f64,
    pub health: Health,
}

impl Default for JobStatistics {
    fn default() -> Self {
        Self {
            total: 0,
            success: 0,
            failure: 0,
            building: 0,
            disabled: 0,
            unstable: 0,
            not_built: 0,
            aborted: 0,
            unknown: 0,
            success_rate: 0.0,
            health: Health::Healthy,
        }
    }
}

impl JobStatistics {
    pub fn compute(jobs: &[JenkinsJob]) -> Self {
        let mut stats = Self::default();
        for job in jobs {
            stats.total += 1;
            let slot = match job.status {
                JobStatus::Success => &mut stats.success,
                JobStatus::Failure => &mut stats.failure,
                JobStatus::Building => &mut stats.building,
                JobStatus::Disabled => &mut stats.disabled,
                JobStatus::Unstable => &mut stats.unstable,
                JobStatus::NotBuilt => &mut stats.not_built,
                JobStatus::Aborted => &mut stats.aborted,
                JobStatus::Unknown => &mut stats.unknown,
            };
            *slot += 1;
        }

        // Disabled, never-built and in-progress jobs have no pass/fail outcome
        let countable = stats.total - stats.disabled - stats.not_built - stats.building;
        stats.success_rate = if countable == 0 {
            0.0
        } else {
            round_one_decimal(f64::from(stats.success) / f64::from(countable) * 100.0)
        };
        stats.health = Health::from_failures(stats.failure);
        stats
    }

    pub fn count(&self, status: JobStatus) -> u32 {
        match status {
            JobStatus::Success => self.success,
            JobStatus::Failure => self.failure,
            JobStatus::Building => self.building,
            JobStatus::Disabled => self.disabled,
            JobStatus::Unstable => self.unstable,
            JobStatus::NotBuilt => self.not_built,
            JobStatus::Aborted => self.aborted,
            JobStatus::Unknown => self.unknown,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn job(status: JobStatus) -> JenkinsJob {
        JenkinsJob {
            name: format!("job-{status}"),
            url: String::new(),
            status,
            last_build_number: None,
            last_build_result: None,
            last_build_timestamp: None,
            last_build_duration_ms: None,
            is_building: status == JobStatus::Building,
        }
    }

    fn jobs(statuses: &[JobStatus]) -> Vec<JenkinsJob> {
        statuses.iter().copied().map(job).collect()
    }

    #[test]
    fn empty_is_all_zero_and_healthy() {
        let stats = JobStatistics::compute(&[]);
        assert_eq!(stats, JobStatistics::default());
        assert_eq!(stats.total, 0);
        assert!(stats.success_rate.abs() < f64::EPSILON);
        assert_eq!(stats.health, Health::Healthy);
        for status in JobStatus::ALL {
            assert_eq!(stats.count(status), 0);
        }
    }

    #[test]
    fn five_successes() {
        let stats = JobStatistics::compute(&jobs(&[JobStatus::Success; 5]));
        assert_eq!(stats.total, 5);
        assert!((stats.success_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(stats.health, Health::Healthy);
    }

    #[test]
    fn excluded_states_leave_denominator() {
        let stats = JobStatistics::compute(&jobs(&[
            JobStatus::Success,
            JobStatus::Failure,
            JobStatus::Unstable,
            JobStatus::Disabled,
            JobStatus::NotBuilt,
            JobStatus::Building,
        ]));
        assert_eq!(stats.total, 6);
        // 1 success out of 3 countable
        assert!((stats.success_rate - 33.3).abs() < 1e-9);
    }

    #[test]
    fn only_uncountable_jobs_rate_is_zero() {
        let stats = JobStatistics::compute(&jobs(&[
            JobStatus::Disabled,
            JobStatus::NotBuilt,
            JobStatus::Building,
        ]));
        assert!(stats.success_rate.abs() < f64::EPSILON);
        assert_eq!(stats.health, Health::Healthy);
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        let stats = JobStatistics::compute(&jobs(&[
            JobStatus::Success,
            JobStatus::Success,
            JobStatus::Failure,
        ]));
        assert!((stats.success_rate - 66.7).abs() < 1e-9);
    }

    #[rstest]
    #[case(0, Health::Healthy)]
    #[case(1, Health::Warning)]
    #[case(2, Health::Warning)]
    #[case(3, Health::Critical)]
    #[case(10, Health::Critical)]
    fn health_from_failures(#[case] failures: usize, #[case] expected: Health) {
        let mut statuses = vec![JobStatus::Failure; failures];
        statuses.extend([JobStatus::Success, JobStatus::Unstable, JobStatus::Disabled]);
        let stats = JobStatistics::compute(&jobs(&statuses));
        assert_eq!(stats.health, expected);
    }

    #[test]
    fn health_wire_values() {
        assert_eq!(serde_json::to_string(&Health::Critical).unwrap(), "\"critical\"");
        assert_eq!(Health::Warning.to_string(), "warning");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_status() -> impl Strategy<Value = JobStatus> {
            (0..JobStatus::ALL.len()).prop_map(|i| JobStatus::ALL[i])
        }

        proptest! {
            #[test]
            fn counts_sum_to_total(statuses in prop::collection::vec(arb_status(), 0..64)) {
                let stats = JobStatistics::compute(&jobs(&statuses));
                let sum: u32 = JobStatus::ALL.iter().map(|s| stats.count(*s)).sum();
                prop_assert_eq!(sum, stats.total);
                prop_assert_eq!(stats.total as usize, statuses.len());
            }

            #[test]
            fn rate_within_bounds(statuses in prop::collection::vec(arb_status(), 0..64)) {
                let stats = JobStatistics::compute(&jobs(&statuses));
                prop_assert!((0.0..=100.0).contains(&stats.success_rate));
            }

            #[test]
            fn health_depends_only_on_failures(statuses in prop::collection::vec(arb_status(), 0..64)) {
                let stats = JobStatistics::compute(&jobs(&statuses));
                prop_assert_eq!(stats.health, Health::from_failures(stats.failure));
            }
        }
    }
}
