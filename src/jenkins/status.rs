use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical build status, independent of Jenkins' ball-color encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Success,
    Failure,
    Unstable,
    Building,
    Disabled,
    NotBuilt,
    Aborted,
    Unknown,
}

impl JobStatus {
    pub const ALL: [Self; 8] = [
        Self::Success,
        Self::Failure,
        Self::Unstable,
        Self::Building,
        Self::Disabled,
        Self::NotBuilt,
        Self::Aborted,
        Self::Unknown,
    ];

    /// Map a Jenkins color token. Total: unrecognized tokens are `Unknown`.
    pub fn from_color(color: &str) -> Self {
        match color {
            "blue" => Self::Success,
            "red" => Self::Failure,
            "yellow" => Self::Unstable,
            "blue_anime" | "red_anime" | "yellow_anime" => Self::Building,
            "disabled" => Self::Disabled,
            "notbuilt" => Self::NotBuilt,
            "aborted" => Self::Aborted,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unstable => "unstable",
            Self::Building => "building",
            Self::Disabled => "disabled",
            Self::NotBuilt => "not_built",
            Self::Aborted => "aborted",
            Self::Unknown => "unknown",
        }
    }

    pub fn display_color(self) -> &'static str {
        match self {
            Self::Success => "green",
            Self::Failure => "red",
            Self::Unstable => "orange",
            Self::Building => "blue",
            Self::Disabled | Self::NotBuilt | Self::Aborted | Self::Unknown => "gray",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => ":white_check_mark:",
            Self::Failure => ":x:",
            Self::Unstable => ":warning:",
            Self::Building => ":arrows_counterclockwise:",
            Self::Disabled => ":no_entry_sign:",
            Self::NotBuilt => ":white_circle:",
            Self::Aborted => ":stop_button:",
            Self::Unknown => ":grey_question:",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
