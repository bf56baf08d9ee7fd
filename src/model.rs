use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

pub const NO_STATUS: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    InProgress,
    Succeeded,
    Failed,
    Fault,
    TimedOut,
    Stopped,
    Other(String),
}

impl BuildStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BuildStatus::InProgress => "IN_PROGRESS",
            BuildStatus::Succeeded => "SUCCEEDED",
            BuildStatus::Failed => "FAILED",
            BuildStatus::Fault => "FAULT",
            BuildStatus::TimedOut => "TIMED_OUT",
            BuildStatus::Stopped => "STOPPED",
            BuildStatus::Other(raw) => raw,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Succeeded)
    }
}

impl From<String> for BuildStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "IN_PROGRESS" => BuildStatus::InProgress,
            "SUCCEEDED" => BuildStatus::Succeeded,
            "FAILED" => BuildStatus::Failed,
            "FAULT" => BuildStatus::Fault,
            "TIMED_OUT" => BuildStatus::TimedOut,
            "STOPPED" => BuildStatus::Stopped,
            _ => BuildStatus::Other(raw),
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(raw: &str) -> Self {
        BuildStatus::from(raw.to_string())
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPhase {
    pub phase_type: String,
    pub phase_status: Option<BuildStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogLocation {
    pub group_name: Option<String>,
    pub stream_name: Option<String>,
}

impl LogLocation {
    pub fn new(group: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            group_name: Some(group.into()),
            stream_name: Some(stream.into()),
        }
    }

    /// Both identifiers, when the build has produced log output.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match (self.group_name.as_deref(), self.stream_name.as_deref()) {
            (Some(group), Some(stream)) if !group.is_empty() && !stream.is_empty() => {
                Some((group, stream))
            }
            _ => None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.parts().is_some()
    }
}

/// Snapshot of one remote build as of the latest poll.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildState {
    pub id: String,
    pub status: BuildStatus,
    pub phases: Vec<BuildPhase>,
    pub log_location: LogLocation,
    pub start_time: Option<OffsetDateTime>,
    pub end_time: Option<OffsetDateTime>,
}

impl BuildState {
    pub fn elapsed_ms(&self) -> Option<i64> {
        let start = self.start_time?;
        let end = self.end_time?;
        Some((end - start).whole_milliseconds() as i64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseView {
    pub phase_type: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: Option<i64>,
    pub message: String,
}
