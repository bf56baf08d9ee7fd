use crate::aws::{self, JsonClient, Protocol, ServiceError};
use crate::credentials::Credentials;
use crate::model::{BuildPhase, BuildState, BuildStatus, LogLocation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const SIGNING_NAME: &str = "codebuild";
const TARGET_PREFIX: &str = "CodeBuild_20161006";

/// Build orchestration operations the poller depends on.
pub trait BuildService {
    /// Every project name, sorted by name descending.
    fn list_projects(&self) -> Result<Vec<String>, ServiceError>;

    /// Starts a build and returns its identifier.
    fn start_build(&self, project: &str) -> Result<String, ServiceError>;

    /// Current details of a build, or `None` when the service does not know the id.
    fn get_build(&self, build_id: &str) -> Result<Option<BuildState>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct CodeBuildClient {
    client: JsonClient,
}

impl CodeBuildClient {
    pub fn new(credentials: &Credentials, endpoint: Option<&str>) -> Result<Self, ServiceError> {
        let endpoint = aws::endpoint_or_default(endpoint, SIGNING_NAME, &credentials.region);
        let client = JsonClient::new(
            credentials,
            SIGNING_NAME,
            TARGET_PREFIX,
            Protocol::Json11,
            &endpoint,
        )?;
        Ok(Self { client })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsRequest<'a> {
    sort_by: &'a str,
    sort_order: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<String>,
    next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBuildRequest<'a> {
    project_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartBuildResponse {
    build: BuildRef,
}

#[derive(Debug, Deserialize)]
struct BuildRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct BatchGetBuildsRequest<'a> {
    ids: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetBuildsResponse {
    #[serde(default)]
    pub builds: Vec<BuildRecord>,
    #[serde(default)]
    pub builds_not_found: Vec<String>,
}

/// One build as the service reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub id: String,
    pub build_status: BuildStatus,
    #[serde(default)]
    pub phases: Vec<PhaseRecord>,
    pub logs: Option<LogsRecord>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseRecord {
    pub phase_type: String,
    pub phase_status: Option<BuildStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsRecord {
    pub group_name: Option<String>,
    pub stream_name: Option<String>,
}

impl From<BuildRecord> for BuildState {
    fn from(record: BuildRecord) -> Self {
        let log_location = record
            .logs
            .map(|logs| LogLocation {
                group_name: logs.group_name,
                stream_name: logs.stream_name,
            })
            .unwrap_or_default();

        BuildState {
            id: record.id,
            status: record.build_status,
            phases: record
                .phases
                .into_iter()
                .map(|phase| BuildPhase {
                    phase_type: phase.phase_type,
                    phase_status: phase.phase_status,
                })
                .collect(),
            log_location,
            start_time: record.start_time.and_then(epoch_seconds),
            end_time: record.end_time.and_then(epoch_seconds),
        }
    }
}

fn epoch_seconds(seconds: f64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos((seconds * 1e9) as i128).ok()
}

impl BuildService for CodeBuildClient {
    fn list_projects(&self) -> Result<Vec<String>, ServiceError> {
        let mut projects = Vec::new();
        let mut next_token = None;

        loop {
            let page: ListProjectsResponse = self.client.call(
                "ListProjects",
                &ListProjectsRequest {
                    sort_by: "NAME",
                    sort_order: "DESCENDING",
                    next_token: next_token.take(),
                },
            )?;
            projects.extend(page.projects);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(projects)
    }

    fn start_build(&self, project: &str) -> Result<String, ServiceError> {
        let response: StartBuildResponse = self.client.call(
            "StartBuild",
            &StartBuildRequest {
                project_name: project,
            },
        )?;
        Ok(response.build.id)
    }

    fn get_build(&self, build_id: &str) -> Result<Option<BuildState>, ServiceError> {
        let response: BatchGetBuildsResponse = self
            .client
            .call("BatchGetBuilds", &BatchGetBuildsRequest { ids: [build_id] })?;

        Ok(response
            .builds
            .into_iter()
            .find(|build| build.id == build_id)
            .map(BuildState::from))
    }
}
