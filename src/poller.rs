//! Drives one remote build from submission to its captured log output.

use crate::aws::ServiceError;
use crate::codebuild::BuildService;
use crate::config::PollTiming;
use crate::logs::LogService;
use crate::model::{BuildState, LogLocation, NO_STATUS, PhaseView};
use crate::output;
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("project name must not be empty")]
    EmptyProject,
    #[error("no such project: {0}")]
    ProjectNotFound(String),
    #[error("build {0} was not found")]
    BuildNotFound(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct Poller<B, L> {
    builds: B,
    logs: L,
}

impl<B: BuildService, L: LogService> Poller<B, L> {
    pub fn new(builds: B, logs: L) -> Self {
        Self { builds, logs }
    }

    pub fn builds(&self) -> &B {
        &self.builds
    }

    pub fn logs(&self) -> &L {
        &self.logs
    }

    /// Starts a build of `project`, refusing names the project listing does not contain.
    pub fn start(&self, project: &str) -> Result<String, BuildError> {
        if project.trim().is_empty() {
            return Err(BuildError::EmptyProject);
        }

        let projects = self.builds.list_projects()?;
        if !projects.iter().any(|name| name == project) {
            return Err(BuildError::ProjectNotFound(project.to_string()));
        }

        let build_id = self.builds.start_build(project)?;
        tracing::info!(project, %build_id, "build started");
        Ok(build_id)
    }

    pub fn poll(&self, build_id: &str) -> Result<BuildState, BuildError> {
        let state = self
            .builds
            .get_build(build_id)?
            .ok_or_else(|| BuildError::BuildNotFound(build_id.to_string()))?;

        tracing::debug!(
            build_id,
            status = %state.status,
            phases = state.phases.len(),
            "polled build"
        );
        Ok(state)
    }

    /// Every message of the build's log stream from its head, trimmed, in service order.
    pub fn fetch_logs(&self, location: &LogLocation) -> Result<Vec<String>, BuildError> {
        let Some((group, stream)) = location.parts() else {
            return Ok(Vec::new());
        };

        let mut lines = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let page = self.logs.get_log_events(group, stream, token.as_deref())?;
            if page.events.is_empty() {
                break;
            }

            lines.extend(
                page.events
                    .into_iter()
                    .map(|event| event.message.trim().to_string()),
            );

            match page.next_forward_token {
                Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
                _ => break,
            }
        }

        Ok(lines)
    }

    /// Starts the build, reports its phase at every poll while it is in progress,
    /// then writes its log lines. Returns the first state that is no longer in progress.
    pub fn drive<W, S>(
        &self,
        project: &str,
        timing: &PollTiming,
        out: &mut W,
        mut sleep: S,
    ) -> Result<BuildState, BuildError>
    where
        W: Write,
        S: FnMut(Duration),
    {
        let build_id = self.start(project)?;
        sleep(timing.grace);

        let state = loop {
            let state = self.poll(&build_id)?;
            if !state.status.is_in_progress() {
                break state;
            }

            if let Some(phase) = current_phase(&state) {
                output::print_phase(&mut *out, &phase)?;
            }
            sleep(timing.interval);
        };

        let lines = self.fetch_logs(&state.log_location)?;
        output::print_log_lines(&mut *out, &lines)?;
        Ok(state)
    }
}

/// The latest phase of `state`, with `N/A` standing in for a missing phase status.
pub fn current_phase(state: &BuildState) -> Option<PhaseView> {
    let last = state.phases.last()?;
    Some(PhaseView {
        phase_type: last.phase_type.clone(),
        status: last
            .phase_status
            .as_ref()
            .map(|status| status.as_str().to_string())
            .unwrap_or_else(|| NO_STATUS.to_string()),
    })
}
