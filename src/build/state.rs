//! Build state machine
//!
//! ```text
//! Idle -> WorkspaceCreated -> AppStaged -> Detected -> Analyzed -> Built -> Exported
//!   \            \                \            \           \         \
//!    `------------`----------------`------------`-----------`---------`--> Failed(step)
//! ```

use crate::error::{PackError, PackResult};
use crate::orchestration::Phase;
use std::fmt;

/// Where a build failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// Creating the workspace
    Workspace,
    /// Resolving the cache directory or staging the app
    Prepare,
    /// Running a phase
    Phase(Phase),
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace => f.write_str("workspace"),
            Self::Prepare => f.write_str("prepare"),
            Self::Phase(phase) => write!(f, "{}", phase),
        }
    }
}

/// Progress of a single build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Idle,
    WorkspaceCreated,
    AppStaged,
    Detected,
    Analyzed,
    Built,
    Exported,
    Failed(BuildStep),
}

impl BuildState {
    /// Phase to run next, if the build is in the phase sequence
    pub fn next_phase(&self) -> Option<Phase> {
        match self {
            Self::AppStaged => Some(Phase::Detect),
            Self::Detected => Some(Phase::Analyze),
            Self::Analyzed => Some(Phase::Build),
            Self::Built => Some(Phase::Export),
            _ => None,
        }
    }

    /// Workspace acquired
    pub fn workspace_created(self) -> PackResult<Self> {
        match self {
            Self::Idle => Ok(Self::WorkspaceCreated),
            other => Err(invalid(other, "workspace created")),
        }
    }

    /// App source staged (cache resolved)
    pub fn app_staged(self) -> PackResult<Self> {
        match self {
            Self::WorkspaceCreated => Ok(Self::AppStaged),
            other => Err(invalid(other, "app staged")),
        }
    }

    /// `phase` completed successfully
    pub fn phase_completed(self, phase: Phase) -> PackResult<Self> {
        if self.next_phase() != Some(phase) {
            return Err(invalid(self, phase.name()));
        }
        Ok(match phase {
            Phase::Detect => Self::Detected,
            Phase::Analyze => Self::Analyzed,
            Phase::Build => Self::Built,
            Phase::Export => Self::Exported,
        })
    }

    /// Terminal failure at whatever step was in progress
    pub fn fail(self) -> Self {
        match self {
            Self::Idle => Self::Failed(BuildStep::Workspace),
            Self::WorkspaceCreated => Self::Failed(BuildStep::Prepare),
            Self::Failed(step) => Self::Failed(step),
            other => match other.next_phase() {
                Some(phase) => Self::Failed(BuildStep::Phase(phase)),
                // Exported is terminal; nothing left to fail.
                None => other,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exported | Self::Failed(_))
    }
}

fn invalid(state: BuildState, event: &str) -> PackError {
    PackError::Internal(format!("invalid build transition: {} in {:?}", event, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_sequence() {
        let mut state = BuildState::Idle
            .workspace_created()
            .unwrap()
            .app_staged()
            .unwrap();

        let mut ran = Vec::new();
        while let Some(phase) = state.next_phase() {
            ran.push(phase);
            state = state.phase_completed(phase).unwrap();
        }

        assert_eq!(ran, Phase::ALL.to_vec());
        assert_eq!(state, BuildState::Exported);
        assert!(state.is_terminal());
    }

    #[test]
    fn phases_cannot_be_skipped() {
        let state = BuildState::AppStaged;
        assert!(state.phase_completed(Phase::Analyze).is_err());
        assert!(BuildState::Idle.phase_completed(Phase::Detect).is_err());
        assert!(BuildState::Exported.phase_completed(Phase::Export).is_err());
    }

    #[test]
    fn fail_records_step_in_progress() {
        assert_eq!(
            BuildState::Idle.fail(),
            BuildState::Failed(BuildStep::Workspace)
        );
        assert_eq!(
            BuildState::WorkspaceCreated.fail(),
            BuildState::Failed(BuildStep::Prepare)
        );
        assert_eq!(
            BuildState::Detected.fail(),
            BuildState::Failed(BuildStep::Phase(Phase::Analyze))
        );
        assert_eq!(BuildState::Exported.fail(), BuildState::Exported);
        assert!(BuildState::Detected.fail().is_terminal());
    }

    #[test]
    fn failed_state_has_no_next_phase() {
        assert_eq!(
            BuildState::Failed(BuildStep::Phase(Phase::Detect)).next_phase(),
            None
        );
    }

    #[test]
    fn step_display() {
        assert_eq!(BuildStep::Phase(Phase::Build).to_string(), "build");
        assert_eq!(BuildStep::Prepare.to_string(), "prepare");
    }
}
