//! Lifecycle phases and their container contract
//!
//! | Phase   | Mounts                                              | Socket | User | Args                                       | Output   |
//! |---------|-----------------------------------------------------|--------|------|--------------------------------------------|----------|
//! | detect  | launch/app:/launch/app, workspace:/workspace        | no     | -    | -                                          | streamed |
//! | analyze | launch:/launch, workspace:/workspace:ro             | yes    | -    | -daemon <repo>                             | captured |
//! | build   | launch, workspace, cache:/cache, platform:/platform | no     | -    | -                                          | streamed |
//! | export  | launch:/launch:ro, workspace:/workspace:ro          | yes    | 0    | -daemon -daemon-stack -stack <stack> <repo> | captured |

use crate::orchestration::container::{OutputMode, VolumeBinding};
use crate::workspace::Workspace;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One step of the build lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Detect,
    Analyze,
    Build,
    Export,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [Phase::Detect, Phase::Analyze, Phase::Build, Phase::Export];

    /// Tag suffix and display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Detect => "detect",
            Self::Analyze => "analyze",
            Self::Build => "build",
            Self::Export => "export",
        }
    }

    /// Progress header shown before the phase starts
    pub fn header(&self) -> &'static str {
        match self {
            Self::Detect => "DETECTING",
            Self::Analyze => "ANALYZING",
            Self::Build => "BUILDING",
            Self::Export => "EXPORTING",
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::Analyze => Some("Reading information from previous image for possible re-use"),
            _ => None,
        }
    }

    /// Phase image for `stack`
    pub fn image(&self, stack: &str) -> String {
        format!("{}:{}", stack, self.name())
    }

    /// Detect and build progress is streamed; analyze and export are only
    /// shown when they fail.
    pub fn output_mode(&self) -> OutputMode {
        match self {
            Self::Detect | Self::Build => OutputMode::Stream,
            Self::Analyze | Self::Export => OutputMode::Capture,
        }
    }

    /// Whether the runtime control socket is mounted
    pub fn needs_socket(&self) -> bool {
        matches!(self, Self::Analyze | Self::Export)
    }

    /// Whether the phase runs as the elevated user
    pub fn privileged(&self) -> bool {
        matches!(self, Self::Export)
    }

    /// Volume bindings, in order
    pub fn mounts(&self, ctx: &PhaseContext) -> Vec<VolumeBinding> {
        match self {
            Self::Detect => vec![
                VolumeBinding::rw(&ctx.app_dir, "/launch/app"),
                VolumeBinding::rw(&ctx.workspace_dir, "/workspace"),
            ],
            Self::Analyze => vec![
                VolumeBinding::rw(&ctx.launch_dir, "/launch"),
                VolumeBinding::ro(&ctx.workspace_dir, "/workspace"),
            ],
            Self::Build => vec![
                VolumeBinding::rw(&ctx.launch_dir, "/launch"),
                VolumeBinding::rw(&ctx.workspace_dir, "/workspace"),
                VolumeBinding::rw(&ctx.cache_dir, "/cache"),
                VolumeBinding::rw(&ctx.platform_dir, "/platform"),
            ],
            Self::Export => vec![
                VolumeBinding::ro(&ctx.launch_dir, "/launch"),
                VolumeBinding::ro(&ctx.workspace_dir, "/workspace"),
            ],
        }
    }

    /// Arguments passed to the phase image
    pub fn args(&self, ctx: &PhaseContext) -> Vec<String> {
        match self {
            Self::Detect | Self::Build => vec![],
            Self::Analyze => vec!["-daemon".to_string(), ctx.repo.clone()],
            Self::Export => vec![
                "-daemon".to_string(),
                "-daemon-stack".to_string(),
                "-stack".to_string(),
                ctx.stack.clone(),
                ctx.repo.clone(),
            ],
        }
    }

    /// Full invocation of this phase for one build
    pub fn invocation(&self, ctx: &PhaseContext) -> PhaseInvocation {
        PhaseInvocation {
            phase: *self,
            image: self.image(&ctx.stack),
            mounts: self.mounts(ctx),
            args: self.args(ctx),
            needs_socket: self.needs_socket(),
            privileged: self.privileged(),
            output: self.output_mode(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host paths and names shared by all phases of one build
#[derive(Debug, Clone)]
pub struct PhaseContext {
    pub app_dir: PathBuf,
    pub launch_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub stack: String,
    pub repo: String,
}

impl PhaseContext {
    pub fn new(
        workspace: &Workspace,
        cache_dir: &Path,
        stack: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            app_dir: workspace.app_dir(),
            launch_dir: workspace.launch_dir(),
            workspace_dir: workspace.workspace_dir(),
            platform_dir: workspace.platform_dir(),
            cache_dir: cache_dir.to_path_buf(),
            stack: stack.into(),
            repo: repo.into(),
        }
    }
}

/// Everything needed to run one phase container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseInvocation {
    pub phase: Phase,
    pub image: String,
    pub mounts: Vec<VolumeBinding>,
    pub args: Vec<String>,
    pub needs_socket: bool,
    pub privileged: bool,
    pub output: OutputMode,
}
