//! Build orchestration
//!
//! Drives one build through the state machine: workspace, cache dir, app
//! staging, then detect, analyze, build and export. The first failure ends
//! the build. The workspace is removed on every exit path.

use crate::build::state::BuildState;
use crate::cache::CacheResolver;
use crate::config::Config;
use crate::error::{PackError, PackResult};
use crate::history::BuildLog;
use crate::orchestration::{ContainerRuntime, PhaseContext, PhaseRunner};
use crate::stage::{self, StageReport};
use crate::ui::UiContext;
use crate::workspace::{Workspace, WorkspaceManager};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A request to build one application image
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Application source directory
    pub app_dir: PathBuf,
    /// Stack name, used as the phase image prefix
    pub stack: String,
    /// Name of the image to produce
    pub repo: String,
    /// Build against the local daemon (the only supported mode)
    pub use_daemon: bool,
}

impl BuildRequest {
    /// Daemon build of `app_dir`
    pub fn new(app_dir: impl Into<PathBuf>, stack: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            app_dir: app_dir.into(),
            stack: stack.into(),
            repo: repo.into(),
            use_daemon: true,
        }
    }

    pub fn with_daemon(mut self, use_daemon: bool) -> Self {
        self.use_daemon = use_daemon;
        self
    }

    fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "app_dir": self.app_dir,
            "stack": self.stack,
            "repo": self.repo,
        })
    }
}

/// Result of a successful build
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub repo: String,
    pub stack: String,
    /// Cache directory used by the build phase
    pub cache_dir: PathBuf,
    pub staged: StageReport,
    pub elapsed: Duration,
}

/// Composes workspace, cache, staging and phases into a build
pub struct BuildOrchestrator {
    workspaces: WorkspaceManager,
    cache: CacheResolver,
    runner: PhaseRunner,
    history: Option<BuildLog>,
    cancel: Arc<AtomicBool>,
}

impl BuildOrchestrator {
    pub fn new(workspaces: WorkspaceManager, cache: CacheResolver, runner: PhaseRunner) -> Self {
        Self {
            workspaces,
            cache,
            runner,
            history: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Orchestrator wired from configuration
    pub fn from_config(
        config: &Config,
        runtime: Arc<dyn ContainerRuntime>,
        ui: UiContext,
    ) -> PackResult<Self> {
        let orchestrator = Self::new(
            WorkspaceManager::from_config(&config.workspace),
            CacheResolver::from_config(&config.cache)?,
            PhaseRunner::new(runtime, &config.runtime, ui),
        );
        Ok(orchestrator.with_history(BuildLog::new(config)))
    }

    /// Record build events in `log`
    pub fn with_history(mut self, log: BuildLog) -> Self {
        self.history = Some(log);
        self
    }

    /// Flag checked before each phase; setting it stops the build there.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Build an image from `request.app_dir`
    pub async fn build(&self, request: &BuildRequest) -> PackResult<BuildOutcome> {
        if !request.use_daemon {
            return Err(PackError::UnsupportedMode);
        }

        self.record("build.started", request.summary()).await;

        let mut state = BuildState::Idle;
        let result = self.execute(request, &mut state).await;

        match &result {
            Ok(outcome) => {
                info!("Built {} in {:.1?}", outcome.repo, outcome.elapsed);
                let mut data = request.summary();
                data["cache_dir"] = serde_json::json!(outcome.cache_dir);
                data["elapsed_ms"] = serde_json::json!(outcome.elapsed.as_millis() as u64);
                self.record("build.completed", data).await;
            }
            Err(e) => {
                let failed = state.fail();
                debug!("Build of {} ended in {:?}", request.repo, failed);
                let mut data = request.summary();
                if let BuildState::Failed(step) = failed {
                    data["step"] = serde_json::json!(step.to_string());
                }
                data["error"] = serde_json::json!(e.to_string());
                self.record("build.failed", data).await;
            }
        }

        result
    }

    async fn execute(
        &self,
        request: &BuildRequest,
        state: &mut BuildState,
    ) -> PackResult<BuildOutcome> {
        let started = Instant::now();

        let workspace = self.workspaces.create()?;
        *state = state.workspace_created()?;
        info!("Workspace: {}", workspace.root().display());

        let result = self.run_in_workspace(&workspace, request, state).await;

        if let Err(e) = workspace.destroy() {
            warn!("{}", e);
        }

        let (cache_dir, staged) = result?;
        Ok(BuildOutcome {
            repo: request.repo.clone(),
            stack: request.stack.clone(),
            cache_dir,
            staged,
            elapsed: started.elapsed(),
        })
    }

    async fn run_in_workspace(
        &self,
        workspace: &Workspace,
        request: &BuildRequest,
        state: &mut BuildState,
    ) -> PackResult<(PathBuf, StageReport)> {
        let cache_dir = self.cache.resolve(&request.app_dir)?;
        info!("Cache: {}", cache_dir.display());

        let staged = stage::stage_app(request.app_dir.clone(), workspace.app_dir()).await?;
        *state = state.app_staged()?;

        let ctx = PhaseContext::new(workspace, &cache_dir, &request.stack, &request.repo);

        while let Some(phase) = state.next_phase() {
            if self.cancel.load(Ordering::SeqCst) {
                return Err(PackError::Cancelled { before: phase });
            }
            self.runner.run(&phase.invocation(&ctx)).await?;
            *state = state.phase_completed(phase)?;
        }

        Ok((cache_dir, staged))
    }

    async fn record(&self, event: &str, data: serde_json::Value) {
        if let Some(ref history) = self.history {
            history.log(event, &data).await;
        }
    }
}
