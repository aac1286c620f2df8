//! Build command - run the lifecycle against an app directory

use crate::build::{BuildOrchestrator, BuildRequest};
use crate::cli::args::BuildArgs;
use crate::cli::commands::app_dir_or_cwd;
use crate::config::Config;
use crate::error::{PackError, PackResult};
use crate::orchestration::CliRuntime;
use crate::ui::{self, UiContext};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> PackResult<()> {
    let ctx = UiContext::detect();

    let app_dir = app_dir_or_cwd(args.path)?;
    let stack = args
        .stack
        .or_else(|| config.build.default_stack.clone())
        .unwrap_or_default();

    let request = BuildRequest::new(app_dir, stack, args.repo_name).with_daemon(!args.no_daemon);
    if request.use_daemon && request.stack.is_empty() {
        return Err(PackError::User(
            "No stack given. Pass --stack or set build.default_stack".to_string(),
        ));
    }

    let runtime = Arc::new(CliRuntime::new(config.runtime.binary.clone()));
    let orchestrator = BuildOrchestrator::from_config(config, runtime, ctx)?;
    debug!("Building {} from {}", request.repo, request.app_dir.display());

    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; stopping before the next phase");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let outcome = match orchestrator.build(&request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.failed_phase().is_some() {
                ui::outro_error(&ctx, &format!("Build of {} failed", request.repo));
            }
            return Err(e);
        }
    };

    ui::step_ok_detail(&ctx, "Cache", &outcome.cache_dir.display().to_string());
    ui::outro_success(
        &ctx,
        &format!(
            "Successfully built {} ({:.1}s)",
            outcome.repo,
            outcome.elapsed.as_secs_f64()
        ),
    );
    Ok(())
}
