//! Runs one lifecycle phase
//!
//! Turns a [`PhaseInvocation`] into a container run: mounts the runtime
//! socket for phases that talk to the daemon, switches to the elevated user
//! for privileged phases, and maps non-zero exits and launch failures to
//! `PackError::Phase`.

use crate::config::schema::RuntimeConfig;
use crate::error::{PackError, PackResult};
use crate::orchestration::container::{ContainerConfig, OutputMode, VolumeBinding};
use crate::orchestration::error_tail;
use crate::orchestration::phase::PhaseInvocation;
use crate::orchestration::runtime::ContainerRuntime;
use crate::ui::{self, TaskSpinner, UiContext};
use std::error::Error as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Executes phase invocations against a container runtime
pub struct PhaseRunner {
    runtime: Arc<dyn ContainerRuntime>,
    socket: PathBuf,
    privileged_user: String,
    ui: UiContext,
}

impl PhaseRunner {
    pub fn new(runtime: Arc<dyn ContainerRuntime>, config: &RuntimeConfig, ui: UiContext) -> Self {
        Self {
            runtime,
            socket: config.socket.clone(),
            privileged_user: config.export_user.clone(),
            ui,
        }
    }

    /// Container configuration for an invocation
    pub fn container_config(&self, invocation: &PhaseInvocation) -> ContainerConfig {
        let mut volumes = Vec::with_capacity(invocation.mounts.len() + 1);
        if invocation.needs_socket {
            volumes.push(VolumeBinding::rw(
                &self.socket,
                self.socket.display().to_string(),
            ));
        }
        volumes.extend(invocation.mounts.iter().cloned());

        ContainerConfig {
            image: invocation.image.clone(),
            volumes,
            user: invocation
                .privileged
                .then(|| self.privileged_user.clone()),
            args: invocation.args.clone(),
        }
    }

    /// Run the phase to completion
    pub async fn run(&self, invocation: &PhaseInvocation) -> PackResult<()> {
        let phase = invocation.phase;
        ui::phase_header(&self.ui, phase);

        let config = self.container_config(invocation);
        debug!("Running {} phase with image {}", phase, config.image);

        match invocation.output {
            OutputMode::Stream => {
                let outcome = self
                    .runtime
                    .run(&config, OutputMode::Stream)
                    .await
                    .map_err(|e| PackError::phase(phase, describe(&e)))?;

                if !outcome.success() {
                    // Already on screen; keep the tail for the error.
                    return Err(PackError::phase(phase, error_tail(&outcome.output)));
                }
            }
            OutputMode::Capture => {
                let mut spinner = TaskSpinner::new(&self.ui);
                spinner.start(&format!("Running {}...", phase));

                let result = self.runtime.run(&config, OutputMode::Capture).await;
                let output = match result {
                    Ok(outcome) if outcome.success() => {
                        spinner.stop(&format!("{} complete", phase));
                        None
                    }
                    Ok(outcome) => Some(outcome.output),
                    Err(e) => Some(describe(&e)),
                };

                if let Some(output) = output {
                    spinner.stop_error(&format!("{} failed", phase));
                    ui::phase_output(&self.ui, &output);
                    return Err(PackError::phase(phase, output));
                }
            }
        }

        info!("{} phase complete", phase);
        Ok(())
    }
}

/// Error message with its source chain, for launch failures
fn describe(err: &PackError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
