//! Docker-CLI container runtime
//!
//! Implements the ContainerRuntime trait by shelling out to `docker`, or any
//! CLI that accepts the same `run` flags (e.g. `podman`).

use crate::error::{PackError, PackResult};
use crate::orchestration::container::{ContainerConfig, OutputMode, RunOutcome};
use crate::orchestration::runtime::ContainerRuntime;
use crate::orchestration::{stream_child_output, OutputSource};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Container runtime backed by a Docker-compatible CLI
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    /// Create a runtime invoking `binary`
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Binary this runtime invokes
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn print_line(source: OutputSource, line: &str) {
        match source {
            OutputSource::Stdout => println!("{}", line),
            OutputSource::Stderr => eprintln!("{}", line),
        }
    }
}

impl Default for CliRuntime {
    fn default() -> Self {
        Self::new("docker")
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn is_available(&self) -> PackResult<bool> {
        let status = Command::new(&self.binary)
            .arg("version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) => Ok(status.success()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PackError::command_failed(
                format!("{} version", self.binary),
                e,
            )),
        }
    }

    async fn run(&self, config: &ContainerConfig, output: OutputMode) -> PackResult<RunOutcome> {
        let args = config.run_args();
        let command_line = format!("{} {}", self.binary, args.join(" "));
        debug!("Executing: {}", command_line);

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PackError::command_failed(&command_line, e))?;

        let lines = match output {
            OutputMode::Stream => stream_child_output(&mut child, &Self::print_line).await?,
            OutputMode::Capture => stream_child_output(&mut child, &|_, _| {}).await?,
        };

        let status = child
            .wait()
            .await
            .map_err(|e| PackError::command_failed(&command_line, e))?;

        debug!("{} exited with {:?}", config.image, status.code());

        Ok(RunOutcome {
            exit_code: status.code(),
            output: lines.join("\n"),
        })
    }

    fn runtime_name(&self) -> &str {
        &self.binary
    }
}
