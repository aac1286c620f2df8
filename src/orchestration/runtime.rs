//! Container runtime abstraction
//!
//! The orchestrator only needs to run a container to completion, so the
//! capability is that one operation plus an availability probe. Tests
//! drive the orchestrator with a recording fake.

use crate::error::PackResult;
use crate::orchestration::container::{ContainerConfig, OutputMode, RunOutcome};
use async_trait::async_trait;

/// Abstract container runtime interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Check if the runtime is available on this system
    async fn is_available(&self) -> PackResult<bool>;

    /// Run a container until it exits.
    ///
    /// `Ok` means the container launched, whatever its exit code; `Err`
    /// means it could not be launched at all.
    async fn run(&self, config: &ContainerConfig, output: OutputMode) -> PackResult<RunOutcome>;

    /// Get the human-readable runtime name for display
    fn runtime_name(&self) -> &str;
}
