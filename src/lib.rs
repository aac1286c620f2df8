//! pack - build container images from application source
//!
//! Stages an application into an ephemeral workspace and runs the
//! detect, analyze, build and export lifecycle phases in containers
//! against the local daemon, reusing a per-application cache directory
//! across builds.

pub mod build;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod orchestration;
pub mod stage;
pub mod ui;
pub mod workspace;

pub use build::{BuildOrchestrator, BuildOutcome, BuildRequest};
pub use error::{PackError, PackResult};
