//! Build pipeline
//!
//! [`BuildOrchestrator`] runs the four lifecycle phases for one application
//! inside a throwaway workspace, tracking progress in a [`BuildState`].

mod orchestrator;
mod state;

pub use orchestrator::{BuildOrchestrator, BuildOutcome, BuildRequest};
pub use state::{BuildState, BuildStep};
