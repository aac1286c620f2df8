//! Error types for pack
//!
//! All modules use `PackResult<T>` as their return type.

use crate::orchestration::Phase;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pack operations
pub type PackResult<T> = Result<T, PackError>;

/// All errors that can occur in pack
#[derive(Error, Debug)]
pub enum PackError {
    // Build mode errors
    #[error("NOT IMPLEMENTED (must use daemon)")]
    UnsupportedMode,

    // Phase errors
    #[error("{phase} phase failed")]
    Phase { phase: Phase, output: String },

    #[error("Build cancelled before {before} phase")]
    Cancelled { before: Phase },

    // Runtime errors
    #[error("Container runtime not found: {binary}")]
    RuntimeNotFound { binary: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl PackError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a phase failure carrying the output worth showing to the operator
    pub fn phase(phase: Phase, output: impl Into<String>) -> Self {
        Self::Phase {
            phase,
            output: output.into(),
        }
    }

    /// The phase this error was raised by, if any
    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            Self::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedMode => Some("Drop --no-daemon; only daemon builds are supported"),
            Self::RuntimeNotFound { .. } => {
                Some("Install Docker or set runtime.binary to a compatible CLI (e.g. podman)")
            }
            Self::Phase { phase, .. } if *phase == Phase::Detect => {
                Some("No buildpack accepted the app; check the stack and the app directory")
            }
            _ => None,
        }
    }
}
