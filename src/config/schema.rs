//! Configuration schema for pack
//!
//! Configuration is stored at `~/.config/pack/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container runtime settings
    pub runtime: RuntimeConfig,

    /// Cache settings
    pub cache: CacheConfig,

    /// Ephemeral workspace settings
    pub workspace: WorkspaceConfig,

    /// Build defaults
    pub build: BuildConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append every build to the build history log
    pub build_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            build_log: true,
        }
    }
}

/// Container runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Docker-compatible CLI to invoke
    pub binary: String,

    /// Host path of the runtime control socket
    pub socket: PathBuf,

    /// User the export phase runs as
    pub export_user: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            socket: PathBuf::from("/var/run/docker.sock"),
            export_user: "0".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root override (default: `~/.pack/cache`)
    pub root: Option<PathBuf>,
}

/// Workspace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Parent directory for build workspaces (default: OS temp dir)
    pub temp_root: Option<PathBuf>,

    /// Name prefix for workspace directories
    pub prefix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            prefix: "lifecycle.pack.build.".to_string(),
        }
    }
}

/// Build defaults applied when flags are omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Stack used when `--stack` is not given
    pub default_stack: Option<String>,
}
