//! Loading and saving `config.toml`
//!
//! Every setting has a default, so a missing file is the same as an empty
//! one. Values the build depends on are checked at load time, so a bad
//! `runtime.binary` or `workspace.prefix` is reported against the file
//! instead of surfacing mid-build.

pub mod schema;

pub use schema::Config;

use crate::error::{PackError, PackResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes one `config.toml`, and knows where pack keeps its files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager for `<config_dir>/pack/config.toml`
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Manager for an explicit file (`--config` / `PACK_CONFIG`)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pack")
            .join("config.toml")
    }

    /// Per-user state directory; holds the build history
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pack")
    }

    pub fn build_log_path() -> PathBuf {
        Self::state_dir().join("builds.log")
    }

    /// `<home>/.pack/cache`, used when `cache.root` is unset
    pub fn default_cache_root() -> PackResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            PackError::io(
                "locating home directory",
                std::io::Error::new(std::io::ErrorKind::NotFound, "no home directory"),
            )
        })?;
        Ok(home.join(".pack").join("cache"))
    }

    /// Load and validate the file. Defaults apply when it does not exist.
    pub async fn load(&self) -> PackResult<Config> {
        let config = match fs::read_to_string(&self.config_path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| self.invalid(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.config_path.display());
                Config::default()
            }
            Err(e) => {
                return Err(PackError::io(
                    format!("reading config from {}", self.config_path.display()),
                    e,
                ))
            }
        };

        validate(&config).map_err(|reason| self.invalid(reason))?;
        Ok(config)
    }

    /// Write `config`, creating the parent directory
    pub async fn save(&self, config: &Config) -> PackResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PackError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            PackError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn invalid(&self, reason: String) -> PackError {
        PackError::ConfigInvalid {
            path: self.config_path.clone(),
            reason,
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings a build cannot start with
pub(crate) fn validate(config: &Config) -> Result<(), String> {
    if !matches!(config.general.log_format.as_str(), "text" | "json") {
        return Err(format!(
            "general.log_format must be \"text\" or \"json\", got \"{}\"",
            config.general.log_format
        ));
    }
    if config.runtime.binary.trim().is_empty() {
        return Err("runtime.binary is empty".to_string());
    }
    if config.runtime.export_user.trim().is_empty() {
        return Err("runtime.export_user is empty".to_string());
    }
    let prefix = &config.workspace.prefix;
    if prefix.is_empty() || prefix.contains('/') {
        return Err(format!(
            "workspace.prefix must be a non-empty file name prefix, got \"{}\"",
            prefix
        ));
    }
    Ok(())
}
