//! Build history
//!
//! Appends one JSON line per build event to `~/.local/state/pack/builds.log`.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based build log that appends JSON lines
#[derive(Debug, Clone)]
pub struct BuildLog {
    enabled: bool,
    path: PathBuf,
}

impl BuildLog {
    /// Create a build log from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.build_log,
            path: ConfigManager::build_log_path(),
        }
    }

    /// Build log writing to `path`
    pub fn with_path(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            enabled,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event. IO failures are logged and otherwise ignored; the
    /// build result never depends on the history.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize build event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write build log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn writes_json_line() {
        let dir = TempDir::new().unwrap();
        let log = BuildLog::with_path(dir.path().join("builds.log"), true);

        log.log("build.started", &serde_json::json!({"repo": "myapp"}))
            .await;

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();

        assert_eq!(parsed["event"], "build.started");
        assert_eq!(parsed["data"]["repo"], "myapp");
        assert!(parsed["timestamp"].is_string());
    }

    #[tokio::test]
    async fn appends_multiple_lines() {
        let dir = TempDir::new().unwrap();
        let log = BuildLog::with_path(dir.path().join("nested").join("builds.log"), true);

        log.log("build.started", &serde_json::json!({})).await;
        log.log("build.completed", &serde_json::json!({})).await;

        let content = tokio::fs::read_to_string(log.path()).await.unwrap();
        assert_eq!(content.trim().lines().count(), 2);
    }

    #[tokio::test]
    async fn skips_when_disabled() {
        let dir = TempDir::new().unwrap();
        let log = BuildLog::with_path(dir.path().join("builds.log"), false);

        log.log("build.started", &serde_json::json!({})).await;

        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn unwritable_path_is_ignored() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let log = BuildLog::with_path(blocker.join("builds.log"), true);

        // Must not panic or error
        log.log("build.started", &serde_json::json!({})).await;
    }
}
