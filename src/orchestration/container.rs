//! Container invocation types
//!
//! Plain data describing one `run` of a container. Runtimes render it to
//! their command line; tests inspect it directly.

use std::fmt;
use std::path::PathBuf;

/// Access mode of a volume binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    ReadWrite,
    ReadOnly,
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadWrite => write!(f, "rw"),
            Self::ReadOnly => write!(f, "ro"),
        }
    }
}

/// Host path bound into the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    pub host_path: PathBuf,
    pub container_path: String,
    pub mode: MountMode,
}

impl VolumeBinding {
    /// Read-write binding
    pub fn rw(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode: MountMode::ReadWrite,
        }
    }

    /// Read-only binding
    pub fn ro(host_path: impl Into<PathBuf>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode: MountMode::ReadOnly,
        }
    }

    /// `-v` value: `host:container` (read-write) or `host:container:ro`
    pub fn to_arg(&self) -> String {
        match self.mode {
            MountMode::ReadWrite => {
                format!("{}:{}", self.host_path.display(), self.container_path)
            }
            MountMode::ReadOnly => {
                format!("{}:{}:ro", self.host_path.display(), self.container_path)
            }
        }
    }
}

/// How a run's output is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Forward lines to the terminal as they arrive
    Stream,
    /// Collect silently
    Capture,
}

/// Configuration for one container run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Image reference (`stack:phase`)
    pub image: String,
    /// Volume bindings, in order
    pub volumes: Vec<VolumeBinding>,
    /// User to run as (`--user`)
    pub user: Option<String>,
    /// Arguments passed to the image entrypoint
    pub args: Vec<String>,
}

impl ContainerConfig {
    /// Arguments after the runtime binary: `run [--user u] -v ... image args...`
    pub fn run_args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string()];

        if let Some(ref user) = self.user {
            args.push("--user".to_string());
            args.push(user.clone());
        }

        for v in &self.volumes {
            args.push("-v".to_string());
            args.push(v.to_arg());
        }

        args.push(self.image.clone());
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Result of a container run that launched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutcome {
    /// Exit code, `None` if terminated by a signal
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_args() {
        assert_eq!(
            VolumeBinding::rw("/tmp/ws/launch", "/launch").to_arg(),
            "/tmp/ws/launch:/launch"
        );
        assert_eq!(
            VolumeBinding::ro("/tmp/ws/workspace", "/workspace").to_arg(),
            "/tmp/ws/workspace:/workspace:ro"
        );
    }

    #[test]
    fn run_args_order() {
        let config = ContainerConfig {
            image: "heroku-18:export".to_string(),
            volumes: vec![
                VolumeBinding::rw("/var/run/docker.sock", "/var/run/docker.sock"),
                VolumeBinding::ro("/w/launch", "/launch"),
            ],
            user: Some("0".to_string()),
            args: vec!["-daemon".to_string(), "myapp".to_string()],
        };

        assert_eq!(
            config.run_args(),
            vec![
                "run",
                "--user",
                "0",
                "-v",
                "/var/run/docker.sock:/var/run/docker.sock",
                "-v",
                "/w/launch:/launch:ro",
                "heroku-18:export",
                "-daemon",
                "myapp",
            ]
        );
    }

    #[test]
    fn outcome_success() {
        assert!(RunOutcome {
            exit_code: Some(0),
            output: String::new()
        }
        .success());
        assert!(!RunOutcome {
            exit_code: Some(1),
            output: String::new()
        }
        .success());
        assert!(!RunOutcome::default().success());
    }
}
