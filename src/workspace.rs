//! Ephemeral per-build workspace
//!
//! Every build gets a fresh directory tree under the temp root:
//!
//! ```text
//! <temp>/lifecycle.pack.build.<id>/
//!   platform/      empty scaffold mounted into build
//!   launch/        shared by analyze, build and export
//!     app/         staged application source
//!   workspace/     scratch space for detect and build
//! ```
//!
//! The [`Workspace`] handle owns the tree. It is removed recursively by
//! [`Workspace::destroy`], or by `Drop` if the handle goes out of scope first.

use crate::config::schema::WorkspaceConfig;
use crate::error::{PackError, PackResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Scaffold handed to the build phase
pub const PLATFORM_DIR: &str = "platform";
/// Shared launch state
pub const LAUNCH_DIR: &str = "launch";
/// Staged app source, inside `launch/`
pub const APP_DIR: &str = "app";
/// Scratch space
pub const WORKSPACE_DIR: &str = "workspace";

const SUBDIR_MODE: u32 = 0o755;
const ROOT_MODE: u32 = 0o700;
const MAX_NAME_ATTEMPTS: usize = 8;

/// Creates workspaces under a fixed parent directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    temp_root: PathBuf,
    prefix: String,
}

impl WorkspaceManager {
    /// Create a manager placing workspaces in `temp_root`
    pub fn new(temp_root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            temp_root: temp_root.into(),
            prefix: prefix.into(),
        }
    }

    /// Create a manager from configuration, defaulting to the OS temp dir
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        let temp_root = config
            .temp_root
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        Self::new(temp_root, config.prefix.clone())
    }

    /// Directory workspaces are created in
    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Name prefix of every workspace root
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Create a new workspace with its fixed subdirectories
    pub fn create(&self) -> PackResult<Workspace> {
        let root = self.create_root()?;
        // Guard first so a failed subdirectory does not leak the root.
        let workspace = Workspace {
            root,
            released: false,
        };

        for dir in [
            workspace.platform_dir(),
            workspace.launch_dir(),
            workspace.workspace_dir(),
        ] {
            create_dir_with_mode(&dir, SUBDIR_MODE)
                .map_err(|e| PackError::io(format!("creating {}", dir.display()), e))?;
        }

        debug!("Created workspace {}", workspace.root.display());
        Ok(workspace)
    }

    fn create_root(&self) -> PackResult<PathBuf> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = format!("{}{}", self.prefix, Uuid::new_v4().simple());
            let root = self.temp_root.join(name);

            match create_dir_with_mode(&root, ROOT_MODE) {
                Ok(()) => return Ok(root),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(PackError::io(
                        format!("creating workspace in {}", self.temp_root.display()),
                        e,
                    ))
                }
            }
        }

        Err(PackError::io(
            format!("creating workspace in {}", self.temp_root.display()),
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "workspace names exhausted",
            ),
        ))
    }
}

/// Handle to a live workspace tree
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    released: bool,
}

impl Workspace {
    /// Root of the tree
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform_dir(&self) -> PathBuf {
        self.root.join(PLATFORM_DIR)
    }

    pub fn launch_dir(&self) -> PathBuf {
        self.root.join(LAUNCH_DIR)
    }

    /// Where the application source is staged
    pub fn app_dir(&self) -> PathBuf {
        self.launch_dir().join(APP_DIR)
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.root.join(WORKSPACE_DIR)
    }

    /// Remove the whole tree
    pub fn destroy(mut self) -> PackResult<()> {
        self.released = true;
        remove_tree(&self.root)
            .map_err(|e| PackError::io(format!("removing workspace {}", self.root.display()), e))?;
        debug!("Removed workspace {}", self.root.display());
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = remove_tree(&self.root) {
            warn!("Failed to remove workspace {}: {}", self.root.display(), e);
        }
    }
}

fn create_dir_with_mode(path: &Path, mode: u32) -> io::Result<()> {
    fs::create_dir(path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

/// Recursive removal; a missing tree counts as removed.
fn remove_tree(root: &Path) -> io::Result<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            // Staged directories keep the source's mode, which may forbid
            // deleting their children.
            make_dirs_writable(root)?;
            fs::remove_dir_all(root)
        }
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn make_dirs_writable(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let meta = fs::symlink_metadata(dir)?;
    if !meta.is_dir() {
        return Ok(());
    }
    let mode = meta.permissions().mode();
    fs::set_permissions(dir, fs::Permissions::from_mode(mode | 0o700))?;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            make_dirs_writable(&entry.path())?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_dirs_writable(_dir: &Path) -> io::Result<()> {
    Ok(())
}
