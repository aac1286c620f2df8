//! Persistent per-application cache directories
//!
//! Each application gets `<cache root>/<sha256(absolute app dir)>/`, by
//! default under `~/.pack/cache`. The contents belong to the build phase
//! container; pack only creates, locates and clears the directory.

pub mod key;

use crate::config::{schema::CacheConfig, ConfigManager};
use crate::error::{PackError, PackResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const CACHE_DIR_MODE: u32 = 0o755;

/// Maps application directories to their cache directories
#[derive(Debug, Clone)]
pub struct CacheResolver {
    root: PathBuf,
}

impl CacheResolver {
    /// Create a resolver rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use the configured root, or `~/.pack/cache`
    pub fn from_config(config: &CacheConfig) -> PackResult<Self> {
        let root = match &config.root {
            Some(root) => root.clone(),
            None => ConfigManager::default_cache_root()?,
        };
        Ok(Self::new(root))
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compute the cache directory for `app_dir` without touching disk
    pub fn path_for(&self, app_dir: &Path) -> PackResult<PathBuf> {
        let absolute = key::absolutize(app_dir)?;
        Ok(self.root.join(key::digest(&absolute)))
    }

    /// Compute and create the cache directory for `app_dir`
    pub fn resolve(&self, app_dir: &Path) -> PackResult<PathBuf> {
        let dir = self.path_for(app_dir)?;
        if dir.is_dir() {
            debug!("Reusing cache dir {}", dir.display());
            return Ok(dir);
        }

        fs::create_dir_all(&dir)
            .map_err(|e| PackError::io(format!("creating cache dir {}", dir.display()), e))?;

        // Mode is set on creation only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dir, fs::Permissions::from_mode(CACHE_DIR_MODE))
                .map_err(|e| PackError::io("setting cache dir permissions", e))?;
        }

        debug!("Cache dir for {}: {}", app_dir.display(), dir.display());
        Ok(dir)
    }

    /// Remove the cache directory for `app_dir`. Returns whether it existed.
    pub fn clear(&self, app_dir: &Path) -> PackResult<bool> {
        let dir = self.path_for(app_dir)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PackError::io(
                format!("removing cache dir {}", dir.display()),
                e,
            )),
        }
    }
}
