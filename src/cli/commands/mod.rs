//! CLI command implementations

pub mod build;
pub mod cache;
pub mod config;
pub mod status;

pub use build::execute as build;
pub use cache::execute as cache;
pub use config::execute as config;
pub use status::execute as status;

use crate::error::{PackError, PackResult};
use std::path::PathBuf;

/// `--path` if given, otherwise the current directory
pub(crate) fn app_dir_or_cwd(path: Option<PathBuf>) -> PackResult<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|e| PackError::io("getting current directory", e)),
    }
}
