//! Application source staging
//!
//! Mirrors the app directory into `launch/app` of the build workspace.
//! Directories are created before their children, regular files are copied
//! byte-for-byte and both keep the source's permission bits. Anything else
//! (symlinks, sockets, devices) is skipped.
//!
//! The first failure aborts staging; whatever was copied so far stays behind
//! and is discarded along with the workspace.

use crate::error::{PackError, PackResult};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Summary of a staging run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Directories created (including the destination root)
    pub directories: usize,
    /// Regular files copied
    pub files: usize,
    /// Bytes copied
    pub bytes: u64,
    /// Entries that were neither files nor directories
    pub skipped: usize,
}

/// Stage `src` into `dest` on the blocking pool
pub async fn stage_app(src: PathBuf, dest: PathBuf) -> PackResult<StageReport> {
    tokio::task::spawn_blocking(move || stage_app_blocking(&src, &dest))
        .await
        .map_err(|e| PackError::Internal(format!("staging task failed: {}", e)))?
}

/// Stage `src` into `dest` on the current thread
pub fn stage_app_blocking(src: &Path, dest: &Path) -> PackResult<StageReport> {
    let meta = fs::metadata(src)
        .map_err(|e| PackError::io(format!("reading app dir {}", src.display()), e))?;

    let mut report = StageReport::default();
    if meta.is_dir() {
        copy_dir(src, dest, &meta, &mut report)?;
    } else if meta.is_file() {
        copy_file(src, dest, &meta, &mut report)?;
    } else {
        return Err(PackError::io(
            format!("staging {}", src.display()),
            io::Error::new(io::ErrorKind::InvalidInput, "not a file or directory"),
        ));
    }

    debug!(
        "Staged {} dirs, {} files ({} bytes) into {}",
        report.directories,
        report.files,
        report.bytes,
        dest.display()
    );
    Ok(report)
}

fn copy_dir(src: &Path, dest: &Path, meta: &fs::Metadata, report: &mut StageReport) -> PackResult<()> {
    match fs::create_dir(dest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dest.is_dir() => {}
        Err(e) => return Err(PackError::io(format!("creating {}", dest.display()), e)),
    }
    report.directories += 1;

    // Keep the directory writable while it is populated; the source mode
    // is applied once the children are in place.
    set_mode(dest, mode_of(meta) | 0o700)?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| PackError::io(format!("reading {}", src.display()), e))?
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| PackError::io(format!("reading {}", src.display()), e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| PackError::io(format!("inspecting {}", path.display()), e))?;

        if file_type.is_dir() || file_type.is_file() {
            let child_meta = entry
                .metadata()
                .map_err(|e| PackError::io(format!("inspecting {}", path.display()), e))?;
            if file_type.is_dir() {
                copy_dir(&path, &target, &child_meta, report)?;
            } else {
                copy_file(&path, &target, &child_meta, report)?;
            }
        } else {
            warn!("Skipping non-regular entry {}", path.display());
            report.skipped += 1;
        }
    }

    set_mode(dest, mode_of(meta))
}

fn copy_file(src: &Path, dest: &Path, meta: &fs::Metadata, report: &mut StageReport) -> PackResult<()> {
    let mut reader =
        File::open(src).map_err(|e| PackError::io(format!("opening {}", src.display()), e))?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dest)
        .map_err(|e| PackError::io(format!("creating {}", dest.display()), e))?;

    let copied = io::copy(&mut reader, &mut writer)
        .map_err(|e| PackError::io(format!("copying {}", src.display()), e))?;
    drop(writer);

    set_mode(dest, mode_of(meta))?;

    report.files += 1;
    report.bytes += copied;
    Ok(())
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(_meta: &fs::Metadata) -> u32 {
    0
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> PackResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| PackError::io(format!("setting permissions on {}", path.display()), e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> PackResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[cfg(unix)]
    fn chmod(path: &Path, mode: u32) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn mirrors_tree_and_contents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("lib/deep")).unwrap();
        fs::write(src.join("main.rb"), b"puts 1").unwrap();
        fs::write(src.join("lib/deep/util.rb"), b"module Util; end").unwrap();

        let dest = temp.path().join("app");
        let report = stage_app_blocking(&src, &dest).unwrap();

        assert_eq!(fs::read(dest.join("main.rb")).unwrap(), b"puts 1");
        assert_eq!(
            fs::read(dest.join("lib/deep/util.rb")).unwrap(),
            b"module Util; end"
        );
        assert_eq!(report.directories, 3);
        assert_eq!(report.files, 2);
        assert_eq!(report.bytes, 6 + 16);
        assert_eq!(report.skipped, 0);
    }

    #[cfg(unix)]
    #[test]
    fn preserves_permissions_and_empty_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("private")).unwrap();
        fs::write(src.join("empty"), b"").unwrap();
        fs::write(src.join("run.sh"), b"#!/bin/sh\n").unwrap();
        fs::write(src.join("private/secret"), b"s").unwrap();
        chmod(&src.join("run.sh"), 0o755);
        chmod(&src.join("empty"), 0o600);
        chmod(&src.join("private"), 0o700);

        let dest = temp.path().join("app");
        stage_app_blocking(&src, &dest).unwrap();

        assert_eq!(fs::metadata(dest.join("empty")).unwrap().len(), 0);
        assert_eq!(mode(&dest.join("empty")), 0o600);
        assert_eq!(mode(&dest.join("run.sh")), 0o755);
        assert_eq!(mode(&dest.join("private")), 0o700);
        assert_eq!(fs::read(dest.join("private/secret")).unwrap(), b"s");
    }

    #[cfg(unix)]
    #[test]
    fn read_only_directory_is_populated_then_locked() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("ro")).unwrap();
        fs::write(src.join("ro/file"), b"data").unwrap();
        chmod(&src.join("ro"), 0o555);

        let dest = temp.path().join("app");
        stage_app_blocking(&src, &dest).unwrap();

        assert_eq!(fs::read(dest.join("ro/file")).unwrap(), b"data");
        assert_eq!(mode(&dest.join("ro")), 0o555);

        chmod(&dest.join("ro"), 0o755);
        chmod(&src.join("ro"), 0o755);
    }

    #[test]
    fn overwrites_existing_file_with_truncation() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("config"), b"new").unwrap();

        let dest = temp.path().join("app");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("config"), b"much longer old content").unwrap();

        stage_app_blocking(&src, &dest).unwrap();
        assert_eq!(fs::read(dest.join("config")).unwrap(), b"new");
    }

    #[cfg(unix)]
    #[test]
    fn skips_symlinks() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("real"), b"x").unwrap();
        std::os::unix::fs::symlink(src.join("real"), src.join("link")).unwrap();

        let dest = temp.path().join("app");
        let report = stage_app_blocking(&src, &dest).unwrap();

        assert!(dest.join("real").exists());
        assert!(fs::symlink_metadata(dest.join("link")).is_err());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn missing_source_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = stage_app_blocking(&temp.path().join("nope"), &temp.path().join("app"))
            .unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
    }

    #[test]
    fn missing_destination_parent_aborts() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();

        let err = stage_app_blocking(&src, &temp.path().join("no/such/app")).unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
    }

    #[tokio::test]
    async fn async_staging_matches_blocking() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Procfile"), b"web: ./run").unwrap();

        let dest = temp.path().join("app");
        let report = stage_app(src, dest.clone()).await.unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(fs::read(dest.join("Procfile")).unwrap(), b"web: ./run");
    }
}
