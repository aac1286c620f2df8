//! Cache key derivation
//!
//! An application's cache key is the SHA256 of its absolute, lexically
//! cleaned path. Same path = same cache.

use crate::error::{PackError, PackResult};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and clean it.
///
/// `.` components are dropped and `..` folds onto its parent. The path does
/// not need to exist and symlinks are left unresolved.
pub fn absolutize(path: &Path) -> PackResult<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| PackError::io("getting current directory", e))?;
        cwd.join(path)
    };
    Ok(clean(&joined))
}

/// Lexical path cleaning
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `/..` stays `/`
                if !matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Hex digest of the path's raw bytes (its UTF-8 bytes when valid)
pub fn digest(absolute: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(absolute.as_os_str().as_encoded_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_folds_dot_segments() {
        assert_eq!(
            clean(Path::new("/src/./x/../app1")),
            PathBuf::from("/src/app1")
        );
        assert_eq!(clean(Path::new("/src/app1/")), PathBuf::from("/src/app1"));
        assert_eq!(clean(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn absolutize_relative_uses_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let abs = absolutize(Path::new("some/app")).unwrap();
        assert_eq!(abs, clean(&cwd.join("some/app")));
        assert!(abs.is_absolute());
    }

    #[test]
    fn digest_is_stable_hex() {
        let a = digest(Path::new("/src/app1"));
        assert_eq!(a, digest(Path::new("/src/app1")));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn digest_differs_per_path() {
        assert_ne!(digest(Path::new("/src/app1")), digest(Path::new("/src/app2")));
    }

    #[test]
    fn digest_matches_utf8_bytes() {
        let expected = hex::encode(Sha256::digest("/src/app1".as_bytes()));
        assert_eq!(digest(Path::new("/src/app1")), expected);
    }

    #[cfg(unix)]
    #[test]
    fn digest_distinguishes_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(OsStr::from_bytes(b"/src/app\xff"));
        let b = Path::new(OsStr::from_bytes(b"/src/app\xfe"));
        assert_ne!(digest(a), digest(b));
        assert_eq!(digest(a), digest(&clean(a)));
    }
}
