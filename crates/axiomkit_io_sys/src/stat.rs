//! Single-path inspection: existence, type and symlink-aware size lookup.

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::spec::{N_SYMLINK_HOPS_MAX, ResolveSymlinkError};

/// `true` when `path` exists. Follows symlinks, so a dangling link is `false`.
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok()
}

/// `true` when `path` is a directory or a symlink to one.
pub fn is_dir<P: AsRef<Path>>(path: P) -> bool {
    fs::metadata(path).is_ok_and(|st| st.is_dir())
}

/// `true` when `path` itself is a symbolic link (dangling or not).
pub fn is_symlink<P: AsRef<Path>>(path: P) -> bool {
    fs::symlink_metadata(path).is_ok_and(|st| st.file_type().is_symlink())
}

/// Size in bytes of `path` after dereferencing any chain of symlinks.
///
/// Returns `0` when the path is missing, a link in the chain cannot be read,
/// the chain dangles, or it is longer than [`N_SYMLINK_HOPS_MAX`].
pub fn file_size<P: AsRef<Path>>(path: P) -> u64 {
    let path = path.as_ref();
    match resolve_symlink_metadata(path) {
        Ok((_, stat_target)) => stat_target.len(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "file size lookup failed");
            0
        }
    }
}

/// Follow `path` through symlinks until a non-link path is reached.
///
/// Relative link targets are resolved against the directory holding the
/// link. At most [`N_SYMLINK_HOPS_MAX`] links are dereferenced; a cycle ends
/// in [`ResolveSymlinkError::TooManyHops`] unless the OS reports an error
/// first.
///
/// # Examples
/// ```no_run
/// use axiomkit_io_sys::resolve_symlink;
///
/// let path_target = resolve_symlink("/usr/bin/cc").expect("resolve");
/// assert!(!path_target.is_symlink());
/// ```
pub fn resolve_symlink<P: AsRef<Path>>(path: P) -> Result<PathBuf, ResolveSymlinkError> {
    resolve_symlink_metadata(path.as_ref()).map(|(path_target, _)| path_target)
}

fn resolve_symlink_metadata(path: &Path) -> Result<(PathBuf, Metadata), ResolveSymlinkError> {
    let mut path_cursor = path.to_path_buf();
    for n_hop in 0..=N_SYMLINK_HOPS_MAX {
        let stat_cursor = match fs::symlink_metadata(&path_cursor) {
            Ok(v) => v,
            Err(source) => {
                return Err(ResolveSymlinkError::Io {
                    path: path_cursor,
                    source,
                });
            }
        };
        if !stat_cursor.file_type().is_symlink() {
            return Ok((path_cursor, stat_cursor));
        }
        if n_hop == N_SYMLINK_HOPS_MAX {
            break;
        }

        let path_link_target = match fs::read_link(&path_cursor) {
            Ok(v) => v,
            Err(source) => {
                return Err(ResolveSymlinkError::Io {
                    path: path_cursor,
                    source,
                });
            }
        };
        let path_next = join_link_target(&path_cursor, &path_link_target);
        trace!(
            hop = n_hop + 1,
            link = %path_cursor.display(),
            target = %path_next.display(),
            "dereference symlink"
        );
        path_cursor = path_next;
    }

    Err(ResolveSymlinkError::TooManyHops {
        path: path.to_path_buf(),
        hops: N_SYMLINK_HOPS_MAX,
    })
}

fn join_link_target(path_link: &Path, path_link_target: &Path) -> PathBuf {
    if path_link_target.is_absolute() {
        return path_link_target.to_path_buf();
    }
    match path_link.parent() {
        Some(path_parent) => path_parent.join(path_link_target),
        None => path_link_target.to_path_buf(),
    }
}
