//! Entry models, scan options and top-level error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Maximum number of symlink dereferences before resolution gives up.
pub const N_SYMLINK_HOPS_MAX: usize = 32;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Symlink handling policy for [`scan_dir_size`](crate::scan_dir_size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSizeSymlinkStrategy {
    /// Count the link's own lstat size and never traverse it.
    Lstat,
    /// Follow the link and count the target bytes/entries.
    Dereference,
    /// Ignore symlink entries.
    Skip,
}

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSizePatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Metadata for one directory entry, as seen by `lstat`.
///
/// Built fresh for a single visitor call of [`fetch_dir`](crate::fetch_dir).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntryInfo {
    /// Full path of the entry (`dir` joined with `name_entry`).
    pub path_entry: PathBuf,
    /// Entry name as listed by the directory.
    pub name_entry: String,
    /// Size in bytes reported by `lstat`. Meaningful for regular files.
    pub size: u64,
    /// Entry is a directory (never true for a symlink).
    pub if_is_dir: bool,
    /// Entry is a symbolic link.
    pub if_is_symlink: bool,
}

/// Input options for `scan_dir_size`.
#[derive(Debug, Clone)]
pub struct SpecDirSizeOptions {
    /// Include patterns applied to file basename.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Include patterns applied to directory basename.
    pub patterns_include_dirs: Option<Vec<String>>,
    /// Exclude patterns applied to directory basename.
    pub patterns_exclude_dirs: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumSizePatternMode,
    /// Symlink handling behavior.
    pub rule_symlink: EnumSizeSymlinkStrategy,
    /// Deepest entry level counted; children of the root are depth 1.
    pub depth_limit: Option<usize>,
}

impl Default for SpecDirSizeOptions {
    fn default() -> Self {
        Self {
            patterns_include_files: None,
            patterns_exclude_files: None,
            patterns_include_dirs: None,
            patterns_exclude_dirs: None,
            rule_pattern: EnumSizePatternMode::Glob,
            rule_symlink: EnumSizeSymlinkStrategy::Lstat,
            depth_limit: None,
        }
    }
}

/// One scan failure item with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSizeError {
    /// Path that failed.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// Failure to resolve a symlink chain to a non-link path.
#[derive(Debug, Error)]
pub enum ResolveSymlinkError {
    /// `lstat` or `readlink` failed somewhere along the chain.
    #[error("failed to resolve {}: {source}", .path.display())]
    Io {
        /// Path whose inspection failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The chain is a cycle or longer than [`N_SYMLINK_HOPS_MAX`].
    #[error("symlink chain starting at {} exceeds {hops} hops", .path.display())]
    TooManyHops {
        /// Path resolution started from.
        path: PathBuf,
        /// Hop limit that was exceeded.
        hops: usize,
    },
}

/// "Top-level call failed" errors for `scan_dir_size`.
#[derive(Debug, Error)]
pub enum DirSizeError {
    /// Invalid depth value.
    #[error("{0}")]
    InvalidDepthLimit(String),
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Scan root is not a directory.
    #[error("Scan root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
