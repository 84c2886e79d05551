//! Directory enumeration and size aggregation.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::report::{ReportDirSize, ReportDirSizeBuilder};
use crate::spec::{DirSizeError, EnumSizeSymlinkStrategy, SpecDirSizeOptions, SpecEntryInfo};
use crate::stat::resolve_symlink;
use crate::util::{SpecSizePatterns, TypeDirIdentity, derive_dir_identity, is_depth_within_limit};

/// Call `visit` once for every entry of `dir`.
///
/// Entry names are read in one batch and the directory handle is closed
/// before the first visit. Each entry is inspected with `lstat`, so symlinks
/// are reported as symlinks.
///
/// - Failing to open or list `dir` returns the IO error as is.
/// - An entry that vanished between listing and `lstat` is skipped.
/// - Any other `lstat` failure stops enumeration and is returned.
/// - The first visitor error stops enumeration and is returned unchanged.
///
/// Entry order is whatever the filesystem yields.
///
/// # Examples
/// ```no_run
/// use std::io;
/// use axiomkit_io_sys::fetch_dir;
///
/// let mut l_names = Vec::new();
/// fetch_dir("/etc", |spec_entry| -> io::Result<()> {
///     l_names.push(spec_entry.name_entry.clone());
///     Ok(())
/// })?;
/// # Ok::<(), io::Error>(())
/// ```
pub fn fetch_dir<P, F, E>(dir: P, mut visit: F) -> Result<(), E>
where
    P: AsRef<Path>,
    F: FnMut(&SpecEntryInfo) -> Result<(), E>,
    E: From<io::Error>,
{
    let path_dir = dir.as_ref();
    let l_names = read_entry_names(path_dir)?;

    for name_entry in l_names {
        if let Some(spec_entry) = stat_entry(path_dir, &name_entry)? {
            visit(&spec_entry)?;
        }
    }
    Ok(())
}

fn read_entry_names(path_dir: &Path) -> io::Result<Vec<OsString>> {
    fs::read_dir(path_dir)?
        .map(|entry| entry.map(|v| v.file_name()))
        .collect()
}

/// `lstat` one listed entry. `Ok(None)` means it vanished after listing.
fn stat_entry(path_dir: &Path, name_entry: &OsStr) -> io::Result<Option<SpecEntryInfo>> {
    let path_entry = path_dir.join(name_entry);
    let stat_entry = match fs::symlink_metadata(&path_entry) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %path_entry.display(), "entry vanished before stat, skipped");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let file_type = stat_entry.file_type();
    Ok(Some(SpecEntryInfo {
        path_entry,
        name_entry: name_entry.to_string_lossy().into_owned(),
        size: stat_entry.len(),
        if_is_dir: file_type.is_dir(),
        if_is_symlink: file_type.is_symlink(),
    }))
}

/// Total size in bytes of everything below `dir`.
///
/// Symlinks are not followed: a link counts with its own `lstat` size and a
/// linked directory is never descended into. Errors are not reported; the
/// bytes summed before a failure are returned. Use [`fetch_dir`] or
/// [`scan_dir_size`] when failures matter.
pub fn dir_size<P: AsRef<Path>>(dir: P) -> u64 {
    let path_dir = dir.as_ref();
    let mut n_bytes = 0_u64;
    let res_fetch = fetch_dir(path_dir, |spec_entry| -> io::Result<()> {
        n_bytes += if spec_entry.if_is_dir {
            dir_size(&spec_entry.path_entry)
        } else {
            spec_entry.size
        };
        Ok(())
    });
    if let Err(e) = res_fetch {
        debug!(path = %path_dir.display(), error = %e, "dir size is partial");
    }
    n_bytes
}

#[derive(Debug)]
struct SpecSizeContext {
    spec_size_options: SpecDirSizeOptions,
    spec_size_pats: SpecSizePatterns,
    builder_size_report: ReportDirSizeBuilder,
    /// Directories on the current descent path.
    set_ancestor_dirs: HashSet<TypeDirIdentity>,
    /// Directories already counted anywhere in this scan.
    set_visited_dirs: HashSet<TypeDirIdentity>,
}

/// Sum the sizes below `dir` and report what was counted, skipped and failed.
///
/// Behavior is controlled by [`SpecDirSizeOptions`]:
/// - include/exclude patterns for file and directory basenames,
/// - symlink strategy (count the link, skip it, or follow it with loop
///   detection),
/// - optional depth limit.
///
/// Returns [`DirSizeError`] only for setup and validation failures.
/// A directory that cannot be listed and an entry whose `lstat` fails are
/// each recorded as one error in the report, and the scan carries on with
/// the remaining entries.
///
/// When following symlinks, a link back to a directory on the current
/// descent path is a loop and is skipped with a warning. A directory reached
/// a second time through another path is skipped as already counted.
pub fn scan_dir_size<P: AsRef<Path>>(
    dir: P,
    spec_size_options: SpecDirSizeOptions,
) -> Result<ReportDirSize, DirSizeError> {
    if spec_size_options.depth_limit == Some(0) {
        return Err(DirSizeError::InvalidDepthLimit(
            "Arg `depth_limit` must be >= 1 or None.".to_string(),
        ));
    }
    let path_dir = dir.as_ref();
    if !path_dir.is_dir() {
        return Err(DirSizeError::RootNotDirectory(path_dir.to_path_buf()));
    }
    let spec_size_pats = SpecSizePatterns::from_options(&spec_size_options)?;

    let mut spec_size_ctx = SpecSizeContext {
        spec_size_options,
        spec_size_pats,
        builder_size_report: ReportDirSizeBuilder::default(),
        set_ancestor_dirs: HashSet::new(),
        set_visited_dirs: HashSet::new(),
    };
    walk_directory(path_dir, 0, &mut spec_size_ctx);

    let report = spec_size_ctx.builder_size_report.build();
    debug!(root = %path_dir.display(), "{report}");
    Ok(report)
}

/// Scan the entries of `path_dir`. Returns whether its listing was read.
fn walk_directory(
    path_dir: &Path,
    n_depth: usize,
    spec_size_ctx: &mut SpecSizeContext,
) -> bool {
    let dir_identity =
        if spec_size_ctx.spec_size_options.rule_symlink == EnumSizeSymlinkStrategy::Dereference {
            let Some(v) = enter_directory(path_dir, spec_size_ctx) else {
                return false;
            };
            Some(v)
        } else {
            None
        };

    let b_if_listed = scan_entries(path_dir, n_depth, spec_size_ctx);

    if let Some(v) = dir_identity {
        spec_size_ctx.set_ancestor_dirs.remove(&v);
    }
    b_if_listed
}

/// Register `path_dir` on the descent path, or explain why it is not entered.
fn enter_directory(
    path_dir: &Path,
    spec_size_ctx: &mut SpecSizeContext,
) -> Option<TypeDirIdentity> {
    let builder = &mut spec_size_ctx.builder_size_report;
    let dir_identity = match derive_dir_identity(path_dir) {
        Ok(v) => v,
        Err(e) => {
            builder.add_error(
                path_dir.to_path_buf(),
                format!("Failed to stat directory {} ({e})", path_dir.display()),
            );
            return None;
        }
    };

    if spec_size_ctx.set_ancestor_dirs.contains(&dir_identity) {
        warn!(path = %path_dir.display(), "symlink loop detected");
        builder.add_warning(format!("Symlink loop detected: {}", path_dir.display()));
        builder.add_skipped();
        return None;
    }
    if !spec_size_ctx.set_visited_dirs.insert(dir_identity.clone()) {
        debug!(path = %path_dir.display(), "directory already counted");
        builder.add_warning(format!("Directory already counted: {}", path_dir.display()));
        builder.add_skipped();
        return None;
    }
    spec_size_ctx.set_ancestor_dirs.insert(dir_identity.clone());
    Some(dir_identity)
}

fn scan_entries(
    path_dir: &Path,
    n_depth: usize,
    spec_size_ctx: &mut SpecSizeContext,
) -> bool {
    let l_names = match read_entry_names(path_dir) {
        Ok(v) => v,
        Err(e) => {
            spec_size_ctx.builder_size_report.add_error(
                path_dir.to_path_buf(),
                format!("Failed to scan directory {} ({e})", path_dir.display()),
            );
            return false;
        }
    };

    for name_entry in l_names {
        match stat_entry(path_dir, &name_entry) {
            Ok(Some(spec_entry)) => handle_entry(&spec_entry, n_depth + 1, spec_size_ctx),
            Ok(None) => {}
            Err(e) => {
                let path_entry = path_dir.join(&name_entry);
                let exception = format!("Failed to stat {} ({e})", path_entry.display());
                spec_size_ctx
                    .builder_size_report
                    .add_error(path_entry, exception);
            }
        }
    }
    true
}

fn handle_entry(
    spec_entry: &SpecEntryInfo,
    n_depth: usize,
    spec_size_ctx: &mut SpecSizeContext,
) {
    if !spec_entry.if_is_symlink {
        if spec_entry.if_is_dir {
            handle_dir(
                &spec_entry.path_entry,
                &spec_entry.name_entry,
                n_depth,
                spec_size_ctx,
            );
        } else {
            handle_file(&spec_entry.name_entry, spec_entry.size, spec_size_ctx);
        }
        return;
    }

    spec_size_ctx.builder_size_report.add_symlink();
    match spec_size_ctx.spec_size_options.rule_symlink {
        EnumSizeSymlinkStrategy::Skip => spec_size_ctx.builder_size_report.add_skipped(),
        EnumSizeSymlinkStrategy::Lstat => {
            handle_file(&spec_entry.name_entry, spec_entry.size, spec_size_ctx);
        }
        EnumSizeSymlinkStrategy::Dereference => {
            let stat_target = match resolve_symlink(&spec_entry.path_entry)
                .map_err(|e| e.to_string())
                .and_then(|p| fs::metadata(p).map_err(|e| e.to_string()))
            {
                Ok(v) => v,
                Err(msg) => {
                    spec_size_ctx
                        .builder_size_report
                        .add_error(spec_entry.path_entry.clone(), msg);
                    return;
                }
            };
            if stat_target.is_dir() {
                handle_dir(
                    &spec_entry.path_entry,
                    &spec_entry.name_entry,
                    n_depth,
                    spec_size_ctx,
                );
            } else {
                handle_file(&spec_entry.name_entry, stat_target.len(), spec_size_ctx);
            }
        }
    }
}

fn handle_dir(
    path_dir: &Path,
    name_dir: &str,
    n_depth: usize,
    spec_size_ctx: &mut SpecSizeContext,
) {
    if spec_size_ctx.spec_size_pats.should_exclude_dir(name_dir) {
        spec_size_ctx.builder_size_report.add_skipped();
        return;
    }
    if !is_depth_within_limit(n_depth + 1, spec_size_ctx.spec_size_options.depth_limit) {
        spec_size_ctx.builder_size_report.add_skipped();
        return;
    }
    if walk_directory(path_dir, n_depth, spec_size_ctx) {
        spec_size_ctx.builder_size_report.add_dir();
    }
}

fn handle_file(name_file: &str, size: u64, spec_size_ctx: &mut SpecSizeContext) {
    if spec_size_ctx.spec_size_pats.should_exclude_file(name_file) {
        spec_size_ctx.builder_size_report.add_skipped();
        return;
    }
    spec_size_ctx.builder_size_report.add_file(size);
}
