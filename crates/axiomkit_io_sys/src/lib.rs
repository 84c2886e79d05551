//! `axiomkit_io_sys` v1:
//! Filesystem inspection, directory traversal and stream helpers.
//!
//! Modules:
//! - `walk`   : directory enumeration and size aggregation
//! - `stat`   : single-path checks and symlink-aware size lookup
//! - `path`   : temp/home directories and file extensions
//! - `stream` : null stream and progress-reporting writer
//! - `copy`   : single-file copy with progress
//! - `spec`   : entry model, options and errors
//! - `report` : size scan report model
//! - `util`   : shared helper functions
//!
//! Functions come in two flavors. Strict ones ([`fetch_dir`],
//! [`resolve_symlink`], [`scan_dir_size`]) return errors to the caller.
//! Absorbing ones ([`dir_size`], [`file_size`], [`user_home_dir`], ...) never
//! fail and fall back to `0`, `false` or `None`.

pub mod copy;
pub mod path;
pub mod report;
pub mod spec;
pub mod stat;
pub mod stream;
pub mod walk;
mod util;

pub use copy::copy_file_with_progress;
pub use path::{file_ext, temp_dir, temp_filename, trim_trailing_separators, user_home_dir};
pub use report::{ReportDirSize, ReportDirSizeBuilder};
pub use spec::{
    DirSizeError, EnumSizePatternMode, EnumSizeSymlinkStrategy, N_SYMLINK_HOPS_MAX,
    ResolveSymlinkError, SpecDirSizeOptions, SpecEntryInfo, SpecSizeError,
};
pub use stat::{file_exists, file_size, is_dir, is_symlink, resolve_symlink};
pub use stream::{DEV_NULL, NullStream, ProgressWriter};
pub use walk::{dir_size, fetch_dir, scan_dir_size};
