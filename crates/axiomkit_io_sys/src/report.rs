//! Size scan report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::spec::SpecSizeError;

/// Aggregate counters and diagnostics for one `scan_dir_size` run.
#[derive(Debug, Default, Clone)]
pub struct ReportDirSize {
    /// Total bytes of counted entries.
    pub n_bytes: u64,
    /// Number of counted non-directory entries (files and lstat-counted links).
    pub cnt_files: u64,
    /// Number of directories below the root whose entries were listed.
    pub cnt_dirs: u64,
    /// Number of symlink entries encountered.
    pub cnt_symlinks: u64,
    /// Number of entries left out by filters, the depth limit, the symlink
    /// strategy, symlink loops or directories already counted.
    pub cnt_skipped: u64,
    /// Non-fatal warnings collected during traversal.
    pub warnings: Vec<String>,
    /// Per-entry failures.
    pub errors: Vec<SpecSizeError>,
}

impl ReportDirSize {
    /// Number of collected hard errors.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of collected warnings.
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("n_bytes".to_string(), self.n_bytes),
            ("cnt_files".to_string(), self.cnt_files),
            ("cnt_dirs".to_string(), self.cnt_dirs),
            ("cnt_symlinks".to_string(), self.cnt_symlinks),
            ("cnt_skipped".to_string(), self.cnt_skipped),
            ("cnt_errors".to_string(), self.error_count() as u64),
            ("cnt_warnings".to_string(), self.warning_count() as u64),
        ])
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} bytes={} files={} dirs={} symlinks={} skipped={} errors={} warnings={}",
            self.n_bytes,
            self.cnt_files,
            self.cnt_dirs,
            self.cnt_symlinks,
            self.cnt_skipped,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for ReportDirSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[SIZE]"))
    }
}

/// Mutable accumulator for size scan statistics.
#[derive(Debug, Default, Clone)]
pub struct ReportDirSizeBuilder {
    report: ReportDirSize,
}

impl ReportDirSizeBuilder {
    /// Count one non-directory entry of `size` bytes.
    pub fn add_file(&mut self, size: u64) {
        self.report.cnt_files += 1;
        self.report.n_bytes += size;
    }

    /// Count one listed directory.
    pub fn add_dir(&mut self) {
        self.report.cnt_dirs += 1;
    }

    /// Count one symlink entry.
    pub fn add_symlink(&mut self) {
        self.report.cnt_symlinks += 1;
    }

    /// Count one skipped entry.
    pub fn add_skipped(&mut self) {
        self.report.cnt_skipped += 1;
    }

    /// Add warning message.
    pub fn add_warning(&mut self, warning: String) {
        self.report.warnings.push(warning);
    }

    /// Add one path-scoped error.
    pub fn add_error(&mut self, path: PathBuf, exception: String) {
        self.report.errors.push(SpecSizeError { path, exception });
    }

    /// Finalize builder into immutable report.
    pub fn build(self) -> ReportDirSize {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{ReportDirSize, ReportDirSizeBuilder};

    #[test]
    fn report_dir_size_to_dict_and_format_agree() {
        let report = ReportDirSize {
            n_bytes: 1024,
            cnt_files: 5,
            cnt_dirs: 2,
            cnt_symlinks: 1,
            cnt_skipped: 3,
            warnings: vec!["w".to_string()],
            errors: vec![],
        };

        let dict_counts = report.to_dict();
        assert_eq!(dict_counts["n_bytes"], 1024);
        assert_eq!(dict_counts["cnt_files"], 5);
        assert_eq!(dict_counts["cnt_dirs"], 2);
        assert_eq!(dict_counts["cnt_symlinks"], 1);
        assert_eq!(dict_counts["cnt_skipped"], 3);
        assert_eq!(dict_counts["cnt_errors"], 0);
        assert_eq!(dict_counts["cnt_warnings"], 1);

        let txt = report.format("[SIZE]");
        assert_eq!(
            txt,
            "[SIZE] bytes=1024 files=5 dirs=2 symlinks=1 skipped=3 errors=0 warnings=1"
        );
        assert_eq!(report.to_string(), txt);
    }

    #[test]
    fn builder_accumulates_bytes_per_file() {
        let mut builder = ReportDirSizeBuilder::default();
        builder.add_file(10);
        builder.add_file(32);
        builder.add_dir();
        builder.add_error(PathBuf::from("/x"), "boom".to_string());

        let report = builder.build();
        assert_eq!(report.n_bytes, 42);
        assert_eq!(report.cnt_files, 2);
        assert_eq!(report.cnt_dirs, 1);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors[0].exception, "boom");
    }
}
