use std::fs;
use std::io;
use std::path::Path;

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{DirSizeError, EnumSizePatternMode, SpecDirSizeOptions};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypePatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypePatternSeq {
    fn compile(
        patterns: Option<&[String]>,
        rule_pattern: EnumSizePatternMode,
    ) -> Result<Option<Self>, DirSizeError> {
        let Some(patterns) = patterns.filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        let invalid = |e: &dyn std::fmt::Display| {
            DirSizeError::InvalidPattern(format!("Invalid pattern in include/exclude: {e}"))
        };
        let seq = match rule_pattern {
            EnumSizePatternMode::Literal => Self::Literal(patterns.to_vec()),
            EnumSizePatternMode::Glob => Self::Glob(
                patterns
                    .iter()
                    .map(|p| Glob::new(p).map(|g| g.compile_matcher()))
                    .collect::<Result<_, _>>()
                    .map_err(|e| invalid(&e))?,
            ),
            EnumSizePatternMode::Regex => Self::Regex(
                patterns
                    .iter()
                    .map(|p| Regex::new(p.as_str()))
                    .collect::<Result<_, _>>()
                    .map_err(|e| invalid(&e))?,
            ),
        };
        Ok(Some(seq))
    }

    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecSizePatterns {
    patterns_include_files: Option<TypePatternSeq>,
    patterns_exclude_files: Option<TypePatternSeq>,
    patterns_include_dirs: Option<TypePatternSeq>,
    patterns_exclude_dirs: Option<TypePatternSeq>,
}

impl SpecSizePatterns {
    pub(crate) fn from_options(options: &SpecDirSizeOptions) -> Result<Self, DirSizeError> {
        let rule_pattern = options.rule_pattern;
        Ok(Self {
            patterns_include_files: TypePatternSeq::compile(
                options.patterns_include_files.as_deref(),
                rule_pattern,
            )?,
            patterns_exclude_files: TypePatternSeq::compile(
                options.patterns_exclude_files.as_deref(),
                rule_pattern,
            )?,
            patterns_include_dirs: TypePatternSeq::compile(
                options.patterns_include_dirs.as_deref(),
                rule_pattern,
            )?,
            patterns_exclude_dirs: TypePatternSeq::compile(
                options.patterns_exclude_dirs.as_deref(),
                rule_pattern,
            )?,
        })
    }

    pub(crate) fn should_exclude_file(&self, name: &str) -> bool {
        should_exclude_by_patterns(
            name,
            self.patterns_include_files.as_ref(),
            self.patterns_exclude_files.as_ref(),
        )
    }

    pub(crate) fn should_exclude_dir(&self, name: &str) -> bool {
        should_exclude_by_patterns(
            name,
            self.patterns_include_dirs.as_ref(),
            self.patterns_exclude_dirs.as_ref(),
        )
    }
}

fn should_exclude_by_patterns(
    value: &str,
    patterns_include: Option<&TypePatternSeq>,
    patterns_exclude: Option<&TypePatternSeq>,
) -> bool {
    patterns_include.is_some_and(|p| !p.is_match(value))
        || patterns_exclude.is_some_and(|p| p.is_match(value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TraversalHelpers

pub(crate) fn is_depth_within_limit(depth_value: usize, depth_limit: Option<usize>) -> bool {
    depth_limit.is_none_or(|limit| depth_value <= limit)
}

/// Identity of a directory used for loop detection when following symlinks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct TypeDirIdentity {
    #[cfg(unix)]
    dev_ino: (u64, u64),
    #[cfg(not(unix))]
    path_canonical: std::path::PathBuf,
}

pub(crate) fn derive_dir_identity(path_dir: &Path) -> io::Result<TypeDirIdentity> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let stat_dir = fs::metadata(path_dir)?;
        Ok(TypeDirIdentity {
            dev_ino: (stat_dir.dev(), stat_dir.ino()),
        })
    }
    #[cfg(not(unix))]
    {
        Ok(TypeDirIdentity {
            path_canonical: fs::canonicalize(path_dir)?,
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TestSupport

#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{SpecSizePatterns, is_depth_within_limit};
    use crate::spec::{DirSizeError, EnumSizePatternMode, SpecDirSizeOptions};

    #[test]
    fn glob_include_and_exclude_combine() {
        let options = SpecDirSizeOptions {
            patterns_include_files: Some(vec!["*.log".to_string()]),
            patterns_exclude_files: Some(vec!["debug*".to_string()]),
            ..SpecDirSizeOptions::default()
        };
        let pats = SpecSizePatterns::from_options(&options).expect("compile");

        assert!(!pats.should_exclude_file("app.log"));
        assert!(pats.should_exclude_file("debug.log"));
        assert!(pats.should_exclude_file("app.txt"));
        assert!(!pats.should_exclude_dir("anything"));
    }

    #[test]
    fn literal_mode_matches_substrings() {
        let options = SpecDirSizeOptions {
            patterns_exclude_dirs: Some(vec!["cache".to_string()]),
            rule_pattern: EnumSizePatternMode::Literal,
            ..SpecDirSizeOptions::default()
        };
        let pats = SpecSizePatterns::from_options(&options).expect("compile");

        assert!(pats.should_exclude_dir(".cache_v2"));
        assert!(!pats.should_exclude_dir("src"));
    }

    #[test]
    fn empty_pattern_list_is_ignored() {
        let options = SpecDirSizeOptions {
            patterns_include_files: Some(vec![]),
            ..SpecDirSizeOptions::default()
        };
        let pats = SpecSizePatterns::from_options(&options).expect("compile");
        assert!(!pats.should_exclude_file("x.bin"));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let options = SpecDirSizeOptions {
            patterns_include_files: Some(vec!["(".to_string()]),
            rule_pattern: EnumSizePatternMode::Regex,
            ..SpecDirSizeOptions::default()
        };
        let err = SpecSizePatterns::from_options(&options).expect_err("must fail");
        assert!(matches!(err, DirSizeError::InvalidPattern(_)));
    }

    #[test]
    fn depth_limit_is_inclusive() {
        assert!(is_depth_within_limit(7, None));
        assert!(is_depth_within_limit(2, Some(2)));
        assert!(!is_depth_within_limit(3, Some(2)));
    }
}
