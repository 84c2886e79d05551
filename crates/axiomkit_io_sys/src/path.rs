//! Platform path helpers: temp/home directories and file extensions.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::stat::file_exists;

/// Environment variables checked by [`user_home_dir`], in order.
const L_HOME_ENV_VARS: [&str; 8] = [
    "HOME",               // /home/{username}, /Users/{username}
    "HOMEPATH",           // \Users\{username}
    "LOCALAPPDATA",       // C:\Users\{username}\AppData\Local
    "APPDATA",            // C:\Users\{username}\AppData\Roaming
    "CSIDL_APPDATA",      // C:\Users\{username}\AppData\Roaming
    "ProgramData",        // C:\ProgramData
    "CommonProgramFiles", // C:\Program Files\Common Files
    "CD",                 // current directory
];

/// Strip trailing `/` and `\` from `path`.
///
/// A path made only of separators keeps its first one, so `/` stays `/`.
/// Paths that are not valid UTF-8 are trimmed the same way.
pub fn trim_trailing_separators<P: AsRef<Path>>(path: P) -> PathBuf {
    PathBuf::from(trim_os_separators(path.as_ref().as_os_str()))
}

#[cfg(unix)]
fn trim_os_separators(c_path: &OsStr) -> OsString {
    use std::os::unix::ffi::OsStrExt;

    let raw_path = c_path.as_bytes();
    let n_keep = count_kept_units(raw_path, |b| matches!(b, b'/' | b'\\'));
    OsStr::from_bytes(&raw_path[..n_keep]).to_os_string()
}

#[cfg(windows)]
fn trim_os_separators(c_path: &OsStr) -> OsString {
    use std::os::windows::ffi::{OsStrExt, OsStringExt};

    let l_units: Vec<u16> = c_path.encode_wide().collect();
    let n_keep = count_kept_units(&l_units, |u| u == u16::from(b'/') || u == u16::from(b'\\'));
    OsString::from_wide(&l_units[..n_keep])
}

#[cfg(not(any(unix, windows)))]
fn trim_os_separators(c_path: &OsStr) -> OsString {
    let Some(c_text) = c_path.to_str() else {
        return c_path.to_os_string();
    };
    let l_units: Vec<char> = c_text.chars().collect();
    let n_keep = count_kept_units(&l_units, |c| matches!(c, '/' | '\\'));
    l_units[..n_keep].iter().collect::<String>().into()
}

/// Length of `l_units` without its trailing separators, keeping one if that
/// is all there is.
fn count_kept_units<T: Copy>(l_units: &[T], is_separator: impl Fn(T) -> bool) -> usize {
    match l_units.iter().rposition(|&u| !is_separator(u)) {
        Some(n_idx) => n_idx + 1,
        None => l_units.len().min(1),
    }
}

/// System temp directory without trailing separators.
pub fn temp_dir() -> PathBuf {
    trim_trailing_separators(env::temp_dir())
}

/// Random file path `<temp_dir>/tmp<16 hex digits>[.ext]`.
///
/// Nothing is created and uniqueness is not checked.
pub fn temp_filename(ext: &str) -> PathBuf {
    let c_ext = if ext.is_empty() {
        String::new()
    } else {
        format!(".{ext}")
    };
    temp_dir().join(format!("tmp{:016x}{c_ext}", rand::random::<u64>()))
}

/// Best guess of the current user's home directory.
///
/// Returns the first candidate environment variable that is set, non-empty
/// and points to an existing path, trimmed of trailing separators.
pub fn user_home_dir() -> Option<PathBuf> {
    user_home_dir_from(|name| env::var_os(name))
}

fn user_home_dir_from<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<OsString>,
{
    L_HOME_ENV_VARS.iter().find_map(|name| {
        let value = lookup(name).filter(|v| !v.is_empty())?;
        if !file_exists(&value) {
            debug!(var = *name, value = ?value, "home dir candidate does not exist");
            return None;
        }
        Some(trim_trailing_separators(value))
    })
}

/// Lowercase file extension without the dot.
///
/// Follows [`Path::extension`], so dotfiles such as `.hidden` and names
/// ending in a dot have no extension.
///
/// # Examples
/// ```
/// use axiomkit_io_sys::file_ext;
///
/// assert_eq!(file_ext("/path/path/file.ZIP"), "zip");
/// assert_eq!(file_ext("/path/path/file"), "");
/// ```
pub fn file_ext<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::ffi::OsString;
    use std::path::PathBuf;

    use regex::Regex;
    use tempfile::TempDir;

    use super::{file_ext, temp_dir, temp_filename, trim_trailing_separators, user_home_dir_from};

    #[test]
    fn trims_trailing_separators() {
        assert_eq!(trim_trailing_separators("/tmp/"), PathBuf::from("/tmp"));
        assert_eq!(trim_trailing_separators("/tmp//"), PathBuf::from("/tmp"));
        assert_eq!(trim_trailing_separators(r"C:\Temp\"), PathBuf::from(r"C:\Temp"));
        assert_eq!(trim_trailing_separators("/tmp"), PathBuf::from("/tmp"));
        assert_eq!(trim_trailing_separators("/"), PathBuf::from("/"));
        assert_eq!(trim_trailing_separators(""), PathBuf::from(""));
        assert_eq!(trim_trailing_separators(r"\\"), PathBuf::from(r"\"));
    }

    #[cfg(unix)]
    #[test]
    fn trims_trailing_separators_of_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path_raw = OsStr::from_bytes(b"/tmp/caf\xe9//");
        assert!(path_raw.to_str().is_none());
        assert_eq!(
            trim_trailing_separators(path_raw),
            PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xe9"))
        );
    }

    #[test]
    fn temp_dir_has_no_trailing_separator() {
        let c_dir = temp_dir().to_string_lossy().to_string();
        assert!(c_dir.len() == 1 || !c_dir.ends_with(['/', '\\']));
    }

    #[test]
    fn temp_filename_shape() {
        let re_name = Regex::new(r"^tmp[0-9a-f]{16}\.txt$").expect("regex");
        let path = temp_filename("txt");
        assert_eq!(path.parent(), Some(temp_dir().as_path()));
        let c_name = path.file_name().expect("name").to_string_lossy().to_string();
        assert!(re_name.is_match(&c_name), "unexpected name {c_name}");

        let re_bare = Regex::new(r"^tmp[0-9a-f]{16}$").expect("regex");
        let path_bare = temp_filename("");
        let c_bare = path_bare.file_name().expect("name").to_string_lossy().to_string();
        assert!(re_bare.is_match(&c_bare), "unexpected name {c_bare}");

        assert_ne!(temp_filename("txt"), temp_filename("txt"));
    }

    #[test]
    fn home_dir_picks_first_existing_candidate() {
        let tmp = TempDir::new().expect("tempdir");
        let c_existing = format!("{}/", tmp.path().display());
        let dict_env: HashMap<&str, OsString> = HashMap::from([
            ("HOME", OsString::from("")),
            ("HOMEPATH", OsString::from("/definitely/not/here")),
            ("APPDATA", OsString::from(c_existing)),
            ("CD", OsString::from("/")),
        ]);

        let path_home = user_home_dir_from(|name| dict_env.get(name).cloned());
        assert_eq!(path_home, Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn home_dir_none_when_nothing_matches() {
        let path_home = user_home_dir_from(|name| {
            (name == "HOME").then(|| OsString::from("/definitely/not/here"))
        });
        assert_eq!(path_home, None);
    }

    #[test]
    fn file_ext_cases() {
        assert_eq!(file_ext("/a/b/file.ZIP"), "zip");
        assert_eq!(file_ext("/a/b/archive.tar.Gz"), "gz");
        assert_eq!(file_ext("/a/b/file"), "");
        assert_eq!(file_ext("/a/b/.hidden"), "");
        assert_eq!(file_ext("/a/b/file."), "");
        assert_eq!(file_ext("/a/b.d/file"), "");
    }
}
