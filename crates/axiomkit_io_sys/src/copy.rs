//! Single-file copy with byte progress reporting.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::stream::ProgressWriter;

/// Copy `src` to `dst`, reporting each written chunk to `progress`.
///
/// `dst` is created or truncated. After the bytes are written the source
/// permissions are applied. On Linux the access/modify times and `user.`
/// extended attributes are copied too, leaving `dst` with the same size and
/// mtime as `src`. Returns the number of bytes copied.
pub fn copy_file_with_progress<P, Q, F>(src: P, dst: Q, progress: F) -> io::Result<u64>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: FnMut(u64),
{
    let path_file_src = src.as_ref();
    let path_file_dst = dst.as_ref();

    let mut reader = BufReader::new(File::open(path_file_src)?);
    let mut writer = ProgressWriter::new(File::create(path_file_dst)?, progress);
    let n_copied = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    drop(writer);

    apply_metadata(path_file_src, path_file_dst)?;
    debug!(
        src = %path_file_src.display(),
        dst = %path_file_dst.display(),
        n_bytes = n_copied,
        "file copied"
    );
    Ok(n_copied)
}

fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> io::Result<()> {
    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    #[cfg(target_os = "linux")]
    {
        use filetime::{FileTime, set_file_times};

        let file_time_access = FileTime::from_last_access_time(&stat_src);
        let file_time_modify = FileTime::from_last_modification_time(&stat_src);
        set_file_times(path_file_dst, file_time_access, file_time_modify)?;
        copy_xattrs_linux(path_file_src, path_file_dst);
    }
    Ok(())
}

/// Copy the `user.` extended attributes of `path_file_src` onto `path_file_dst`.
///
/// ACL, security and trusted attributes are not copied. Failures are logged
/// and the copy goes on.
#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    const C_USER_NAMESPACE: &[u8] = b"user.";

    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            debug!(path = %path_file_src.display(), error = %e, "xattr listing unavailable");
            return;
        }
    };

    let mut n_copied = 0_usize;
    let iter_user_names =
        iter_xattr_names.filter(|name| name.as_encoded_bytes().starts_with(C_USER_NAMESPACE));
    for name in iter_user_names {
        let res_copy = xattr::get(path_file_src, &name).and_then(|raw_value| match raw_value {
            Some(v) => xattr::set(path_file_dst, &name, &v).map(|()| true),
            None => Ok(false),
        });
        match res_copy {
            Ok(true) => n_copied += 1,
            Ok(false) => {}
            Err(e) => debug!(
                path = %path_file_dst.display(),
                name = ?name,
                error = %e,
                "xattr not copied"
            ),
        }
    }
    tracing::trace!(path = %path_file_dst.display(), n_copied, "xattrs copied");
}
