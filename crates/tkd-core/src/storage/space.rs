//! Free space of the destination filesystem.

use std::io;
use std::path::Path;

/// Bytes available to unprivileged users on the filesystem holding `dir`.
#[cfg(unix)]
pub fn available_bytes(dir: &Path) -> io::Result<u64> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(dir.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
    let r = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
    if r != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok((stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64))
}

/// Free space is not checked off Unix.
#[cfg(not(unix))]
pub fn available_bytes(_dir: &Path) -> io::Result<u64> {
    Ok(u64::MAX)
}
