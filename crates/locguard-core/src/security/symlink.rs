//! Physical containment checks.
//!
//! Lexical validation alone cannot see symlinks. These checks resolve what is
//! actually on disk and compare it with the canonical form of the base.

use std::fs::File;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::SecurityError;
use crate::security::path::normalize_lexically;
use crate::types::TrustedBase;

/// Verifies that the deepest existing ancestor of `resolved` is physically
/// inside the base.
///
/// Walks up from `resolved` until an entry exists (without following a
/// final symlink), then canonicalizes that entry. A dangling symlink has its
/// target resolved lexically against the link's real parent instead.
///
/// # Errors
///
/// - `SecurityError::SymlinkEscape` if the real location is outside the base
/// - `SecurityError::Io` if the file system cannot be inspected
pub fn verify_physical(resolved: &Path, base: &TrustedBase) -> Result<()> {
    let mut cursor = resolved;
    loop {
        match std::fs::symlink_metadata(cursor) {
            Ok(metadata) => {
                let real = real_location(cursor, &metadata)?;
                if base.contains_real(&real) {
                    return Ok(());
                }
                return Err(SecurityError::SymlinkEscape {
                    path: resolved.to_path_buf(),
                    real,
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => match cursor.parent() {
                Some(parent) => cursor = parent,
                None => return Ok(()),
            },
            Err(e) => return Err(e.into()),
        }
    }
}

fn real_location(cursor: &Path, metadata: &std::fs::Metadata) -> Result<PathBuf> {
    match cursor.canonicalize() {
        Ok(real) => Ok(real),
        Err(e) if e.kind() == io::ErrorKind::NotFound && metadata.is_symlink() => {
            let target = std::fs::read_link(cursor)?;
            let parent = match cursor.parent() {
                Some(parent) => parent.canonicalize()?,
                None => PathBuf::from("/"),
            };
            Ok(normalize_lexically(&parent.join(target)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Verifies that an open descriptor refers to a file inside the base.
///
/// Called right after opening so that a symlink swapped in between
/// validation and open is caught on the handle actually used for I/O.
///
/// # Errors
///
/// - `SecurityError::SymlinkEscape` if the descriptor's real path is outside
///   the base
/// - `SecurityError::Io` if the real path cannot be determined; this fails
///   closed on platforms without a descriptor path query
pub fn verify_descriptor(file: &File, resolved: &Path, base: &TrustedBase) -> Result<PathBuf> {
    let real = descriptor_path(file)?;
    if base.contains_real(&real) {
        Ok(real)
    } else {
        Err(SecurityError::SymlinkEscape {
            path: resolved.to_path_buf(),
            real,
        })
    }
}

/// Returns the real path of an open file descriptor.
///
/// # Errors
///
/// Returns an I/O error if the platform cannot report descriptor paths.
#[cfg(target_os = "linux")]
pub fn descriptor_path(file: &File) -> io::Result<PathBuf> {
    use std::os::fd::AsRawFd;

    std::fs::read_link(format!("/proc/self/fd/{}", file.as_raw_fd()))
}

/// Returns the real path of an open file descriptor.
///
/// # Errors
///
/// Returns an I/O error if the platform cannot report descriptor paths.
#[cfg(target_os = "macos")]
pub fn descriptor_path(file: &File) -> io::Result<PathBuf> {
    use std::ffi::OsString;
    use std::os::fd::AsRawFd;
    use std::os::unix::ffi::OsStringExt;

    #[allow(clippy::cast_sign_loss)]
    let mut buf = vec![0u8; libc::PATH_MAX as usize];

    // SAFETY: F_GETPATH writes at most PATH_MAX bytes into `buf`, which
    // outlives the call.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::fcntl(file.as_raw_fd(), libc::F_GETPATH, buf.as_mut_ptr()) };
    if rc == -1 {
        return Err(io::Error::last_os_error());
    }

    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    buf.truncate(len);
    Ok(PathBuf::from(OsString::from_vec(buf)))
}

/// Returns the real path of an open file descriptor.
///
/// # Errors
///
/// Always fails: this platform has no descriptor path query.
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn descriptor_path(_file: &File) -> io::Result<PathBuf> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "descriptor path verification is not supported on this platform",
    ))
}
