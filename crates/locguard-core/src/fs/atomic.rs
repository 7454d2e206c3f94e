//! Atomic writes into the trusted base.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::MAX_FILE_SIZE;
use crate::Result;
use crate::SecurityError;
use crate::security::verify_descriptor;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// Writes `data` to `target` by writing a temporary sibling and renaming it
/// over the target.
///
/// The parent directory is canonicalized and verified, the temporary file
/// is created inside that *real* directory and verified through its
/// descriptor, and the final rename targets the real directory as well.
/// A symlink sitting at the target is replaced, never followed. Every
/// temporary name is unique, so concurrent writers to the same target never
/// collide: the last rename wins and readers always see a whole file.
///
/// # Errors
///
/// - `SecurityError::FileTooLarge` if `data` exceeds [`MAX_FILE_SIZE`]
/// - `SecurityError::SymlinkEscape` if the parent or the temporary file
///   resolves outside the base
/// - `SecurityError::InvalidInput` if the target is the base itself
/// - `SecurityError::Io` if the parent is missing (and `create_parents` is
///   off) or any write step fails
pub fn write_atomic(
    target: &ResolvedPath,
    base: &TrustedBase,
    data: &[u8],
    create_parents: bool,
) -> Result<()> {
    let size = data.len() as u64;
    if size > MAX_FILE_SIZE {
        return Err(SecurityError::FileTooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }

    let path = target.as_path();
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(SecurityError::InvalidInput {
            reason: format!("cannot write to {}", path.display()),
        });
    };
    if target.is_base() {
        return Err(SecurityError::InvalidInput {
            reason: "cannot write over the trusted base".to_string(),
        });
    }

    if create_parents {
        std::fs::create_dir_all(parent)?;
    }
    let real_parent = verified_parent(parent, path, base)?;

    let mut temp = NamedTempFile::new_in(&real_parent)?;
    verify_descriptor(temp.as_file(), path, base)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(real_parent.join(file_name))
        .map_err(|e| SecurityError::Io(e.error))?;
    Ok(())
}

fn verified_parent(parent: &Path, target: &Path, base: &TrustedBase) -> Result<PathBuf> {
    let real_parent = parent.canonicalize()?;
    if !base.contains_real(&real_parent) {
        return Err(SecurityError::SymlinkEscape {
            path: target.to_path_buf(),
            real: real_parent,
        });
    }
    Ok(real_parent)
}
