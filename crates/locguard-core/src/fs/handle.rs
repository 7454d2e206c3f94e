//! Descriptor-verified file handles.
//!
//! A [`VerifiedFile`] is opened first and checked second: the real path is
//! taken from the open descriptor, never by re-resolving the string path, so
//! a symlink swapped in after validation is caught on the handle that is
//! actually used for I/O.

use std::fs::File;
use std::fs::Metadata;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::SecurityError;
use crate::security::verify_descriptor;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// An open, read-only handle whose real path is inside the trusted base.
///
/// The descriptor closes when the value is dropped, on every exit path.
#[derive(Debug)]
pub struct VerifiedFile {
    file: File,
    path: PathBuf,
    real: PathBuf,
    metadata: Metadata,
}

impl VerifiedFile {
    /// Opens `resolved` read-only and verifies the descriptor.
    ///
    /// On Unix the open uses `O_NONBLOCK`, so a FIFO planted at the path
    /// cannot stall the caller. Directories can be opened too.
    ///
    /// # Errors
    ///
    /// - `SecurityError::SymlinkEscape` if the descriptor resolves outside
    ///   the base
    /// - `SecurityError::Io` if the open or stat fails (including not-found)
    pub fn open(resolved: &ResolvedPath, base: &TrustedBase) -> Result<Self> {
        let path = resolved.as_path();
        let file = read_only_options().open(path)?;
        let real = verify_descriptor(&file, path, base)?;
        let metadata = file.metadata()?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            real,
            metadata,
        })
    }

    /// Returns the validated lexical path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the real path reported by the descriptor.
    #[inline]
    #[must_use]
    pub fn real_path(&self) -> &Path {
        &self.real
    }

    /// Returns metadata taken from the descriptor.
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns the underlying file.
    #[inline]
    #[must_use]
    pub fn as_file(&self) -> &File {
        &self.file
    }

    /// Reads the whole file, refusing anything that is not a regular file or
    /// is larger than `max` bytes.
    ///
    /// At most `max + 1` bytes are read, so a file growing after the stat is
    /// still caught.
    ///
    /// # Errors
    ///
    /// - `SecurityError::InvalidInput` if the handle is not a regular file
    /// - `SecurityError::FileTooLarge` if the content exceeds `max`
    /// - `SecurityError::Io` if reading fails
    pub fn read_limited(self, max: u64) -> Result<Vec<u8>> {
        if !self.metadata.is_file() {
            return Err(SecurityError::InvalidInput {
                reason: format!("not a regular file: {}", self.path.display()),
            });
        }
        if self.metadata.len() > max {
            return Err(SecurityError::FileTooLarge {
                size: self.metadata.len(),
                max,
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let mut buffer = Vec::with_capacity(self.metadata.len() as usize);
        self.file.take(max + 1).read_to_end(&mut buffer)?;
        let read = buffer.len() as u64;
        if read > max {
            return Err(SecurityError::FileTooLarge { size: read, max });
        }
        Ok(buffer)
    }

    /// Reads the whole file as UTF-8 text, with the same limits as
    /// [`read_limited`](Self::read_limited).
    ///
    /// # Errors
    ///
    /// As [`read_limited`](Self::read_limited), plus `SecurityError::Io`
    /// with `InvalidData` if the content is not UTF-8.
    pub fn read_to_string_limited(self, max: u64) -> Result<String> {
        let bytes = self.read_limited(max)?;
        String::from_utf8(bytes).map_err(|e| {
            SecurityError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

fn read_only_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }
    options
}
