//! Directory listings bound to a verified descriptor.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::ReaddirOptions;
use crate::Result;
use crate::SecurityError;
use crate::fs::VerifiedFile;
use crate::security::verify_physical;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// Result of a guarded listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Sorted, `/`-separated entry names relative to the listed directory.
    pub entries: Vec<String>,
    /// Symlinked entries dropped because they resolve outside the base.
    pub escaped: Vec<String>,
}

/// Lists `dir` after verifying it through an open descriptor.
///
/// A missing directory yields an empty listing.
///
/// # Errors
///
/// - `SecurityError::OutsideAllowlist` if `dir` is not under an allowed
///   subdirectory
/// - `SecurityError::SymlinkEscape` if the directory resolves outside the
///   base
/// - `SecurityError::InvalidInput` if `dir` is not a directory
/// - `SecurityError::Io` for other file-system failures
pub fn list_directory(
    dir: &ResolvedPath,
    base: &TrustedBase,
    options: &ReaddirOptions,
) -> Result<Listing> {
    if !options.allowed_subdirs.is_empty() && !dir.is_base() {
        let top = match dir.relative().components().next() {
            Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
            _ => String::new(),
        };
        if !options.is_subdir_allowed(&top) {
            return Err(SecurityError::OutsideAllowlist {
                path: dir.as_path().to_path_buf(),
            });
        }
    }

    let handle = match VerifiedFile::open(dir, base) {
        Ok(handle) => handle,
        Err(e) if e.is_not_found() => return Ok(Listing::default()),
        Err(e) => return Err(e),
    };
    if !handle.metadata().is_dir() {
        return Err(SecurityError::InvalidInput {
            reason: format!("not a directory: {}", dir.as_path().display()),
        });
    }

    let root = listing_root(&handle);
    let filter_top_level = dir.is_base() && !options.allowed_subdirs.is_empty();
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut listing = Listing::default();
    let mut walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::from)?;
        let file_type = entry.file_type();
        let name = relative_name(entry.path(), &root);

        if filter_top_level
            && entry.depth() == 1
            && file_type.is_dir()
            && !options.is_subdir_allowed(&name)
        {
            walker.skip_current_dir();
            continue;
        }

        if options.verify_entries && file_type.is_symlink() {
            match verify_physical(entry.path(), base) {
                Ok(()) => {}
                Err(SecurityError::SymlinkEscape { .. }) => {
                    listing.escaped.push(name);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        listing.entries.push(name);
    }

    listing.entries.sort();
    listing.escaped.sort();
    Ok(listing)
}

/// Directory path to enumerate for an open handle.
///
/// On Linux this is the descriptor's `/proc/self/fd` entry, so the listing
/// reads exactly the directory that was verified.
#[cfg(target_os = "linux")]
fn listing_root(handle: &VerifiedFile) -> PathBuf {
    use std::os::fd::AsRawFd;

    PathBuf::from(format!("/proc/self/fd/{}", handle.as_file().as_raw_fd()))
}

#[cfg(not(target_os = "linux"))]
fn listing_root(handle: &VerifiedFile) -> PathBuf {
    handle.real_path().to_path_buf()
}

fn relative_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
