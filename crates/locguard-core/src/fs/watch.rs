//! Change notifications confined to the trusted base.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use notify::Event;
use notify::RecommendedWatcher;
use notify::RecursiveMode;
use notify::Watcher;
use serde_json::json;

use crate::Result;
use crate::SecurityError;
use crate::audit::EventLevel;
use crate::audit::SecurityLogger;
use crate::fs::VerifiedFile;
use crate::types::ResolvedPath;
use crate::types::TrustedBase;

/// A running watch. Dropping it stops the notifications.
#[derive(Debug)]
pub struct GuardedWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl GuardedWatcher {
    /// Returns the real directory being watched.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Watches `dir` recursively and forwards events to `handler`.
///
/// The directory is verified through a descriptor first and the watch is
/// installed on its real path. Event paths outside the canonical base are
/// removed; an event left with no paths is dropped and logged.
///
/// # Errors
///
/// - `SecurityError::SymlinkEscape` if `dir` resolves outside the base
/// - `SecurityError::InvalidInput` if `dir` is not a directory
/// - `SecurityError::Io` if the directory cannot be opened or the watcher
///   cannot be installed
pub fn watch_directory<F>(
    dir: &ResolvedPath,
    base: &TrustedBase,
    logger: Arc<SecurityLogger>,
    handler: F,
) -> Result<GuardedWatcher>
where
    F: Fn(Event) + Send + 'static,
{
    let handle = VerifiedFile::open(dir, base)?;
    if !handle.metadata().is_dir() {
        return Err(SecurityError::InvalidInput {
            reason: format!("not a directory: {}", dir.as_path().display()),
        });
    }
    let root = handle.real_path().to_path_buf();
    let canonical_base = base.canonical().to_path_buf();

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(mut event) => {
                let before = event.paths.len();
                event.paths.retain(|path| path.starts_with(&canonical_base));
                if before > 0 && event.paths.is_empty() {
                    logger.log(
                        "watch event outside trusted base dropped",
                        EventLevel::Warn,
                        json!({ "base": canonical_base.display().to_string() }),
                    );
                    return;
                }
                handler(event);
            }
            Err(e) => {
                logger.log(
                    "watch error",
                    EventLevel::Error,
                    json!({ "error": e.to_string() }),
                );
            }
        }
    })
    .map_err(notify_error)?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .map_err(notify_error)?;

    Ok(GuardedWatcher {
        _watcher: watcher,
        root,
    })
}

fn notify_error(error: notify::Error) -> SecurityError {
    match error.kind {
        notify::ErrorKind::Io(io) => SecurityError::Io(io),
        _ => SecurityError::Io(std::io::Error::other(error)),
    }
}
