//! Size-bounded JSON-lines audit file.

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

use chrono::Utc;

use super::SecurityEvent;

/// Appends one JSON line per event and rotates the file when it would grow
/// past `max_bytes`.
///
/// Rotation renames the current file to `<name>.<UTC timestamp>` and keeps
/// at most `keep` rotated files. Appends are serialized by a mutex so
/// concurrent writers never interleave partial lines.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    keep: usize,
    state: Mutex<SinkState>,
}

#[derive(Debug)]
struct SinkState {
    file: File,
    written: u64,
}

impl RotatingFileSink {
    /// Opens (or creates) the audit file at `path` in append mode.
    ///
    /// A `max_bytes` of zero disables rotation.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be opened.
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, keep: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            keep,
            state: Mutex::new(SinkState { file, written }),
        })
    }

    /// Returns the active log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `event` as one JSON line, rotating first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, rotation or the write fails.
    pub fn append(&self, event: &SecurityEvent) -> io::Result<()> {
        let mut line = serde_json::to_vec(event).map_err(io::Error::other)?;
        line.push(b'\n');
        let len = line.len() as u64;

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if self.max_bytes > 0 && state.written > 0 && state.written + len > self.max_bytes {
            self.rotate(&mut state)?;
        }
        state.file.write_all(&line)?;
        state.file.flush()?;
        state.written += len;
        Ok(())
    }

    /// Lists rotated files, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory cannot be read.
    pub fn rotated_files(&self) -> io::Result<Vec<PathBuf>> {
        let Some(name) = self.path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(Vec::new());
        };
        let prefix = format!("{name}.");
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut rotated: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .map(|entry| entry.path())
            .collect();
        rotated.sort();
        Ok(rotated)
    }

    fn rotate(&self, state: &mut SinkState) -> io::Result<()> {
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6fZ");
        let mut target = self.path.with_file_name(format!(
            "{}.{stamp}",
            self.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
        ));
        let mut counter = 1;
        while target.exists() {
            target = self.path.with_file_name(format!(
                "{}.{stamp}-{counter}",
                self.path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
            ));
            counter += 1;
        }

        std::fs::rename(&self.path, &target)?;
        state.file = open_append(&self.path)?;
        state.written = 0;
        self.prune()
    }

    fn prune(&self) -> io::Result<()> {
        let rotated = self.rotated_files()?;
        let excess = rotated.len().saturating_sub(self.keep);
        for old in rotated.into_iter().take(excess) {
            std::fs::remove_file(old)?;
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
