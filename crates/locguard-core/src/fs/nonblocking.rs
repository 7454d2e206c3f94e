//! Async variants of the guarded operations.

use std::fs::Metadata;

use serde_json::json;
use tokio::task::JoinError;

use crate::MkdirOptions;
use crate::PathGuard;
use crate::ReaddirOptions;
use crate::Result;
use crate::SanitizeOptions;
use crate::SecurityError;
use crate::WriteOptions;
use crate::audit::EventLevel;
use crate::types::ResolvedPath;

/// Runs [`PathGuard`] operations on tokio's blocking pool.
///
/// Each call clones the guard (a base path and a logger handle) into the
/// blocking task, so the future suspends only while the file-system work
/// runs. A task that fails to join is logged and treated like a soft
/// failure.
///
/// # Examples
///
/// ```no_run
/// use locguard_core::AsyncPathGuard;
/// use locguard_core::PathGuard;
/// use locguard_core::SanitizeOptions;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let guard = AsyncPathGuard::new(PathGuard::new("/srv/app")?);
/// let content = guard
///     .read_to_string("locales/en.json", SanitizeOptions::default())
///     .await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AsyncPathGuard {
    inner: PathGuard,
}

impl AsyncPathGuard {
    /// Wraps a synchronous guard.
    #[must_use]
    pub const fn new(inner: PathGuard) -> Self {
        Self { inner }
    }

    /// Returns the wrapped guard.
    #[must_use]
    pub const fn blocking(&self) -> &PathGuard {
        &self.inner
    }

    /// Async [`PathGuard::read_to_string`].
    pub async fn read_to_string(
        &self,
        candidate: impl Into<String>,
        options: SanitizeOptions,
    ) -> Option<String> {
        let candidate = candidate.into();
        self.soft("read", move |guard| guard.read_to_string(&candidate, &options))
            .await
    }

    /// Async [`PathGuard::read`].
    pub async fn read(
        &self,
        candidate: impl Into<String>,
        options: SanitizeOptions,
    ) -> Option<Vec<u8>> {
        let candidate = candidate.into();
        self.soft("read", move |guard| guard.read(&candidate, &options))
            .await
    }

    /// Async [`PathGuard::write`].
    pub async fn write(
        &self,
        candidate: impl Into<String>,
        data: impl Into<Vec<u8>>,
        options: WriteOptions,
    ) -> bool {
        let candidate = candidate.into();
        let data = data.into();
        self.soft("write", move |guard| guard.write(&candidate, &data, &options))
            .await
    }

    /// Async [`PathGuard::exists`].
    pub async fn exists(&self, candidate: impl Into<String>) -> bool {
        let candidate = candidate.into();
        self.soft("exists", move |guard| guard.exists(&candidate)).await
    }

    /// Async [`PathGuard::metadata`].
    pub async fn metadata(&self, candidate: impl Into<String>) -> Option<Metadata> {
        let candidate = candidate.into();
        self.soft("stat", move |guard| guard.metadata(&candidate)).await
    }

    /// Async [`PathGuard::create_dir`].
    pub async fn create_dir(
        &self,
        candidate: impl Into<String>,
        options: MkdirOptions,
    ) -> Option<ResolvedPath> {
        let candidate = candidate.into();
        self.soft("mkdir", move |guard| guard.create_dir(&candidate, &options))
            .await
    }

    /// Async [`PathGuard::remove`].
    pub async fn remove(&self, candidate: impl Into<String>) -> bool {
        let candidate = candidate.into();
        self.soft("delete", move |guard| guard.remove(&candidate)).await
    }

    /// Async [`PathGuard::read_dir`].
    ///
    /// # Errors
    ///
    /// As [`PathGuard::read_dir`], plus `SecurityError::Io` if the blocking
    /// task fails to join.
    pub async fn read_dir(
        &self,
        candidate: impl Into<String>,
        options: ReaddirOptions,
    ) -> Result<Vec<String>> {
        let candidate = candidate.into();
        let guard = self.inner.clone();
        tokio::task::spawn_blocking(move || guard.read_dir(&candidate, &options))
            .await
            .map_err(|e| {
                self.join_failed("readdir", &e);
                SecurityError::Io(std::io::Error::other(e))
            })?
    }

    async fn soft<T, F>(&self, operation: &'static str, f: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(PathGuard) -> T + Send + 'static,
    {
        let guard = self.inner.clone();
        match tokio::task::spawn_blocking(move || f(guard)).await {
            Ok(value) => value,
            Err(e) => {
                self.join_failed(operation, &e);
                T::default()
            }
        }
    }

    fn join_failed(&self, operation: &str, error: &JoinError) {
        self.inner.logger().log(
            "blocking file operation did not complete",
            EventLevel::Error,
            json!({ "operation": operation, "error": error.to_string() }),
        );
    }
}

impl From<PathGuard> for AsyncPathGuard {
    fn from(inner: PathGuard) -> Self {
        Self::new(inner)
    }
}
