//! Symlink-safe file-system operations.
//!
//! Everything here takes an already validated [`ResolvedPath`] and verifies
//! the *real* location before touching data.
//!
//! [`ResolvedPath`]: crate::types::ResolvedPath

pub mod atomic;
pub mod handle;
pub mod listing;
pub mod nonblocking;
pub mod watch;

pub use atomic::write_atomic;
pub use handle::VerifiedFile;
pub use listing::Listing;
pub use listing::list_directory;
pub use nonblocking::AsyncPathGuard;
pub use watch::GuardedWatcher;
pub use watch::watch_directory;
