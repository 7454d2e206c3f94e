//! Path-traversal-safe file access for i18n tooling.
//!
//! `locguard-core` validates untrusted path strings against a trusted base
//! directory and performs symlink-safe reads, writes, listings and deletes.
//! Every rejected candidate is recorded as a redacted
//! [`SecurityEvent`](audit::SecurityEvent).
//!
//! Protection covers:
//! - `../` and `..\` traversal, including mixed separators
//! - shell metacharacters, `javascript:`/`data:`/`file:` schemes and UNC
//!   prefixes
//! - symlinks (and symlinks swapped in after validation) that resolve
//!   outside the base
//! - oversized files, FIFOs and other non-regular files
//!
//! # Examples
//!
//! ```no_run
//! use locguard_core::PathGuard;
//! use locguard_core::SanitizeOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let guard = PathGuard::new("/tmp/proj")?;
//! let options = SanitizeOptions::default().with_extensions([".json"]);
//!
//! if let Some(messages) = guard.read_to_string("ui-locales/en.json", &options) {
//!     println!("{messages}");
//! }
//! assert!(guard.validate("../../etc/passwd").is_none());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod audit;
pub mod config;
pub mod error;
pub mod fs;
pub mod guard;
pub mod security;
pub mod types;

// Re-export main API types
pub use config::InputOptions;
pub use config::MAX_FILE_SIZE;
pub use config::MkdirOptions;
pub use config::ReaddirOptions;
pub use config::SanitizeOptions;
pub use config::WriteOptions;
pub use error::Result;
pub use error::SecurityError;
pub use fs::AsyncPathGuard;
pub use fs::GuardedWatcher;
pub use fs::VerifiedFile;
pub use guard::PathGuard;

// Re-export types module for easier access
pub use types::ResolvedPath;
pub use types::TrustedBase;
